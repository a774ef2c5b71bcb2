//! Demo routes wiring every toolkit helper to an endpoint.

use std::sync::Arc;

use axum::Router;
use axum::extract::{FromRef, Path, Request, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolkit_core::{random_string, slugify};
use toolkit_reqwest::ReqwestClient;
use toolkit_server::extract::Json;
use toolkit_server::handler::{
    Error, FileNaming, JsonResponse, PartialUpload, Result, UploadedFile,
    download_static_file_in, upload_files, upload_one_file,
};
use toolkit_server::{JsonConfig, UploadConfig};

use crate::config::{Cli, StorageConfig};

/// Longest string `GET /random/{length}` produces.
pub const MAX_RANDOM_LENGTH: usize = 4096;

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    storage: Arc<StorageConfig>,
    upload: Arc<UploadConfig>,
    json: JsonConfig,
    remote: ReqwestClient,
}

impl AppState {
    /// Creates the state from parsed CLI configuration.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        Ok(Self {
            storage: Arc::new(cli.storage.clone()),
            upload: Arc::new(cli.upload.clone()),
            json: cli.json,
            remote: ReqwestClient::new(cli.remote.clone())?,
        })
    }
}

impl FromRef<AppState> for JsonConfig {
    fn from_ref(state: &AppState) -> Self {
        state.json
    }
}

/// Returns a [`Router`] with every demo route.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/upload/one", post(upload_one))
        .route("/download/{file}", get(download))
        .route("/json", post(echo_json))
        .route("/slugify", post(create_slug))
        .route("/random/{length}", get(create_random))
        .route("/push", post(push))
        .with_state(state)
}

async fn upload(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, JsonResponse<Vec<UploadedFile>>)> {
    let files = upload_files(
        request,
        &state.storage.upload_dir,
        &state.upload,
        FileNaming::Random,
    )
    .await?;

    let message = format!("{} file(s) uploaded", files.len());
    Ok((StatusCode::CREATED, JsonResponse::success(message, files)))
}

async fn upload_one(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, JsonResponse<UploadedFile>)> {
    let file = upload_one_file(
        request,
        &state.storage.upload_dir,
        &state.upload,
        FileNaming::Original,
    )
    .await
    .map_err(|error| PartialUpload {
        uploaded: Vec::new(),
        error,
    })?;

    Ok((StatusCode::CREATED, JsonResponse::success("file uploaded", file)))
}

async fn download(
    State(state): State<AppState>,
    Path(file): Path<String>,
    request: Request,
) -> Response {
    download_static_file_in(request, &state.storage.static_dir, &file, &file).await
}

/// Body of `POST /json`.
#[derive(Debug, Serialize, Deserialize)]
struct Note {
    title: String,
    #[serde(default)]
    body: String,
}

async fn echo_json(Json(note): Json<Note>) -> JsonResponse<Note> {
    JsonResponse::success("received", note)
}

#[derive(Debug, Deserialize)]
struct SlugRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct SlugResponse {
    slug: String,
}

async fn create_slug(Json(request): Json<SlugRequest>) -> Result<JsonResponse<SlugResponse>> {
    let slug = slugify(&request.text)?;
    Ok(JsonResponse::success("slug created", SlugResponse { slug }))
}

#[derive(Debug, Serialize)]
struct RandomResponse {
    value: String,
}

async fn create_random(Path(length): Path<usize>) -> JsonResponse<RandomResponse> {
    let value = random_string(length.min(MAX_RANDOM_LENGTH));
    JsonResponse::success("random string generated", RandomResponse { value })
}

#[derive(Debug, Deserialize)]
struct PushRequest {
    url: String,
    payload: Value,
}

#[derive(Debug, Serialize)]
struct PushResponse {
    status: u16,
}

async fn push(
    State(state): State<AppState>,
    Json(request): Json<PushRequest>,
) -> Result<JsonResponse<PushResponse>> {
    let (_, status) = state
        .remote
        .push_json(&request.url, &request.payload)
        .await
        .map_err(|err| Error::new(err.into()).with_status(StatusCode::BAD_GATEWAY))?;

    Ok(JsonResponse::success(
        "payload delivered",
        PushResponse {
            status: status.as_u16(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use axum_test::multipart::{MultipartForm, Part};
    use clap::Parser;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\x00\x00\x00\x01";
    const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\x00\x10JFIF\x00\x01\x01\x00\x00\x01\x00\x01";

    struct Harness {
        server: TestServer,
        uploads: TempDir,
        statics: TempDir,
    }

    fn harness() -> anyhow::Result<Harness> {
        let uploads = tempfile::tempdir()?;
        let statics = tempfile::tempdir()?;

        let cli = Cli::try_parse_from([
            "toolkit",
            "--upload-dir",
            uploads.path().to_str().unwrap_or_default(),
            "--static-dir",
            statics.path().to_str().unwrap_or_default(),
            "--allowed-file-types",
            "image/png",
        ])?;

        let server = TestServer::new(routes(AppState::from_cli(&cli)?))?;
        Ok(Harness {
            server,
            uploads,
            statics,
        })
    }

    fn png_part(name: &str) -> Part {
        Part::bytes(PNG).file_name(name).mime_type("image/png")
    }

    #[tokio::test]
    async fn upload_renames_files() -> anyhow::Result<()> {
        let harness = harness()?;

        let form = MultipartForm::new()
            .add_part("file", png_part("img.png"))
            .add_text("title", "holiday");
        let response = harness.server.post("/upload").multipart(form).await;
        response.assert_status(StatusCode::CREATED);

        let body = response.json::<JsonResponse<Vec<UploadedFile>>>();
        assert!(!body.error);
        let files = body.data.unwrap_or_default();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].original_file_name, "img.png");
        assert_ne!(files[0].new_file_name, "img.png");
        assert!(harness.uploads.path().join(&files[0].new_file_name).is_file());
        Ok(())
    }

    #[tokio::test]
    async fn partial_upload_reports_written_files() -> anyhow::Result<()> {
        let harness = harness()?;

        let form = MultipartForm::new()
            .add_part("file", png_part("one.png"))
            .add_part("file", Part::bytes(JPEG).file_name("two.jpg"));
        let response = harness.server.post("/upload").multipart(form).await;
        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let body = response.json::<Value>();
        assert_eq!(body["error"], true);
        assert_eq!(body["data"][0]["originalFileName"], "one.png");
        Ok(())
    }

    #[tokio::test]
    async fn single_upload_keeps_original_name() -> anyhow::Result<()> {
        let harness = harness()?;

        let form = MultipartForm::new().add_part("file", png_part("img.png"));
        let response = harness.server.post("/upload/one").multipart(form).await;
        response.assert_status(StatusCode::CREATED);

        assert!(harness.uploads.path().join("img.png").is_file());
        Ok(())
    }

    #[tokio::test]
    async fn single_upload_without_file() -> anyhow::Result<()> {
        let harness = harness()?;

        let form = MultipartForm::new().add_text("title", "holiday");
        let response = harness.server.post("/upload/one").multipart(form).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "no file provided");
        Ok(())
    }

    #[tokio::test]
    async fn download_serves_attachment() -> anyhow::Result<()> {
        let harness = harness()?;
        std::fs::write(harness.statics.path().join("notes.txt"), b"hello")?;

        let response = harness.server.get("/download/notes.txt").await;
        response.assert_status_ok();
        assert_eq!(
            response.header("content-disposition"),
            "attachment; filename=\"notes.txt\""
        );
        assert_eq!(response.text(), "hello");
        Ok(())
    }

    #[tokio::test]
    async fn json_rejects_unknown_keys() -> anyhow::Result<()> {
        let harness = harness()?;

        let response = harness
            .server
            .post("/json")
            .json(&json!({ "title": "a", "tilte": "b" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["message"],
            "body contains unknown key \"tilte\""
        );
        Ok(())
    }

    #[tokio::test]
    async fn json_echoes_value() -> anyhow::Result<()> {
        let harness = harness()?;

        let response = harness
            .server
            .post("/json")
            .json(&json!({ "title": "a" }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["title"], "a");
        Ok(())
    }

    #[tokio::test]
    async fn slugify_route() -> anyhow::Result<()> {
        let harness = harness()?;

        let response = harness
            .server
            .post("/slugify")
            .json(&json!({ "text": "Now is the time!" }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["slug"], "now-is-the-time");

        let response = harness
            .server
            .post("/slugify")
            .json(&json!({ "text": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["message"],
            "empty string not permitted"
        );
        Ok(())
    }

    #[tokio::test]
    async fn random_route_caps_length() -> anyhow::Result<()> {
        let harness = harness()?;

        let response = harness.server.get("/random/10").await;
        let value = response.json::<Value>()["data"]["value"].clone();
        assert_eq!(value.as_str().map(str::len), Some(10));

        let response = harness.server.get("/random/100000").await;
        let value = response.json::<Value>()["data"]["value"].clone();
        assert_eq!(value.as_str().map(str::len), Some(MAX_RANDOM_LENGTH));
        Ok(())
    }

    #[tokio::test]
    async fn push_reports_remote_status() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let remote = Router::new().route("/", post(|| async { StatusCode::ACCEPTED }));
        tokio::spawn(async move { axum::serve(listener, remote).await });

        let harness = harness()?;
        let response = harness
            .server
            .post("/push")
            .json(&json!({ "url": format!("http://{address}/"), "payload": { "a": 1 } }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["status"], 202);
        Ok(())
    }
}
