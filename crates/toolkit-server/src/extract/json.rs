//! Strict JSON extractor.

use axum::extract::{FromRef, FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;
use toolkit_core::ErrorKind;

use crate::config::JsonConfig;
use crate::handler::{Error, JsonResponse, read_json};

/// JSON extractor backed by [`read_json`].
///
/// Unlike [`axum::Json`] it caps the body at [`JsonConfig::max_body_size`],
/// rejects unknown object keys unless configured otherwise, rejects
/// trailing values, and renders every rejection as the JSON error envelope.
/// The [`JsonConfig`] is taken from router state through [`FromRef`].
///
/// When used as a response, the value is wrapped in a success
/// [`JsonResponse`].
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    JsonConfig: FromRef<S>,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let config = JsonConfig::from_ref(state);

        match read_json(req.into_body(), &config).await {
            Ok(value) => Ok(Self(value)),
            Err(err) if err.kind() == ErrorKind::BodyTooLarge => {
                Err(Error::new(err).with_status(StatusCode::PAYLOAD_TOO_LARGE))
            }
            Err(err) => Err(Error::new(err)),
        }
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        JsonResponse::success("success", self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::routing::post;
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::Value;

    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct Greeting {
        name: String,
    }

    async fn echo(Json(greeting): Json<Greeting>) -> Json<Greeting> {
        Json(greeting)
    }

    fn server(config: JsonConfig) -> anyhow::Result<TestServer> {
        let router = Router::new().route("/", post(echo)).with_state(config);
        Ok(TestServer::new(router)?)
    }

    #[tokio::test]
    async fn accepts_valid_body() -> anyhow::Result<()> {
        let server = server(JsonConfig::default())?;

        let response = server.post("/").text(r#"{"name": "ferris"}"#).await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["error"], false);
        assert_eq!(body["data"]["name"], "ferris");
        Ok(())
    }

    #[tokio::test]
    async fn rejects_unknown_key_with_envelope() -> anyhow::Result<()> {
        let server = server(JsonConfig::default())?;

        let response = server
            .post("/")
            .text(r#"{"name": "ferris", "age": 8}"#)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body = response.json::<Value>();
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "body contains unknown key \"age\"");
        assert!(body.get("data").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn accepts_unknown_key_when_allowed() -> anyhow::Result<()> {
        let config = JsonConfig::builder()
            .with_allow_unknown_fields(true)
            .build()?;
        let server = server(config)?;

        let response = server
            .post("/")
            .text(r#"{"name": "ferris", "age": 8}"#)
            .await;
        response.assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn oversized_body_is_payload_too_large() -> anyhow::Result<()> {
        let config = JsonConfig::builder().with_max_body_size(8usize).build()?;
        let server = server(config)?;

        let response = server.post("/").text(r#"{"name": "ferris"}"#).await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        let body = response.json::<Value>();
        assert_eq!(body["message"], "body must not be larger than 8 bytes");
        Ok(())
    }

    #[tokio::test]
    async fn empty_body_is_rejected() -> anyhow::Result<()> {
        let server = server(JsonConfig::default())?;

        let response = server.post("/").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["message"], "body must not be empty");
        Ok(())
    }
}
