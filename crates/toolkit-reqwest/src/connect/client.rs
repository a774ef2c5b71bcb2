//! Reqwest-based client for outbound JSON delivery.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;

use super::ReqwestConfig;
use crate::error::Result;

/// Tracing target for reqwest client operations.
pub const TRACING_TARGET: &str = "toolkit_reqwest::client";

/// Inner client that holds the HTTP client and configuration.
struct ReqwestClientInner {
    http: Client,
    config: ReqwestConfig,
}

/// Reqwest-based HTTP client that posts JSON payloads to remote endpoints.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ReqwestClient {
    inner: Arc<ReqwestClientInner>,
}

impl std::fmt::Debug for ReqwestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestClient {
    /// Creates a new reqwest client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ReqwestConfig) -> Result<Self> {
        let timeout = config.effective_timeout();
        let user_agent = config.effective_user_agent();

        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = timeout.as_millis(),
            user_agent = %user_agent,
            "Creating reqwest client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        let inner = ReqwestClientInner { http, config };
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Creates a new reqwest client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ReqwestConfig::default())
    }

    /// Gets the client configuration.
    pub fn config(&self) -> &ReqwestConfig {
        &self.inner.config
    }

    /// Serializes `data` as JSON and POSTs it to `url`.
    ///
    /// Any status the remote answers with is returned, success or not; only
    /// serialization and transport failures are errors.
    pub async fn push_json<T>(&self, url: &str, data: &T) -> Result<(Response, StatusCode)>
    where
        T: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(data)?;

        tracing::debug!(
            target: TRACING_TARGET,
            url,
            size = payload.len(),
            "Pushing JSON payload"
        );

        let response = self
            .inner
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .inspect_err(|err| {
                tracing::warn!(
                    target: TRACING_TARGET,
                    url,
                    error = %err,
                    "JSON push failed"
                );
            })?;

        let status = response.status();
        tracing::debug!(
            target: TRACING_TARGET,
            url,
            status = status.as_u16(),
            "JSON push completed"
        );

        Ok((response, status))
    }
}

/// Serializes `data` as JSON and POSTs it to `url` through a client with
/// default settings.
pub async fn push_json_to_remote<T>(url: &str, data: &T) -> Result<(Response, StatusCode)>
where
    T: Serialize + ?Sized,
{
    ReqwestClient::with_defaults()?.push_json(url, data).await
}
