//! Configuration for the reqwest client.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default timeout for outbound requests: 30 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the reqwest HTTP client.
///
/// Unset or zero values fall back to the defaults through
/// [`effective_timeout`](Self::effective_timeout) and
/// [`effective_user_agent`](Self::effective_user_agent).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[serde(rename_all = "camelCase")]
pub struct ReqwestConfig {
    /// Timeout for outbound requests in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "remote-timeout", env = "REMOTE_TIMEOUT")
    )]
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with outbound requests.
    #[cfg_attr(
        feature = "config",
        arg(long = "remote-user-agent", env = "REMOTE_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ReqwestConfig {
    /// Returns the default user agent string.
    fn default_user_agent() -> String {
        format!("toolkit/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Sets the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the effective timeout, using the default if unset or zero.
    pub fn effective_timeout(&self) -> Duration {
        match self.timeout_secs {
            Some(secs) if secs > 0 => Duration::from_secs(secs),
            _ => DEFAULT_TIMEOUT,
        }
    }

    /// Returns the effective user agent, using the default if unset or empty.
    pub fn effective_user_agent(&self) -> String {
        match self.user_agent.as_deref() {
            Some(user_agent) if !user_agent.is_empty() => user_agent.to_owned(),
            _ => Self::default_user_agent(),
        }
    }
}
