//! Listener address and shutdown behaviour of the demo server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;
use crate::server::ServerError;

/// Ports the server may bind; privileged ports are refused.
pub const PORT_RANGE: RangeInclusive<u16> = 1024..=u16::MAX;

/// Accepted drain timeouts, in seconds.
pub const SHUTDOWN_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=300;

/// Where the server listens and how long it drains on shutdown.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Address to listen on; `0.0.0.0` exposes the server on every interface.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on (1024-65535).
    #[arg(short = 'p', long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Seconds in-flight requests get to finish after SIGINT/SIGTERM
    /// before their connections are dropped (1-300).
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

impl ServerConfig {
    /// Checks the port and drain timeout against their accepted ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidConfig`] naming the offending value.
    pub fn validate(&self) -> Result<(), ServerError> {
        if !PORT_RANGE.contains(&self.port) {
            return Err(ServerError::InvalidConfig(format!(
                "port {} is privileged, use {}-{}",
                self.port,
                PORT_RANGE.start(),
                PORT_RANGE.end()
            )));
        }

        if !SHUTDOWN_TIMEOUT_RANGE.contains(&self.shutdown_timeout) {
            return Err(ServerError::InvalidConfig(format!(
                "shutdown timeout of {}s is outside {}-{}s",
                self.shutdown_timeout,
                SHUTDOWN_TIMEOUT_RANGE.start(),
                SHUTDOWN_TIMEOUT_RANGE.end()
            )));
        }

        Ok(())
    }

    /// Socket address the listener binds.
    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Drain timeout applied after a shutdown signal.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    #[must_use]
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "Server configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 3000,
            shutdown_timeout: 30,
        }
    }
}
