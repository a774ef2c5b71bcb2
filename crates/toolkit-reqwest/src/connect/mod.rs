//! Reqwest client module.

mod client;
mod config;

pub use client::{ReqwestClient, TRACING_TARGET, push_json_to_remote};
pub use config::ReqwestConfig;
