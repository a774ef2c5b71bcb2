//! Outbound JSON delivery over reqwest.
//!
//! [`ReqwestClient::push_json`] serializes a value, POSTs it with
//! `Content-Type: application/json` and hands back the response together
//! with its status code. [`push_json_to_remote`] does the same through a
//! client built from [`ReqwestConfig::default`].
//!
//! # Example
//!
//! ```rust,ignore
//! use toolkit_reqwest::{ReqwestClient, ReqwestConfig};
//!
//! let client = ReqwestClient::new(ReqwestConfig::default().with_user_agent("uploader/1.0"))?;
//! let (response, status) = client
//!     .push_json("https://example.com/hook", &serde_json::json!({ "ok": true }))
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod connect;
mod error;

pub use crate::connect::{ReqwestClient, ReqwestConfig, TRACING_TARGET, push_json_to_remote};
pub use crate::error::{Error, Result};
