#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for filesystem operations.
pub const TRACING_TARGET_FS: &str = "toolkit_core::fs";

mod error;

pub mod fs;
pub mod random;
pub mod slug;
pub mod sniff;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::fs::create_dir_if_not_exist;
pub use crate::random::random_string;
pub use crate::slug::slugify;
pub use crate::sniff::detect_content_type;
