//! Upload and JSON decoding configuration.
//!
//! Both types carry explicit defaults and can be assembled through their
//! builders, deserialized from configuration files, or (with the `config`
//! feature) parsed from command-line flags and environment variables.

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default cap for a whole multipart body: 1 GiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 1024 * 1024 * 1024;

/// Default cap for a JSON request body: 1 MiB.
pub const DEFAULT_MAX_JSON_SIZE: usize = 1024 * 1024;

/// Settings for the multipart upload ingestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[builder(
    name = "UploadConfigBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    /// Maximum size of the whole multipart body in bytes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_UPLOAD_SIZE", default_value_t = DEFAULT_MAX_UPLOAD_SIZE)
    )]
    #[builder(default = "DEFAULT_MAX_UPLOAD_SIZE")]
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,

    /// Accepted MIME types. Empty accepts every type.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "ALLOWED_FILE_TYPES", value_delimiter = ',')
    )]
    #[builder(default)]
    #[serde(default)]
    pub allowed_file_types: Vec<String>,
}

fn default_max_upload_size() -> u64 {
    DEFAULT_MAX_UPLOAD_SIZE
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            allowed_file_types: Vec::new(),
        }
    }
}

impl UploadConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> UploadConfigBuilder {
        UploadConfigBuilder::default()
    }

    /// Returns `true` if `content_type` passes the allow-list.
    ///
    /// Entries match case-insensitively against either the full sniffed
    /// value or its essence without parameters, so `text/plain` accepts
    /// `text/plain; charset=utf-8`. This is wider than an exact comparison:
    /// the sniffer always reports text with a charset parameter, and an
    /// exact match would make bare `text/*` entries unusable.
    pub fn is_allowed(&self, content_type: &str) -> bool {
        if self.allowed_file_types.is_empty() {
            return true;
        }

        let essence = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim();

        self.allowed_file_types.iter().any(|allowed| {
            let allowed = allowed.trim();
            allowed.eq_ignore_ascii_case(content_type) || allowed.eq_ignore_ascii_case(essence)
        })
    }
}

impl UploadConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_upload_size == Some(0) {
            return Err("max upload size must be greater than 0".to_owned());
        }

        Ok(())
    }
}

/// Settings for the strict JSON decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[builder(
    name = "JsonConfigBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
#[serde(rename_all = "camelCase")]
pub struct JsonConfig {
    /// Maximum size of a JSON body in bytes.
    #[cfg_attr(
        feature = "config",
        arg(long = "max-json-size", env = "MAX_JSON_SIZE", default_value_t = DEFAULT_MAX_JSON_SIZE)
    )]
    #[builder(default = "DEFAULT_MAX_JSON_SIZE")]
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Accept object keys the destination type does not declare.
    #[cfg_attr(feature = "config", arg(long, env = "ALLOW_UNKNOWN_FIELDS"))]
    #[builder(default)]
    #[serde(default)]
    pub allow_unknown_fields: bool,
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_JSON_SIZE
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_JSON_SIZE,
            allow_unknown_fields: false,
        }
    }
}

impl JsonConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> JsonConfigBuilder {
        JsonConfigBuilder::default()
    }
}

impl JsonConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.max_body_size == Some(0) {
            return Err("max body size must be greater than 0".to_owned());
        }

        Ok(())
    }
}
