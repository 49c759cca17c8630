//! HTTP configuration.

use crate::cookie::CookieManager;
use crate::error::{HttpError, HttpResult};
use courier_url::Charset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shortest random tail allowed in a multipart boundary.
pub const MIN_BOUNDARY_RANDOM_LEN: usize = 16;

/// HTTP configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Charset for URL encoding and text form values.
    #[serde(with = "charset_label")]
    pub charset: Charset,
    /// Persist and attach cookies.
    pub cookies_enabled: bool,
    /// Transparently decode gzip/deflate response bodies.
    pub decompress: bool,
    /// Fixed prefix of generated multipart boundaries.
    pub boundary_prefix: String,
    /// Number of random characters after the boundary prefix.
    pub boundary_random_len: usize,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            charset: Charset::Utf8,
            cookies_enabled: true,
            decompress: true,
            boundary_prefix: "--------------------Courier_".to_string(),
            boundary_random_len: MIN_BOUNDARY_RANDOM_LEN,
            user_agent: format!("courier/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    /// Parse a YAML document; missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> HttpResult<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| HttpError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> HttpResult<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Defaults overridden by `COURIER_*` environment variables.
    pub fn from_env() -> HttpResult<Self> {
        let mut config = Self::default();

        if let Ok(charset) = std::env::var("COURIER_CHARSET") {
            config.charset = charset.parse().map_err(HttpError::Config)?;
        }

        if let Ok(cookies) = std::env::var("COURIER_COOKIES") {
            config.cookies_enabled = parse_flag(&cookies);
        }

        if let Ok(decompress) = std::env::var("COURIER_DECOMPRESS") {
            config.decompress = parse_flag(&decompress);
        }

        if let Ok(prefix) = std::env::var("COURIER_BOUNDARY_PREFIX") {
            config.boundary_prefix = prefix;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> HttpResult<()> {
        if self.boundary_prefix.is_empty() {
            return Err(HttpError::Config("boundary_prefix must not be empty".to_string()));
        }
        if self.boundary_random_len < MIN_BOUNDARY_RANDOM_LEN {
            return Err(HttpError::Config(format!(
                "boundary_random_len must be at least {} (got {})",
                MIN_BOUNDARY_RANDOM_LEN, self.boundary_random_len
            )));
        }
        Ok(())
    }

    /// Cookie manager matching `cookies_enabled`.
    pub fn cookie_manager(&self) -> CookieManager {
        if self.cookies_enabled {
            CookieManager::thread()
        } else {
            CookieManager::Disabled
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

mod charset_label {
    use courier_url::Charset;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(charset: &Charset, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(charset.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Charset, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}
