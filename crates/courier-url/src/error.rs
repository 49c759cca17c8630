//! Error types for URL handling.

use crate::charset::Charset;
use thiserror::Error;

/// Errors raised while parsing or building URLs.
#[derive(Debug, Error)]
pub enum UrlError {
    /// The URL string was empty or only whitespace.
    #[error("URL must not be blank")]
    Blank,

    /// The URL has no `scheme://` prefix.
    #[error("URL has no scheme: {url}")]
    MissingScheme {
        /// The offending input.
        url: String,
    },

    /// The URL has no host component.
    #[error("URL has no host: {url}")]
    MissingHost {
        /// The offending input.
        url: String,
    },

    /// The port is not a valid TCP port.
    #[error("URL has an invalid port: {url}")]
    InvalidPort {
        /// The offending input.
        url: String,
    },

    /// A character cannot be represented in the target charset.
    #[error("character {ch:?} cannot be encoded as {charset}")]
    Unencodable {
        /// The character.
        ch: char,
        /// The target charset.
        charset: Charset,
    },

    /// Conversion through the `url` crate failed.
    #[error("URL parse error: {0}")]
    Parse(#[from] url::ParseError),
}

/// Result type alias for URL operations.
pub type UrlResult<T> = std::result::Result<T, UrlError>;
