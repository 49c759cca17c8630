//! HTTP errors.

use courier_url::UrlError;
use std::path::PathBuf;

/// Errors raised by bodies, response streams and the cookie jar.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Underlying read or write failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response status of 400 or above.
    #[error("request failed with status {status}")]
    Status {
        /// Status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// A file resource does not exist.
    #[error("resource not found: {}", path.display())]
    ResourceNotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// Reading or writing cookie headers failed.
    #[error("cookie store error: {message}")]
    Cookie {
        /// What failed.
        message: String,
        /// Cause.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A header name or value could not be built.
    #[error("invalid header: {name}")]
    InvalidHeader {
        /// Offending header.
        name: String,
    },

    /// URL parsing failure.
    #[error(transparent)]
    Url(#[from] UrlError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl HttpError {
    /// Create a cookie store error wrapping its cause.
    pub fn cookie(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Cookie {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a client (4xx) status error.
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Whether this is a server (5xx) status error.
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s >= 500)
    }
}

/// Result type alias for HTTP operations.
pub type HttpResult<T> = std::result::Result<T, HttpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = HttpError::Status {
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.to_string(), "request failed with status 503");
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_cookie_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = HttpError::cookie("failed to persist cookies", io);
        assert!(err.to_string().contains("failed to persist cookies"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_url_error_is_transparent() {
        let err: HttpError = UrlError::Blank.into();
        assert_eq!(err.to_string(), "URL must not be blank");
    }
}
