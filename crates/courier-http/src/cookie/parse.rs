//! `Set-Cookie` parsing and request matching.

use ::cookie::Cookie as SetCookie;
use chrono::{DateTime, Duration, Utc};
use courier_url::UrlBuilder;
use std::fmt;
use std::net::IpAddr;
use tracing::debug;

/// A cookie received from a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    domain: String,
    host_only: bool,
    path: String,
    secure: bool,
    http_only: bool,
    expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Create a host-only session cookie for `domain` and `path`.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into().to_ascii_lowercase(),
            host_only: true,
            path: path.into(),
            secure: false,
            http_only: false,
            expires: None,
        }
    }

    /// Parse one `Set-Cookie` value received for `uri`.
    ///
    /// Returns `None` for values without a name or whose `Domain` does not
    /// cover the request host.
    pub fn parse(header: &str, uri: &UrlBuilder) -> Option<Self> {
        Self::parse_at(header, uri, Utc::now())
    }

    pub(crate) fn parse_at(header: &str, uri: &UrlBuilder, now: DateTime<Utc>) -> Option<Self> {
        let raw = match SetCookie::parse(header) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(header, error = %err, "Ignoring unparsable cookie");
                return None;
            }
        };

        let host = uri.host().to_ascii_lowercase();
        let mut cookie = Cookie::new(raw.name(), raw.value_trimmed(), host.clone(), default_path(uri));

        if let Some(domain) = raw.domain().map(|d| d.trim_start_matches('.')).filter(|d| !d.is_empty()) {
            let domain = domain.to_ascii_lowercase();
            if !domain_matches(&host, &domain) {
                debug!(domain = %domain, host = %host, "Rejecting cookie for foreign domain");
                return None;
            }
            cookie.domain = domain;
            cookie.host_only = false;
        }
        if let Some(path) = raw.path().filter(|p| p.starts_with('/')) {
            cookie.path = path.to_string();
        }
        cookie.secure = raw.secure().unwrap_or(false);
        cookie.http_only = raw.http_only().unwrap_or(false);

        // Max-Age takes precedence over Expires.
        cookie.expires = match raw.max_age() {
            Some(max_age) if max_age.whole_seconds() <= 0 => Some(DateTime::<Utc>::MIN_UTC),
            Some(max_age) => Some(
                Duration::try_seconds(max_age.whole_seconds())
                    .and_then(|delta| now.checked_add_signed(delta))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            None => raw
                .expires_datetime()
                .and_then(|expires| DateTime::from_timestamp(expires.unix_timestamp(), 0)),
        };

        Some(cookie)
    }

    /// Cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Domain the cookie belongs to.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Whether the cookie is sent to its exact host only.
    pub fn is_host_only(&self) -> bool {
        self.host_only
    }

    /// Path prefix the cookie is sent for.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the cookie is restricted to secure schemes.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Whether the cookie carries the `HttpOnly` flag.
    pub fn is_http_only(&self) -> bool {
        self.http_only
    }

    /// Expiry instant; `None` for session cookies.
    pub fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Set the expiry instant.
    pub fn set_expires(&mut self, expires: Option<DateTime<Utc>>) -> &mut Self {
        self.expires = expires;
        self
    }

    /// Restrict the cookie to secure schemes.
    pub fn set_secure(&mut self, secure: bool) -> &mut Self {
        self.secure = secure;
        self
    }

    /// Whether the cookie has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// Whether the cookie should be sent with a request to `uri` at `now`.
    pub fn matches(&self, uri: &UrlBuilder, now: DateTime<Utc>) -> bool {
        if self.is_expired(now) || (self.secure && !uri.is_secure()) {
            return false;
        }

        let host = uri.host().to_ascii_lowercase();
        let domain_ok = if self.host_only {
            host == self.domain
        } else {
            domain_matches(&host, &self.domain)
        };

        domain_ok && path_matches(&uri.path().to_string(), &self.path)
    }

    pub(crate) fn key(&self) -> (String, String, String) {
        (self.domain.clone(), self.path.clone(), self.name.clone())
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

fn default_path(uri: &UrlBuilder) -> String {
    let path = uri.path().to_string();
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(index) => path[..index].to_string(),
    }
}

fn domain_matches(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }
    host.parse::<IpAddr>().is_err()
        && host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

fn path_matches(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}
