//! Request bodies, response streams and cookies for Courier.
//!
//! This crate turns values into wire bytes and back:
//!
//! - `resource` - byte sources for uploads (memory, files, collections)
//! - `body` - form-encoded and multipart request bodies
//! - `response` - status-aware, transparently decompressed response streams
//! - `cookie` - per-thread or per-scope cookie jars and the dispatcher

#![warn(missing_docs)]

pub mod body;
pub mod config;
pub mod cookie;
pub mod error;
pub mod resource;
pub mod response;

pub use body::{FormBody, FormValue, MultipartBody, RequestBody};
pub use config::HttpConfig;
pub use self::cookie::{
    disable_global, global_manager, set_global_manager, Cookie, CookieDispatcher, CookieManager, CookieScope,
    CookieStore, ScopedCookieStore, ThreadCookieStore,
};
pub use error::{HttpError, HttpResult};
pub use resource::{BytesResource, FileResource, MultiResource, Resource};
pub use response::{ByteSource, ContentCoding, ResponseContentStream};

/// Common HTTP header values.
pub mod headers {
    /// `application/x-www-form-urlencoded`.
    pub const CONTENT_TYPE_FORM: &str = crate::body::FORM_URLENCODED;
    /// Prefix of multipart content types.
    pub const CONTENT_TYPE_MULTIPART: &str = "multipart/form-data";
    /// `application/octet-stream`.
    pub const CONTENT_TYPE_OCTET_STREAM: &str = crate::resource::OCTET_STREAM;
    /// `Accept-Encoding` value matching the decoders in [`crate::response`].
    pub const ACCEPT_ENCODING_SUPPORTED: &str = "gzip, deflate";
    /// Legacy cookie header.
    pub const SET_COOKIE2: &str = crate::cookie::SET_COOKIE2;
}
