//! Outgoing request bodies.

mod form;
mod multipart;

pub use self::form::{FormBody, FORM_URLENCODED};
pub use self::multipart::{generate_boundary, FormValue, MultipartBody};

use crate::error::{HttpError, HttpResult};
use bytes::Bytes;
use courier_url::{Charset, TableMap};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use std::io::{self, Write};

/// A request body together with its content type.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Raw bytes.
    Bytes {
        /// Body content.
        data: Bytes,
        /// `Content-Type` value, if known.
        content_type: Option<String>,
    },
    /// Form-encoded text fields.
    Form(FormBody),
    /// Multipart fields.
    Multipart(MultipartBody),
}

impl RequestBody {
    /// Form-encoded body unless a field holds a resource, multipart otherwise.
    pub fn from_fields(fields: TableMap<String, FormValue>, charset: Charset) -> Self {
        if fields.values().iter().any(FormValue::is_resource) {
            return RequestBody::Multipart(MultipartBody::create(fields, charset));
        }

        let pairs = fields
            .into_iter()
            .filter_map(|(name, value)| match value {
                FormValue::Text(text) => Some((name, text)),
                _ => None,
            });
        RequestBody::Form(FormBody::from_pairs(pairs, charset))
    }

    /// Raw bytes with an explicit content type.
    pub fn bytes(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        RequestBody::Bytes {
            data: data.into(),
            content_type: Some(content_type.into()),
        }
    }

    /// `Content-Type` header value for this body.
    pub fn content_type(&self) -> Option<String> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Bytes { content_type, .. } => content_type.clone(),
            RequestBody::Form(_) => Some(FORM_URLENCODED.to_string()),
            RequestBody::Multipart(body) => Some(body.content_type()),
        }
    }

    /// Set `Content-Type` on `headers` unless the caller already did.
    pub fn apply_headers(&self, headers: &mut HeaderMap) -> HttpResult<()> {
        let Some(content_type) = self.content_type() else {
            return Ok(());
        };
        if headers.contains_key(CONTENT_TYPE) {
            return Ok(());
        }
        let value = HeaderValue::from_str(&content_type).map_err(|_| HttpError::InvalidHeader {
            name: CONTENT_TYPE.to_string(),
        })?;
        headers.insert(CONTENT_TYPE, value);
        Ok(())
    }

    /// Whether there is nothing to send.
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Bytes { data, .. } => data.is_empty(),
            RequestBody::Form(form) => form.is_empty(),
            RequestBody::Multipart(_) => false,
        }
    }

    /// Serialize the body into `out`.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            RequestBody::Empty => Ok(()),
            RequestBody::Bytes { data, .. } => out.write_all(data),
            RequestBody::Form(form) => form.write(out),
            RequestBody::Multipart(body) => body.write(out),
        }
    }

    /// Serialize the body into a buffer.
    pub fn to_bytes(&self) -> io::Result<Bytes> {
        match self {
            RequestBody::Bytes { data, .. } => Ok(data.clone()),
            _ => {
                let mut buf = Vec::new();
                self.write_to(&mut buf)?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

impl From<FormBody> for RequestBody {
    fn from(form: FormBody) -> Self {
        RequestBody::Form(form)
    }
}

impl From<MultipartBody> for RequestBody {
    fn from(body: MultipartBody) -> Self {
        RequestBody::Multipart(body)
    }
}
