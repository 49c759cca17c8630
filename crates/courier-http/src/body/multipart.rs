//! `multipart/form-data` encoding.

use crate::config::{HttpConfig, MIN_BOUNDARY_RANDOM_LEN};
use crate::resource::{content_type_for, BytesResource, FileResource, MultiResource, Resource};
use bytes::Bytes;
use courier_url::{Charset, TableMap};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, trace};

/// A single multipart field value.
#[derive(Debug, Clone)]
pub enum FormValue {
    /// Plain text, written in the body charset.
    Text(String),
    /// One file part.
    Resource(Arc<dyn Resource>),
    /// One file part per member, all under the same field name.
    Resources(MultiResource),
}

impl FormValue {
    /// Whether the value carries file content.
    pub fn is_resource(&self) -> bool {
        !matches!(self, FormValue::Text(_))
    }

    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

macro_rules! form_value_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FormValue {
                fn from(value: $ty) -> Self {
                    FormValue::Text(value.to_string())
                }
            }
        )*
    };
}

form_value_from_display!(i32, i64, u32, u64, usize, f64, bool);

impl From<Arc<dyn Resource>> for FormValue {
    fn from(value: Arc<dyn Resource>) -> Self {
        FormValue::Resource(value)
    }
}

impl From<BytesResource> for FormValue {
    fn from(value: BytesResource) -> Self {
        FormValue::Resource(Arc::new(value))
    }
}

impl From<FileResource> for FormValue {
    fn from(value: FileResource) -> Self {
        FormValue::Resource(Arc::new(value))
    }
}

impl From<MultiResource> for FormValue {
    fn from(value: MultiResource) -> Self {
        FormValue::Resources(value)
    }
}

/// A `multipart/form-data` body with a fixed boundary.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    fields: TableMap<String, FormValue>,
    boundary: String,
    charset: Charset,
}

impl MultipartBody {
    /// Create a body with a freshly generated boundary.
    pub fn create(fields: TableMap<String, FormValue>, charset: Charset) -> Self {
        let config = HttpConfig::default();
        let boundary = generate_boundary(&config.boundary_prefix, config.boundary_random_len);
        Self::with_boundary(fields, boundary, charset)
    }

    /// Create a body whose boundary follows `config`.
    pub fn from_config(fields: TableMap<String, FormValue>, config: &HttpConfig) -> Self {
        let boundary = generate_boundary(&config.boundary_prefix, config.boundary_random_len);
        Self::with_boundary(fields, boundary, config.charset)
    }

    /// Create a body with an explicit boundary.
    pub fn with_boundary(
        fields: TableMap<String, FormValue>,
        boundary: impl Into<String>,
        charset: Charset,
    ) -> Self {
        Self {
            fields,
            boundary: boundary.into(),
            charset,
        }
    }

    /// Append a field.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<FormValue>) -> &mut Self {
        self.fields.put(name.into(), value.into());
        self
    }

    /// The boundary token, without leading dashes.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Charset of text values and part headers.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// The fields in encounter order.
    pub fn fields(&self) -> &TableMap<String, FormValue> {
        &self.fields
    }

    /// `Content-Type` header value for this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Serialize the body into `out`.
    pub fn write<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        debug!(boundary = %self.boundary, fields = self.fields.len(), "Writing multipart body");

        for (name, value) in self.fields.iter() {
            match value {
                FormValue::Resources(multi) => {
                    for resource in multi.iter() {
                        self.write_resource(out, name, resource.as_ref())?;
                    }
                }
                FormValue::Resource(resource) => self.write_resource(out, name, resource.as_ref())?,
                FormValue::Text(text) => self.write_text(out, name, text)?,
            }
        }

        self.write_str(out, &format!("--{}--\r\n", self.boundary))?;
        out.flush()
    }

    /// Serialize the body into a buffer.
    pub fn to_bytes(&self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    fn write_text<W: Write + ?Sized>(&self, out: &mut W, name: &str, text: &str) -> io::Result<()> {
        trace!(field = name, "Writing text part");
        self.write_str(
            out,
            &format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
                self.boundary, name
            ),
        )?;
        self.write_str(out, text)?;
        out.write_all(b"\r\n")
    }

    fn write_resource<W: Write + ?Sized>(
        &self,
        out: &mut W,
        name: &str,
        resource: &dyn Resource,
    ) -> io::Result<()> {
        let filename = resource.name().unwrap_or(name);
        let content_type = resource
            .content_type()
            .unwrap_or_else(|| content_type_for(filename));
        trace!(field = name, filename, content_type, "Writing file part");

        self.write_str(
            out,
            &format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            ),
        )?;
        io::copy(&mut resource.open()?, out)?;
        out.write_all(b"\r\n")
    }

    fn write_str<W: Write + ?Sized>(&self, out: &mut W, text: &str) -> io::Result<()> {
        out.write_all(&self.charset.encode_lossy(text))
    }
}

/// Boundary made of `prefix` followed by `random_len` random alphanumerics.
///
/// Lengths below [`MIN_BOUNDARY_RANDOM_LEN`] are raised to it.
pub fn generate_boundary(prefix: &str, random_len: usize) -> String {
    let random_len = random_len.max(MIN_BOUNDARY_RANDOM_LEN);
    let tail: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(random_len)
        .map(char::from)
        .collect();
    let boundary = format!("{prefix}{tail}");
    trace!(boundary = %boundary, "Generated multipart boundary");
    boundary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::OCTET_STREAM;
    use test_case::test_case;

    fn body(fields: Vec<(&str, FormValue)>) -> MultipartBody {
        let fields = fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        MultipartBody::with_boundary(fields, "B", Charset::Utf8)
    }

    fn render(body: &MultipartBody) -> String {
        String::from_utf8(body.to_bytes().unwrap().to_vec()).unwrap()
    }

    #[test]
    fn test_single_text_field() {
        let body = body(vec![("name", "Alice".into())]);
        assert_eq!(
            render(&body),
            "--B\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nAlice\r\n--B--\r\n"
        );
    }

    #[test]
    fn test_empty_body_is_closing_boundary() {
        let body = body(vec![]);
        assert_eq!(render(&body), "--B--\r\n");
    }

    #[test]
    fn test_resource_part_headers() {
        let body = body(vec![("upload", BytesResource::named("hi", "note.txt").into())]);
        assert_eq!(
            render(&body),
            "--B\r\nContent-Disposition: form-data; name=\"upload\"; filename=\"note.txt\"\r\n\
             Content-Type: text/plain\r\n\r\nhi\r\n--B--\r\n"
        );
    }

    #[test]
    fn test_unnamed_resource_uses_field_name() {
        let body = body(vec![("blob", BytesResource::new(vec![0u8, 1, 2], None).into())]);
        let bytes = body.to_bytes().unwrap();
        let head = String::from_utf8_lossy(&bytes);
        assert!(head.contains("name=\"blob\"; filename=\"blob\"\r\n"));
        assert!(head.contains(&format!("Content-Type: {}\r\n", OCTET_STREAM)));
        assert!(bytes.windows(3).any(|w| w == [0u8, 1, 2]));
    }

    #[test]
    fn test_resource_collection_flattens() {
        let mut multi = MultiResource::new();
        multi
            .add(BytesResource::named("one", "a.txt"))
            .add(BytesResource::named("two", "b.txt"));
        let body = body(vec![("files", multi.into())]);
        let text = render(&body);

        assert_eq!(text.matches("--B\r\n").count(), 2);
        assert_eq!(text.matches("name=\"files\"").count(), 2);
        assert_eq!(text.matches("--B--\r\n").count(), 1);
        assert!(text.ends_with("two\r\n--B--\r\n"));
        let first = text.find("filename=\"a.txt\"").unwrap();
        let second = text.find("filename=\"b.txt\"").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_duplicate_fields_keep_order() {
        let body = body(vec![("tag", "x".into()), ("tag", 2i32.into()), ("flag", true.into())]);
        let text = render(&body);
        let x = text.find("\r\n\r\nx\r\n").unwrap();
        let two = text.find("\r\n\r\n2\r\n").unwrap();
        let flag = text.find("\r\n\r\ntrue\r\n").unwrap();
        assert!(x < two && two < flag);
    }

    #[test]
    fn test_latin1_text_value() {
        let fields = vec![("city".to_string(), FormValue::from("Zürich"))].into_iter().collect();
        let body = MultipartBody::with_boundary(fields, "B", Charset::Latin1);
        let bytes = body.to_bytes().unwrap();
        assert!(bytes.windows(6).any(|w| w == b"Z\xFCrich"));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(body(vec![]).content_type(), "multipart/form-data; boundary=B");
    }

    #[test_case(16 ; "minimum")]
    #[test_case(32 ; "long")]
    fn test_generated_boundary(len: usize) {
        let boundary = generate_boundary("--Courier_", len);
        assert!(boundary.starts_with("--Courier_"));
        assert_eq!(boundary.len(), "--Courier_".len() + len);
        assert!(boundary["--Courier_".len()..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test_case(0 ; "zero")]
    #[test_case(4 ; "short")]
    fn test_short_random_length_is_raised(len: usize) {
        let config = HttpConfig {
            boundary_prefix: "xx".to_string(),
            boundary_random_len: len,
            ..HttpConfig::default()
        };
        let body = MultipartBody::from_config(TableMap::new(), &config);
        assert_eq!(body.boundary().len(), 2 + MIN_BOUNDARY_RANDOM_LEN);
        assert!(body.boundary()[2..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_created_bodies_differ() {
        let a = MultipartBody::create(TableMap::new(), Charset::Utf8);
        let b = MultipartBody::create(TableMap::new(), Charset::Utf8);
        assert_ne!(a.boundary(), b.boundary());
        assert!(a.boundary().starts_with(&HttpConfig::default().boundary_prefix));
    }

    #[test]
    fn test_from_config_uses_charset() {
        let config = HttpConfig {
            charset: Charset::Latin1,
            boundary_prefix: "xx".to_string(),
            ..HttpConfig::default()
        };
        let body = MultipartBody::from_config(TableMap::new(), &config);
        assert_eq!(body.charset(), Charset::Latin1);
        assert!(body.boundary().starts_with("xx"));
    }
}
