//! Response body streams.

use crate::error::{HttpError, HttpResult};
use bytes::Bytes;
use flate2::read::{DeflateDecoder, GzDecoder};
use http::header::CONTENT_ENCODING;
use http::HeaderMap;
use std::fmt;
use std::io::{self, BufRead, BufReader, Cursor, Read};
use tracing::{debug, warn};

/// Content coding of a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentCoding {
    /// Not compressed.
    #[default]
    Identity,
    /// gzip.
    Gzip,
    /// Raw deflate, without zlib header.
    Deflate,
}

impl ContentCoding {
    /// Coding declared by `Content-Encoding`, gzip winning over deflate.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut coding = ContentCoding::Identity;
        let tokens = headers
            .get_all(CONTENT_ENCODING)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .map(|token| token.trim().to_ascii_lowercase());

        for token in tokens {
            match token.as_str() {
                "gzip" | "x-gzip" => return ContentCoding::Gzip,
                "deflate" => coding = ContentCoding::Deflate,
                _ => {}
            }
        }
        coding
    }
}

/// A raw response byte stream and the coding already removed from it.
pub struct ByteSource {
    reader: Box<dyn Read + Send>,
    decoded: Option<ContentCoding>,
}

impl ByteSource {
    /// Wrap a reader that yields bytes as they came off the wire.
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            decoded: None,
        }
    }

    /// Wrap a reader that already decodes `coding`.
    pub fn decoded(reader: impl Read + Send + 'static, coding: ContentCoding) -> Self {
        Self {
            reader: Box::new(reader),
            decoded: Some(coding),
        }
    }

    /// Wrap an in-memory body.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(Cursor::new(data.into()))
    }

    fn already_decodes(&self, coding: ContentCoding) -> bool {
        self.decoded == Some(coding)
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource").field("decoded", &self.decoded).finish_non_exhaustive()
    }
}

/// Decoded body stream of a response.
///
/// Which source is read and whether a decompression layer is added are
/// both settled in [`new`](Self::new) and never revisited.
pub struct ResponseContentStream {
    status: u16,
    coding: ContentCoding,
    synthesized: bool,
    inner: BufReader<Box<dyn Read + Send>>,
}

impl ResponseContentStream {
    /// Select and decorate the body source for a response.
    ///
    /// Statuses below 400 read `success`, others read `error`; when the
    /// selected source is absent the other one is used, and when both are
    /// absent the stream yields a short diagnostic message. With
    /// `decompress` set, a gzip or deflate `Content-Encoding` adds a
    /// matching decoder unless the source already removes it.
    pub fn new(
        status: u16,
        headers: &HeaderMap,
        success: Option<ByteSource>,
        error: Option<ByteSource>,
        decompress: bool,
    ) -> Self {
        let is_error = status >= 400;
        let (preferred, fallback) = if is_error { (error, success) } else { (success, error) };

        let Some(source) = preferred.or(fallback) else {
            warn!(status, "Response has no body source, using diagnostic message");
            let message = format!("Error request, response status: {}", status);
            return Self {
                status,
                coding: ContentCoding::Identity,
                synthesized: true,
                inner: BufReader::new(Box::new(Cursor::new(message.into_bytes()))),
            };
        };

        let mut declared = if decompress {
            ContentCoding::from_headers(headers)
        } else {
            ContentCoding::Identity
        };
        if source.already_decodes(declared) {
            declared = ContentCoding::Identity;
        }

        let reader: Box<dyn Read + Send> = if declared == ContentCoding::Identity {
            source.reader
        } else {
            // Bodies of 204/304 and HEAD responses are empty despite the header.
            let mut raw = BufReader::new(source.reader);
            if matches!(raw.fill_buf(), Ok(peeked) if peeked.is_empty()) {
                debug!(status, coding = ?declared, "Empty encoded body, skipping decoder");
                declared = ContentCoding::Identity;
                Box::new(raw)
            } else if declared == ContentCoding::Gzip {
                Box::new(GzDecoder::new(raw))
            } else {
                Box::new(DeflateDecoder::new(raw))
            }
        };

        debug!(status, error_source = is_error, coding = ?declared, "Resolved response stream");

        Self {
            status,
            coding: declared,
            synthesized: false,
            inner: BufReader::new(reader),
        }
    }

    /// Response status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is 400 or above.
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Coding removed while reading.
    pub fn coding(&self) -> ContentCoding {
        self.coding
    }

    /// Whether the body is the diagnostic message rather than a real source.
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    /// Bytes readable without touching the underlying source.
    pub fn available(&self) -> usize {
        self.inner.buffer().len()
    }

    /// Discard up to `n` bytes, returning how many were skipped.
    pub fn skip(&mut self, n: u64) -> io::Result<u64> {
        io::copy(&mut (&mut self.inner).take(n), &mut io::sink())
    }

    /// Read the rest of the body.
    pub fn read_to_bytes(&mut self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        self.inner.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Read the rest of the body as UTF-8, replacing invalid sequences.
    pub fn read_to_string_lossy(&mut self) -> io::Result<String> {
        let bytes = self.read_to_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Fail with the status and body text for statuses of 400 and above.
    pub fn error_for_status(mut self) -> HttpResult<Self> {
        if !self.is_error() {
            return Ok(self);
        }
        let body = self.read_to_string_lossy()?;
        Err(HttpError::Status {
            status: self.status,
            body,
        })
    }

    /// Release the underlying source.
    pub fn close(self) {
        debug!(status = self.status, "Closing response stream");
    }
}

impl Read for ResponseContentStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for ResponseContentStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

impl fmt::Debug for ResponseContentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseContentStream")
            .field("status", &self.status)
            .field("coding", &self.coding)
            .field("synthesized", &self.synthesized)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{DeflateEncoder, GzEncoder};
    use flate2::Compression;
    use http::HeaderValue;
    use std::io::Write;
    use test_case::test_case;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn encoding(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static(value));
        headers
    }

    fn read_all(mut stream: ResponseContentStream) -> String {
        stream.read_to_string_lossy().unwrap()
    }

    #[test_case(200, "ok" ; "success")]
    #[test_case(302, "ok" ; "redirect")]
    #[test_case(404, "missing" ; "client error")]
    #[test_case(500, "missing" ; "server error")]
    fn test_source_selection(status: u16, expected: &str) {
        let stream = ResponseContentStream::new(
            status,
            &HeaderMap::new(),
            Some(ByteSource::from_bytes("ok")),
            Some(ByteSource::from_bytes("missing")),
            true,
        );
        assert_eq!(stream.is_error(), status >= 400);
        assert_eq!(read_all(stream), expected);
    }

    #[test]
    fn test_no_source_yields_diagnostic() {
        let stream = ResponseContentStream::new(503, &HeaderMap::new(), None, None, true);
        assert!(stream.is_synthesized());
        assert_eq!(read_all(stream), "Error request, response status: 503");
    }

    #[test]
    fn test_missing_error_source_falls_back() {
        let stream =
            ResponseContentStream::new(404, &HeaderMap::new(), Some(ByteSource::from_bytes("body")), None, true);
        assert!(!stream.is_synthesized());
        assert_eq!(read_all(stream), "body");
    }

    #[test]
    fn test_gzip_is_decoded() {
        let stream = ResponseContentStream::new(
            200,
            &encoding("gzip"),
            Some(ByteSource::from_bytes(gzip(b"plain text"))),
            None,
            true,
        );
        assert_eq!(stream.coding(), ContentCoding::Gzip);
        assert_eq!(read_all(stream), "plain text");
    }

    #[test]
    fn test_raw_deflate_is_decoded() {
        let stream = ResponseContentStream::new(
            200,
            &encoding("deflate"),
            Some(ByteSource::from_bytes(deflate(b"inflated"))),
            None,
            true,
        );
        assert_eq!(stream.coding(), ContentCoding::Deflate);
        assert_eq!(read_all(stream), "inflated");
    }

    #[test]
    fn test_gzip_error_body_is_decoded() {
        let stream = ResponseContentStream::new(
            500,
            &encoding("GZIP"),
            None,
            Some(ByteSource::from_bytes(gzip(b"boom"))),
            true,
        );
        assert_eq!(read_all(stream), "boom");
    }

    #[test]
    fn test_already_decoded_source_is_not_wrapped_twice() {
        let source = ByteSource::decoded(Cursor::new(b"done".to_vec()), ContentCoding::Gzip);
        let stream = ResponseContentStream::new(200, &encoding("gzip"), Some(source), None, true);
        assert_eq!(read_all(stream), "done");
    }

    #[test_case(204, "gzip" ; "no content gzip")]
    #[test_case(304, "deflate" ; "not modified deflate")]
    #[test_case(200, "gzip" ; "head response")]
    fn test_empty_encoded_body_reads_empty(status: u16, coding: &'static str) {
        let mut stream = ResponseContentStream::new(
            status,
            &encoding(coding),
            Some(ByteSource::from_bytes(Vec::new())),
            None,
            true,
        );
        assert_eq!(stream.coding(), ContentCoding::Identity);
        assert!(stream.read_to_bytes().unwrap().is_empty());
    }

    #[test]
    fn test_decompress_disabled_passes_through() {
        let compressed = gzip(b"plain text");
        let mut stream = ResponseContentStream::new(
            200,
            &encoding("gzip"),
            Some(ByteSource::from_bytes(compressed.clone())),
            None,
            false,
        );
        assert_eq!(stream.coding(), ContentCoding::Identity);
        assert_eq!(stream.read_to_bytes().unwrap().to_vec(), compressed);
    }

    #[test_case("gzip, identity", ContentCoding::Gzip ; "list")]
    #[test_case("identity, deflate", ContentCoding::Deflate ; "deflate in list")]
    #[test_case("deflate, gzip", ContentCoding::Gzip ; "gzip wins")]
    #[test_case("br", ContentCoding::Identity ; "unsupported")]
    fn test_coding_from_headers(value: &'static str, expected: ContentCoding) {
        assert_eq!(ContentCoding::from_headers(&encoding(value)), expected);
    }

    #[test]
    fn test_skip_and_available() {
        let mut stream =
            ResponseContentStream::new(200, &HeaderMap::new(), Some(ByteSource::from_bytes("0123456789")), None, true);
        assert_eq!(stream.available(), 0);
        assert_eq!(stream.skip(4).unwrap(), 4);
        assert_eq!(stream.available(), 6);
        assert_eq!(stream.fill_buf().unwrap(), b"456789");
        assert_eq!(stream.skip(100).unwrap(), 6);
        assert_eq!(stream.read_to_bytes().unwrap().len(), 0);
    }

    #[test]
    fn test_error_for_status() {
        let ok = ResponseContentStream::new(200, &HeaderMap::new(), Some(ByteSource::from_bytes("x")), None, true);
        assert!(ok.error_for_status().is_ok());

        let failed =
            ResponseContentStream::new(404, &HeaderMap::new(), None, Some(ByteSource::from_bytes("nope")), true);
        match failed.error_for_status() {
            Err(HttpError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "nope");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }
}
