//! In-memory resource.

use super::Resource;
use bytes::Bytes;
use std::io::{self, Cursor, Read};

/// Resource backed by a byte buffer.
#[derive(Debug, Clone)]
pub struct BytesResource {
    data: Bytes,
    name: Option<String>,
    content_type: Option<String>,
}

impl BytesResource {
    /// Wrap `data` with an optional name.
    pub fn new(data: impl Into<Bytes>, name: Option<String>) -> Self {
        Self {
            data: data.into(),
            name,
            content_type: None,
        }
    }

    /// Wrap `data` under `name`.
    pub fn named(data: impl Into<Bytes>, name: impl Into<String>) -> Self {
        Self::new(data, Some(name.into()))
    }

    /// Override the guessed content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The buffer length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Resource for BytesResource {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.data.clone())))
    }

    fn read_bytes(&self) -> io::Result<Bytes> {
        Ok(self.data.clone())
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .or_else(|| self.name().and_then(super::guess_content_type))
    }
}
