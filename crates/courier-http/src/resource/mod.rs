//! Byte sources for request bodies: in-memory bytes, files and collections.

mod memory;
mod file;
mod mime;
mod multi;

pub use self::memory::BytesResource;
pub use self::file::FileResource;
pub use self::mime::{content_type_for, guess_content_type, OCTET_STREAM};
pub use self::multi::MultiResource;

use bytes::Bytes;
use courier_url::Charset;
use std::fmt;
use std::io::{self, Read};
use std::path::Path;

/// A named source of bytes.
pub trait Resource: Send + Sync + fmt::Debug {
    /// Name used as the multipart filename.
    fn name(&self) -> Option<&str>;

    /// Location on disk, for file-backed resources.
    fn url(&self) -> Option<&Path> {
        None
    }

    /// Open a fresh reader over the content.
    fn open(&self) -> io::Result<Box<dyn Read + Send>>;

    /// Read the whole content.
    fn read_bytes(&self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        self.open()?.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Read the whole content as text in `charset`.
    fn read_str(&self, charset: Charset) -> io::Result<String> {
        Ok(charset.decode(&self.read_bytes()?))
    }

    /// MIME type of the content, guessed from the name by default.
    fn content_type(&self) -> Option<&str> {
        self.name().and_then(guess_content_type)
    }
}
