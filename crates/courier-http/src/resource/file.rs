//! File-backed resource.

use super::Resource;
use crate::error::{HttpError, HttpResult};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Resource read from a file on each `open`.
#[derive(Debug, Clone)]
pub struct FileResource {
    path: PathBuf,
    name: Option<String>,
}

impl FileResource {
    /// Wrap `path`; the name defaults to the file name.
    ///
    /// The file is not touched until it is opened.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Self { path, name }
    }

    /// Wrap `path`, failing unless it names a regular file.
    pub fn existing(path: impl Into<PathBuf>) -> HttpResult<Self> {
        let resource = Self::new(path);
        if !resource.path.is_file() {
            return Err(HttpError::ResourceNotFound { path: resource.path });
        }
        Ok(resource)
    }

    /// Use `name` as the multipart filename instead of the file name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileResource {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn url(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}
