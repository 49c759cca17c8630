//! Test helpers for Courier crates.

use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary directory that is removed on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a file named `test_file` holding `content` in a fresh temp dir.
pub fn temp_file(content: &str) -> (TempDir, PathBuf) {
    temp_file_bytes("test_file", content.as_bytes())
}

/// Creates a file called `name` holding raw `content` in a fresh temp dir.
pub fn temp_file_bytes(name: &str, content: &[u8]) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
