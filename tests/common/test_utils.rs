//! Shared test utilities for creating temporary files.

use std::io::Write;
use tempfile::NamedTempFile;

/// Creates a temporary file with the given content and no extension.
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    create_temp_file_with_suffix(content, "")
}

/// Creates a temporary file whose name ends with `suffix` (e.g. `.msi`).
pub fn create_temp_file_with_suffix(content: &[u8], suffix: &str) -> NamedTempFile {
    let mut temp_file = tempfile::Builder::new()
        .prefix("artifact-")
        .suffix(suffix)
        .tempfile()
        .unwrap();
    temp_file.write_all(content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}
