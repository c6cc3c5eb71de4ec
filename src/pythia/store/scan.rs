use crate::codec::DOCUMENT_EXT;
use crate::error::{Result, StoreError};
use std::fs;
use std::path::Path;

/// List the file stems of every document directly inside `dir`.
///
/// Subdirectories and files with any other extension (including in-flight
/// `.tmp` writes) are skipped. Order follows the directory listing.
pub fn document_stems(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
    let mut stems = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| StoreError::io(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(stem) = name.strip_suffix(DOCUMENT_EXT) {
            stems.push(stem.to_string());
        }
    }

    Ok(stems)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_only_json_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("1.json"), "{}").unwrap();
        fs::write(dir.path().join("12.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        fs::write(dir.path().join(".3-abc.tmp"), "{}").unwrap();
        fs::create_dir(dir.path().join("7.json")).unwrap();

        let mut stems = document_stems(dir.path()).unwrap();
        stems.sort();
        assert_eq!(stems, vec!["1", "12"]);
    }

    #[test]
    fn empty_directory_has_no_stems() {
        let dir = TempDir::new().unwrap();
        assert!(document_stems(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = document_stems(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
