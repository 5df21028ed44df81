//! Plan document codec
//!
//! Thin boundary around the serialization library: read a plan file into
//! the in-memory model, write it back, and mint fresh instance identifiers.
//! The mutation engine never touches the on-disk encoding.

use std::fs;
use std::path::Path;

use thiserror::Error;
use uuid::Uuid;

use super::model::Plan;

/// Errors crossing the codec boundary
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a valid plan document: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize plan: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Read a plan document from disk.
pub fn read(path: &Path) -> Result<Plan, CodecError> {
    let content = fs::read_to_string(path).map_err(|source| CodecError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CodecError::Decode {
        path: path.display().to_string(),
        source,
    })
}

/// Write a plan document to disk.
pub fn write(plan: &Plan, path: &Path) -> Result<(), CodecError> {
    let content = serde_json::to_string_pretty(plan).map_err(CodecError::Encode)?;
    fs::write(path, content).map_err(|source| CodecError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Mint a fresh globally-unique instance identifier in the
/// `2.25.<decimal-uuid>` form.
pub fn generate_uid() -> String {
    format!("2.25.{}", Uuid::new_v4().as_u128())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rejects_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "not a plan").unwrap();
        assert!(matches!(read(&path), Err(CodecError::Decode { .. })));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(matches!(read(&path), Err(CodecError::Io { .. })));
    }

    #[test]
    fn test_generate_uid_shape() {
        let uid = generate_uid();
        assert!(uid.starts_with("2.25."));
        assert!(uid[5..].chars().all(|c| c.is_ascii_digit()));
        assert_ne!(generate_uid(), uid);
    }
}
