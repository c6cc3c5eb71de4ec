//! Document encoding for records. Pure functions, no file I/O.

use crate::error::{Result, StoreError};
use crate::model::Record;
use std::path::Path;

/// Extension of every record document, including the dot.
pub const DOCUMENT_EXT: &str = ".json";

/// Serialize a record to its on-disk document. `path` only labels errors.
pub fn encode<R: Record>(record: &R, pretty: bool, path: &Path) -> Result<Vec<u8>> {
    let encoded = if pretty {
        serde_json::to_vec_pretty(record)
    } else {
        serde_json::to_vec(record)
    };
    encoded.map_err(|e| StoreError::encoding(path, e))
}

pub fn decode<R: Record>(bytes: &[u8], path: &Path) -> Result<R> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::encoding(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, RecordId};

    #[test]
    fn document_carries_every_field() {
        let mut answer = Answer::new("How?", "Like this.", "howto misc");
        answer.id = RecordId::new(3);
        answer.created_by_id = "1".into();

        let bytes = encode(&answer, false, Path::new("3.json")).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc["id"], "3");
        assert_eq!(doc["tags"], "howto misc");
        assert_eq!(doc["created_by_id"], "1");
        assert!(doc["created_at"].is_string());

        let back: Answer = decode(&bytes, Path::new("3.json")).unwrap();
        assert_eq!(back, answer);
    }

    #[test]
    fn pretty_documents_are_multiline() {
        let answer = Answer::new("q", "a", "");
        let bytes = encode(&answer, true, Path::new("1.json")).unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains('\n'));
    }

    #[test]
    fn corrupt_document_is_an_encoding_error() {
        let err = decode::<Answer>(b"{\"question\": ", Path::new("/d/9.json")).unwrap_err();
        match err {
            StoreError::Encoding { path, .. } => assert_eq!(path, Path::new("/d/9.json")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
