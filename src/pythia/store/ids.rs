//! Identifier allocation.
//!
//! There is no persisted counter: the next id is always the largest id in the
//! directory plus one, so out-of-band deletions never cause drift. Deleting
//! the highest record and then creating one reuses its number; deleting any
//! other record never does.

use crate::error::{Result, StoreError};
use crate::model::RecordId;
use std::path::Path;

/// Parse directory stems into identifiers.
///
/// Any stem that is not a canonical positive integer means a file that does
/// not belong to the collection, reported as [`StoreError::CorruptState`].
pub fn parse_stems(dir: &Path, stems: &[String]) -> Result<Vec<RecordId>> {
    stems
        .iter()
        .map(|stem| {
            RecordId::from_stem(stem).ok_or_else(|| StoreError::CorruptState {
                dir: dir.to_path_buf(),
                name: format!("{stem}{}", crate::codec::DOCUMENT_EXT),
            })
        })
        .collect()
}

/// The largest id in `existing` plus one. A document already sitting at the
/// top of the id space leaves nothing to allocate.
pub fn next_identifier(dir: &Path, existing: &[RecordId]) -> Result<RecordId> {
    match existing.iter().max() {
        None => Ok(RecordId::FIRST),
        Some(max) => max.next().ok_or_else(|| StoreError::IdentifiersExhausted {
            dir: dir.to_path_buf(),
        }),
    }
}
