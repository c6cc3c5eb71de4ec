//! # Secondary Indexes
//!
//! In-memory lookups derived from a collection's documents. An index holds no
//! state of its own worth persisting: it is rebuilt from the files on disk when
//! the collection opens and after every create, update and delete, inside the
//! same write lock as the file change. Readers therefore never see an index
//! that disagrees with the directory it describes.
//!
//! - [`tags::TagIndex`]: tag token to answer ids, with conjunctive search.
//! - [`logins::LoginIndex`]: login name to user id.

use crate::model::{Record, RecordId};

pub mod logins;
pub mod tags;

pub use logins::LoginIndex;
pub use tags::TagIndex;

/// A lookup structure rebuilt from the full record set of one collection.
pub trait SecondaryIndex<R: Record>: Default + Send + Sync {
    /// Add one record. Called once per record during a build.
    fn insert(&mut self, id: RecordId, record: &R);

    /// Derive any summary state once every record has been inserted.
    fn finish(&mut self) {}

    /// Build a fresh index from `(id, record)` pairs.
    fn build<'a, It>(records: It) -> Self
    where
        It: IntoIterator<Item = (RecordId, &'a R)>,
        R: 'a,
    {
        let mut index = Self::default();
        for (id, record) in records {
            index.insert(id, record);
        }
        index.finish();
        index
    }
}
