//! # Storage Layer
//!
//! A [`Collection`] persists one record type as a flat directory of JSON
//! documents and keeps one [`SecondaryIndex`] over them.
//!
//! ## Storage Format
//!
//! ```text
//! <root>/
//! ├── config.json          # Optional store configuration
//! ├── answers/
//! │   ├── 1.json           # One document per record, named by id
//! │   └── 2.json
//! └── users/
//!     └── 1.json
//! ```
//!
//! Files are the truth. The index is a cache rebuilt from every document in
//! the directory whenever the collection opens and after each mutation.
//!
//! ## Locking
//!
//! Each collection owns one read-write lock, guarding its index:
//!
//! - `find`, `find_all`, `find_where` and `inspect` share the read lock.
//! - `create`, `update`, `delete` and `rebuild_index` hold the write lock for
//!   the file write *and* the index rebuild, so a reader that gets the lock
//!   after a writer sees both the new file and the new index.
//!
//! Locks are never held across collections and never taken twice by one
//! operation.
//!
//! ## Writes
//!
//! Documents are written to a hidden `.tmp` file in the same directory with
//! the configured permission bits, then renamed over `<id>.json`.

use crate::codec::{self, DOCUMENT_EXT};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::index::SecondaryIndex;
use crate::model::{Record, RecordId};
use chrono::Utc;
use log::{debug, info};
use parking_lot::RwLock;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub mod ids;
pub mod scan;

pub struct Collection<R: Record, I: SecondaryIndex<R>> {
    dir: PathBuf,
    file_mode: u32,
    pretty: bool,
    index: RwLock<I>,
    _records: PhantomData<fn() -> R>,
}

impl<R: Record, I: SecondaryIndex<R>> Collection<R, I> {
    /// Open the collection stored in `dir`, creating the directory if needed
    /// and building the index from every document already present.
    pub fn open(dir: impl Into<PathBuf>, config: &StoreConfig) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let collection = Self {
            dir,
            file_mode: config.file_mode,
            pretty: config.pretty,
            index: RwLock::new(I::default()),
            _records: PhantomData,
        };

        let (index, count) = collection.build_index()?;
        *collection.index.write() = index;
        info!(
            "opened {} at {} ({} records)",
            R::COLLECTION,
            collection.dir.display(),
            count
        );

        Ok(collection)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store a new record and return its id.
    ///
    /// A record without an id gets the next free one. A record that already
    /// carries an id is written under it, unless a document with that id
    /// exists, which is [`StoreError::AlreadyExists`]; changes to stored
    /// records go through [`Collection::update`].
    pub fn create(&self, mut record: R) -> Result<RecordId> {
        let mut index = self.index.write();

        let id = match record.id() {
            Some(id) => {
                let path = self.document_path(id);
                if path.try_exists().map_err(|e| StoreError::io(&path, e))? {
                    return Err(StoreError::AlreadyExists {
                        collection: R::COLLECTION,
                        id: id.to_string(),
                    });
                }
                id
            }
            None => {
                let stems = scan::document_stems(&self.dir)?;
                ids::next_identifier(&self.dir, &ids::parse_stems(&self.dir, &stems)?)?
            }
        };
        record.set_id(id);
        record.before_create(Utc::now());

        self.write_document(id, &record)?;
        debug!("created {} {}", R::COLLECTION, id);

        self.reindex(&mut index, id)?;
        Ok(id)
    }

    pub fn find(&self, id: RecordId) -> Result<R> {
        let _index = self.index.read();
        self.load(id)
    }

    /// Every record in the collection, in id order. Fails if any one fails.
    pub fn find_all(&self) -> Result<Vec<R>> {
        let _index = self.index.read();
        Ok(self
            .load_all()?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Load the records whose ids `select` picks from the index.
    pub fn find_where<F>(&self, select: F) -> Result<Vec<R>>
    where
        F: FnOnce(&I) -> Vec<RecordId>,
    {
        let index = self.index.read();
        select(&index)
            .into_iter()
            .map(|id| self.load(id))
            .collect()
    }

    /// Read from the index without touching any document.
    pub fn inspect<T>(&self, f: impl FnOnce(&I) -> T) -> T {
        f(&self.index.read())
    }

    /// Overwrite an existing record, keeping the fields the record type marks
    /// as fixed at creation.
    pub fn update(&self, mut record: R) -> Result<RecordId> {
        let id = record
            .id()
            .ok_or_else(|| StoreError::InvalidIdentifier(String::new()))?;

        let mut index = self.index.write();

        let previous = self.load(id)?;
        record.before_update(&previous, Utc::now());

        self.write_document(id, &record)?;
        debug!("updated {} {}", R::COLLECTION, id);

        self.reindex(&mut index, id)?;
        Ok(id)
    }

    pub fn delete(&self, id: RecordId) -> Result<()> {
        let mut index = self.index.write();

        let path = self.document_path(id);
        fs::remove_file(&path).map_err(|e| self.missing_or_io(id, &path, e))?;
        debug!("deleted {} {}", R::COLLECTION, id);

        self.reindex(&mut index, id)
    }

    /// Rebuild the index from disk under the write lock.
    pub fn rebuild_index(&self) -> Result<()> {
        let mut index = self.index.write();
        let (fresh, _) = self.build_index()?;
        *index = fresh;
        Ok(())
    }

    /// Wait for in-flight operations by taking and releasing the write lock.
    pub fn drain(&self) {
        drop(self.index.write());
    }

    fn document_path(&self, id: RecordId) -> PathBuf {
        self.dir.join(format!("{}{}", id, DOCUMENT_EXT))
    }

    fn missing_or_io(&self, id: RecordId, path: &Path, err: std::io::Error) -> StoreError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StoreError::NotFound {
                collection: R::COLLECTION,
                id: id.to_string(),
            }
        } else {
            StoreError::io(path, err)
        }
    }

    fn load(&self, id: RecordId) -> Result<R> {
        let path = self.document_path(id);
        let bytes = fs::read(&path).map_err(|e| self.missing_or_io(id, &path, e))?;
        let mut record: R = codec::decode(&bytes, &path)?;
        // The filename is authoritative for the id.
        record.set_id(id);
        Ok(record)
    }

    fn load_all(&self) -> Result<Vec<(RecordId, R)>> {
        let stems = scan::document_stems(&self.dir)?;
        let mut ids = ids::parse_stems(&self.dir, &stems)?;
        ids.sort();

        ids.into_iter()
            .map(|id| self.load(id).map(|record| (id, record)))
            .collect()
    }

    fn build_index(&self) -> Result<(I, usize)> {
        let records = self.load_all()?;
        let index = I::build(records.iter().map(|(id, record)| (*id, record)));
        Ok((index, records.len()))
    }

    /// Replace the index after a mutation. On failure the previous index is
    /// left in place and the caller learns it is stale.
    fn reindex(&self, index: &mut I, id: RecordId) -> Result<()> {
        match self.build_index() {
            Ok((fresh, _)) => {
                *index = fresh;
                Ok(())
            }
            Err(source) => Err(StoreError::StaleIndex {
                collection: R::COLLECTION,
                id: id.to_string(),
                source: Box::new(source),
            }),
        }
    }

    fn write_document(&self, id: RecordId, record: &R) -> Result<()> {
        let path = self.document_path(id);
        let bytes = codec::encode(record, self.pretty, &path)?;

        let tmp = self.dir.join(format!(".{}-{}.tmp", id, Uuid::new_v4()));
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.file_mode);
        }

        let written = options
            .open(&tmp)
            .and_then(|mut file| {
                file.write_all(&bytes)?;
                file.sync_all()
            })
            .and_then(|_| fs::rename(&tmp, &path));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::io(&path, e));
        }
        Ok(())
    }
}
