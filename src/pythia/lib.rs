//! # Pythia Architecture
//!
//! Pythia is an **embedded flat-file record store** for a small knowledge base:
//! question/answer records searchable by tag, and the users who write them.
//! Every record is one JSON document in a directory; there is no server, no
//! query language and no write-ahead log. The process owns its data directory
//! for as long as the [`db::Database`] is open.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Facade (db.rs)                                             │
//! │  - Parses ids, stamps actors, hashes passwords              │
//! │  - Search, tag listing, login, name enrichment              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Collections (store/)                                       │
//! │  - One directory, one RwLock, one secondary index each      │
//! │  - create / find / find_all / update / delete               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Indexes (index/) and documents (codec.rs, model.rs)        │
//! │  - Rebuilt from disk after every mutation                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Files Are the Truth
//!
//! Indexes are caches. After any completed mutation the tag index maps each
//! tag to exactly the answers on disk that carry it, and the login index maps
//! each login to exactly one user on disk. A rebuild that fails after a write
//! is reported as [`error::StoreError::StaleIndex`], never swallowed.
//!
//! ## Module Overview
//!
//! - [`db`]: The facade, entry point for all operations
//! - [`store`]: Collections, directory scanning, identifier allocation
//! - [`index`]: Tag and login indexes
//! - [`model`]: `Answer`, `User`, `RecordId` and the `Record` trait
//! - [`codec`]: JSON document encoding
//! - [`credential`]: Password hashing
//! - [`config`]: Store configuration
//! - [`error`]: Error types

pub mod codec;
pub mod config;
pub mod credential;
pub mod db;
pub mod error;
pub mod index;
pub mod model;
pub mod store;

pub use db::Database;
pub use error::{ErrorKind, Result, StoreError};
