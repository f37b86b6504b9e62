//! Storage layer
//!
//! Handles the on-disk representation of the store.
//!
//! ## Layout
//!
//! - `schema`: storage records and the snapshot written to disk
//! - `persistence`: atomic JSON load/save of the snapshot
//! - `error`: typed I/O and format errors

pub mod error;
pub mod persistence;
pub mod schema;

pub use error::{StorageError, StorageResult};
pub use persistence::JsonPersistence;
pub use schema::{MovieRecord, NextIds, Snapshot, VoteRecord};
