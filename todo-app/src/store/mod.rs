//! Persistence for todo items.
//!
//! Every mutation follows the same cycle: load the whole backing file,
//! change the records in memory, then write the whole file back. Nothing is
//! cached between operations, so the file is always the source of truth.

use crate::todo::{Status, Todo};
use serde::Deserialize;

pub mod codec;
pub mod file;
pub mod memory;
pub mod records;
pub mod service;

pub use codec::DecodeError;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use service::TodoService;

/// Error type for record store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record carries the requested ID.
    #[error("todo item {0} not found")]
    NotFound(u32),
    /// The status is not one of the known labels.
    #[error("invalid status '{0}', expected one of: {labels}", labels = Status::labels())]
    InvalidStatus(String),
    /// The highest possible ID is already in use.
    #[error("no todo IDs left to assign")]
    IdsExhausted,
    /// The backing file exists but its contents cannot be read as records.
    #[error("store at {location} is corrupt: {source}")]
    Corrupt {
        location: String,
        #[source]
        source: DecodeError,
    },
    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Physical layout of the backing file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    /// Pretty-printed JSON array of records.
    #[default]
    Json,
    /// One `id, description, status` line per record.
    Text,
}

/// Somewhere the full list of records can be loaded from and saved to.
pub trait Storage: Send + Sync {
    /// Reads every record. A backing file that does not exist yet is an empty store.
    fn load_all(&self) -> Result<Vec<Todo>, StoreError>;

    /// Replaces the stored records with `todos`.
    fn save_all(&self, todos: &[Todo]) -> Result<(), StoreError>;
}

impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    fn load_all(&self) -> Result<Vec<Todo>, StoreError> {
        (**self).load_all()
    }

    fn save_all(&self, todos: &[Todo]) -> Result<(), StoreError> {
        (**self).save_all(todos)
    }
}
