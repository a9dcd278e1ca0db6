#![forbid(unsafe_code)]

pub mod progress_store;
pub mod repository;
pub mod sqlite;

pub use progress_store::{ProgressStore, StorageKeys};
pub use repository::{InMemoryRepository, KeyValueRepository, Storage, StorageError};
