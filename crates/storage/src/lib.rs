#![forbid(unsafe_code)]

pub mod json;
pub mod repository;

pub use json::JsonHistoryStore;
pub use repository::{HistoryRepository, InMemoryHistoryRepository, Storage, StorageError};
