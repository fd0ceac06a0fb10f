//! Core traits defined in `crm-core` and implemented by other crates.

pub mod storage;

pub use storage::{StorageProvider, StoredObject};
