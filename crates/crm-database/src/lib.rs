//! # crm-database
//!
//! PostgreSQL connection management, the store traits the service layer
//! depends on, their sqlx repository implementations and an in-memory
//! implementation used by tests and local tooling.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod stores;
pub mod traits;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use stores::Stores;
