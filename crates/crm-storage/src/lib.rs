//! # crm-storage
//!
//! Storage provider implementations for CRM documents (teasers). Objects
//! live in named buckets; writing into a missing bucket is an error the
//! caller can recover from by creating the bucket.

pub mod mime;
pub mod providers;

pub use mime::mime_from_path;
pub use providers::local::LocalStorageProvider;
