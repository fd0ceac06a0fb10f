//! # crm-core
//!
//! Core crate for the deal-flow CRM. Contains configuration schemas,
//! typed identifiers, pagination types, the storage provider seam and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other CRM crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
