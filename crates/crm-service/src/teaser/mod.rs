//! Teaser document uploads.

pub mod service;
pub mod validate;

pub use service::{TeaserService, TeaserUpload};
pub use validate::{ALLOWED_TEASER_MIME_TYPES, MAX_TEASER_BYTES, validate_teaser_upload};
