//! Collaborator commissions.

pub mod model;

pub use model::{Commission, CommissionStatus, CreateCommission};
