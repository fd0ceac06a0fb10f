//! Role-based access control for CRM operations.

pub mod enforcer;
pub mod policies;

pub use enforcer::RbacEnforcer;
pub use policies::{Permission, RbacPolicies};
