//! # crm-auth
//!
//! Authentication and authorization for the CRM API.
//!
//! ## Modules
//!
//! - `jwt`: access token creation and validation
//! - `rbac`: role-to-permission policy and enforcement

pub mod jwt;
pub mod rbac;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use rbac::{Permission, RbacEnforcer};
