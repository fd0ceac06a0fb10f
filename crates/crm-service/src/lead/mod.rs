//! Supporting CRUD for leads, users and commissions.

pub mod commission;
pub mod service;
pub mod user;

pub use commission::CommissionService;
pub use service::LeadService;
pub use user::UserService;
