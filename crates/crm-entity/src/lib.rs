//! # crm-entity
//!
//! Domain entity models for the deal-flow CRM. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`; enums map onto Postgres enum types.

pub mod commission;
pub mod job;
pub mod lead;
pub mod notification;
pub mod reminder;
pub mod task;
pub mod user;
