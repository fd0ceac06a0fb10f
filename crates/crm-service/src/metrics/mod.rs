//! Pipeline and commission aggregation views.

pub mod commission;
pub mod kanban;
pub mod service;

pub use commission::{CollaboratorTotal, CommissionStats, commission_stats};
pub use kanban::{KanbanStats, StageStats, kanban_stats};
pub use service::MetricsService;
