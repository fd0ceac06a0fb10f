//! Lead domain entities.

pub mod assignment;
pub mod model;
pub mod stage;
pub mod status;

pub use assignment::{Assignment, WorkerLoad};
pub use model::{CreateLead, Lead};
pub use stage::PipelineStage;
pub use status::LeadStatus;
