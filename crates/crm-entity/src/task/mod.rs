//! Lead task entities.

pub mod model;
pub mod sla;
pub mod types;

pub use model::{CreateTask, NewTask, Task, TaskWithDependencies};
pub use sla::TaskSlaPolicy;
pub use types::{TaskPriority, TaskStatus, TaskType};
