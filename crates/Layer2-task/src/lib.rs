//! # bookforge-task
//!
//! Task records and progress tracking for BookForge generation jobs.
//!
//! ## Features
//!
//! - Forward-only status machine (`Pending → Running → Completed | Error`)
//! - Concurrent store with per-task locks and snapshot reads
//! - Single-writer handle enforcing monotonic steps

pub mod state;
pub mod store;
pub mod task;

pub use state::TaskStatus;
pub use store::{TaskStore, TaskWriter};
pub use task::{Progress, Task, TaskId};
