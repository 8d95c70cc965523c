//! Background Tasks Module
//!
//! Long-running loops sharing the store with the request path.
//!
//! # Tasks
//! - Row scheduler: republishes cached rows at their configured interval
//! - Session retention: trims sessions (and optionally carts) to a limit
//! - Expiry sweep: purges expired keys from the in-memory store

mod expiry;
mod retention;
mod rows;
mod worker;

pub use expiry::spawn_expiry_task;
pub use retention::{RetentionMode, RetentionTick, RetentionWorker, MAX_BATCH};
pub use rows::{Inventory, InventorySource, RowSchedule, RowScheduler, RowSource, RowTick};
pub use worker::{QuitSignal, WorkerHandle};
