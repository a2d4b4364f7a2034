//! This crate provides the data model of a to-do list.
//!
//! Tasks live in a [`TaskStore`](store::TaskStore), split between active and completed tasks. \
//! The store is persisted through a [`Gateway`](gateway::Gateway), that combines a local key-value store (see the [`cache`] module)
//! with a read-only fallback document used on first start (see the [`fallback`] module).
//!
//! The [`calendar`] module projects the active tasks on a month view, and the [`export`] module renders them as a JSON document. \
//! A [`TodoApp`](app::TodoApp) ties all of these together, and is what a user interface should drive.

pub mod traits;

mod task;
pub use task::{Task, TaskId};
pub use task::{parse_due_date, parse_time};
pub mod snapshot;
pub use snapshot::Snapshot;
pub mod store;
pub use store::TaskStore;
pub mod error;
pub use error::StoreError;

pub mod cache;
pub mod fallback;
pub mod gateway;

pub mod calendar;
pub mod export;
pub mod app;
pub use app::TodoApp;

pub mod config;
pub mod utils;
