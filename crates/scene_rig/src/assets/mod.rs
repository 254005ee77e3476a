//! Asset loading
//!
//! Model loads run off the coordinator thread. [`LoadTask::spawn`] starts an
//! [`AssetLoader`] on a worker; the task yields any number of
//! [`LoadEvent::Progress`] events followed by exactly one
//! [`LoadEvent::Completed`].

mod loader;
mod task;

pub use loader::{AssetLoader, CancelToken, FileModelLoader, LoadError, ModelData};
pub use task::{LoadEvent, LoadTask};
