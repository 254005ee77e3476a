//! Context-level errors

use thiserror::Error;

use super::handle::{HandleKind, Handles};
use crate::assets::LoadError;

/// Errors raised by producers and their callbacks
#[derive(Error, Debug)]
pub enum ContextError {
    /// A handle was assigned twice
    #[error("{0} handle is already set")]
    HandleAlreadySet(HandleKind),

    /// A callback ran before the handles it needs were set
    #[error("`{consumer}` is missing required handles: {missing}")]
    MissingDependency {
        /// Label of the callback or producer that needed the handles
        consumer: String,
        /// Handles that were not set
        missing: Handles,
    },

    /// Asset loading failed synchronously
    #[error("Asset error: {0}")]
    Asset(#[from] LoadError),

    /// Producer-defined failure
    #[error("{0}")]
    Custom(String),
}

impl ContextError {
    /// Shorthand for [`ContextError::MissingDependency`]
    pub fn missing(consumer: impl Into<String>, missing: Handles) -> Self {
        Self::MissingDependency {
            consumer: consumer.into(),
            missing,
        }
    }
}
