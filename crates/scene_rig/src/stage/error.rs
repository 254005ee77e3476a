//! Stage errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::context::{ContextError, PoolKind};

/// Errors raised by the stage lifecycle
#[derive(Error, Debug)]
pub enum StageError {
    /// `mount` called twice
    #[error("Stage is already mounted")]
    AlreadyMounted,

    /// Operation on a stage that has been torn down
    #[error("Stage has been disposed")]
    Disposed,

    /// A producer failed during setup
    #[error("Producer `{producer}` failed during setup: {source}")]
    Setup {
        /// Producer name
        producer: String,
        /// Underlying failure
        #[source]
        source: ContextError,
    },

    /// A callback failed and the fault policy stopped the flush
    #[error("{pool} callback `{label}` failed: {source}")]
    CallbackFailed {
        /// Pool being flushed
        pool: PoolKind,
        /// Label of the failing callback
        label: String,
        /// Underlying failure
        #[source]
        source: ContextError,
    },

    /// Stage or manifest configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
