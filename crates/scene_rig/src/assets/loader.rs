//! Model loaders
//!
//! An [`AssetLoader`] does the blocking work of fetching a model. It runs on
//! a worker thread spawned by [`LoadTask`](super::LoadTask), reports progress
//! as whole percentages and checks its [`CancelToken`] between steps.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::scene::Aabb;

/// Loaded model payload
#[derive(Debug, Clone)]
pub struct ModelData {
    /// Resource the payload came from
    pub source: String,
    /// Raw bytes
    pub bytes: Vec<u8>,
    /// Local bounds, when the loader can determine them
    pub bounds: Option<Aabb>,
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    /// Nothing exists at the given location
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Reading failed part way
    #[error("IO error while loading {url}: {source}")]
    Io {
        /// Requested resource
        url: String,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// The payload could not be decoded
    #[error("Failed to decode {url}: {reason}")]
    Decode {
        /// Requested resource
        url: String,
        /// Decoder message
        reason: String,
    },

    /// The load was cancelled before it completed
    #[error("Load cancelled")]
    Cancelled,

    /// The worker went away without reporting a result
    #[error("Load worker stopped without a result")]
    Interrupted,

    /// The stage was torn down before the load could start
    #[error("Load never started")]
    NotStarted,

    /// The model arrived but there was no scene to place it in
    #[error("No scene to place the model in")]
    SceneUnavailable,
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Blocking model loader
pub trait AssetLoader: Send + Sync {
    /// Fetch `url`, calling `progress` with percentages in 0..=100
    fn load(&self, url: &str, cancel: &CancelToken, progress: &mut dyn FnMut(u8)) -> Result<ModelData, LoadError>;
}

/// Reads models from the local file system in fixed-size chunks
#[derive(Debug, Clone)]
pub struct FileModelLoader {
    root: Option<PathBuf>,
    chunk_size: usize,
}

impl Default for FileModelLoader {
    fn default() -> Self {
        Self {
            root: None,
            chunk_size: 64 * 1024,
        }
    }
}

impl FileModelLoader {
    /// Loader resolving urls as given
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative urls against `root`
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Bytes read between progress reports
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn percent(read: u64, total: u64) -> u8 {
    if total == 0 {
        100
    } else {
        (read.min(total) * 100 / total) as u8
    }
}

impl AssetLoader for FileModelLoader {
    fn load(&self, url: &str, cancel: &CancelToken, progress: &mut dyn FnMut(u8)) -> Result<ModelData, LoadError> {
        let path = self.resolve(url);
        let io_error = |source: io::Error| LoadError::Io { url: url.to_string(), source };

        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(io_error(e)),
        };
        let total = file.metadata().map_err(io_error)?.len();
        log::debug!("Loading {} ({} bytes)", path.display(), total);

        let mut bytes = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            if cancel.is_cancelled() {
                return Err(LoadError::Cancelled);
            }
            let read = file.read(&mut chunk).map_err(io_error)?;
            if read == 0 {
                break;
            }
            bytes.extend_from_slice(&chunk[..read]);
            progress(percent(bytes.len() as u64, total));
        }

        if total == 0 {
            progress(100);
        }

        Ok(ModelData {
            source: url.to_string(),
            bytes,
            bounds: None,
        })
    }
}
