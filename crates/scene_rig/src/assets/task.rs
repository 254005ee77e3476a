//! One-shot background load
//!
//! A [`LoadTask`] runs an [`AssetLoader`] on its own thread and hands the
//! results back over a channel. The owner polls it from the coordinator
//! thread, so handlers never run concurrently with a flush.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, RecvError, RecvTimeoutError, TryRecvError};

use super::loader::{AssetLoader, CancelToken, LoadError, ModelData};

/// Event delivered by a load task
#[derive(Debug)]
pub enum LoadEvent {
    /// Percentage of the payload received
    Progress {
        /// Requested resource
        url: String,
        /// 0..=100, never lower than the previous report
        percent: u8,
    },
    /// Final result; delivered exactly once
    Completed(Result<ModelData, LoadError>),
}

enum WorkerMessage {
    Progress(u8),
    Done(Result<ModelData, LoadError>),
}

/// Handle to an in-flight load
pub struct LoadTask {
    url: String,
    receiver: Receiver<WorkerMessage>,
    cancel: CancelToken,
    last_percent: Option<u8>,
    finished: bool,
}

impl LoadTask {
    /// Start loading `url` on a worker thread
    pub fn spawn(loader: Arc<dyn AssetLoader>, url: impl Into<String>) -> Result<Self, LoadError> {
        let url = url.into();
        let (sender, receiver) = unbounded();
        let cancel = CancelToken::new();

        let worker_url = url.clone();
        let worker_cancel = cancel.clone();
        thread::Builder::new()
            .name("asset-load".to_string())
            .spawn(move || {
                let mut report = |percent: u8| {
                    // The receiver is gone once the task is dropped or cancelled.
                    let _ = sender.send(WorkerMessage::Progress(percent));
                };
                let result = loader.load(&worker_url, &worker_cancel, &mut report);
                if sender.send(WorkerMessage::Done(result)).is_err() {
                    log::trace!("Load result for {} discarded, task was dropped", worker_url);
                }
            })
            .map_err(|source| LoadError::Io { url: url.clone(), source })?;

        log::debug!("Started loading {}", url);
        Ok(Self {
            url,
            receiver,
            cancel,
            last_percent: None,
            finished: false,
        })
    }

    /// Requested resource
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Token shared with the worker
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether the completion event has been delivered
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Next event that has already arrived, without blocking
    pub fn poll(&mut self) -> Option<LoadEvent> {
        while !self.finished {
            match self.receiver.try_recv() {
                Ok(message) => {
                    if let Some(event) = self.accept(message) {
                        return Some(event);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return Some(self.interrupted()),
            }
        }
        None
    }

    /// Next event, blocking for at most `timeout`.
    ///
    /// A timeout too large to represent as a deadline blocks until the
    /// worker sends something.
    pub fn wait(&mut self, timeout: Duration) -> Option<LoadEvent> {
        let deadline = Instant::now().checked_add(timeout);
        while !self.finished {
            let received = match deadline {
                Some(deadline) => {
                    match self.receiver.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                        Ok(message) => Ok(message),
                        Err(RecvTimeoutError::Timeout) => return None,
                        Err(RecvTimeoutError::Disconnected) => Err(RecvError),
                    }
                }
                None => self.receiver.recv(),
            };
            match received {
                Ok(message) => {
                    if let Some(event) = self.accept(message) {
                        return Some(event);
                    }
                }
                Err(RecvError) => return Some(self.interrupted()),
            }
        }
        None
    }

    /// Stop the load.
    ///
    /// Returns the `Cancelled` completion unless a completion was already
    /// delivered. Anything the worker sends afterwards is discarded.
    pub fn cancel(&mut self) -> Option<LoadEvent> {
        self.cancel.cancel();
        if self.finished {
            return None;
        }
        log::debug!("Cancelled load of {}", self.url);
        self.finished = true;
        Some(LoadEvent::Completed(Err(LoadError::Cancelled)))
    }

    fn accept(&mut self, message: WorkerMessage) -> Option<LoadEvent> {
        match message {
            WorkerMessage::Progress(percent) => {
                let percent = percent.min(100);
                if self.last_percent.is_some_and(|last| percent <= last) {
                    return None;
                }
                self.last_percent = Some(percent);
                Some(LoadEvent::Progress {
                    url: self.url.clone(),
                    percent,
                })
            }
            WorkerMessage::Done(result) => {
                self.finished = true;
                Some(LoadEvent::Completed(result))
            }
        }
    }

    fn interrupted(&mut self) -> LoadEvent {
        log::warn!("Load worker for {} exited without a result", self.url);
        self.finished = true;
        LoadEvent::Completed(Err(LoadError::Interrupted))
    }
}

impl Drop for LoadTask {
    fn drop(&mut self) {
        if !self.finished {
            self.cancel.cancel();
        }
    }
}
