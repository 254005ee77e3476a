//! In-flight asset loads watched by the context
//!
//! Load tasks run on worker threads; their events are delivered to the
//! registered handler on the coordinator thread when the stage polls.

use super::store::SceneContext;
use crate::assets::{LoadEvent, LoadTask};

/// Handler invoked on the coordinator thread for every load event
pub type LoadHandler = dyn FnMut(&mut SceneContext, LoadEvent);

pub(crate) struct LoadWatch {
    pub(crate) task: LoadTask,
    pub(crate) handler: Box<LoadHandler>,
}

#[derive(Default)]
pub(crate) struct LoadQueue {
    watches: Vec<LoadWatch>,
}

impl LoadQueue {
    pub(crate) fn push(&mut self, watch: LoadWatch) {
        self.watches.push(watch);
    }

    pub(crate) fn take(&mut self) -> Vec<LoadWatch> {
        std::mem::take(&mut self.watches)
    }

    /// Put back watches that were taken for polling, ahead of any that were
    /// registered while they were out.
    pub(crate) fn restore(&mut self, mut earlier: Vec<LoadWatch>) {
        earlier.append(&mut self.watches);
        self.watches = earlier;
    }

    pub(crate) fn len(&self) -> usize {
        self.watches.len()
    }
}
