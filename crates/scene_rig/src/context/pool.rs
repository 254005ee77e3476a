//! Ordered callback pools
//!
//! Entries live in a slot map keyed by [`CallbackId`]; a separate order list
//! records registration order. Removing an entry never shifts another
//! entry's id or its position relative to the rest.

use std::fmt;

use super::error::ContextError;
use super::handle::Handles;
use super::store::SceneContext;
use crate::foundation::collections::{CallbackId, SlotMap};
use crate::stage::FrameTick;

/// Callback shape for the init, resize and dispose pools
pub type LifecycleCallback = dyn FnMut(&mut SceneContext) -> Result<(), ContextError>;

/// Callback shape for the frame pool
pub type FrameCallback = dyn FnMut(&mut SceneContext, &FrameTick) -> Result<(), ContextError>;

/// Which pool an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// Flushed once at mount
    Init,
    /// Flushed on every tick while the frame driver runs
    Frame,
    /// Flushed on every resize signal
    Resize,
    /// Flushed once at unmount
    Dispose,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::Frame => "frame",
            Self::Resize => "resize",
            Self::Dispose => "dispose",
        })
    }
}

/// Metadata attached to every registered callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    label: String,
    requires: Handles,
    provides: Handles,
}

impl Registration {
    /// Registration with no declared dependencies
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            requires: Handles::empty(),
            provides: Handles::empty(),
        }
    }

    /// Handles that must be set before the callback may run
    #[must_use]
    pub fn requires(mut self, handles: Handles) -> Self {
        self.requires |= handles;
        self
    }

    /// Handles the callback assigns when it runs
    #[must_use]
    pub fn provides(mut self, handles: Handles) -> Self {
        self.provides |= handles;
        self
    }

    /// Label used in logs and fault reports
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Declared requirements
    pub fn required(&self) -> Handles {
        self.requires
    }

    /// Declared provisions
    pub fn provided(&self) -> Handles {
        self.provides
    }
}

impl From<&str> for Registration {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Registration {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

struct Entry<F: ?Sized> {
    registration: Registration,
    // Taken out while the callback runs so it can receive `&mut SceneContext`.
    callback: Option<Box<F>>,
}

/// Ordered sequence of callbacks with stable ids
pub struct CallbackPool<F: ?Sized> {
    entries: SlotMap<CallbackId, Entry<F>>,
    order: Vec<CallbackId>,
}

impl<F: ?Sized> Default for CallbackPool<F> {
    fn default() -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
        }
    }
}

impl<F: ?Sized> CallbackPool<F> {
    /// Append a callback
    pub fn push(&mut self, registration: Registration, callback: Box<F>) -> CallbackId {
        let id = self.entries.insert(Entry {
            registration,
            callback: Some(callback),
        });
        self.order.push(id);
        id
    }

    /// Remove a callback; returns whether it was present
    pub fn remove(&mut self, id: CallbackId) -> bool {
        if self.entries.remove(id).is_some() {
            self.order.retain(|&other| other != id);
            true
        } else {
            false
        }
    }

    /// Number of registered callbacks
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the pool is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in registration order
    pub fn ids(&self) -> &[CallbackId] {
        &self.order
    }

    /// Metadata of a registered callback
    pub fn registration(&self, id: CallbackId) -> Option<&Registration> {
        self.entries.get(id).map(|entry| &entry.registration)
    }

    /// Labels in registration order
    pub fn labels(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|&id| self.entries.get(id))
            .map(|entry| entry.registration.label())
            .collect()
    }

    pub(crate) fn take_callback(&mut self, id: CallbackId) -> Option<Box<F>> {
        self.entries.get_mut(id).and_then(|entry| entry.callback.take())
    }

    // A callback that unregistered itself while running is dropped here.
    pub(crate) fn restore_callback(&mut self, id: CallbackId, callback: Box<F>) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.callback = Some(callback);
        }
    }
}

/// The four pools of one context
#[derive(Default)]
pub struct LifecyclePools {
    pub(crate) init: CallbackPool<LifecycleCallback>,
    pub(crate) frame: CallbackPool<FrameCallback>,
    pub(crate) resize: CallbackPool<LifecycleCallback>,
    pub(crate) dispose: CallbackPool<LifecycleCallback>,
}

impl LifecyclePools {
    pub(crate) fn init_mut(&mut self) -> &mut CallbackPool<LifecycleCallback> {
        &mut self.init
    }

    pub(crate) fn frame_mut(&mut self) -> &mut CallbackPool<FrameCallback> {
        &mut self.frame
    }

    pub(crate) fn resize_mut(&mut self) -> &mut CallbackPool<LifecycleCallback> {
        &mut self.resize
    }

    pub(crate) fn dispose_mut(&mut self) -> &mut CallbackPool<LifecycleCallback> {
        &mut self.dispose
    }

    /// Number of callbacks in a pool
    pub fn len(&self, kind: PoolKind) -> usize {
        match kind {
            PoolKind::Init => self.init.len(),
            PoolKind::Frame => self.frame.len(),
            PoolKind::Resize => self.resize.len(),
            PoolKind::Dispose => self.dispose.len(),
        }
    }

    /// Labels of a pool in registration order
    pub fn labels(&self, kind: PoolKind) -> Vec<&str> {
        match kind {
            PoolKind::Init => self.init.labels(),
            PoolKind::Frame => self.frame.labels(),
            PoolKind::Resize => self.resize.labels(),
            PoolKind::Dispose => self.dispose.labels(),
        }
    }

    /// Remove a callback from a pool
    pub fn remove(&mut self, kind: PoolKind, id: CallbackId) -> bool {
        match kind {
            PoolKind::Init => self.init.remove(id),
            PoolKind::Frame => self.frame.remove(id),
            PoolKind::Resize => self.resize.remove(id),
            PoolKind::Dispose => self.dispose.remove(id),
        }
    }
}
