//! # Scene Context
//!
//! The shared record every producer receives during setup and every
//! lifecycle callback receives when its pool is flushed.
//!
//! ## Handles
//!
//! Each engine handle sits in a [`Slot`] that moves from `Unset` to `Set`
//! exactly once. Producers that need a handle declare it in their
//! [`Registration`] and the flush skips them with a
//! [`ContextError::MissingDependency`] instead of letting them run against a
//! missing object.
//!
//! ## Pools
//!
//! Four ordered pools hold the registered callbacks:
//!
//! | Pool    | Flushed by                         |
//! |---------|------------------------------------|
//! | init    | `Stage::mount`, once               |
//! | frame   | `Stage::tick`, while running       |
//! | resize  | `Stage::resize`, once per signal   |
//! | dispose | `Stage::unmount`, once             |

mod error;
mod handle;
mod loads;
mod pool;
mod store;

pub use error::ContextError;
pub use handle::{Container, HandleKind, Handles, Slot};
pub use loads::LoadHandler;
pub use pool::{CallbackPool, FrameCallback, LifecycleCallback, LifecyclePools, PoolKind, Registration};
pub use store::SceneContext;

pub(crate) use loads::{LoadQueue, LoadWatch};

pub use crate::foundation::collections::CallbackId;
