//! Stable handle keys
//!
//! Registrations and scene nodes are stored in slot maps so that removing one
//! entry never invalidates the key of another.

pub use slotmap::{SecondaryMap, SlotMap};

slotmap::new_key_type! {
    /// Identifier returned for every callback registered into a lifecycle pool
    pub struct CallbackId;

    /// Identifier of a node stored in a [`Scene`](crate::scene::Scene)
    pub struct NodeId;
}
