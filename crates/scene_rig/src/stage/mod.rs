//! # Stage
//!
//! The mount, frame, resize and dispose coordinators for one
//! [`SceneContext`](crate::context::SceneContext).
//!
//! A [`Stage`] owns the context. Producers are composed into it before mount;
//! after that the host only forwards its signals:
//!
//! | Host signal        | Stage call          | Pool flushed |
//! |--------------------|---------------------|--------------|
//! | container ready    | [`Stage::mount`]    | init, once   |
//! | animation tick     | [`Stage::tick`]     | frame        |
//! | viewport resized   | [`Stage::resize`]   | resize       |
//! | container destroyed| [`Stage::unmount`]  | dispose, once|
//!
//! Every flush returns a [`FlushReport`]. With
//! [`FaultPolicy::Isolate`](crate::core::FaultPolicy::Isolate) a failing
//! callback is logged and recorded and the rest of the pool still runs.

mod coordinator;
mod driver;
mod error;
mod flush;
mod ordering;

#[cfg(test)]
mod scenario_tests;

pub use coordinator::{Stage, StagePhase};
pub use driver::{DriverState, FrameDriver, FrameStats, FrameTick};
pub use error::StageError;
pub use flush::{FlushFault, FlushReport};
pub use ordering::dependency_order;
