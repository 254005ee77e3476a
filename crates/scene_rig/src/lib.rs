//! # Scene Rig
//!
//! Lifecycle coordination for a 3D scene assembled from independent
//! producers.
//!
//! ## Features
//!
//! - **Shared context**: scene, camera, renderer, controls and debug panel
//!   handles, each set exactly once
//! - **Lifecycle pools**: init, frame, resize and dispose callbacks with
//!   stable ids and declared handle dependencies
//! - **Stage coordinator**: mount, tick, resize and unmount with per-flush
//!   fault isolation
//! - **Background model loading**: progress events and exactly one completion,
//!   cancelled on teardown
//! - **Manifests**: whole stages described in TOML or RON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_rig::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut stage = Stage::new(StageConfig::default());
//!     stage
//!         .compose(SceneProducer::default())?
//!         .compose(CameraProducer::default())?
//!         .compose(RendererProducer::default())?
//!         .compose(ControlsProducer::default())?;
//!
//!     stage.mount(Container::new(1, 1280, 720))?;
//!     let mut timer = Timer::new();
//!     for _ in 0..60 {
//!         stage.tick(timer.update())?;
//!     }
//!     stage.unmount()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core modules
pub mod core;
pub mod context;
pub mod stage;

// Supporting modules
pub mod foundation;
pub mod config;
pub mod scene;
pub mod assets;
pub mod producers;
pub mod manifest;

/// Common imports for scene authors
pub mod prelude {
    pub use crate::{
        assets::{AssetLoader, FileModelLoader, LoadError},
        config::{Config, ConfigFormat},
        context::{Container, ContextError, Handles, PoolKind, Registration, SceneContext},
        core::{FaultPolicy, StageConfig},
        foundation::{math::Vec3, time::Timer},
        manifest::{ProducerSpec, SceneManifest},
        producers::{
            CameraProducer, CameraProps, ControlsProducer, ControlsProps, LightProducer, LightProps, LightType,
            LoadOutcome, ModelProducer, ModelProps, Producer, RendererProducer, RendererProps, SceneProducer,
            SceneProps,
        },
        scene::{HeadlessRenderer, RenderBackend},
        stage::{FlushReport, FrameTick, Stage, StageError, StagePhase},
    };
}
