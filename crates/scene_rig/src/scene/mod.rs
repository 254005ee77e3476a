//! Engine object handles
//!
//! The coordinator treats these as opaque: it stores them in the
//! [`SceneContext`](crate::context::SceneContext) and hands them to the
//! callbacks that producers register. They carry just enough state for
//! producers to do their work and for hosts to observe the result.
//!
//! ```text
//! Scene ── nodes (lights, models, helpers)
//! Camera ── projection + view
//! RenderBackend ── paints Scene through Camera
//! OrbitControls ── moves Camera every frame
//! GuiPanel ── bindable projection of Scene fields
//! ```

mod graph;
mod camera;
mod lighting;
mod renderer;
mod controls;
mod gui;

pub use graph::{Aabb, HelperKind, NodeKind, NodeTransform, Scene, SceneNode};
pub use camera::{Camera, Projection};
pub use lighting::{Light, LightKind};
pub use renderer::{FrameRecord, HeadlessRenderer, RenderBackend, RendererSettings, ToneMapping};
pub use controls::OrbitControls;
pub use gui::{Axis, BindingTarget, BindingValue, GuiControl, GuiFolder, GuiPanel};

pub use crate::foundation::collections::NodeId;
