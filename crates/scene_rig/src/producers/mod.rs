//! # Producers
//!
//! Each producer builds one engine object from its props and registers the
//! callbacks that keep it in step with the stage lifecycle. Producers never
//! talk to each other or to the stage; everything goes through the
//! [`SceneContext`] they are given during setup.
//!
//! | Producer   | Sets handle | Pools used                     |
//! |------------|-------------|--------------------------------|
//! | scene      | scene       | none                           |
//! | camera     | camera      | init, resize (+ dispose helper) |
//! | renderer   | renderer    | init, frame, resize, dispose   |
//! | light      | none        | init, dispose                  |
//! | controls   | controls    | init, then frame               |
//! | model      | none        | init, dispose + load events    |

mod camera;
mod controls;
mod lights;
mod model;
mod renderer;
mod scene;

pub use camera::{CameraProducer, CameraProps, ProjectionType};
pub use controls::{ControlsProducer, ControlsProps};
pub use lights::{LightProducer, LightProps, LightType};
pub use model::{LoadOutcome, ModelProducer, ModelProps};
pub use renderer::{RendererProducer, RendererProps};
pub use scene::{SceneProducer, SceneProps};

use crate::context::{ContextError, Handles, SceneContext};

/// A component that contributes to the scene
pub trait Producer {
    /// Name used in logs and setup errors
    fn name(&self) -> &str;

    /// Handles that must already be set when `setup` runs
    fn requires(&self) -> Handles {
        Handles::empty()
    }

    /// Handles `setup` assigns
    fn provides(&self) -> Handles {
        Handles::empty()
    }

    /// Read what is needed from `ctx`, build the producer's own object and
    /// register callbacks
    fn setup(self, ctx: &mut SceneContext) -> Result<(), ContextError>;
}
