//! Model producer
//!
//! The init callback only starts the load; placement happens later on the
//! coordinator thread when the stage delivers the completion event. The
//! completion callback fires exactly once: with the placed node, with the
//! load error, with [`LoadError::Cancelled`] when the stage is torn down
//! mid-load, or with [`LoadError::NotStarted`] when teardown comes before the
//! load could start.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Producer;
use crate::assets::{AssetLoader, CancelToken, LoadError, LoadEvent, LoadTask, ModelData};
use crate::context::{ContextError, Handles, Registration, SceneContext};
use crate::foundation::collections::NodeId;
use crate::foundation::math::{vec_deg_to_rad, Vec3};
use crate::scene::{Axis, BindingTarget, GuiControl, NodeKind, SceneNode};

/// Model props
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelProps {
    /// Directory or url prefix
    pub path: String,
    /// File name appended to `path`
    pub file_name: String,
    /// Display name, defaults to the file name
    pub name: Option<String>,
    /// Position; zero components keep the centred offset
    pub position: Option<Vec3>,
    /// Euler rotation in degrees
    pub rotation: Option<Vec3>,
    /// Move the model's bounding-box centre to the world origin
    pub world_center: bool,
    /// Render as wireframe
    pub wireframe: bool,
}

impl ModelProps {
    /// Full resource location
    pub fn url(&self) -> String {
        if self.path.is_empty() || self.path.ends_with('/') {
            format!("{}{}", self.path, self.file_name)
        } else {
            format!("{}/{}", self.path, self.file_name)
        }
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.file_name)
    }

    fn place(&self, data: ModelData) -> SceneNode {
        let mut node = SceneNode::new(
            self.display_name(),
            NodeKind::Model {
                source: data.source,
                byte_len: data.bytes.len(),
                bounds: data.bounds,
            },
        );
        if let Some(rotation) = self.rotation {
            node.transform.rotation = vec_deg_to_rad(rotation);
        }
        if self.world_center {
            node.center_on_origin();
        }
        if let Some(position) = self.position {
            for i in 0..3 {
                if position[i] != 0.0 {
                    node.transform.position[i] = position[i];
                }
            }
        }
        node.wireframe = self.wireframe;
        node
    }
}

/// How a model load ended
#[derive(Debug)]
pub enum LoadOutcome {
    /// The model is in the scene
    Loaded(NodeId),
    /// The model never made it into the scene
    Failed(LoadError),
}

type ProgressFn = dyn FnMut(&str, u8);
type CompleteFn = dyn FnOnce(LoadOutcome);

#[derive(Default)]
struct Listeners {
    on_progress: Option<Box<ProgressFn>>,
    on_complete: Option<Box<CompleteFn>>,
}

impl Listeners {
    fn progress(&mut self, url: &str, percent: u8) {
        if let Some(on_progress) = self.on_progress.as_mut() {
            on_progress(url, percent);
        }
    }

    fn complete(&mut self, outcome: LoadOutcome) {
        match self.on_complete.take() {
            Some(on_complete) => on_complete(outcome),
            None => log::trace!("Model load finished with no completion listener: {:?}", outcome),
        }
    }
}

#[derive(Default)]
struct LoadState {
    node: Option<NodeId>,
    cancel: Option<CancelToken>,
}

/// Loads a model in the background and places it in the scene
pub struct ModelProducer {
    props: ModelProps,
    loader: Arc<dyn AssetLoader>,
    listeners: Listeners,
}

impl fmt::Debug for ModelProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelProducer").field("props", &self.props).finish_non_exhaustive()
    }
}

impl ModelProducer {
    /// Producer loading through `loader`
    pub fn new(props: ModelProps, loader: Arc<dyn AssetLoader>) -> Self {
        Self {
            props,
            loader,
            listeners: Listeners::default(),
        }
    }

    /// Called with `(url, percent)` as the payload arrives
    #[must_use]
    pub fn on_progress(mut self, callback: impl FnMut(&str, u8) + 'static) -> Self {
        self.listeners.on_progress = Some(Box::new(callback));
        self
    }

    /// Called once when the load ends
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce(LoadOutcome) + 'static) -> Self {
        self.listeners.on_complete = Some(Box::new(callback));
        self
    }
}

fn add_gui_folder(ctx: &mut SceneContext, title: &str, id: NodeId) {
    let Some(gui) = ctx.gui_mut() else {
        return;
    };
    gui.add_folder(format!("Model: {title}"))
        .add_vector("position", |axis: Axis| BindingTarget::NodePosition(id, axis), GuiControl::listen)
        .add_vector(
            "rotation",
            |axis: Axis| BindingTarget::NodeRotationDegrees(id, axis),
            |control| control.range(-360.0, 360.0).listen(),
        )
        .add(GuiControl::new("wireframe", BindingTarget::NodeWireframe(id)));
}

fn handle_event(
    ctx: &mut SceneContext,
    event: LoadEvent,
    props: &ModelProps,
    state: &RefCell<LoadState>,
    listeners: &RefCell<Listeners>,
) {
    match event {
        LoadEvent::Progress { url, percent } => listeners.borrow_mut().progress(&url, percent),
        LoadEvent::Completed(Ok(data)) => {
            let Some(scene) = ctx.scene_mut() else {
                log::error!("Model {} loaded but the scene is gone", props.url());
                listeners.borrow_mut().complete(LoadOutcome::Failed(LoadError::SceneUnavailable));
                return;
            };
            let id = scene.add(props.place(data));
            state.borrow_mut().node = Some(id);
            log::info!("Model {} loaded", props.url());

            add_gui_folder(ctx, props.display_name(), id);
            ctx.redraw_now();
            listeners.borrow_mut().complete(LoadOutcome::Loaded(id));
        }
        LoadEvent::Completed(Err(error)) => {
            if matches!(error, LoadError::Cancelled) {
                log::debug!("Model {} load cancelled", props.url());
            } else {
                log::error!("Model {} failed to load: {}", props.url(), error);
            }
            listeners.borrow_mut().complete(LoadOutcome::Failed(error));
        }
    }
}

impl Producer for ModelProducer {
    fn name(&self) -> &str {
        "model"
    }

    fn setup(self, ctx: &mut SceneContext) -> Result<(), ContextError> {
        let Self { props, loader, listeners } = self;
        let props = Rc::new(props);
        let state = Rc::new(RefCell::new(LoadState::default()));
        let listeners = Rc::new(RefCell::new(listeners));

        let init_props = Rc::clone(&props);
        let init_state = Rc::clone(&state);
        let dispose_listeners = Rc::clone(&listeners);
        ctx.register_init(
            Registration::new("model.load").requires(Handles::RENDERER | Handles::SCENE),
            move |ctx| {
                let url = init_props.url();
                let task = match LoadTask::spawn(Arc::clone(&loader), url.clone()) {
                    Ok(task) => task,
                    Err(error) => {
                        log::error!("Could not start loading {}: {}", url, error);
                        listeners.borrow_mut().complete(LoadOutcome::Failed(error));
                        return Ok(());
                    }
                };
                init_state.borrow_mut().cancel = Some(task.cancel_token());

                let props = Rc::clone(&init_props);
                let state = Rc::clone(&init_state);
                let listeners = Rc::clone(&listeners);
                ctx.watch_load(task, move |ctx, event| handle_event(ctx, event, &props, &state, &listeners));
                Ok(())
            },
        );

        ctx.register_dispose("model.dispose", move |ctx| {
            let mut state = state.borrow_mut();
            match state.cancel.take() {
                Some(cancel) => cancel.cancel(),
                None => dispose_listeners
                    .borrow_mut()
                    .complete(LoadOutcome::Failed(LoadError::NotStarted)),
            }
            if let (Some(id), Some(scene)) = (state.node.take(), ctx.scene_mut()) {
                scene.remove(id);
                log::debug!("Removed model {} from the scene", props.url());
            }
            Ok(())
        });
        Ok(())
    }
}
