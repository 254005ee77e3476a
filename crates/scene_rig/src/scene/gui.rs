//! Debug control panel projection
//!
//! The panel widget library is external; this module only describes which
//! numeric and boolean fields are exposed and how edits map back onto the
//! scene. A [`GuiControl`] never borrows the value it shows. It names a
//! [`BindingTarget`] that is resolved against the scene on every read and
//! write, so entries stay valid while nodes come and go.

use super::graph::Scene;
use crate::foundation::collections::NodeId;
use crate::foundation::math::{deg_to_rad, rad_to_deg, Vec3};

/// Vector component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// X component
    X,
    /// Y component
    Y,
    /// Z component
    Z,
}

impl Axis {
    /// All three axes in order
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    fn read(self, v: &Vec3) -> f32 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
            Self::Z => v.z,
        }
    }

    fn write(self, v: &mut Vec3, value: f32) {
        match self {
            Self::X => v.x = value,
            Self::Y => v.y = value,
            Self::Z => v.z = value,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

/// Field a control is bound to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingTarget {
    /// Scene root position
    ScenePosition(Axis),
    /// Scene root rotation, radians
    SceneRotation(Axis),
    /// Node position
    NodePosition(NodeId, Axis),
    /// Node rotation, shown and edited in degrees
    NodeRotationDegrees(NodeId, Axis),
    /// Node wireframe toggle
    NodeWireframe(NodeId),
    /// Read-only frame rate
    FrameRate,
}

/// Value read from or written to a binding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindingValue {
    /// Numeric field
    Number(f32),
    /// Boolean field
    Toggle(bool),
}

/// One control in a folder
#[derive(Debug, Clone, PartialEq)]
pub struct GuiControl {
    /// Display label
    pub label: String,
    /// Bound field
    pub target: BindingTarget,
    /// Slider range, if any
    pub range: Option<(f32, f32)>,
    /// Step for numeric edits
    pub step: Option<f32>,
    /// Refresh the displayed value every frame
    pub listen: bool,
}

impl GuiControl {
    /// Control with no range or step
    pub fn new(label: impl Into<String>, target: BindingTarget) -> Self {
        Self {
            label: label.into(),
            target,
            range: None,
            step: None,
            listen: false,
        }
    }

    /// Builder-style step
    #[must_use]
    pub fn step(mut self, step: f32) -> Self {
        self.step = Some(step);
        self
    }

    /// Builder-style range
    #[must_use]
    pub fn range(mut self, min: f32, max: f32) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Builder-style listen flag
    #[must_use]
    pub fn listen(mut self) -> Self {
        self.listen = true;
        self
    }
}

/// Named group of controls
#[derive(Debug, Clone, PartialEq)]
pub struct GuiFolder {
    /// Folder title
    pub name: String,
    /// Collapsed by default
    pub closed: bool,
    /// Controls in display order
    pub controls: Vec<GuiControl>,
}

impl GuiFolder {
    /// Append a control
    pub fn add(&mut self, control: GuiControl) -> &mut Self {
        self.controls.push(control);
        self
    }

    /// Append `<prefix>-x`, `-y`, `-z` controls built from `target`
    pub fn add_vector(
        &mut self,
        prefix: &str,
        target: impl Fn(Axis) -> BindingTarget,
        configure: impl Fn(GuiControl) -> GuiControl,
    ) -> &mut Self {
        for axis in Axis::ALL {
            let control = GuiControl::new(format!("{prefix}-{}", axis.suffix()), target(axis));
            self.controls.push(configure(control));
        }
        self
    }
}

/// Debug control panel
#[derive(Debug, Clone, PartialEq)]
pub struct GuiPanel {
    /// Panel title
    pub title: String,
    /// Panel width in pixels
    pub width: u32,
    folders: Vec<GuiFolder>,
    frame_rate: f32,
}

impl GuiPanel {
    /// Empty panel
    pub fn new(title: impl Into<String>, width: u32) -> Self {
        Self {
            title: title.into(),
            width,
            folders: Vec::new(),
            frame_rate: 0.0,
        }
    }

    /// Add a folder and return it for population
    pub fn add_folder(&mut self, name: impl Into<String>) -> &mut GuiFolder {
        self.folders.push(GuiFolder {
            name: name.into(),
            closed: false,
            controls: Vec::new(),
        });
        let last = self.folders.len() - 1;
        &mut self.folders[last]
    }

    /// All folders in creation order
    pub fn folders(&self) -> &[GuiFolder] {
        &self.folders
    }

    /// Find a folder by name
    pub fn folder(&self, name: &str) -> Option<&GuiFolder> {
        self.folders.iter().find(|folder| folder.name == name)
    }

    /// Update the frame-rate readout
    pub fn set_frame_rate(&mut self, fps: f32) {
        self.frame_rate = fps;
    }

    /// Current value of a binding, `None` if its node is gone
    pub fn read(&self, scene: &Scene, target: BindingTarget) -> Option<BindingValue> {
        let value = match target {
            BindingTarget::ScenePosition(axis) => BindingValue::Number(axis.read(&scene.position)),
            BindingTarget::SceneRotation(axis) => BindingValue::Number(axis.read(&scene.rotation)),
            BindingTarget::NodePosition(id, axis) => {
                BindingValue::Number(axis.read(&scene.get(id)?.transform.position))
            }
            BindingTarget::NodeRotationDegrees(id, axis) => {
                BindingValue::Number(rad_to_deg(axis.read(&scene.get(id)?.transform.rotation)))
            }
            BindingTarget::NodeWireframe(id) => BindingValue::Toggle(scene.get(id)?.wireframe),
            BindingTarget::FrameRate => BindingValue::Number(self.frame_rate),
        };
        Some(value)
    }

    /// Write an edited value back into the scene.
    ///
    /// Returns `false` when the target is read-only, its node is gone, or the
    /// value has the wrong shape.
    pub fn apply(scene: &mut Scene, target: BindingTarget, value: BindingValue) -> bool {
        match (target, value) {
            (BindingTarget::ScenePosition(axis), BindingValue::Number(v)) => {
                axis.write(&mut scene.position, v);
            }
            (BindingTarget::SceneRotation(axis), BindingValue::Number(v)) => {
                axis.write(&mut scene.rotation, v);
            }
            (BindingTarget::NodePosition(id, axis), BindingValue::Number(v)) => {
                let Some(node) = scene.get_mut(id) else { return false };
                axis.write(&mut node.transform.position, v);
            }
            (BindingTarget::NodeRotationDegrees(id, axis), BindingValue::Number(v)) => {
                let Some(node) = scene.get_mut(id) else { return false };
                axis.write(&mut node.transform.rotation, deg_to_rad(v));
            }
            (BindingTarget::NodeWireframe(id), BindingValue::Toggle(on)) => {
                let Some(node) = scene.get_mut(id) else { return false };
                node.wireframe = on;
            }
            _ => return false,
        }
        true
    }
}
