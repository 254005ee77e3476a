//! Handle slots and the host container

use std::fmt;

use bitflags::bitflags;

use super::error::ContextError;

bitflags! {
    /// Set of context handles, used for dependency declarations and gating
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Handles: u8 {
        /// Host container
        const CONTAINER = 1 << 0;
        /// Scene root
        const SCENE = 1 << 1;
        /// Camera
        const CAMERA = 1 << 2;
        /// Renderer
        const RENDERER = 1 << 3;
        /// Orbit controls
        const CONTROLS = 1 << 4;
        /// Debug control panel
        const GUI = 1 << 5;
    }
}

impl fmt::Display for Handles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = HandleKind::ALL
            .iter()
            .filter(|kind| self.contains(kind.flag()))
            .map(|kind| kind.name())
            .collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}

/// One context handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// Host container
    Container,
    /// Scene root
    Scene,
    /// Camera
    Camera,
    /// Renderer
    Renderer,
    /// Orbit controls
    Controls,
    /// Debug control panel
    Gui,
}

impl HandleKind {
    /// Every handle kind
    pub const ALL: [Self; 6] = [
        Self::Container,
        Self::Scene,
        Self::Camera,
        Self::Renderer,
        Self::Controls,
        Self::Gui,
    ];

    /// Matching [`Handles`] flag
    pub fn flag(self) -> Handles {
        match self {
            Self::Container => Handles::CONTAINER,
            Self::Scene => Handles::SCENE,
            Self::Camera => Handles::CAMERA,
            Self::Renderer => Handles::RENDERER,
            Self::Controls => Handles::CONTROLS,
            Self::Gui => Handles::GUI,
        }
    }

    /// Lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Scene => "scene",
            Self::Camera => "camera",
            Self::Renderer => "renderer",
            Self::Controls => "controls",
            Self::Gui => "gui",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set-once holder for an engine handle
#[derive(Debug)]
pub enum Slot<T> {
    /// Not assigned yet
    Unset,
    /// Assigned; never replaced for the lifetime of the context
    Set(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> Slot<T> {
    /// Assign the handle. Fails if it was already assigned.
    pub fn set(&mut self, kind: HandleKind, value: T) -> Result<(), ContextError> {
        if self.is_set() {
            log::warn!("Rejected second assignment of the {} handle", kind);
            return Err(ContextError::HandleAlreadySet(kind));
        }
        *self = Self::Set(value);
        Ok(())
    }

    /// Whether the handle is assigned
    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// Borrow the handle
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset => None,
        }
    }

    /// Borrow the handle mutably
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset => None,
        }
    }
}

/// Host surface the scene is mounted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Container {
    id: u64,
    width: u32,
    height: u32,
}

impl Container {
    /// Describe a host surface
    pub fn new(id: u64, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    /// Host-assigned identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Client size as `(width, height)`
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width / height, `None` while either side is collapsed to zero
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect(&self) -> Option<f32> {
        (self.width > 0 && self.height > 0).then(|| self.width as f32 / self.height as f32)
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}
