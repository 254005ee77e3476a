//! Flat scene graph
//!
//! Nodes live in a slot map so producers can hold a [`NodeId`] across
//! lifecycle callbacks and remove exactly what they added.

use serde::{Deserialize, Serialize};

use crate::foundation::collections::{NodeId, SlotMap};
use crate::foundation::math::Vec3;
use super::lighting::Light;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a bounding box from two corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Centre point of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Debug helper geometry
#[derive(Debug, Clone, PartialEq)]
pub enum HelperKind {
    /// Camera frustum outline
    Camera,
    /// Light gizmo sized by `size`
    Light {
        /// Gizmo size
        size: f32,
    },
    /// Ground grid
    Grid {
        /// Side length
        size: f32,
        /// Divisions per side
        divisions: u32,
        /// Centre line colour as 0xRRGGBB
        center_color: u32,
        /// Remaining line colour as 0xRRGGBB
        grid_color: u32,
        /// Material opacity, `None` when opaque
        opacity: Option<f32>,
    },
    /// XYZ axes
    Axes {
        /// Axis length
        length: f32,
    },
}

/// What a node holds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A light source
    Light(Light),
    /// A loaded model
    Model {
        /// Resource the model was loaded from
        source: String,
        /// Size of the loaded payload in bytes
        byte_len: usize,
        /// Local bounds reported by the loader
        bounds: Option<Aabb>,
    },
    /// Debug helper
    Helper(HelperKind),
}

/// Position and Euler rotation (radians) of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    /// Position in world space
    pub position: Vec3,
    /// Euler rotation in radians
    pub rotation: Vec3,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
        }
    }
}

/// One entry in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Display name
    pub name: String,
    /// Node payload
    pub kind: NodeKind,
    /// Node transform
    pub transform: NodeTransform,
    /// Render meshes as wireframe
    pub wireframe: bool,
}

impl SceneNode {
    /// Create a node at the origin
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: NodeTransform::default(),
            wireframe: false,
        }
    }

    /// Builder-style position
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Move the node so the centre of its bounds sits on the world origin
    pub fn center_on_origin(&mut self) {
        if let NodeKind::Model { bounds: Some(bounds), .. } = &self.kind {
            self.transform.position -= bounds.center();
        }
    }
}

/// Scene root
#[derive(Debug, Default)]
pub struct Scene {
    nodes: SlotMap<NodeId, SceneNode>,
    /// Root position
    pub position: Vec3,
    /// Root Euler rotation in radians
    pub rotation: Vec3,
    /// Background colour, `None` for transparent
    pub background: Option<u32>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id
    pub fn add(&mut self, node: SceneNode) -> NodeId {
        log::trace!("Scene: adding node '{}'", node.name);
        self.nodes.insert(node)
    }

    /// Remove a node, returning it if it was present
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        let removed = self.nodes.remove(id);
        if let Some(node) = &removed {
            log::trace!("Scene: removed node '{}'", node.name);
        }
        removed
    }

    /// Get a node
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Get a node mutably
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    /// Whether the node is still in the scene
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter()
    }

    /// Count nodes matching a predicate
    pub fn count_where(&self, predicate: impl Fn(&SceneNode) -> bool) -> usize {
        self.nodes.values().filter(|node| predicate(node)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_keeps_other_ids_valid() {
        let mut scene = Scene::new();
        let a = scene.add(SceneNode::new("a", NodeKind::Helper(HelperKind::Axes { length: 1.0 })));
        let b = scene.add(SceneNode::new("b", NodeKind::Helper(HelperKind::Axes { length: 2.0 })));

        assert!(scene.remove(a).is_some());
        assert!(scene.remove(a).is_none());
        assert!(scene.contains(b));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_center_on_origin_uses_bounds() {
        let mut node = SceneNode::new(
            "model",
            NodeKind::Model {
                source: "m.glb".into(),
                byte_len: 0,
                bounds: Some(Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 4.0, 6.0))),
            },
        );
        node.center_on_origin();
        assert_eq!(node.transform.position, Vec3::new(-1.0, -2.0, -3.0));
    }
}
