use std::cell::Cell;
use std::rc::Rc;

use id_arena::Id;

use crate::math::{Aabb, Plane};

pub type MeshId = Id<SceneMesh>;

/// A clip plane shared by every material slot it is attached to. Updating the
/// cell moves the plane for all holders at once.
pub type ClipPlaneRef = Rc<Cell<Plane>>;

#[derive(Debug, Clone, Default)]
pub struct MaterialSlot {
    pub clip_plane: Option<ClipPlaneRef>,
    pub wireframe: bool,
}

#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub name: String,
    /// Local-space bounds of all primitives, if the container provided them.
    pub bounds: Option<Aabb>,
    /// One material slot per primitive.
    pub material_slots: Vec<MaterialSlot>,
}

impl SceneMesh {
    pub fn new(name: impl Into<String>, primitive_count: usize, bounds: Option<Aabb>) -> Self {
        Self {
            name: name.into(),
            bounds,
            material_slots: vec![MaterialSlot::default(); primitive_count],
        }
    }

    pub fn primitive_count(&self) -> usize {
        self.material_slots.len()
    }

    pub fn display_name(&self) -> Option<&str> {
        let trimmed = self.name.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}
