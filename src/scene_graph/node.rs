use id_arena::Id;

use crate::scene_graph::mesh::MeshId;
use crate::scene_graph::transform::Transform;

pub type NodeId = Id<SceneNode>;

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub mesh_id: Option<MeshId>,
    pub parent_id: Option<NodeId>,
    pub child_ids: Vec<NodeId>,
    pub visible: bool,
}

impl SceneNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_mesh(mut self, mesh_id: MeshId) -> Self {
        self.mesh_id = Some(mesh_id);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Name with surrounding whitespace removed, or `None` when nothing is left.
    pub fn display_name(&self) -> Option<&str> {
        let trimmed = self.name.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh_id.is_some()
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::default(),
            mesh_id: None,
            parent_id: None,
            child_ids: Vec::new(),
            visible: true,
        }
    }
}
