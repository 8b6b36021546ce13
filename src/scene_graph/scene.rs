use glam::{Mat4, Vec3};
use id_arena::Arena;

use crate::math::Aabb;
use crate::scene_graph::mesh::{ClipPlaneRef, MeshId, SceneMesh};
use crate::scene_graph::node::{NodeId, SceneNode};

/// Arena-backed node forest. Root order is document order and drives every
/// traversal.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub nodes: Arena<SceneNode>,
    pub meshes: Arena<SceneMesh>,
    root_ids: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root_ids.is_empty()
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.root_ids
    }

    pub fn add_mesh(&mut self, mesh: SceneMesh) -> MeshId {
        self.meshes.alloc(mesh)
    }

    /// Adds `node` under `parent`, or as a new root when `parent` is `None`.
    /// Any links already present on `node` are replaced.
    pub fn add_node(&mut self, mut node: SceneNode, parent: Option<NodeId>) -> NodeId {
        let parent = parent.filter(|id| self.nodes.get(*id).is_some());
        node.parent_id = parent;
        node.child_ids.clear();

        let node_id = self.nodes.alloc(node);
        match parent.and_then(|id| self.nodes.get_mut(id)) {
            Some(parent_node) => parent_node.child_ids.push(node_id),
            None => self.root_ids.push(node_id),
        }

        node_id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&SceneMesh> {
        self.meshes.get(id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Pre-order walk of the subtree rooted at `start`, children in document order.
    pub fn depth_first(&self, start: NodeId) -> DepthFirst<'_> {
        DepthFirst {
            scene: self,
            stack: vec![start],
        }
    }

    /// Pre-order walk over every root in turn.
    pub fn traverse(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root_ids
            .iter()
            .flat_map(move |root| self.depth_first(*root))
    }

    pub fn mesh_node_ids(&self) -> Vec<NodeId> {
        self.traverse()
            .filter(|id| self.node(*id).is_some_and(SceneNode::has_mesh))
            .collect()
    }

    pub fn primitive_count(&self, node_id: NodeId) -> usize {
        self.node(node_id)
            .and_then(|node| node.mesh_id)
            .and_then(|mesh_id| self.mesh(mesh_id))
            .map_or(0, SceneMesh::primitive_count)
    }

    /// World matrices for every node, indexed by arena index.
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut matrices = vec![Mat4::IDENTITY; self.nodes.len()];
        let mut stack: Vec<(NodeId, Mat4)> = self
            .root_ids
            .iter()
            .rev()
            .map(|id| (*id, Mat4::IDENTITY))
            .collect();

        while let Some((node_id, parent_world)) = stack.pop() {
            let Some(node) = self.node(node_id) else {
                continue;
            };
            let world = parent_world * node.transform.local_matrix();
            matrices[node_id.index()] = world;

            for &child_id in node.child_ids.iter().rev() {
                stack.push((child_id, world));
            }
        }

        matrices
    }

    /// World-space bounds of the mesh attached to `node_id`.
    pub fn node_world_bounds(&self, node_id: NodeId, world_matrices: &[Mat4]) -> Option<Aabb> {
        let mesh = self.node(node_id)?.mesh_id.and_then(|id| self.mesh(id))?;
        let local = mesh.bounds?;
        let world = world_matrices.get(node_id.index())?;
        Some(local.transformed(world))
    }

    /// Union of every mesh's world-space bounds, using current transforms.
    pub fn world_bounds(&self) -> Aabb {
        let matrices = self.world_matrices();
        self.mesh_node_ids()
            .into_iter()
            .filter_map(|id| self.node_world_bounds(id, &matrices))
            .fold(Aabb::EMPTY, |acc, bounds| acc.union(&bounds))
    }

    pub fn set_node_translation(&mut self, node_id: NodeId, translation: Vec3) {
        if let Some(node) = self.nodes.get_mut(node_id) {
            node.transform.set_translation(translation);
        }
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        for (_, node) in self.nodes.iter_mut() {
            node.visible = visible;
        }
    }

    /// Points every material slot at `plane`.
    pub fn attach_clip_plane(&mut self, plane: &ClipPlaneRef) {
        for (_, mesh) in self.meshes.iter_mut() {
            for slot in &mut mesh.material_slots {
                slot.clip_plane = Some(plane.clone());
            }
        }
    }

    /// Detaches clip planes from every material slot. Returns how many slots
    /// were holding one.
    pub fn clear_clip_planes(&mut self) -> usize {
        let mut cleared = 0;
        for (_, mesh) in self.meshes.iter_mut() {
            for slot in &mut mesh.material_slots {
                if slot.clip_plane.take().is_some() {
                    cleared += 1;
                }
            }
        }
        cleared
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        for (_, mesh) in self.meshes.iter_mut() {
            for slot in &mut mesh.material_slots {
                slot.wireframe = wireframe;
            }
        }
    }
}

pub struct DepthFirst<'a> {
    scene: &'a SceneGraph,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let node_id = self.stack.pop()?;
            let Some(node) = self.scene.node(node_id) else {
                continue;
            };
            self.stack.extend(node.child_ids.iter().rev().copied());
            return Some(node_id);
        }
    }
}
