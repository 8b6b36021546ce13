use std::collections::HashMap;
use std::path::Path;

use glam::{Quat, Vec3};

use crate::error::ViewerError;
use crate::math::Aabb;
use crate::scene_graph::{MeshId, NodeId, SceneGraph, SceneMesh, SceneNode, Transform};

/// Reads a `.gltf`/`.glb` file and builds its scene graph. Only the JSON
/// document is needed; mesh bounds come from accessor min/max.
pub fn load_gltf(path: impl AsRef<Path>) -> Result<SceneGraph, ViewerError> {
    let gltf = gltf::Gltf::open(path)?;
    Ok(scene_from_gltf(&gltf.document))
}

/// Builds a scene graph from the default scene, or the first scene when no
/// default is set. A document without scenes yields an empty graph.
pub fn scene_from_gltf(document: &gltf::Document) -> SceneGraph {
    let mut scene_graph = SceneGraph::new();

    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        log::warn!(
            "{}",
            ViewerError::Configuration("document has no scenes, nothing to segment".to_string())
        );
        return scene_graph;
    };

    let mut gltf_mesh_to_mesh: HashMap<usize, MeshId> = HashMap::new();
    let mut stack: Vec<(gltf::Node, Option<NodeId>)> =
        scene.nodes().map(|node| (node, None)).collect();
    stack.reverse();

    while let Some((node, parent)) = stack.pop() {
        let (translation, rotation, scale) = node.transform().decomposed();
        let transform = Transform::new(
            Vec3::from(translation),
            Quat::from_array(rotation),
            Vec3::from(scale),
        );
        let mut object =
            SceneNode::named(node.name().unwrap_or_default()).with_transform(transform);

        if let Some(mesh) = node.mesh() {
            let mesh_id = *gltf_mesh_to_mesh
                .entry(mesh.index())
                .or_insert_with(|| scene_graph.add_mesh(mesh_from_gltf(&mesh)));
            object = object.with_mesh(mesh_id);
        }

        let node_id = scene_graph.add_node(object, parent);

        let children: Vec<gltf::Node> = node.children().collect();
        stack.extend(children.into_iter().rev().map(|child| (child, Some(node_id))));
    }

    scene_graph
}

fn mesh_from_gltf(mesh: &gltf::Mesh) -> SceneMesh {
    let mut primitive_count = 0;
    let mut bounds: Option<Aabb> = None;

    for primitive in mesh.primitives() {
        primitive_count += 1;
        let Some(primitive_bounds) = position_bounds(&primitive) else {
            continue;
        };
        bounds = Some(match bounds {
            Some(existing) => existing.union(&primitive_bounds),
            None => primitive_bounds,
        });
    }

    SceneMesh::new(mesh.name().unwrap_or_default(), primitive_count, bounds)
}

// Primitive::bounding_box panics when POSITION or its min/max is missing.
fn position_bounds(primitive: &gltf::Primitive) -> Option<Aabb> {
    let accessor = primitive.get(&gltf::Semantic::Positions)?;
    let min = vec3_from_json(&accessor.min()?)?;
    let max = vec3_from_json(&accessor.max()?)?;
    Some(Aabb::new(min, max))
}

fn vec3_from_json(value: &gltf::json::Value) -> Option<Vec3> {
    match value.as_array()?.as_slice() {
        [x, y, z] => Some(Vec3::new(x.as_f64()? as f32, y.as_f64()? as f32, z.as_f64()? as f32)),
        _ => None,
    }
}
