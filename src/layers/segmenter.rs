use itertools::Itertools;

use crate::config::{FlattenPolicy, SegmenterConfig};
use crate::layers::step::{step_id, LayerVisualizerData, StepMetadata, VisualizerStep};
use crate::scene_graph::{NodeId, SceneGraph, SceneNode};

/// Splits `scene` into construction steps.
///
/// Every top-level node contributes one step holding all mesh nodes beneath
/// it, in pre-order. A synthetic "Start" step with no members always comes
/// first. When the flatten policy applies, each mesh node gets its own step
/// instead.
pub fn segment(scene: &SceneGraph, config: &SegmenterConfig) -> LayerVisualizerData {
    let mut data = LayerVisualizerData::default();
    if scene.is_empty() {
        return data;
    }

    data.push_start_step();

    let groups: Vec<Vec<NodeId>> = scene
        .root_ids()
        .iter()
        .map(|root| {
            scene
                .depth_first(*root)
                .filter(|id| scene.node(*id).is_some_and(SceneNode::has_mesh))
                .collect::<Vec<_>>()
        })
        .filter(|group| !group.is_empty())
        .collect();

    let mesh_node_count: usize = groups.iter().map(Vec::len).sum();
    if mesh_node_count == 0 {
        log::info!("No mesh nodes found, timeline has no layers");
        return data;
    }

    let flatten = match config.flatten {
        FlattenPolicy::Auto => groups.len() == 1 && mesh_node_count > 1,
        FlattenPolicy::Never => false,
        FlattenPolicy::Always => true,
    };

    let groups = if flatten {
        groups.into_iter().flatten().map(|id| vec![id]).collect()
    } else {
        groups
    };

    for members in groups {
        let ordinal = data.step_count();
        let (step, metadata) = build_step(scene, ordinal, members);
        for node_id in &step.node_ids {
            if let Some(mesh_id) = scene.node(*node_id).and_then(|node| node.mesh_id) {
                data.mesh_step_map.insert(mesh_id, step.id.clone());
            }
        }
        data.push_step(step, metadata);
    }

    log::info!(
        "Segmented {} mesh nodes into {} steps{}: {}",
        mesh_node_count,
        data.step_count() - 1,
        if flatten { " (flattened)" } else { "" },
        data.steps.iter().skip(1).map(|step| &step.title).join(", ")
    );

    data
}

fn build_step(
    scene: &SceneGraph,
    ordinal: usize,
    node_ids: Vec<NodeId>,
) -> (VisualizerStep, StepMetadata) {
    let members: Vec<&SceneNode> = node_ids.iter().filter_map(|id| scene.node(*id)).collect();

    let title_node = members
        .iter()
        .find(|node| node.display_name().is_some())
        .or_else(|| members.first());
    let title = title_node
        .and_then(|node| label_for(scene, node))
        .unwrap_or_else(|| format!("Layer {ordinal}"));

    let mesh_ids = members
        .iter()
        .enumerate()
        .map(|(i, node)| match node.display_name() {
            Some(name) => name.to_string(),
            None => format!("layer-{ordinal}-{}", i + 1),
        })
        .collect();

    let node_names = members
        .iter()
        .enumerate()
        .map(|(i, node)| label_for(scene, node).unwrap_or_else(|| format!("Layer {}", i + 1)))
        .collect();

    let primitive_count = node_ids.iter().map(|id| scene.primitive_count(*id)).sum();

    let step = VisualizerStep {
        id: step_id(ordinal),
        ordinal,
        title,
        description: None,
        node_ids,
        mesh_ids,
        primitive_count,
    };
    let metadata = StepMetadata {
        node_names,
        mesh_count: primitive_count,
        primitive_count,
    };

    (step, metadata)
}

/// Node name, else the attached mesh's name.
fn label_for(scene: &SceneGraph, node: &SceneNode) -> Option<String> {
    node.display_name()
        .or_else(|| {
            node.mesh_id
                .and_then(|id| scene.mesh(id))
                .and_then(|mesh| mesh.display_name())
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::SceneMesh;

    fn mesh_node(
        scene: &mut SceneGraph,
        name: &str,
        primitives: usize,
        parent: Option<NodeId>,
    ) -> NodeId {
        let mesh = scene.add_mesh(SceneMesh::new(format!("{name}-mesh"), primitives, None));
        scene.add_node(SceneNode::named(name).with_mesh(mesh), parent)
    }

    #[test]
    fn empty_scene_yields_no_steps() {
        let data = segment(&SceneGraph::new(), &SegmenterConfig::default());
        assert!(data.is_empty());
        assert!(!data.has_layers());
    }

    #[test]
    fn scene_without_meshes_only_has_start_step() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(SceneNode::named("empty"), None);
        scene.add_node(SceneNode::named("also empty"), Some(root));

        let data = segment(&scene, &SegmenterConfig::default());
        assert_eq!(data.step_count(), 1);
        assert!(!data.has_layers());
        assert_eq!(data.steps[0].title, crate::layers::step::START_STEP_TITLE);
    }

    #[test]
    fn titles_fall_back_to_mesh_name_then_layer_number() {
        let mut scene = SceneGraph::new();
        let named_mesh = scene.add_mesh(SceneMesh::new("Bracket", 1, None));
        let anonymous_mesh = scene.add_mesh(SceneMesh::new("  ", 1, None));

        let first = scene.add_node(SceneNode::named(""), None);
        scene.add_node(SceneNode::named(" ").with_mesh(named_mesh), Some(first));
        let second = scene.add_node(SceneNode::named(""), None);
        scene.add_node(SceneNode::default().with_mesh(anonymous_mesh), Some(second));

        let data = segment(&scene, &SegmenterConfig::default());
        let titles: Vec<&str> = data.steps.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Start", "Bracket", "Layer 2"]);
        assert_eq!(data.steps[1].mesh_ids, vec!["layer-1-1".to_string()]);
        assert_eq!(data.metadata("step-2").unwrap().node_names, vec!["Layer 1".to_string()]);
    }

    #[test]
    fn title_prefers_first_named_member() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(SceneNode::named("Frame"), None);
        mesh_node(&mut scene, "", 1, Some(root));
        mesh_node(&mut scene, "Rail", 1, Some(root));
        let other = scene.add_node(SceneNode::named("Other"), None);
        mesh_node(&mut scene, "Panel", 1, Some(other));

        let data = segment(&scene, &SegmenterConfig::default());
        assert_eq!(data.steps[1].title, "Rail");
        assert_eq!(data.steps[1].mesh_ids, vec!["layer-1-1".to_string(), "Rail".to_string()]);
    }

    #[test]
    fn primitive_counts_are_summed_per_step() {
        let mut scene = SceneGraph::new();
        let a = scene.add_node(SceneNode::named("a"), None);
        mesh_node(&mut scene, "a1", 3, Some(a));
        mesh_node(&mut scene, "a2", 2, Some(a));
        mesh_node(&mut scene, "b", 4, None);

        let data = segment(&scene, &SegmenterConfig::default());
        let counts: Vec<usize> = data.steps.iter().map(|s| s.primitive_count).collect();
        assert_eq!(counts, vec![0, 5, 4]);
        assert_eq!(data.metadata("step-1").unwrap().mesh_count, 5);
    }

    #[test]
    fn flatten_policy_overrides_heuristic() {
        let mut scene = SceneGraph::new();
        let a = scene.add_node(SceneNode::named("a"), None);
        mesh_node(&mut scene, "a1", 1, Some(a));
        mesh_node(&mut scene, "a2", 1, Some(a));

        let auto = segment(&scene, &SegmenterConfig::default());
        assert_eq!(auto.step_count(), 3);

        let never = segment(
            &scene,
            &SegmenterConfig {
                flatten: FlattenPolicy::Never,
            },
        );
        assert_eq!(never.step_count(), 2);

        let b = scene.add_node(SceneNode::named("b"), None);
        mesh_node(&mut scene, "b1", 1, Some(b));
        let always = segment(
            &scene,
            &SegmenterConfig {
                flatten: FlattenPolicy::Always,
            },
        );
        assert_eq!(always.step_count(), 4);
    }

    #[test]
    fn lookups_resolve_nodes_and_meshes_to_ordinals() {
        let mut scene = SceneGraph::new();
        let first = mesh_node(&mut scene, "first", 1, None);
        let second = mesh_node(&mut scene, "second", 1, None);
        let data = segment(&scene, &SegmenterConfig::default());

        assert_eq!(data.step_ordinal_for_node(first), Some(1));
        assert_eq!(data.step_ordinal_for_node(second), Some(2));
        let second_mesh = scene.node(second).unwrap().mesh_id.unwrap();
        assert_eq!(data.step_ordinal_for_mesh(second_mesh), Some(2));
    }
}
