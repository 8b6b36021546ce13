use std::collections::HashMap;

use crate::scene_graph::{MeshId, NodeId};

pub const START_STEP_TITLE: &str = "Start";
pub const START_STEP_DESCRIPTION: &str = "All layers hidden";

/// A group of nodes revealed together during playback.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizerStep {
    pub id: String,
    pub ordinal: usize,
    pub title: String,
    pub description: Option<String>,
    pub node_ids: Vec<NodeId>,
    /// Display identifiers, not geometry handles.
    pub mesh_ids: Vec<String>,
    pub primitive_count: usize,
}

impl VisualizerStep {
    pub fn is_start(&self) -> bool {
        self.ordinal == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepMetadata {
    pub node_names: Vec<String>,
    pub mesh_count: usize,
    pub primitive_count: usize,
}

/// Segmentation result: ordered steps plus reverse lookups from scene
/// elements to the step that owns them.
#[derive(Debug, Clone, Default)]
pub struct LayerVisualizerData {
    pub steps: Vec<VisualizerStep>,
    pub metadata_by_step: HashMap<String, StepMetadata>,
    pub node_step_map: HashMap<NodeId, String>,
    pub mesh_step_map: HashMap<MeshId, String>,
    ordinal_by_step: HashMap<String, usize>,
}

impl LayerVisualizerData {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// False when only the synthetic start step exists, i.e. nothing to play.
    pub fn has_layers(&self) -> bool {
        self.steps.len() > 1
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, ordinal: usize) -> Option<&VisualizerStep> {
        self.steps.get(ordinal)
    }

    pub fn metadata(&self, step_id: &str) -> Option<&StepMetadata> {
        self.metadata_by_step.get(step_id)
    }

    pub fn ordinal_of(&self, step_id: &str) -> Option<usize> {
        self.ordinal_by_step.get(step_id).copied()
    }

    pub fn step_ordinal_for_node(&self, node_id: NodeId) -> Option<usize> {
        self.node_step_map
            .get(&node_id)
            .and_then(|step_id| self.ordinal_of(step_id))
    }

    pub fn step_ordinal_for_mesh(&self, mesh_id: MeshId) -> Option<usize> {
        self.mesh_step_map
            .get(&mesh_id)
            .and_then(|step_id| self.ordinal_of(step_id))
    }

    pub(crate) fn push_step(&mut self, step: VisualizerStep, metadata: StepMetadata) {
        for node_id in &step.node_ids {
            self.node_step_map.insert(*node_id, step.id.clone());
        }
        self.ordinal_by_step.insert(step.id.clone(), step.ordinal);
        self.metadata_by_step.insert(step.id.clone(), metadata);
        self.steps.push(step);
    }

    pub(crate) fn push_start_step(&mut self) {
        let step = VisualizerStep {
            id: step_id(0),
            ordinal: 0,
            title: START_STEP_TITLE.to_string(),
            description: Some(START_STEP_DESCRIPTION.to_string()),
            node_ids: Vec::new(),
            mesh_ids: Vec::new(),
            primitive_count: 0,
        };
        self.push_step(step, StepMetadata::default());
    }
}

pub fn step_id(ordinal: usize) -> String {
    format!("step-{ordinal}")
}
