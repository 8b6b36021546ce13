use std::time::Duration;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ExplosionConfig;
use crate::playback::easing::{Easing, Tween};
use crate::scene_graph::{NodeId, SceneGraph};

#[derive(Debug, Clone, Copy)]
pub struct ExplodedPart {
    pub node_id: NodeId,
    pub original_position: Vec3,
    pub direction: Vec3,
    /// Mesh center relative to the scene center at capture time.
    pub center_offset: Vec3,
}

/// Pushes every mesh node outward from the scene center.
///
/// Directions and original positions are captured once per scene. Offsets
/// are applied on top of the captured positions, so any progress value can
/// be set in any order without drift.
#[derive(Debug)]
pub struct ExplosionEngine {
    config: ExplosionConfig,
    parts: Vec<ExplodedPart>,
    scene_center: Vec3,
    progress: f32,
    animation: Option<Tween>,
}

impl ExplosionEngine {
    pub fn new(config: ExplosionConfig) -> Self {
        Self {
            config,
            parts: Vec::new(),
            scene_center: Vec3::ZERO,
            progress: 0.0,
            animation: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.parts.is_empty()
    }

    pub fn parts(&self) -> &[ExplodedPart] {
        &self.parts
    }

    pub fn scene_center(&self) -> Vec3 {
        self.scene_center
    }

    /// Current progress in `[0, 100]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Captures positions and directions for `scene`, which must be at rest.
    pub fn attach(&mut self, scene: &SceneGraph) {
        self.parts.clear();
        self.progress = 0.0;
        self.animation = None;

        let matrices = scene.world_matrices();
        let centers: Vec<(NodeId, Vec3, Vec3)> = scene
            .mesh_node_ids()
            .into_iter()
            .filter_map(|node_id| {
                let bounds = scene.node_world_bounds(node_id, &matrices)?;
                let position = scene.node(node_id)?.transform.translation();
                Some((node_id, position, bounds.center()))
            })
            .collect();

        self.scene_center = scene.world_bounds().center();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        for (node_id, original_position, mesh_center) in centers {
            let center_offset = mesh_center - self.scene_center;
            let direction = center_offset
                .try_normalize()
                .unwrap_or_else(|| random_unit_vector(&mut rng));

            self.parts.push(ExplodedPart {
                node_id,
                original_position,
                direction,
                center_offset,
            });
        }

        log::debug!("Explosion attached to {} meshes", self.parts.len());
    }

    pub fn detach(&mut self) {
        self.parts.clear();
        self.animation = None;
        self.progress = 0.0;
    }

    /// Moves every part to `original + direction * maxDistance * progress/100`.
    pub fn set_progress(&mut self, scene: &mut SceneGraph, progress: f32) {
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.progress = progress;

        if self.parts.is_empty() {
            return;
        }

        // Recomputed each time; the contributing geometry may have changed.
        let max_distance = scene.world_bounds().max_dimension() * 0.5;
        let distance = max_distance * progress / 100.0;

        for part in &self.parts {
            let position = part.original_position + part.direction * distance;
            scene.set_node_translation(part.node_id, position);
        }
    }

    /// Starts easing the displayed progress toward `target`.
    pub fn animate_to(&mut self, target: f32, now: Duration) {
        let target = target.clamp(0.0, 100.0);
        self.animation = Some(Tween::new(
            now,
            self.config.animation_duration,
            self.progress,
            target,
            Easing::EaseOutCubic,
        ));
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn tick(&mut self, now: Duration, scene: &mut SceneGraph) {
        let Some(animation) = self.animation else {
            return;
        };

        self.set_progress(scene, animation.sample(now));
        if animation.is_finished(now) {
            self.animation = None;
        }
    }
}

fn random_unit_vector(rng: &mut StdRng) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if let Some(direction) = candidate.try_normalize() {
            return direction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Aabb;
    use crate::scene_graph::{SceneMesh, SceneNode, Transform};

    fn cube_at(scene: &mut SceneGraph, name: &str, position: Vec3) -> NodeId {
        let mesh = scene.add_mesh(SceneMesh::new(
            name,
            1,
            Some(Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))),
        ));
        scene.add_node(
            SceneNode::named(name)
                .with_mesh(mesh)
                .with_transform(Transform::from_translation(position)),
            None,
        )
    }

    fn translation(scene: &SceneGraph, id: NodeId) -> Vec3 {
        scene.node(id).unwrap().transform.translation()
    }

    #[test]
    fn parts_move_away_from_center() {
        let mut scene = SceneGraph::new();
        let left = cube_at(&mut scene, "left", Vec3::new(-2.0, 0.0, 0.0));
        let right = cube_at(&mut scene, "right", Vec3::new(2.0, 0.0, 0.0));

        let mut engine = ExplosionEngine::new(ExplosionConfig::default());
        engine.attach(&scene);
        assert!(engine.parts()[0].direction.abs_diff_eq(Vec3::NEG_X, 1e-6));
        assert!(engine.parts()[1].center_offset.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));

        // Bounds span x in [-2.5, 2.5], so max distance is 2.5.
        engine.set_progress(&mut scene, 100.0);
        assert!(translation(&scene, left).abs_diff_eq(Vec3::new(-4.5, 0.0, 0.0), 1e-5));
        assert!(translation(&scene, right).abs_diff_eq(Vec3::new(4.5, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn distance_follows_bounds_at_the_time_of_the_change() {
        let mut scene = SceneGraph::new();
        let left = cube_at(&mut scene, "left", Vec3::new(-2.0, 0.0, 0.0));
        let right = cube_at(&mut scene, "right", Vec3::new(2.0, 0.0, 0.0));

        let mut engine = ExplosionEngine::new(ExplosionConfig::default());
        engine.attach(&scene);

        // Bounds now span x in [-2.5, 6.5], so max distance is 4.5.
        scene.set_node_translation(right, Vec3::new(6.0, 0.0, 0.0));
        engine.set_progress(&mut scene, 100.0);

        assert!(translation(&scene, left).abs_diff_eq(Vec3::new(-6.5, 0.0, 0.0), 1e-5));
        assert!(translation(&scene, right).abs_diff_eq(Vec3::new(6.5, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn zero_progress_restores_original_positions() {
        let mut scene = SceneGraph::new();
        let positions = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-4.0, 0.5, 1.0),
            Vec3::new(0.0, -3.0, 2.0),
        ];
        let ids: Vec<NodeId> = positions
            .iter()
            .enumerate()
            .map(|(i, p)| cube_at(&mut scene, &format!("part{i}"), *p))
            .collect();

        let mut engine = ExplosionEngine::new(ExplosionConfig::default());
        engine.attach(&scene);
        for progress in [0.0, 37.0, 100.0, 64.0, 100.0, 0.0] {
            engine.set_progress(&mut scene, progress);
        }

        for (id, original) in ids.iter().zip(positions) {
            assert!(translation(&scene, *id).abs_diff_eq(original, 1e-6));
        }
    }

    #[test]
    fn centered_mesh_gets_a_stable_fallback_direction() {
        let mut scene = SceneGraph::new();
        cube_at(&mut scene, "center", Vec3::ZERO);

        let mut engine = ExplosionEngine::new(ExplosionConfig::default());
        engine.attach(&scene);
        let direction = engine.parts()[0].direction;
        assert!((direction.length() - 1.0).abs() < 1e-5);

        engine.attach(&scene);
        assert_eq!(engine.parts()[0].direction, direction);
    }

    #[test]
    fn progress_is_clamped() {
        let mut scene = SceneGraph::new();
        cube_at(&mut scene, "a", Vec3::X);
        let mut engine = ExplosionEngine::new(ExplosionConfig::default());
        engine.attach(&scene);

        engine.set_progress(&mut scene, 250.0);
        assert_eq!(engine.progress(), 100.0);
        engine.set_progress(&mut scene, -3.0);
        assert_eq!(engine.progress(), 0.0);
        engine.set_progress(&mut scene, f32::NAN);
        assert_eq!(engine.progress(), 0.0);
    }

    #[test]
    fn animation_eases_to_target() {
        let mut scene = SceneGraph::new();
        cube_at(&mut scene, "a", Vec3::X);
        cube_at(&mut scene, "b", -Vec3::X);
        let mut engine = ExplosionEngine::new(ExplosionConfig::default());
        engine.attach(&scene);

        engine.animate_to(100.0, Duration::ZERO);
        engine.tick(Duration::from_millis(250), &mut scene);
        let midway = engine.progress();
        assert!(midway > 50.0 && midway < 100.0);
        assert!(engine.is_animating());

        engine.tick(Duration::from_millis(500), &mut scene);
        assert_eq!(engine.progress(), 100.0);
        assert!(!engine.is_animating());
    }
}
