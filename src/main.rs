use std::time::Duration;

use anyhow::{Context, Result};
use itertools::Itertools;
use layerviz::asset_pipeline::load_gltf;
use layerviz::{RevealStage, TimelinePosition, Viewer, ViewerConfig};

const FRAME: Duration = Duration::from_micros(16_667);
const MAX_FRAMES: u32 = 60 * 120;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("Usage: layerviz <model.gltf|model.glb> [speed]")?;
    let speed = args
        .next()
        .map(|value| value.parse::<f32>())
        .transpose()
        .context("Playback speed must be a number")?;

    let scene = load_gltf(&path).with_context(|| format!("Failed to load {path}"))?;

    let mut viewer = Viewer::new(ViewerConfig::default());
    let mut clock = Clock::default();
    viewer.load(scene, clock.now);

    if !viewer.has_layers() {
        log::info!("No layers detected in {path}");
        return Ok(());
    }

    for step in &viewer.layers().steps {
        log::info!(
            "Step {}: {} ({} primitives) [{}]",
            step.ordinal,
            step.title,
            step.primitive_count,
            step.mesh_ids.iter().join(", ")
        );
    }

    clock.run(&mut viewer, |viewer| viewer.reveal_stage() == RevealStage::Settled);

    if let Some(speed) = speed {
        viewer.set_speed(speed);
    }
    viewer.play();
    clock.run(&mut viewer, |viewer| !viewer.timeline().is_playing());

    viewer.animate_explode_to(100.0, clock.now);
    clock.run(&mut viewer, |viewer| !viewer.is_exploding());
    viewer.animate_explode_to(0.0, clock.now);
    clock.run(&mut viewer, |viewer| !viewer.is_exploding());

    viewer.return_to_overview(clock.now);
    clock.run(&mut viewer, |viewer| viewer.reveal_stage() == RevealStage::Settled);

    log::info!("Done after {:.2}s", clock.now.as_secs_f32());
    Ok(())
}

/// Fixed-rate simulated frame clock.
#[derive(Default)]
struct Clock {
    now: Duration,
}

impl Clock {
    fn run(&mut self, viewer: &mut Viewer, done: impl Fn(&Viewer) -> bool) {
        let mut position = viewer.timeline().position();
        let mut stage = viewer.reveal_stage();

        for _ in 0..MAX_FRAMES {
            self.now += FRAME;
            viewer.tick(self.now);

            if viewer.reveal_stage() != stage {
                stage = viewer.reveal_stage();
                log::info!("[{:>6.2}s] Reveal stage: {stage:?}", self.now.as_secs_f32());
            }
            if viewer.timeline().position() != position {
                position = viewer.timeline().position();
                if let TimelinePosition::AtStep(index) = position {
                    let title = viewer.layers().step(index).map_or("?", |step| step.title.as_str());
                    log::info!("[{:>6.2}s] Step {index}: {title}", self.now.as_secs_f32());
                }
            }

            if done(viewer) {
                return;
            }
        }

        log::warn!("Gave up waiting after {MAX_FRAMES} frames");
    }
}
