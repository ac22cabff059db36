#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Tile Lands experience.

mod save;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use glam::Vec2;
use log::{debug, error, info};
use tile_lands_core::{Event, ProgressRecord};
use tile_lands_rendering::{
    Celebration, Color, FrameInput, Presentation, RenderingBackend, Scene, TileFootprint,
};
use tile_lands_rendering_macroquad::MacroquadBackend;
use tile_lands_simulation::{Config, FrameControls, PointerInput, ProgressionKeys, Simulation};

use self::save::ProgressStore;

const WINDOW_TITLE: &str = "Tile Lands";
const BACKGROUND: Color = Color::from_rgb_u8(0x2b, 0x3a, 0x4a);

/// Merge tiles into forests across a sequence of isometric levels.
#[derive(Debug, Parser)]
#[command(name = "tile-lands", version)]
struct Args {
    /// JSON file holding the completed levels and the best endless score.
    #[arg(long, default_value = "progress.json")]
    save_path: PathBuf,
    /// Enables the `N`/`P` keys that skip between levels.
    #[arg(long)]
    debug_navigation: bool,
    /// Width of a tile sprite in pixels.
    #[arg(long, default_value_t = 64.0)]
    sprite_width: f32,
    /// Height of a tile sprite in pixels.
    #[arg(long, default_value_t = 64.0)]
    sprite_height: f32,
    /// TOML manifest listing the tile textures. Tiles are flat-shaded without it.
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Synchronises presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    vsync: bool,
    /// Logs frame rate metrics once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Tile Lands command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let footprint = TileFootprint::new(args.sprite_width, args.sprite_height)
        .context("invalid tile sprite size")?;
    let store = ProgressStore::new(args.save_path);
    let record = store
        .load()
        .with_context(|| format!("failed to load progress from {}", store.path().display()))?;
    info!(
        "loaded progress: {} levels completed, best endless score {}",
        record.completed.len(),
        record.best_score
    );

    let simulation = Simulation::new(Config::new(
        record,
        args.debug_navigation,
        args.sprite_width,
        args.sprite_height,
    ));
    info!("{}", simulation.welcome_banner());

    let mut session = Session::new(simulation, store);
    let presentation = Presentation::new(WINDOW_TITLE, BACKGROUND, Scene::new(footprint));

    MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps)
        .with_asset_manifest(args.assets)
        .run(presentation, move |dt, input, scene| {
            session.advance(dt, input, scene);
        })
}

/// Couples the simulation with the scene and the progress file.
#[derive(Debug)]
struct Session {
    simulation: Simulation,
    store: ProgressStore,
    saved: ProgressRecord,
}

impl Session {
    fn new(simulation: Simulation, store: ProgressStore) -> Self {
        let saved = simulation.progression().record().clone();
        Self {
            simulation,
            store,
            saved,
        }
    }

    fn advance(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        let events = self.simulation.step(dt, controls_from(&input)).to_vec();
        scene.advance_celebration(dt);

        for event in &events {
            match event {
                Event::LevelLoaded { level, dimensions } => {
                    info!("playing {} ({dimensions:?})", level.title());
                    scene.celebration = None;
                }
                Event::LevelCleared | Event::LevelReset { .. } => scene.celebration = None,
                Event::ForestFormed { anchor, .. } => {
                    let view = self.simulation.tile_view();
                    let projection = view.projection();
                    let centre = projection.pick_point(*anchor)
                        - Vec2::new(0.0, projection.tile_height() / 2.0);
                    scene.celebration = Some(Celebration::new(centre));
                }
                Event::LevelCompleted { level } => info!("completed {}", level.title()),
                Event::TilesMerged { result, promoted, .. } => {
                    debug!("merged into {result:?} at {promoted:?}");
                }
                Event::TimeAdvanced { .. } => {}
            }
        }

        self.persist_if_changed();

        let progression = self.simulation.progression();
        scene.set_tiles(self.simulation.tile_view().iter());
        scene.level_title = progression.current_level().title().to_owned();
        scene.goal_text = progression.goal_text().to_owned();
        scene.level_complete = progression.is_complete();
    }

    fn persist_if_changed(&mut self) {
        let record = self.simulation.progression().record();
        if *record == self.saved {
            return;
        }
        match self.store.save(record) {
            Ok(()) => {
                debug!("progress saved to {}", self.store.path().display());
                self.saved = record.clone();
            }
            Err(error) => {
                error!("{:#}", anyhow::Error::new(error));
                self.saved = record.clone();
            }
        }
    }
}

fn controls_from(input: &FrameInput) -> FrameControls {
    FrameControls {
        pointer: PointerInput::new(input.cursor, input.primary_down),
        keys: ProgressionKeys {
            confirm: input.confirm,
            reset: input.reset,
            skip_forward: input.skip_forward,
            skip_backward: input.skip_backward,
        },
    }
}
