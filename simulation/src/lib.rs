#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame driver wiring the world to the interaction, forest and progression systems.
//!
//! Every call to [`Simulation::step`] performs exactly one pass of
//! interaction, merge resolution, forest detection and goal evaluation.
//! Commands emitted by a system are applied before the next system observes
//! the world, so no partially merged state is ever visible to readers.

use std::time::Duration;

use log::trace;
use tile_lands_core::{Command, Event, ProgressRecord, TileView};
use tile_lands_system_forest::ForestDetector;
use tile_lands_system_progression as progression;
use tile_lands_world::{self as world, query, World};

pub use tile_lands_system_interaction::{Interaction, PointerInput};
pub use tile_lands_system_progression::{goals, Progression, ProgressionKeys};

/// Configuration parameters required to construct a simulation.
#[derive(Clone, Debug)]
pub struct Config {
    record: ProgressRecord,
    debug_navigation: bool,
    sprite_width: f32,
    sprite_height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            record: ProgressRecord::default(),
            debug_navigation: false,
            sprite_width: 64.0,
            sprite_height: 64.0,
        }
    }
}

impl Config {
    /// Creates a configuration from a persisted record and the tile sprite size.
    #[must_use]
    pub fn new(
        record: ProgressRecord,
        debug_navigation: bool,
        sprite_width: f32,
        sprite_height: f32,
    ) -> Self {
        Self {
            record,
            debug_navigation,
            sprite_width,
            sprite_height,
        }
    }
}

/// Input snapshot captured by the adapter once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameControls {
    /// Pointer position and primary button state.
    pub pointer: PointerInput,
    /// Held state of the progression keys.
    pub keys: ProgressionKeys,
}

/// Owns the world and every system, advancing them one frame at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    interaction: Interaction,
    forest: ForestDetector,
    progression: Progression,
    carried: Vec<Event>,
    frame_events: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation. The first level is loaded on the first frame.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::ConfigureTileFootprint {
                sprite_width: config.sprite_width,
                sprite_height: config.sprite_height,
            },
            &mut events,
        );

        Self {
            world,
            interaction: Interaction::new(),
            forest: ForestDetector::new(),
            progression: Progression::new(progression::Config::new(
                config.record,
                config.debug_navigation,
            )),
            carried: events,
            frame_events: Vec::new(),
        }
    }

    /// Advances the simulation by one frame and returns the events it produced.
    pub fn step(&mut self, dt: Duration, controls: FrameControls) -> &[Event] {
        let mut events = std::mem::take(&mut self.carried);
        let frame_start = events.len();
        let mut commands = Vec::new();

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let view = query::tile_view(&self.world);
        self.interaction
            .handle(&events, controls.pointer, &view, &mut commands);
        self.flush(&mut commands, &mut events);

        let view = query::tile_view(&self.world);
        self.forest.handle(&view, &mut commands);
        self.flush(&mut commands, &mut events);

        let view = query::tile_view(&self.world);
        self.progression
            .handle(&events, controls.keys, &view, &mut commands);
        let progression_start = events.len();
        self.flush(&mut commands, &mut events);

        self.carried = events[progression_start..].to_vec();
        self.frame_events = events.split_off(frame_start);
        &self.frame_events
    }

    fn flush(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            trace!("applying {command:?}");
            world::apply(&mut self.world, command, events);
        }
    }

    /// Read-only view of the current grid.
    #[must_use]
    pub fn tile_view(&self) -> TileView {
        query::tile_view(&self.world)
    }

    /// Progression state: current level, goal text and persisted record.
    #[must_use]
    pub const fn progression(&self) -> &Progression {
        &self.progression
    }

    /// Banner adapters may display when the experience boots.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }
}
