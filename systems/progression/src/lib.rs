#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level progression system: goal evaluation, confirmation, reset and debug navigation.

pub mod goals;

use log::{debug, info};
use tile_lands_core::{Command, Event, LevelId, ProgressRecord, TileView};

use self::goals::{endless_score, goal_for};

/// Keyboard state relevant to progression, captured once per frame.
///
/// Fields describe whether a key is held; the system derives fresh presses
/// by comparing against the previous frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressionKeys {
    /// Confirms a completed level and advances to the next one.
    pub confirm: bool,
    /// Restores the current level's authored layout.
    pub reset: bool,
    /// Skips to the next level when debug navigation is enabled.
    pub skip_forward: bool,
    /// Returns to the previous level when debug navigation is enabled.
    pub skip_backward: bool,
}

impl ProgressionKeys {
    fn pressed_since(self, previous: Self) -> Self {
        Self {
            confirm: self.confirm && !previous.confirm,
            reset: self.reset && !previous.reset,
            skip_forward: self.skip_forward && !previous.skip_forward,
            skip_backward: self.skip_backward && !previous.skip_backward,
        }
    }
}

/// Configuration parameters required to construct the progression system.
#[derive(Clone, Debug, Default)]
pub struct Config {
    record: ProgressRecord,
    debug_navigation: bool,
}

impl Config {
    /// Creates a configuration from a previously persisted record.
    #[must_use]
    pub fn new(record: ProgressRecord, debug_navigation: bool) -> Self {
        Self {
            record,
            debug_navigation,
        }
    }
}

/// Pure system that drives level loading and completion.
#[derive(Debug)]
pub struct Progression {
    current: LevelId,
    complete: bool,
    pending_load: bool,
    goal_text: String,
    record: ProgressRecord,
    debug_navigation: bool,
    previous_keys: ProgressionKeys,
}

impl Progression {
    /// Creates a progression system that loads the first level on its first frame.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            current: LevelId::Level1,
            complete: false,
            pending_load: true,
            goal_text: String::new(),
            record: config.record,
            debug_navigation: config.debug_navigation,
            previous_keys: ProgressionKeys::default(),
        }
    }

    /// Level currently being played.
    #[must_use]
    pub const fn current_level(&self) -> LevelId {
        self.current
    }

    /// Whether every goal of the current level holds.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Progress text for the current level's goal.
    #[must_use]
    pub fn goal_text(&self) -> &str {
        &self.goal_text
    }

    /// Persisted record, updated with every confirmed completion.
    #[must_use]
    pub const fn record(&self) -> &ProgressRecord {
        &self.record
    }

    /// Number of distinct levels completed so far.
    #[must_use]
    pub fn levels_completed(&self) -> usize {
        self.record.completed.len()
    }

    /// Consumes world events, key state and the tile view to emit progression commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        keys: ProgressionKeys,
        view: &TileView,
        out: &mut Vec<Command>,
    ) {
        let pressed = keys.pressed_since(self.previous_keys);
        self.previous_keys = keys;

        for event in events {
            match event {
                Event::LevelReset { .. } | Event::LevelCleared => self.complete = false,
                Event::ForestFormed { anchor, .. } => debug!("forest grown at {anchor:?}"),
                _ => {}
            }
        }

        if self.pending_load {
            self.pending_load = false;
            self.complete = false;
            self.goal_text.clear();
            out.push(Command::LoadLevel {
                level: self.current,
            });
            return;
        }

        if pressed.reset {
            out.push(Command::ResetLevel);
            return;
        }

        if self.debug_navigation {
            let target = if pressed.skip_forward {
                Some(self.current.next())
            } else if pressed.skip_backward {
                Some(self.current.previous())
            } else {
                None
            };
            if let Some(target) = target.filter(|target| *target != self.current) {
                debug!("skipping from {:?} to {target:?}", self.current);
                out.push(Command::ClearLevel);
                self.current = target;
                self.pending_load = true;
                return;
            }
        }

        if view.level() != Some(self.current) {
            return;
        }

        if !self.complete {
            let goal = goal_for(self.current);
            self.goal_text = goal.describe(view);
            self.complete = goal.is_met(view);
            if self.complete {
                info!("goals of {} reached", self.current.title());
            }
            if self.current.is_endless() {
                self.record.offer_score(endless_score(view));
            }
        }

        if self.complete && pressed.confirm {
            out.push(Command::CompleteLevel {
                level: self.current,
            });
            self.record.mark_completed(self.current);
            self.current = self.current.next();
            self.complete = false;
            self.pending_load = true;
        }
    }

    /// Current endless score, or `None` outside the endless level.
    #[must_use]
    pub fn endless_score(&self, view: &TileView) -> Option<u32> {
        (self.current.is_endless() && view.level() == Some(self.current))
            .then(|| endless_score(view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presses_are_edge_triggered() {
        let held = ProgressionKeys {
            confirm: true,
            reset: true,
            ..ProgressionKeys::default()
        };
        let fresh = held.pressed_since(ProgressionKeys::default());
        assert!(fresh.confirm && fresh.reset);

        let repeated = held.pressed_since(held);
        assert_eq!(repeated, ProgressionKeys::default());
    }

    #[test]
    fn first_frame_requests_the_first_level() {
        let mut progression = Progression::new(Config::default());
        let mut commands = Vec::new();
        progression.handle(
            &[],
            ProgressionKeys::default(),
            &TileView::default(),
            &mut commands,
        );
        assert_eq!(
            commands,
            vec![Command::LoadLevel {
                level: LevelId::Level1
            }]
        );

        commands.clear();
        progression.handle(
            &[],
            ProgressionKeys::default(),
            &TileView::default(),
            &mut commands,
        );
        assert!(commands.is_empty(), "the load is requested once");
    }
}
