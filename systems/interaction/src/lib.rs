#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure pointer interaction system translating hover, grab and drop into world commands.

use glam::Vec2;
use log::debug;
use tile_lands_core::{Command, Event, GridCoord, TileView};

/// Pointer snapshot captured by the adapter once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInput {
    /// Cursor position in screen pixels, or `None` when the cursor left the window.
    pub position: Option<Vec2>,
    /// Whether the primary button is held this frame.
    pub primary_down: bool,
}

impl PointerInput {
    /// Creates a pointer snapshot with explicit field values.
    #[must_use]
    pub const fn new(position: Option<Vec2>, primary_down: bool) -> Self {
        Self {
            position,
            primary_down,
        }
    }
}

/// Interaction system tracking the hovered and grabbed cells.
///
/// Both slots are non-owning cell addresses; the tiles themselves live in the
/// world and only change through the commands emitted here.
#[derive(Debug, Default)]
pub struct Interaction {
    hovered: Option<GridCoord>,
    grabbed: Option<GridCoord>,
}

impl Interaction {
    /// Creates an interaction system with nothing hovered or grabbed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hovered: None,
            grabbed: None,
        }
    }

    /// Cell under the pointer on the latest frame.
    #[must_use]
    pub const fn hovered(&self) -> Option<GridCoord> {
        self.hovered
    }

    /// Cell picked up by the pointer, if a drag is in progress.
    #[must_use]
    pub const fn grabbed(&self) -> Option<GridCoord> {
        self.grabbed
    }

    /// Consumes world events and the pointer snapshot to emit interaction commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        pointer: PointerInput,
        view: &TileView,
        out: &mut Vec<Command>,
    ) {
        if events.iter().any(replaces_grid) {
            self.hovered = None;
            self.grabbed = None;
        }

        self.hovered = pointer.position.and_then(|position| view.cell_at(position));
        out.push(Command::HoverTile { cell: self.hovered });

        if pointer.primary_down {
            if let (Some(cell), None) = (self.hovered, self.grabbed) {
                debug!("grabbed tile at {cell:?}");
                self.grabbed = Some(cell);
                out.push(Command::GrabTile { cell: Some(cell) });
            }
            return;
        }

        let Some(grabbed) = self.grabbed.take() else {
            return;
        };
        if let Some(target) = self.hovered {
            if target != grabbed && grabbed.is_adjacent(target) {
                out.push(Command::MergeTiles { grabbed, target });
            }
        }
        out.push(Command::GrabTile { cell: None });
    }
}

fn replaces_grid(event: &Event) -> bool {
    matches!(
        event,
        Event::LevelLoaded { .. }
            | Event::LevelCleared
            | Event::LevelReset { .. }
            | Event::LevelCompleted { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_lands_core::{GridDimensions, IsoProjection, LevelId};

    #[test]
    fn grid_replacement_drops_the_grab() {
        let mut interaction = Interaction {
            hovered: Some(GridCoord::new(1, 0)),
            grabbed: Some(GridCoord::new(1, 0)),
        };
        let view = TileView::from_snapshots(
            None,
            GridDimensions::new(0, 0),
            IsoProjection::default(),
            Vec::new(),
        );
        let mut commands = Vec::new();
        interaction.handle(
            &[Event::LevelLoaded {
                level: LevelId::Level2,
                dimensions: GridDimensions::new(3, 3),
            }],
            PointerInput::new(None, false),
            &view,
            &mut commands,
        );

        assert_eq!(commands, vec![Command::HoverTile { cell: None }]);
        assert_eq!(interaction.grabbed(), None);
    }
}
