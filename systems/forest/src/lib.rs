#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure cluster detection system that turns 2×2 tree blocks into forests.

use tile_lands_core::{Command, GridCoord, TileKind, TileView};

/// Number of trees a single forest consumes.
pub const TREES_PER_FOREST: u32 = 4;

/// Stateless system scanning the grid for the first complete 2×2 tree block.
#[derive(Debug, Default)]
pub struct ForestDetector;

impl ForestDetector {
    /// Creates a new forest detector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Scans the view and emits at most one forest formation command.
    ///
    /// The scan is skipped while fewer than [`TREES_PER_FOREST`] trees exist.
    /// Cells are visited in row-major order (outer `x`, inner `y`) and the
    /// search stops at the first block whose four cells are all trees.
    pub fn handle(&self, view: &TileView, out: &mut Vec<Command>) {
        if view.count(TileKind::Tree) < TREES_PER_FOREST {
            return;
        }

        let dimensions = view.dimensions();
        let last_x = dimensions.width().saturating_sub(1);
        let last_y = dimensions.height().saturating_sub(1);
        let is_tree = |x: u32, y: u32| view.kind(GridCoord::new(x, y)) == Some(TileKind::Tree);

        for x in 0..last_x {
            for y in 0..last_y {
                if is_tree(x, y) && is_tree(x, y + 1) && is_tree(x + 1, y) && is_tree(x + 1, y + 1)
                {
                    out.push(Command::FormForest {
                        origin: GridCoord::new(x, y),
                    });
                    return;
                }
            }
        }
    }
}
