#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Lands engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! [`TileView`] snapshots, and respond exclusively with new command batches.

mod projection;

use std::{collections::BTreeSet, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use projection::IsoProjection;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tile Lands.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the pixel footprint of a single tile sprite.
    ///
    /// Cached screen anchors are recomputed for every tile of the current grid.
    ConfigureTileFootprint {
        /// Width of the tile sprite in pixels.
        sprite_width: f32,
        /// Height of the tile sprite in pixels. The projected tile height is half of it.
        sprite_height: f32,
    },
    /// Advances the frame clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Replaces the grid with the authored layout of the requested level.
    LoadLevel {
        /// Level whose layout should be loaded.
        level: LevelId,
    },
    /// Clears the grid and reloads the authored layout of the current level.
    ResetLevel,
    /// Sets every cell of the current grid to [`TileKind::Empty`].
    ClearLevel,
    /// Marks the provided cell as hovered, clearing any previous hover.
    HoverTile {
        /// Cell under the pointer, or `None` when the pointer is off the grid.
        cell: Option<GridCoord>,
    },
    /// Marks the provided cell as grabbed, clearing any previous grab.
    GrabTile {
        /// Cell picked up by the pointer, or `None` to release the grab.
        cell: Option<GridCoord>,
    },
    /// Requests that a grabbed tile be merged into the tile it was dropped on.
    MergeTiles {
        /// Cell that was dragged by the player.
        grabbed: GridCoord,
        /// Cell the dragged tile was dropped onto.
        target: GridCoord,
    },
    /// Requests that the 2×2 tree block anchored at `origin` become a forest.
    FormForest {
        /// Upper-left cell of the block; the block spans `origin..=origin + (1, 1)`.
        origin: GridCoord,
    },
    /// Confirms completion of the provided level and clears the grid.
    CompleteLevel {
        /// Level that the player completed.
        level: LevelId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the frame clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a freshly allocated grid holds the layout of a level.
    LevelLoaded {
        /// Level whose layout was loaded.
        level: LevelId,
        /// Dimensions of the newly allocated grid.
        dimensions: GridDimensions,
    },
    /// Announces that every cell of the current grid was emptied.
    LevelCleared,
    /// Announces that the current level was restored to its authored layout.
    LevelReset {
        /// Level that was reset.
        level: LevelId,
    },
    /// Confirms that two tiles merged into a higher tier.
    TilesMerged {
        /// Kind carried by the promoted tile after the merge.
        result: TileKind,
        /// Cell that received the promotion.
        promoted: GridCoord,
        /// Cell that was emptied by the merge.
        emptied: GridCoord,
    },
    /// Confirms that a 2×2 block of trees collapsed into a forest.
    ForestFormed {
        /// Upper-left cell of the converted block.
        origin: GridCoord,
        /// Bottom-right cell that carries the forest decoration.
        anchor: GridCoord,
    },
    /// Confirms that the player completed a level.
    LevelCompleted {
        /// Level that was completed.
        level: LevelId,
    },
}

/// Category of a tile.
///
/// `Grass < Bush < Tree` is the merge ladder. `Forest` is a terminal composite
/// produced only by 2×2 tree blocks and never takes part in merges.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TileKind {
    /// Unoccupied cell.
    #[default]
    Empty,
    /// Lowest mergeable tier.
    Grass,
    /// Produced by merging two grass tiles.
    Bush,
    /// Produced by merging two bushes. Top of the merge ladder.
    Tree,
    /// Composite spanning a 2×2 block of former trees.
    Forest,
}

impl TileKind {
    /// Kind produced when two tiles of this kind merge, if any.
    #[must_use]
    pub const fn promoted(self) -> Option<TileKind> {
        match self {
            Self::Grass => Some(Self::Bush),
            Self::Bush => Some(Self::Tree),
            Self::Empty | Self::Tree | Self::Forest => None,
        }
    }

    /// Lowercase name used in goal text.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Grass => "grass",
            Self::Bush => "bush",
            Self::Tree => "tree",
            Self::Forest => "forest",
        }
    }
}

/// Integer address of a grid cell.
///
/// `x` is the first (outer) index and `y` the second.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridCoord {
    x: u32,
    y: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// First grid index.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Second grid index.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Reports whether the cells are distinct and at most one cell apart.
    ///
    /// Diagonal neighbours lie √2 apart and are therefore excluded.
    #[must_use]
    pub fn is_adjacent(self, other: GridCoord) -> bool {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dy = u64::from(self.y.abs_diff(other.y));
        dx * dx + dy * dy == 1
    }

    /// Returns the cell offset by the provided deltas, if it stays non-negative.
    #[must_use]
    pub fn offset(self, dx: u32, dy: u32) -> Option<GridCoord> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }
}

/// Dimensions of a rectangular grid measured in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    width: u32,
    height: u32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of cells along the `x` axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cells along the `y` axis.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: GridCoord) -> bool {
        cell.x() < self.width && cell.y() < self.height
    }

    /// Row-major index of the cell (outer `x`, inner `y`).
    #[must_use]
    pub fn index(&self, cell: GridCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let x = usize::try_from(cell.x()).ok()?;
        let y = usize::try_from(cell.y()).ok()?;
        let height = usize::try_from(self.height).ok()?;
        Some(x * height + y)
    }

    /// Iterates over every cell in row-major order (outer `x`, inner `y`).
    pub fn cells(self) -> impl Iterator<Item = GridCoord> {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| GridCoord::new(x, y)))
    }
}

/// Raw result of inverting the isometric projection.
///
/// Negative components are clamped to the `-1` sentinel meaning "no tile".
/// Convert to a [`GridCoord`] through [`MapPoint::within`] only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapPoint {
    /// First grid index or `-1`.
    pub x: i32,
    /// Second grid index or `-1`.
    pub y: i32,
}

impl MapPoint {
    /// Sentinel component value reported for points left of or above the grid.
    pub const NONE: i32 = -1;

    /// Creates a new map point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Resolves the point into a cell of a grid with the provided dimensions.
    ///
    /// Returns `None` for sentinel components and for points past the grid edge.
    #[must_use]
    pub fn within(self, dimensions: GridDimensions) -> Option<GridCoord> {
        let x = u32::try_from(self.x).ok()?;
        let y = u32::try_from(self.y).ok()?;
        let cell = GridCoord::new(x, y);
        dimensions.contains(cell).then_some(cell)
    }
}

/// Ordered sequence of levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LevelId {
    /// Two-by-two introduction.
    Level1,
    /// Three-by-three field of grass.
    Level2,
    /// Five-by-five meadow.
    Level3,
    /// Narrow five-by-two strip.
    Level4,
    /// Scattered four-by-seven field.
    Level5,
    /// Open field where the first forest must be grown.
    Grove,
    /// Terminal free-play level scored by tile kinds.
    Endless,
}

impl LevelId {
    /// Every level in play order.
    pub const ALL: [LevelId; 7] = [
        LevelId::Level1,
        LevelId::Level2,
        LevelId::Level3,
        LevelId::Level4,
        LevelId::Level5,
        LevelId::Grove,
        LevelId::Endless,
    ];

    /// Zero-based position of the level in play order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Level1 => 0,
            Self::Level2 => 1,
            Self::Level3 => 2,
            Self::Level4 => 3,
            Self::Level5 => 4,
            Self::Grove => 5,
            Self::Endless => 6,
        }
    }

    /// Looks up the level at the provided play-order position.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Level that follows this one. The endless level follows itself.
    #[must_use]
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1).unwrap_or(self)
    }

    /// Level that precedes this one. The first level precedes itself.
    #[must_use]
    pub fn previous(self) -> Self {
        self.index()
            .checked_sub(1)
            .and_then(Self::from_index)
            .unwrap_or(self)
    }

    /// Reports whether the level is the terminal free-play level.
    #[must_use]
    pub const fn is_endless(self) -> bool {
        matches!(self, Self::Endless)
    }

    /// Human-readable title shown by adapters.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Level1 => "Level 1",
            Self::Level2 => "Level 2",
            Self::Level3 => "Level 3",
            Self::Level4 => "Level 4",
            Self::Level5 => "Level 5",
            Self::Grove => "Grove",
            Self::Endless => "Endless",
        }
    }
}

/// Immutable representation of a single tile used for queries and rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSnapshot {
    /// Cell occupied by the tile.
    pub position: GridCoord,
    /// Cached screen position of the tile sprite's top-left corner.
    ///
    /// Picking is exact at [`IsoProjection::pick_point`], the centre of the top
    /// face, not at this anchor.
    pub screen_anchor: Vec2,
    /// Current kind of the tile.
    pub kind: TileKind,
    /// Whether the pointer hovers the tile this frame.
    pub hovered: bool,
    /// Whether the tile is currently grabbed.
    pub grabbed: bool,
    /// Offset applied to the composite forest sprite; zero on every other tile.
    pub decoration_offset: Vec2,
}

/// Read-only snapshot describing every tile of the current grid.
#[derive(Clone, Debug, Default)]
pub struct TileView {
    level: Option<LevelId>,
    dimensions: GridDimensions,
    projection: IsoProjection,
    snapshots: Vec<TileSnapshot>,
}

impl TileView {
    /// Creates a new tile view from snapshots laid out in row-major order.
    #[must_use]
    pub fn from_snapshots(
        level: Option<LevelId>,
        dimensions: GridDimensions,
        projection: IsoProjection,
        snapshots: Vec<TileSnapshot>,
    ) -> Self {
        debug_assert_eq!(snapshots.len(), dimensions.cell_count());
        Self {
            level,
            dimensions,
            projection,
            snapshots,
        }
    }

    /// Level whose layout the grid was last loaded from.
    #[must_use]
    pub const fn level(&self) -> Option<LevelId> {
        self.level
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Projection used to place the grid on screen.
    #[must_use]
    pub const fn projection(&self) -> &IsoProjection {
        &self.projection
    }

    /// Snapshot of the tile at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, cell: GridCoord) -> Option<&TileSnapshot> {
        self.dimensions
            .index(cell)
            .and_then(|index| self.snapshots.get(index))
    }

    /// Kind of the tile at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn kind(&self, cell: GridCoord) -> Option<TileKind> {
        self.tile(cell).map(|tile| tile.kind)
    }

    /// Number of tiles of the provided kind.
    #[must_use]
    pub fn count(&self, kind: TileKind) -> u32 {
        self.snapshots.iter().filter(|tile| tile.kind == kind).count() as u32
    }

    /// Resolves a screen position into the cell beneath it, if any.
    #[must_use]
    pub fn cell_at(&self, screen: Vec2) -> Option<GridCoord> {
        self.projection
            .screen_to_map(screen)
            .within(self.dimensions)
    }

    /// Iterator over the captured tile snapshots in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
        self.snapshots.iter()
    }
}

/// Persistent score record owned by adapters.
///
/// The engine only reads the record at startup and reports completions; it
/// never performs I/O itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Levels completed in any session.
    #[serde(default)]
    pub completed: BTreeSet<LevelId>,
    /// Whether the endless level has been reached.
    #[serde(default)]
    pub endless_unlocked: bool,
    /// Highest endless score observed.
    #[serde(default)]
    pub best_score: u32,
}

impl ProgressRecord {
    /// Records the completion of a level, unlocking the endless level when it follows.
    pub fn mark_completed(&mut self, level: LevelId) {
        let _ = self.completed.insert(level);
        if level.next().is_endless() {
            self.endless_unlocked = true;
        }
    }

    /// Raises the best endless score when the provided score exceeds it.
    pub fn offer_score(&mut self, score: u32) {
        self.best_score = self.best_score.max(score);
    }

    /// Reports whether the level was completed.
    #[must_use]
    pub fn is_completed(&self, level: LevelId) -> bool {
        self.completed.contains(&level)
    }
}
