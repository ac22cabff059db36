//! Static level library: dimensions, screen offset and initial layout per level.

use glam::Vec2;
use tile_lands_core::{GridCoord, GridDimensions, LevelId, TileKind};

/// Initial tile kinds of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// One string per `x` column; each character describes the cell at that `y`.
    ///
    /// Glyphs: `.` empty, `g` grass, `b` bush, `t` tree, `f` forest.
    Authored(&'static [&'static str]),
    /// Every cell starts with the same kind.
    Uniform(TileKind),
}

/// Read-only description of a level's grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelSpec {
    dimensions: GridDimensions,
    offset: Vec2,
    layout: Layout,
}

impl LevelSpec {
    const fn new(width: u32, height: u32, offset: Vec2, layout: Layout) -> Self {
        Self {
            dimensions: GridDimensions::new(width, height),
            offset,
            layout,
        }
    }

    /// Dimensions of the level's grid.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Screen offset of the grid expressed in tile units.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Authored layout of the level.
    #[must_use]
    pub const fn layout(&self) -> Layout {
        self.layout
    }

    /// Initial kind of the provided cell.
    ///
    /// # Panics
    ///
    /// Panics when the authored layout does not cover the cell or contains an
    /// unknown glyph. The library is a closed table, so either case is a
    /// programming error.
    #[must_use]
    pub fn kind_at(&self, cell: GridCoord) -> TileKind {
        match self.layout {
            Layout::Uniform(kind) => kind,
            Layout::Authored(columns) => {
                let glyph = columns
                    .get(cell.x() as usize)
                    .and_then(|column| column.as_bytes().get(cell.y() as usize));
                match glyph {
                    Some(b'.') => TileKind::Empty,
                    Some(b'g') => TileKind::Grass,
                    Some(b'b') => TileKind::Bush,
                    Some(b't') => TileKind::Tree,
                    Some(b'f') => TileKind::Forest,
                    Some(other) => panic!("unknown layout glyph {:?} at {cell:?}", *other as char),
                    None => panic!("layout does not cover {cell:?}"),
                }
            }
        }
    }
}

const LEVEL_1: LevelSpec =
    LevelSpec::new(2, 2, Vec2::new(4.5, 4.0), Layout::Authored(&["bg", ".g"]));

const LEVEL_2: LevelSpec =
    LevelSpec::new(3, 3, Vec2::new(4.5, 4.0), Layout::Uniform(TileKind::Grass));

const LEVEL_3: LevelSpec = LevelSpec::new(
    5,
    5,
    Vec2::new(4.5, 3.0),
    Layout::Authored(&[".ggg.", ".gggg", "ggggg", "gggg.", ".ggg."]),
);

const LEVEL_4: LevelSpec = LevelSpec::new(
    5,
    2,
    Vec2::new(3.75, 3.0),
    Layout::Authored(&[".g", "gg", "tb", "gg", ".g"]),
);

const LEVEL_5: LevelSpec = LevelSpec::new(
    4,
    7,
    Vec2::new(5.0, 3.0),
    Layout::Authored(&["....bbg", "bb...gg", "gt....b", "g......"]),
);

const GROVE: LevelSpec =
    LevelSpec::new(4, 5, Vec2::new(4.5, 3.0), Layout::Uniform(TileKind::Grass));

const ENDLESS: LevelSpec =
    LevelSpec::new(10, 10, Vec2::new(4.5, 0.1), Layout::Uniform(TileKind::Grass));

/// Looks up the static description of a level.
#[must_use]
pub fn level_spec(level: LevelId) -> &'static LevelSpec {
    match level {
        LevelId::Level1 => &LEVEL_1,
        LevelId::Level2 => &LEVEL_2,
        LevelId::Level3 => &LEVEL_3,
        LevelId::Level4 => &LEVEL_4,
        LevelId::Level5 => &LEVEL_5,
        LevelId::Grove => &GROVE,
        LevelId::Endless => &ENDLESS,
    }
}
