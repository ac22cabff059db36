//! Static goal table evaluated against the live tile counts.

use std::fmt::Write as _;

use tile_lands_core::{LevelId, TileKind, TileView};

/// Number of cells covered by a single forest.
pub const CELLS_PER_FOREST: u32 = 4;

const TREE_POINTS: u32 = 25;
const BUSH_POINTS: u32 = 10;
const FOREST_CELL_POINTS: u32 = 50;

/// Single minimum the grid must reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// At least `target` tiles of `kind`.
    Tiles {
        /// Kind being counted.
        kind: TileKind,
        /// Minimum number of tiles.
        target: u32,
    },
    /// At least `target` complete forests, each spanning [`CELLS_PER_FOREST`] cells.
    Forests {
        /// Minimum number of forests.
        target: u32,
    },
}

impl Requirement {
    /// Current progress towards the requirement.
    #[must_use]
    pub fn progress(&self, view: &TileView) -> u32 {
        match *self {
            Self::Tiles { kind, .. } => view.count(kind),
            Self::Forests { .. } => view.count(TileKind::Forest) / CELLS_PER_FOREST,
        }
    }

    /// Minimum the progress must reach.
    #[must_use]
    pub const fn target(&self) -> u32 {
        match *self {
            Self::Tiles { target, .. } | Self::Forests { target } => target,
        }
    }

    /// Name of the counted tiles as shown in goal text.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match *self {
            Self::Tiles { kind, .. } => kind.label(),
            Self::Forests { .. } => TileKind::Forest.label(),
        }
    }

    /// Reports whether the grid satisfies the requirement.
    #[must_use]
    pub fn is_met(&self, view: &TileView) -> bool {
        self.progress(view) >= self.target()
    }
}

/// Goal attached to a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Goal {
    /// Every requirement must hold at the same time.
    Targets(&'static [Requirement]),
    /// Free play scored by [`endless_score`]; never completes.
    Score,
}

impl Goal {
    /// Reports whether every requirement of the goal holds.
    #[must_use]
    pub fn is_met(&self, view: &TileView) -> bool {
        match self {
            Self::Targets(requirements) => {
                requirements.iter().all(|requirement| requirement.is_met(view))
            }
            Self::Score => false,
        }
    }

    /// Human-readable progress, one line per requirement.
    #[must_use]
    pub fn describe(&self, view: &TileView) -> String {
        let mut text = String::new();
        match self {
            Self::Targets(requirements) => {
                for requirement in *requirements {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    let _ = write!(
                        text,
                        "{} / {} {}",
                        requirement.progress(view),
                        requirement.target(),
                        requirement.label()
                    );
                }
            }
            Self::Score => {
                let _ = write!(text, "Score: {}", endless_score(view));
            }
        }
        text
    }
}

const fn tiles(kind: TileKind, target: u32) -> Requirement {
    Requirement::Tiles { kind, target }
}

const LEVEL_1: &[Requirement] = &[tiles(TileKind::Tree, 1)];
const LEVEL_2: &[Requirement] = &[tiles(TileKind::Tree, 2)];
const LEVEL_3: &[Requirement] = &[tiles(TileKind::Tree, 3)];
const LEVEL_4: &[Requirement] = &[tiles(TileKind::Tree, 2), tiles(TileKind::Bush, 1)];
const LEVEL_5: &[Requirement] = &[tiles(TileKind::Tree, 4)];
const GROVE: &[Requirement] = &[Requirement::Forests { target: 1 }, tiles(TileKind::Bush, 2)];

/// Looks up the goal of a level.
#[must_use]
pub const fn goal_for(level: LevelId) -> Goal {
    match level {
        LevelId::Level1 => Goal::Targets(LEVEL_1),
        LevelId::Level2 => Goal::Targets(LEVEL_2),
        LevelId::Level3 => Goal::Targets(LEVEL_3),
        LevelId::Level4 => Goal::Targets(LEVEL_4),
        LevelId::Level5 => Goal::Targets(LEVEL_5),
        LevelId::Grove => Goal::Targets(GROVE),
        LevelId::Endless => Goal::Score,
    }
}

/// Weighted sum of tile counts used as the endless level's score.
///
/// Forest cells are counted individually so converting four trees never
/// lowers the score.
#[must_use]
pub fn endless_score(view: &TileView) -> u32 {
    view.count(TileKind::Tree) * TREE_POINTS
        + view.count(TileKind::Bush) * BUSH_POINTS
        + view.count(TileKind::Forest) * FOREST_CELL_POINTS
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use tile_lands_core::{GridDimensions, IsoProjection, TileSnapshot};

    fn view_of(kinds: &[TileKind]) -> TileView {
        let dimensions = GridDimensions::new(kinds.len() as u32, 1);
        let snapshots = dimensions
            .cells()
            .zip(kinds)
            .map(|(position, kind)| TileSnapshot {
                position,
                screen_anchor: Vec2::ZERO,
                kind: *kind,
                hovered: false,
                grabbed: false,
                decoration_offset: Vec2::ZERO,
            })
            .collect();
        TileView::from_snapshots(None, dimensions, IsoProjection::default(), snapshots)
    }

    #[test]
    fn goal_text_lists_each_requirement() {
        let view = view_of(&[TileKind::Tree, TileKind::Bush, TileKind::Grass]);
        assert_eq!(
            goal_for(LevelId::Level4).describe(&view),
            "1 / 2 tree\n1 / 1 bush"
        );
        assert!(!goal_for(LevelId::Level4).is_met(&view));
    }

    #[test]
    fn forests_are_counted_per_block() {
        let mut kinds = vec![TileKind::Forest; 4];
        kinds.extend([TileKind::Bush, TileKind::Bush]);
        let view = view_of(&kinds);
        assert_eq!(goal_for(LevelId::Grove).describe(&view), "1 / 1 forest\n2 / 2 bush");
        assert!(goal_for(LevelId::Grove).is_met(&view));

        let partial = view_of(&[TileKind::Forest; 3]);
        assert_eq!(Requirement::Forests { target: 1 }.progress(&partial), 0);
    }

    #[test]
    fn endless_goal_reports_score_and_never_completes() {
        let view = view_of(&[TileKind::Tree, TileKind::Bush, TileKind::Forest, TileKind::Grass]);
        assert_eq!(endless_score(&view), 25 + 10 + 50);
        assert_eq!(goal_for(LevelId::Endless).describe(&view), "Score: 85");
        assert!(!goal_for(LevelId::Endless).is_met(&view));
    }

    #[test]
    fn every_promotion_raises_the_endless_score() {
        let grass = view_of(&[TileKind::Grass, TileKind::Grass]);
        let bush = view_of(&[TileKind::Empty, TileKind::Bush]);
        let bushes = view_of(&[TileKind::Bush, TileKind::Bush]);
        let tree = view_of(&[TileKind::Empty, TileKind::Tree]);
        let trees = view_of(&[TileKind::Tree; 4]);
        let forest = view_of(&[TileKind::Forest; 4]);

        assert!(endless_score(&bush) > endless_score(&grass));
        assert!(endless_score(&tree) > endless_score(&bushes));
        assert!(endless_score(&forest) > endless_score(&trees));
    }
}
