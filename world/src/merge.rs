//! Merge rule deciding whether two adjacent tiles combine.

use tile_lands_core::TileKind;

/// Result of a successful merge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Kind assigned to the drop target.
    pub target: TileKind,
    /// Kind assigned to the dragged tile.
    pub grabbed: TileKind,
}

/// Decides the outcome of dropping a `grabbed` tile onto a `target` tile.
///
/// Tiles of the same non-terminal kind combine: the target is promoted to the
/// next tier and the grabbed tile becomes empty. Mismatched, empty and terminal
/// kinds yield `None`, which is a silent rejection rather than an error.
#[must_use]
pub fn resolve(grabbed: TileKind, target: TileKind) -> Option<MergeOutcome> {
    if grabbed != target {
        return None;
    }

    grabbed.promoted().map(|promoted| MergeOutcome {
        target: promoted,
        grabbed: TileKind::Empty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grass_pair_yields_bush_and_empty() {
        assert_eq!(
            resolve(TileKind::Grass, TileKind::Grass),
            Some(MergeOutcome {
                target: TileKind::Bush,
                grabbed: TileKind::Empty,
            })
        );
    }

    #[test]
    fn bush_pair_yields_tree() {
        let outcome = resolve(TileKind::Bush, TileKind::Bush).expect("bushes merge");
        assert_eq!(outcome.target, TileKind::Tree);
    }

    #[test]
    fn terminal_and_mismatched_kinds_are_rejected() {
        assert_eq!(resolve(TileKind::Tree, TileKind::Tree), None);
        assert_eq!(resolve(TileKind::Forest, TileKind::Forest), None);
        assert_eq!(resolve(TileKind::Empty, TileKind::Empty), None);
        assert_eq!(resolve(TileKind::Grass, TileKind::Bush), None);
        assert_eq!(resolve(TileKind::Grass, TileKind::Empty), None);
    }
}
