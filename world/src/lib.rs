#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tile Lands.

pub mod levels;
pub mod merge;

use glam::Vec2;
use log::{debug, info, warn};
use tile_lands_core::{
    Command, Event, GridCoord, GridDimensions, IsoProjection, LevelId, TileKind, TileSnapshot,
    WELCOME_BANNER,
};

use self::levels::LevelSpec;

/// Offset of the composite forest sprite relative to its anchor tile.
pub const FOREST_DECORATION_OFFSET: Vec2 = Vec2::new(-40.0, -200.0);

/// Represents the authoritative Tile Lands world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    projection: IsoProjection,
    level: Option<LevelId>,
    grid: Grid,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a world with an empty grid. No level is loaded until requested.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            projection: IsoProjection::default(),
            level: None,
            grid: Grid::empty(),
        }
    }

    fn load(&mut self, level: LevelId) {
        let spec = levels::level_spec(level);
        self.projection = self.projection.with_offset(spec.offset());
        self.grid = Grid::from_spec(spec, &self.projection);
        self.level = Some(level);
        info!(
            "loaded {} ({}x{})",
            level.title(),
            spec.dimensions().width(),
            spec.dimensions().height()
        );
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTileFootprint {
            sprite_width,
            sprite_height,
        } => {
            if sprite_width <= 0.0 || sprite_height <= 0.0 {
                warn!("ignoring degenerate tile footprint {sprite_width}x{sprite_height}");
                return;
            }
            world.projection =
                IsoProjection::new(sprite_width, sprite_height, world.projection.offset());
            world.grid.reanchor(&world.projection);
        }
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::LoadLevel { level } => {
            world.load(level);
            out_events.push(Event::LevelLoaded {
                level,
                dimensions: world.grid.dimensions,
            });
        }
        Command::ResetLevel => {
            let Some(level) = world.level else {
                return;
            };
            world.grid.clear(&world.projection);
            world.load(level);
            out_events.push(Event::LevelReset { level });
        }
        Command::ClearLevel => {
            world.grid.clear(&world.projection);
            out_events.push(Event::LevelCleared);
        }
        Command::HoverTile { cell } => world.grid.set_hovered(cell),
        Command::GrabTile { cell } => world.grid.set_grabbed(cell),
        Command::MergeTiles { grabbed, target } => {
            if let Some(result) = world.grid.merge(grabbed, target) {
                debug!("merged {grabbed:?} into {target:?} producing {result:?}");
                out_events.push(Event::TilesMerged {
                    result,
                    promoted: target,
                    emptied: grabbed,
                });
            }
        }
        Command::FormForest { origin } => {
            if let Some(anchor) = world.grid.form_forest(origin) {
                debug!("forest formed at {origin:?}");
                out_events.push(Event::ForestFormed { origin, anchor });
            }
        }
        Command::CompleteLevel { level } => {
            if world.level != Some(level) {
                warn!("ignoring completion of {level:?}; {:?} is loaded", world.level);
                return;
            }
            world.grid.clear(&world.projection);
            info!("completed {}", level.title());
            out_events.push(Event::LevelCompleted { level });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tile_lands_core::{GridDimensions, IsoProjection, LevelId, TileKind, TileView};

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Level whose layout the grid was last loaded from.
    #[must_use]
    pub fn level(world: &World) -> Option<LevelId> {
        world.level
    }

    /// Dimensions of the current grid.
    #[must_use]
    pub fn dimensions(world: &World) -> GridDimensions {
        world.grid.dimensions
    }

    /// Projection used to place the current grid on screen.
    #[must_use]
    pub fn projection(world: &World) -> IsoProjection {
        world.projection
    }

    /// Number of tiles of the provided kind in the current grid.
    #[must_use]
    pub fn count(world: &World, kind: TileKind) -> u32 {
        world
            .grid
            .tiles
            .iter()
            .filter(|tile| tile.kind == kind)
            .count() as u32
    }

    /// Captures a read-only view of every tile in the current grid.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView {
        TileView::from_snapshots(
            world.level,
            world.grid.dimensions,
            world.projection,
            world.grid.snapshots(),
        )
    }
}

#[derive(Clone, Debug)]
struct Tile {
    position: GridCoord,
    screen_anchor: Vec2,
    kind: TileKind,
    hovered: bool,
    grabbed: bool,
    decoration_offset: Vec2,
}

impl Tile {
    fn new(position: GridCoord, kind: TileKind, projection: &IsoProjection) -> Self {
        Self {
            position,
            screen_anchor: projection.map_to_screen(position),
            kind,
            hovered: false,
            grabbed: false,
            decoration_offset: Vec2::ZERO,
        }
    }

    fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            position: self.position,
            screen_anchor: self.screen_anchor,
            kind: self.kind,
            hovered: self.hovered,
            grabbed: self.grabbed,
            decoration_offset: self.decoration_offset,
        }
    }
}

#[derive(Clone, Debug)]
struct Grid {
    dimensions: GridDimensions,
    tiles: Vec<Tile>,
    hovered: Option<GridCoord>,
    grabbed: Option<GridCoord>,
}

impl Grid {
    fn empty() -> Self {
        Self {
            dimensions: GridDimensions::new(0, 0),
            tiles: Vec::new(),
            hovered: None,
            grabbed: None,
        }
    }

    fn from_spec(spec: &LevelSpec, projection: &IsoProjection) -> Self {
        let dimensions = spec.dimensions();
        Self {
            dimensions,
            tiles: dimensions
                .cells()
                .map(|cell| Tile::new(cell, spec.kind_at(cell), projection))
                .collect(),
            hovered: None,
            grabbed: None,
        }
    }

    fn clear(&mut self, projection: &IsoProjection) {
        let dimensions = self.dimensions;
        *self = Self {
            dimensions,
            tiles: dimensions
                .cells()
                .map(|cell| Tile::new(cell, TileKind::Empty, projection))
                .collect(),
            hovered: None,
            grabbed: None,
        };
    }

    fn reanchor(&mut self, projection: &IsoProjection) {
        for tile in &mut self.tiles {
            tile.screen_anchor = projection.map_to_screen(tile.position);
        }
    }

    fn tile(&self, cell: GridCoord) -> Option<&Tile> {
        self.dimensions
            .index(cell)
            .and_then(|index| self.tiles.get(index))
    }

    fn tile_mut(&mut self, cell: GridCoord) -> Option<&mut Tile> {
        self.dimensions
            .index(cell)
            .and_then(|index| self.tiles.get_mut(index))
    }

    fn kind(&self, cell: GridCoord) -> Option<TileKind> {
        self.tile(cell).map(|tile| tile.kind)
    }

    fn set_hovered(&mut self, cell: Option<GridCoord>) {
        if let Some(previous) = self.hovered.take() {
            if let Some(tile) = self.tile_mut(previous) {
                tile.hovered = false;
            }
        }

        let Some(cell) = cell else {
            return;
        };
        if let Some(tile) = self.tile_mut(cell) {
            tile.hovered = true;
            self.hovered = Some(cell);
        }
    }

    fn set_grabbed(&mut self, cell: Option<GridCoord>) {
        if let Some(previous) = self.grabbed.take() {
            if let Some(tile) = self.tile_mut(previous) {
                tile.grabbed = false;
            }
        }

        let Some(cell) = cell else {
            return;
        };
        if let Some(tile) = self.tile_mut(cell) {
            tile.grabbed = true;
            self.grabbed = Some(cell);
        }
    }

    fn merge(&mut self, grabbed: GridCoord, target: GridCoord) -> Option<TileKind> {
        if !grabbed.is_adjacent(target) {
            return None;
        }
        let outcome = merge::resolve(self.kind(grabbed)?, self.kind(target)?)?;

        self.tile_mut(target)?.kind = outcome.target;
        self.tile_mut(grabbed)?.kind = outcome.grabbed;
        Some(outcome.target)
    }

    fn form_forest(&mut self, origin: GridCoord) -> Option<GridCoord> {
        let anchor = origin.offset(1, 1)?;
        let block = [origin, origin.offset(0, 1)?, origin.offset(1, 0)?, anchor];
        if !block
            .iter()
            .all(|cell| self.kind(*cell) == Some(TileKind::Tree))
        {
            return None;
        }

        for cell in block {
            let tile = self.tile_mut(cell)?;
            tile.kind = TileKind::Forest;
            tile.decoration_offset = if cell == anchor {
                FOREST_DECORATION_OFFSET
            } else {
                Vec2::ZERO
            };
        }
        Some(anchor)
    }

    fn snapshots(&self) -> Vec<TileSnapshot> {
        self.tiles.iter().map(Tile::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn world_at(level: LevelId) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::LoadLevel { level }, &mut events);
        (world, events)
    }

    fn kind_at(world: &World, x: u32, y: u32) -> TileKind {
        query::tile_view(world)
            .kind(GridCoord::new(x, y))
            .expect("cell inside grid")
    }

    fn set_kinds(world: &mut World, cells: &[(u32, u32)], kind: TileKind) {
        for (x, y) in cells {
            world
                .grid
                .tile_mut(GridCoord::new(*x, *y))
                .expect("cell inside grid")
                .kind = kind;
        }
    }

    #[test]
    fn new_world_has_no_grid() {
        let world = World::new();
        assert_eq!(query::level(&world), None);
        assert_eq!(query::dimensions(&world), GridDimensions::new(0, 0));
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn load_level_allocates_authored_layout() {
        let (world, events) = world_at(LevelId::Level1);

        assert_eq!(
            events,
            vec![Event::LevelLoaded {
                level: LevelId::Level1,
                dimensions: GridDimensions::new(2, 2),
            }]
        );
        assert_eq!(kind_at(&world, 0, 0), TileKind::Bush);
        assert_eq!(kind_at(&world, 0, 1), TileKind::Grass);
        assert_eq!(kind_at(&world, 1, 0), TileKind::Empty);
        assert_eq!(kind_at(&world, 1, 1), TileKind::Grass);
    }

    #[test]
    fn screen_anchors_are_cached_from_level_offset() {
        let (world, _) = world_at(LevelId::Level3);
        let projection = query::projection(&world);
        assert_eq!(projection.offset(), Vec2::new(4.5, 3.0));
        for tile in query::tile_view(&world).iter() {
            assert_eq!(tile.screen_anchor, projection.map_to_screen(tile.position));
        }
    }

    #[test]
    fn loading_discards_previous_grid_and_flags() {
        let (mut world, _) = world_at(LevelId::Level1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::HoverTile {
                cell: Some(GridCoord::new(1, 1)),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::LoadLevel {
                level: LevelId::Level2,
            },
            &mut events,
        );

        let view = query::tile_view(&world);
        assert_eq!(view.dimensions(), GridDimensions::new(3, 3));
        assert!(view.iter().all(|tile| !tile.hovered && !tile.grabbed));
        assert_eq!(view.count(TileKind::Grass), 9);
    }

    #[test]
    fn clear_empties_cells_over_current_dimensions() {
        let (mut world, _) = world_at(LevelId::Level4);
        let mut events = Vec::new();
        apply(&mut world, Command::ClearLevel, &mut events);

        assert_eq!(events, vec![Event::LevelCleared]);
        assert_eq!(query::dimensions(&world), GridDimensions::new(5, 2));
        assert_eq!(query::count(&world, TileKind::Empty), 10);
        assert_eq!(query::level(&world), Some(LevelId::Level4));
    }

    #[test]
    fn reset_restores_authored_layout() {
        let (mut world, _) = world_at(LevelId::Level1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MergeTiles {
                grabbed: GridCoord::new(0, 1),
                target: GridCoord::new(1, 1),
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::ResetLevel, &mut events);

        assert_eq!(
            events,
            vec![Event::LevelReset {
                level: LevelId::Level1
            }]
        );
        assert_eq!(kind_at(&world, 0, 1), TileKind::Grass);
        assert_eq!(kind_at(&world, 1, 1), TileKind::Grass);
    }

    #[test]
    fn reset_without_level_is_ignored() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::ResetLevel, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn hover_and_grab_are_exclusive() {
        let (mut world, _) = world_at(LevelId::Level2);
        let mut events = Vec::new();
        for cell in [GridCoord::new(0, 0), GridCoord::new(2, 1)] {
            apply(
                &mut world,
                Command::HoverTile { cell: Some(cell) },
                &mut events,
            );
            apply(&mut world, Command::GrabTile { cell: Some(cell) }, &mut events);
        }

        let view = query::tile_view(&world);
        let hovered: Vec<GridCoord> = view
            .iter()
            .filter(|tile| tile.hovered)
            .map(|tile| tile.position)
            .collect();
        let grabbed: Vec<GridCoord> = view
            .iter()
            .filter(|tile| tile.grabbed)
            .map(|tile| tile.position)
            .collect();
        assert_eq!(hovered, vec![GridCoord::new(2, 1)]);
        assert_eq!(grabbed, vec![GridCoord::new(2, 1)]);

        apply(&mut world, Command::GrabTile { cell: None }, &mut events);
        apply(&mut world, Command::HoverTile { cell: None }, &mut events);
        let view = query::tile_view(&world);
        assert!(view.iter().all(|tile| !tile.hovered && !tile.grabbed));
        assert!(events.is_empty(), "flag updates are silent");
    }

    #[test]
    fn out_of_bounds_hover_is_ignored() {
        let (mut world, _) = world_at(LevelId::Level1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::HoverTile {
                cell: Some(GridCoord::new(7, 0)),
            },
            &mut events,
        );
        assert!(query::tile_view(&world).iter().all(|tile| !tile.hovered));
    }

    #[test]
    fn merging_grass_promotes_target_and_empties_grabbed() {
        let (mut world, _) = world_at(LevelId::Level1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MergeTiles {
                grabbed: GridCoord::new(0, 1),
                target: GridCoord::new(1, 1),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::TilesMerged {
                result: TileKind::Bush,
                promoted: GridCoord::new(1, 1),
                emptied: GridCoord::new(0, 1),
            }]
        );
        assert_eq!(kind_at(&world, 1, 1), TileKind::Bush);
        assert_eq!(kind_at(&world, 0, 1), TileKind::Empty);
    }

    #[test]
    fn rejected_merges_leave_grid_untouched() {
        let (mut world, _) = world_at(LevelId::Level1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MergeTiles {
                grabbed: GridCoord::new(0, 0),
                target: GridCoord::new(0, 1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MergeTiles {
                grabbed: GridCoord::new(0, 1),
                target: GridCoord::new(5, 1),
            },
            &mut events,
        );
        set_kinds(&mut world, &[(0, 0), (1, 1)], TileKind::Grass);
        apply(
            &mut world,
            Command::MergeTiles {
                grabbed: GridCoord::new(0, 0),
                target: GridCoord::new(1, 1),
            },
            &mut events,
        );

        assert!(events.is_empty(), "mismatched, out-of-range and diagonal merges are silent");
        assert_eq!(kind_at(&world, 0, 0), TileKind::Grass);
        assert_eq!(kind_at(&world, 0, 1), TileKind::Grass);
    }

    #[test]
    fn merging_trees_is_a_no_op() {
        let (mut world, _) = world_at(LevelId::Level2);
        set_kinds(&mut world, &[(0, 0), (0, 1)], TileKind::Tree);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MergeTiles {
                grabbed: GridCoord::new(0, 0),
                target: GridCoord::new(0, 1),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(kind_at(&world, 0, 0), TileKind::Tree);
        assert_eq!(kind_at(&world, 0, 1), TileKind::Tree);
    }

    #[test]
    fn forest_conversion_decorates_bottom_right_only() {
        let (mut world, _) = world_at(LevelId::Level2);
        set_kinds(&mut world, &[(1, 1), (1, 2), (2, 1), (2, 2)], TileKind::Tree);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::FormForest {
                origin: GridCoord::new(1, 1),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::ForestFormed {
                origin: GridCoord::new(1, 1),
                anchor: GridCoord::new(2, 2),
            }]
        );
        let view = query::tile_view(&world);
        assert_eq!(view.count(TileKind::Forest), 4);
        let decorated: Vec<GridCoord> = view
            .iter()
            .filter(|tile| tile.decoration_offset != Vec2::ZERO)
            .map(|tile| tile.position)
            .collect();
        assert_eq!(decorated, vec![GridCoord::new(2, 2)]);

        events.clear();
        apply(
            &mut world,
            Command::FormForest {
                origin: GridCoord::new(1, 1),
            },
            &mut events,
        );
        assert!(events.is_empty(), "converted block must not form twice");
    }

    #[test]
    fn forest_requires_full_tree_block_inside_grid() {
        let (mut world, _) = world_at(LevelId::Level2);
        set_kinds(&mut world, &[(1, 1), (1, 2), (2, 1)], TileKind::Tree);
        let mut events = Vec::new();
        for origin in [GridCoord::new(1, 1), GridCoord::new(2, 2)] {
            apply(&mut world, Command::FormForest { origin }, &mut events);
        }
        assert!(events.is_empty());
        assert_eq!(query::count(&world, TileKind::Forest), 0);
    }

    #[test]
    fn complete_level_clears_grid_and_reports() {
        let (mut world, _) = world_at(LevelId::Level1);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::CompleteLevel {
                level: LevelId::Level2,
            },
            &mut events,
        );
        assert!(events.is_empty(), "completion of another level is ignored");

        apply(
            &mut world,
            Command::CompleteLevel {
                level: LevelId::Level1,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::LevelCompleted {
                level: LevelId::Level1
            }]
        );
        assert_eq!(query::count(&world, TileKind::Empty), 4);
    }

    #[test]
    fn footprint_changes_recompute_anchors() {
        let (mut world, _) = world_at(LevelId::Level2);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureTileFootprint {
                sprite_width: 100.0,
                sprite_height: 80.0,
            },
            &mut events,
        );

        let projection = query::projection(&world);
        assert_eq!(projection.tile_width(), 100.0);
        assert_eq!(projection.tile_height(), 40.0);
        assert_eq!(projection.offset(), Vec2::new(4.5, 4.0));
        let tile = *query::tile_view(&world)
            .tile(GridCoord::new(2, 0))
            .expect("cell inside grid");
        assert_eq!(tile.screen_anchor, Vec2::new(100.0 + 450.0, 40.0 + 160.0));
    }

    #[test]
    fn tick_reports_elapsed_time() {
        let mut world = World::new();
        let mut events = Vec::new();
        let dt = Duration::from_millis(16);
        apply(&mut world, Command::Tick { dt }, &mut events);
        assert_eq!(events, vec![Event::TimeAdvanced { dt }]);
    }
}
