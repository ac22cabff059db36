use tile_lands_core::{Command, Event, GridCoord, LevelId, TileKind};
use tile_lands_system_forest::ForestDetector;
use tile_lands_world::{self as world, query, World};

fn merge(world: &mut World, grabbed: (u32, u32), target: (u32, u32)) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::MergeTiles {
            grabbed: GridCoord::new(grabbed.0, grabbed.1),
            target: GridCoord::new(target.0, target.1),
        },
        &mut events,
    );
    assert_eq!(events.len(), 1, "merge {grabbed:?} -> {target:?} should succeed");
}

fn detect_and_apply(world: &mut World) -> Vec<Event> {
    let mut commands = Vec::new();
    ForestDetector::new().handle(&query::tile_view(world), &mut commands);
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

/// Grows a tree on every cell of the 2×2 block at (1, 1) of the grove level.
fn grow_central_block(world: &mut World) {
    for (near, far, edge, tree) in [
        ((1, 0), (0, 0), (0, 1), (1, 1)),
        ((2, 0), (3, 0), (3, 1), (2, 1)),
        ((1, 3), (0, 3), (0, 2), (1, 2)),
        ((2, 3), (3, 3), (3, 2), (2, 2)),
    ] {
        merge(world, near, tree);
        merge(world, far, edge);
        merge(world, edge, tree);
    }
}

#[test]
fn converted_block_is_not_converted_twice() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            level: LevelId::Grove,
        },
        &mut events,
    );
    grow_central_block(&mut world);

    let view = query::tile_view(&world);
    for cell in [(1, 1), (1, 2), (2, 1), (2, 2)] {
        assert_eq!(
            view.kind(GridCoord::new(cell.0, cell.1)),
            Some(TileKind::Tree),
            "{cell:?} should hold a tree",
        );
    }

    let first = detect_and_apply(&mut world);
    assert_eq!(
        first,
        vec![Event::ForestFormed {
            origin: GridCoord::new(1, 1),
            anchor: GridCoord::new(2, 2),
        }]
    );

    let second = detect_and_apply(&mut world);
    assert!(second.is_empty(), "a converted block must not form a second forest");
    assert_eq!(query::count(&world, TileKind::Forest), 4);
}
