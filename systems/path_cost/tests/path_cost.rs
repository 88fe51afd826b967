use terrain_knowledge_core::{
    Direction, Observation, Observer, PathStep, RoomCoord, RoomName, RoomPosition,
    StructureKind, TerrainClass, IMPASSABLE_COST,
};
use terrain_knowledge_system_path_cost::{FindPathOptions, FindPathResult, Leg};
use terrain_knowledge_world::{MemoryBlobStore, TerrainAtlas};

/// Plain terrain everywhere, with a road along row 2 and a spawn at (3, 2).
struct Outpost;

impl Observer for Outpost {
    fn observe(&self, _room: &RoomName, cell: RoomCoord) -> Option<Observation> {
        let observation = Observation::of(TerrainClass::Plain);
        Some(match (cell.x(), cell.y()) {
            (3, 2) => observation
                .with_structure(StructureKind::Road)
                .with_structure(StructureKind::Other),
            (_, 2) => observation.with_structure(StructureKind::Road),
            _ => observation,
        })
    }
}

fn room() -> RoomName {
    RoomName::new("W2N5")
}

fn position(x: u8, y: u8) -> RoomPosition {
    RoomPosition::new(room(), RoomCoord::new(x, y))
}

fn step(direction: Direction, dx: i8, dy: i8, x: u8, y: u8) -> PathStep {
    PathStep::new(direction, dx, dy, RoomCoord::new(x, y))
}

struct AllPlain;

impl Observer for AllPlain {
    fn observe(&self, _room: &RoomName, _cell: RoomCoord) -> Option<Observation> {
        Some(Observation::of(TerrainClass::Plain))
    }
}

#[test]
fn consecutive_steps_coalesce_into_legs() {
    let mut atlas = TerrainAtlas::new(MemoryBlobStore::new(), AllPlain);
    let result = FindPathResult::new(
        position(0, 0),
        position(1, 2),
        FindPathOptions::default(),
        vec![
            step(Direction::Top, 0, 1, 0, 1),
            step(Direction::Top, 0, 1, 0, 2),
            step(Direction::Right, 1, 0, 1, 2),
        ],
    );

    let legs = result.legs(&mut atlas).to_vec();
    assert_eq!(
        legs,
        vec![
            Leg {
                direction: Direction::Top,
                dx: 0,
                dy: 2,
                end: RoomCoord::new(0, 2),
                movement_cost: 4,
            },
            Leg {
                direction: Direction::Right,
                dx: 1,
                dy: 0,
                end: RoomCoord::new(1, 2),
                movement_cost: 2,
            },
        ]
    );
    assert_eq!(result.movement_cost(&mut atlas), 6);
}

#[test]
fn costs_come_from_discovered_terrain() {
    let mut atlas = TerrainAtlas::new(MemoryBlobStore::new(), Outpost);
    let result = FindPathResult::new(
        position(1, 0),
        position(2, 2),
        FindPathOptions::default(),
        vec![
            step(Direction::Bottom, 0, 1, 1, 1),
            step(Direction::Bottom, 0, 1, 1, 2),
            step(Direction::Right, 1, 0, 2, 2),
        ],
    );

    assert_eq!(result.movement_cost(&mut atlas), 2 + 1 + 1);
    let map = atlas.terrain_map(&room());
    assert_eq!(map.known_cells(), 3, "only the cells on the path are discovered");
    assert!(map.is_dirty());
}

#[test]
fn blocking_structures_dominate_roads() {
    let mut atlas = TerrainAtlas::new(MemoryBlobStore::new(), Outpost);
    let result = FindPathResult::new(
        position(2, 2),
        position(4, 2),
        FindPathOptions::default(),
        vec![
            step(Direction::Right, 1, 0, 3, 2),
            step(Direction::Right, 1, 0, 4, 2),
        ],
    );

    let total = result.movement_cost(&mut atlas);
    assert!(total >= u64::from(IMPASSABLE_COST));
    assert_eq!(result.legs(&mut atlas).len(), 1);
}

#[test]
fn repeated_paths_reuse_stored_knowledge() {
    let mut atlas = TerrainAtlas::new(MemoryBlobStore::new(), Outpost);
    let steps = vec![
        step(Direction::BottomRight, 1, 1, 6, 6),
        step(Direction::BottomRight, 1, 1, 7, 7),
    ];

    let first = FindPathResult::new(
        position(5, 5),
        position(7, 7),
        FindPathOptions::default(),
        steps.clone(),
    );
    assert_eq!(first.movement_cost(&mut atlas), 4);

    let second = FindPathResult::new(
        position(5, 5),
        position(7, 7),
        FindPathOptions {
            ignore_creeps: true,
            ..FindPathOptions::default()
        },
        steps,
    );
    assert_eq!(second.movement_cost(&mut atlas), 4);
    assert!(second.options().ignore_creeps);
    assert_eq!(atlas.terrain_map(&room()).known_cells(), 2);
}

#[test]
fn legs_split_on_every_direction_change() {
    let mut atlas = TerrainAtlas::new(MemoryBlobStore::new(), AllPlain);
    let result = FindPathResult::new(
        position(10, 10),
        position(11, 10),
        FindPathOptions::default(),
        vec![
            step(Direction::Right, 1, 0, 11, 10),
            step(Direction::Bottom, 0, 1, 11, 11),
            step(Direction::Top, 0, -1, 11, 10),
            step(Direction::Top, 0, -1, 11, 9),
            step(Direction::Right, 1, 0, 12, 9),
        ],
    );

    let directions: Vec<Direction> = result
        .legs(&mut atlas)
        .iter()
        .map(|leg| leg.direction)
        .collect();
    assert_eq!(
        directions,
        vec![
            Direction::Right,
            Direction::Bottom,
            Direction::Top,
            Direction::Right
        ]
    );
    assert_eq!(result.legs(&mut atlas)[2].dy, -2);
    assert_eq!(result.movement_cost(&mut atlas), 10);
}
