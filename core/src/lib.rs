#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the terrain knowledge engine.
//!
//! This crate defines the value types and collaborator seams that connect the
//! per-room terrain stores, the compression codec, and the path analyzer. A
//! cell's observed terrain is packed into a [`TerrainCode`], each legal code
//! maps onto exactly one printable storage symbol, and the [`Observer`],
//! [`TerrainBlobStore`], and [`MovementCostSource`] traits describe the live
//! world, the persisted blob, and the cost lookup respectively.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells along each edge of a room.
pub const ROOM_SIZE: u8 = 50;

/// Total number of cells contained in a room grid.
pub const ROOM_AREA: usize = ROOM_SIZE as usize * ROOM_SIZE as usize;

/// Movement cost reported for cells that cannot be entered.
///
/// The value is finite so path totals can still be summed.
pub const IMPASSABLE_COST: u32 = 1_000_000;

/// Movement cost of a cell carrying a road.
pub const ROAD_COST: u32 = 1;

/// Movement cost of bare plain terrain.
pub const PLAIN_COST: u32 = 2;

/// Movement cost of bare swamp terrain.
pub const SWAMP_COST: u32 = 10;

/// Identifier of a room within the simulated world.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    /// Creates a room identifier from the provided name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrows the textual room name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised when a coordinate falls outside the room grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CoordError {
    /// The requested column or row exceeds the room bounds.
    #[error("cell ({x}, {y}) lies outside the 50x50 room grid")]
    OutOfRange {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },
}

/// Location of a single cell inside a room grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawRoomCoord")]
pub struct RoomCoord {
    x: u8,
    y: u8,
}

/// Unchecked wire form of [`RoomCoord`].
#[derive(Deserialize)]
struct RawRoomCoord {
    x: u8,
    y: u8,
}

impl TryFrom<RawRoomCoord> for RoomCoord {
    type Error = CoordError;

    fn try_from(raw: RawRoomCoord) -> Result<Self, Self::Error> {
        Self::try_new(i32::from(raw.x), i32::from(raw.y))
    }
}

impl RoomCoord {
    /// Creates a new cell coordinate.
    ///
    /// # Panics
    ///
    /// Panics when either component is not below [`ROOM_SIZE`]. Asking for a
    /// cell outside the room is a programming error.
    #[must_use]
    pub const fn new(x: u8, y: u8) -> Self {
        assert!(x < ROOM_SIZE && y < ROOM_SIZE, "room coordinate out of range");
        Self { x, y }
    }

    /// Creates a coordinate, rejecting values outside the room grid.
    pub fn try_new(x: i32, y: i32) -> Result<Self, CoordError> {
        let size = i32::from(ROOM_SIZE);
        if (0..size).contains(&x) && (0..size).contains(&y) {
            Ok(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            Err(CoordError::OutOfRange { x, y })
        }
    }

    /// Recovers the coordinate stored at the provided row-major index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= ROOM_AREA {
            return None;
        }
        let size = usize::from(ROOM_SIZE);
        Some(Self {
            x: (index % size) as u8,
            y: (index / size) as u8,
        })
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u8 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(&self) -> u8 {
        self.y
    }

    /// Row-major index of the cell within a room grid.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.x as usize + self.y as usize * ROOM_SIZE as usize
    }

    /// Returns the neighbouring cell in the provided direction, if it lies in the room.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        Self::try_new(i32::from(self.x) + i32::from(dx), i32::from(self.y) + i32::from(dy)).ok()
    }

    /// Iterates every cell of a room in row-major order.
    pub fn all() -> impl Iterator<Item = RoomCoord> {
        (0..ROOM_AREA).filter_map(Self::from_index)
    }
}

/// Absolute position of a cell in the world.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomPosition {
    /// Room that contains the cell.
    pub room: RoomName,
    /// Cell inside the room.
    pub cell: RoomCoord,
}

impl RoomPosition {
    /// Creates a new position.
    #[must_use]
    pub fn new(room: RoomName, cell: RoomCoord) -> Self {
        Self { room, cell }
    }
}

/// Compass directions a unit can step in, numbered clockwise from the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Toward decreasing rows.
    Top = 1,
    /// Toward decreasing rows and increasing columns.
    TopRight = 2,
    /// Toward increasing columns.
    Right = 3,
    /// Toward increasing rows and columns.
    BottomRight = 4,
    /// Toward increasing rows.
    Bottom = 5,
    /// Toward increasing rows and decreasing columns.
    BottomLeft = 6,
    /// Toward decreasing columns.
    Left = 7,
    /// Toward decreasing rows and columns.
    TopLeft = 8,
}

impl Direction {
    /// All directions in clockwise order.
    pub const ALL: [Direction; 8] = [
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
        Self::TopLeft,
    ];

    /// Column and row displacement of a single step.
    #[must_use]
    pub const fn offset(self) -> (i8, i8) {
        match self {
            Self::Top => (0, -1),
            Self::TopRight => (1, -1),
            Self::Right => (1, 0),
            Self::BottomRight => (1, 1),
            Self::Bottom => (0, 1),
            Self::BottomLeft => (-1, 1),
            Self::Left => (-1, 0),
            Self::TopLeft => (-1, -1),
        }
    }

    /// Looks up a direction by its numeric value.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|direction| *direction as u8 == value)
    }
}

/// One step of a path produced by an external pathfinder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    /// Direction travelled to reach the cell.
    pub direction: Direction,
    /// Column displacement of the step.
    pub dx: i8,
    /// Row displacement of the step.
    pub dy: i8,
    /// Cell reached by the step.
    pub cell: RoomCoord,
}

impl PathStep {
    /// Creates a step that moves in `direction` and lands on `cell`.
    #[must_use]
    pub fn new(direction: Direction, dx: i8, dy: i8, cell: RoomCoord) -> Self {
        Self {
            direction,
            dx,
            dy,
            cell,
        }
    }

    /// Creates the step that leaves `from` in `direction`, if the target is inside the room.
    #[must_use]
    pub fn toward(from: RoomCoord, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.offset();
        from.step(direction)
            .map(|cell| Self::new(direction, dx, dy, cell))
    }
}

/// Base terrain class of a discovered cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainClass {
    /// Walkable open ground.
    Plain,
    /// Walkable but slow ground.
    Swamp,
    /// Natural wall that cannot be entered.
    Wall,
}

/// Kind of structure seen on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    /// A road, lowering the cost of the cell.
    Road,
    /// A rampart, which does not block friendly movement.
    Rampart,
    /// Any other structure, which blocks movement.
    Other,
}

/// Result of observing a single visible cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Terrain reported for the cell, absent when the cell could not be seen.
    pub terrain: Option<TerrainClass>,
    /// Structures standing on the cell.
    pub structures: Vec<StructureKind>,
}

impl Observation {
    /// Creates an observation of bare terrain.
    #[must_use]
    pub fn of(terrain: TerrainClass) -> Self {
        Self {
            terrain: Some(terrain),
            structures: Vec::new(),
        }
    }

    /// Adds a structure to the observation.
    #[must_use]
    pub fn with_structure(mut self, kind: StructureKind) -> Self {
        self.structures.push(kind);
        self
    }
}

const TERRAIN_MASK: u8 = 0x03;
const ROAD_FLAG: u8 = 0x04;
const RAMPART_FLAG: u8 = 0x08;
const STRUCTURE_FLAG: u8 = 0x10;
const LEGAL_MASK: u8 = TERRAIN_MASK | ROAD_FLAG | RAMPART_FLAG | STRUCTURE_FLAG;

const PLAIN_BITS: u8 = 0x01;
const SWAMP_BITS: u8 = 0x02;
const WALL_BITS: u8 = 0x03;

/// Storage symbols for every legal code. Structure variants are upper case.
const SYMBOL_TABLE: [(u8, char); 25] = [
    (0x00, 'u'),
    (0x01, 'p'),
    (0x02, 's'),
    (0x03, 'w'),
    (0x05, 'h'),
    (0x06, 'r'),
    (0x07, 'k'),
    (0x09, 'd'),
    (0x0a, 't'),
    (0x0b, 'm'),
    (0x0d, 'o'),
    (0x0e, 'f'),
    (0x0f, 'n'),
    (0x11, 'P'),
    (0x12, 'S'),
    (0x13, 'W'),
    (0x15, 'H'),
    (0x16, 'R'),
    (0x17, 'K'),
    (0x19, 'D'),
    (0x1a, 'T'),
    (0x1b, 'M'),
    (0x1d, 'O'),
    (0x1e, 'F'),
    (0x1f, 'N'),
];

/// Packed knowledge about a single cell.
///
/// The low two bits hold the terrain class (`0` meaning unknown) and the next
/// three bits flag a road, a rampart, and any other structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerrainCode(u8);

impl TerrainCode {
    /// Sentinel for a cell that has never been discovered.
    pub const UNKNOWN: Self = Self(0);

    /// Packs terrain facts into a code.
    #[must_use]
    pub const fn encode(
        terrain: TerrainClass,
        has_road: bool,
        has_rampart: bool,
        has_structure: bool,
    ) -> Self {
        let mut bits = match terrain {
            TerrainClass::Plain => PLAIN_BITS,
            TerrainClass::Swamp => SWAMP_BITS,
            TerrainClass::Wall => WALL_BITS,
        };
        if has_road {
            bits |= ROAD_FLAG;
        }
        if has_rampart {
            bits |= RAMPART_FLAG;
        }
        if has_structure {
            bits |= STRUCTURE_FLAG;
        }
        Self(bits)
    }

    /// Derives the code describing an observed cell.
    ///
    /// Returns `None` when the observation carries no terrain. A blocking
    /// structure masks any road or rampart sharing the cell.
    #[must_use]
    pub fn from_observation(observation: &Observation) -> Option<Self> {
        let terrain = observation.terrain?;
        let structures = &observation.structures;
        if structures.contains(&StructureKind::Other) {
            return Some(Self::encode(terrain, false, false, true));
        }
        Some(Self::encode(
            terrain,
            structures.contains(&StructureKind::Road),
            structures.contains(&StructureKind::Rampart),
            false,
        ))
    }

    /// Reinterprets raw bits, rejecting values outside the code layout.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        let code = Self(bits);
        if code.is_legal() {
            Some(code)
        } else {
            None
        }
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether the cell is still undiscovered.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        self.0 == Self::UNKNOWN.0
    }

    /// Reports whether the code belongs to the storage alphabet.
    ///
    /// Unknown carries no flags; every discovered code needs a terrain class.
    #[must_use]
    pub const fn is_legal(self) -> bool {
        if self.0 & !LEGAL_MASK != 0 {
            return false;
        }
        self.0 == 0 || self.0 & TERRAIN_MASK != 0
    }

    /// Expands the code into terrain facts, or `None` for unknown cells.
    #[must_use]
    pub fn decode(self) -> Option<TerrainInfo> {
        let terrain = match self.0 & TERRAIN_MASK {
            PLAIN_BITS => TerrainClass::Plain,
            SWAMP_BITS => TerrainClass::Swamp,
            WALL_BITS => TerrainClass::Wall,
            _ => return None,
        };
        let has_road = self.0 & ROAD_FLAG != 0;
        let has_rampart = self.0 & RAMPART_FLAG != 0;
        let has_structure = self.0 & STRUCTURE_FLAG != 0;
        Some(TerrainInfo {
            terrain,
            has_road,
            has_rampart,
            has_structure,
            movement_cost: movement_cost(terrain, has_road, has_structure),
        })
    }

    /// Storage symbol of the code.
    ///
    /// Codes built through [`TerrainCode::encode`] or
    /// [`TerrainCode::from_bits`] are always legal; anything else falls back to
    /// the unknown symbol.
    #[must_use]
    pub fn symbol(self) -> char {
        SYMBOL_TABLE
            .iter()
            .find(|(bits, _)| *bits == self.0)
            .map_or('u', |(_, symbol)| *symbol)
    }

    /// Looks up the code stored under a symbol.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        SYMBOL_TABLE
            .iter()
            .find(|(_, candidate)| *candidate == symbol)
            .map(|(bits, _)| Self(*bits))
    }

    /// Every legal code, unknown first.
    pub fn alphabet() -> impl Iterator<Item = TerrainCode> {
        SYMBOL_TABLE.iter().map(|(bits, _)| Self(*bits))
    }
}

fn movement_cost(terrain: TerrainClass, has_road: bool, has_structure: bool) -> u32 {
    if has_structure || terrain == TerrainClass::Wall {
        IMPASSABLE_COST
    } else if has_road {
        ROAD_COST
    } else if terrain == TerrainClass::Swamp {
        SWAMP_COST
    } else {
        PLAIN_COST
    }
}

/// Decoded knowledge about a discovered cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainInfo {
    /// Base terrain class.
    pub terrain: TerrainClass,
    /// Whether a road runs through the cell.
    pub has_road: bool,
    /// Whether a rampart covers the cell.
    pub has_rampart: bool,
    /// Whether a blocking structure stands on the cell.
    pub has_structure: bool,
    /// Cost of entering the cell.
    pub movement_cost: u32,
}

impl TerrainInfo {
    /// Reports whether units can enter the cell at all.
    #[must_use]
    pub const fn is_passable(&self) -> bool {
        self.movement_cost < IMPASSABLE_COST
    }
}

/// Live view of the world, answering per-cell observations.
///
/// Observing is the expensive primitive the scanner budgets. Callers must only
/// observe rooms that are currently visible.
pub trait Observer {
    /// Observes one cell, returning `None` when it cannot currently be seen.
    fn observe(&self, room: &RoomName, cell: RoomCoord) -> Option<Observation>;
}

impl<T> Observer for &T
where
    T: Observer + ?Sized,
{
    fn observe(&self, room: &RoomName, cell: RoomCoord) -> Option<Observation> {
        (**self).observe(room, cell)
    }
}

/// Persisted key-value blob holding one compressed terrain string per room.
pub trait TerrainBlobStore {
    /// Reads the persisted string for a room.
    fn read(&self, room: &RoomName) -> Option<String>;

    /// Replaces the persisted string for a room.
    fn write(&mut self, room: &RoomName, compressed: String);
}

/// Source of per-cell movement costs consulted by the path analyzer.
pub trait MovementCostSource {
    /// Cost of entering a cell, discovering it first when necessary.
    ///
    /// Returns `None` when the cell could not be resolved.
    fn movement_cost(&mut self, room: &RoomName, cell: RoomCoord) -> Option<u32>;
}
