#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-room terrain knowledge and the atlas that memoizes it.
//!
//! A [`TerrainMap`] holds what the agent has learned about every cell of one
//! room. It is rebuilt from the persisted blob once per process, mutated while
//! the tick runs, and written back only when something actually changed. The
//! [`TerrainAtlas`] keeps one map per room for the lifetime of the process and
//! owns the observation and persistence collaborators the maps need.

mod discovery;
mod persistence;

use std::collections::BTreeMap;

use terrain_knowledge_core::{
    MovementCostSource, Observation, Observer, RoomCoord, RoomName, TerrainBlobStore,
    TerrainCode, TerrainInfo, ROOM_AREA,
};

pub use discovery::{ScanOptions, DEFAULT_MAX_LOOKUPS};
pub use persistence::MemoryBlobStore;

/// Everything the agent knows about the terrain of a single room.
#[derive(Clone, Debug)]
pub struct TerrainMap {
    room: RoomName,
    cells: Box<[TerrainCode; ROOM_AREA]>,
    dirty: bool,
}

impl TerrainMap {
    /// Creates a map with every cell unknown.
    #[must_use]
    pub fn new(room: RoomName) -> Self {
        Self {
            room,
            cells: Box::new([TerrainCode::UNKNOWN; ROOM_AREA]),
            dirty: false,
        }
    }

    /// Room described by the map.
    #[must_use]
    pub fn room(&self) -> &RoomName {
        &self.room
    }

    /// Reports whether the map diverged from the last persisted string.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Row-major view of every stored code.
    #[must_use]
    pub fn codes(&self) -> &[TerrainCode; ROOM_AREA] {
        &self.cells
    }

    /// Raw code stored for a cell.
    #[must_use]
    pub fn code(&self, cell: RoomCoord) -> TerrainCode {
        self.cells[cell.index()]
    }

    /// Returns stored knowledge about a cell without observing it.
    #[must_use]
    pub fn peek(&self, cell: RoomCoord) -> Option<TerrainInfo> {
        self.code(cell).decode()
    }

    /// Returns knowledge about a cell, discovering it first if it is unknown.
    ///
    /// The result is only `None` when the cell could not be observed, which
    /// means the caller asked about a room that is not visible.
    pub fn get<O>(&mut self, cell: RoomCoord, observer: &O) -> Option<TerrainInfo>
    where
        O: Observer + ?Sized,
    {
        if self.code(cell).is_unknown() {
            let _ = self.discover(cell, observer);
        }
        self.peek(cell)
    }

    /// Records an observation of a cell.
    ///
    /// Returns `true` when the stored code changed. Observations that carry no
    /// terrain are ignored and identical codes never mark the map dirty.
    pub fn update(&mut self, cell: RoomCoord, observation: &Observation) -> bool {
        let Some(code) = TerrainCode::from_observation(observation) else {
            log::warn!(
                "ignoring observation without terrain at ({}, {}) in room {}",
                cell.x(),
                cell.y(),
                self.room
            );
            return false;
        };

        let slot = &mut self.cells[cell.index()];
        if *slot == code {
            return false;
        }
        *slot = code;
        self.dirty = true;
        true
    }

    /// Number of cells with discovered terrain.
    #[must_use]
    pub fn known_cells(&self) -> usize {
        self.cells.iter().filter(|code| !code.is_unknown()).count()
    }

    /// Reports whether every cell has been discovered.
    #[must_use]
    pub fn is_fully_known(&self) -> bool {
        self.cells.iter().all(|code| !code.is_unknown())
    }

    /// Forgets everything known about the room.
    pub fn reset(&mut self) {
        if self.known_cells() > 0 {
            self.cells.fill(TerrainCode::UNKNOWN);
            self.dirty = true;
        }
    }

    /// Observes a single cell and records the result.
    fn discover<O>(&mut self, cell: RoomCoord, observer: &O) -> bool
    where
        O: Observer + ?Sized,
    {
        match observer.observe(&self.room, cell) {
            Some(observation) => self.update(cell, &observation),
            None => {
                log::debug!(
                    "cell ({}, {}) in room {} is not visible",
                    cell.x(),
                    cell.y(),
                    self.room
                );
                false
            }
        }
    }
}

/// Process-lifetime registry of terrain maps keyed by room.
///
/// Maps are loaded from the blob the first time a room is touched and kept
/// until the atlas is dropped.
#[derive(Debug)]
pub struct TerrainAtlas<B, O> {
    blob: B,
    observer: O,
    maps: BTreeMap<RoomName, TerrainMap>,
}

impl<B, O> TerrainAtlas<B, O>
where
    B: TerrainBlobStore,
    O: Observer,
{
    /// Creates an empty atlas backed by the provided collaborators.
    #[must_use]
    pub fn new(blob: B, observer: O) -> Self {
        Self {
            blob,
            observer,
            maps: BTreeMap::new(),
        }
    }

    /// Returns the map for a room, loading it on first access.
    pub fn terrain_map_mut(&mut self, room: &RoomName) -> &mut TerrainMap {
        self.split(room).0
    }

    /// Returns the map for a room for read-only inspection, loading it on first access.
    pub fn terrain_map(&mut self, room: &RoomName) -> &TerrainMap {
        self.split(room).0
    }

    /// Rooms whose maps have been loaded by this atlas.
    pub fn loaded_rooms(&self) -> impl Iterator<Item = &RoomName> {
        self.maps.keys()
    }

    /// Returns knowledge about a cell, discovering it if necessary.
    pub fn get(&mut self, room: &RoomName, cell: RoomCoord) -> Option<TerrainInfo> {
        let (map, observer) = self.split(room);
        map.get(cell, observer)
    }

    /// Returns stored knowledge about a cell without observing it.
    pub fn peek(&mut self, room: &RoomName, cell: RoomCoord) -> Option<TerrainInfo> {
        self.terrain_map(room).peek(cell)
    }

    /// Records an observation of a cell, returning whether the map changed.
    pub fn update(&mut self, room: &RoomName, cell: RoomCoord, observation: &Observation) -> bool {
        self.terrain_map_mut(room).update(cell, observation)
    }

    /// Runs a budgeted discovery scan over a room.
    pub fn scan(&mut self, room: &RoomName, options: ScanOptions) -> usize {
        let (map, observer) = self.split(room);
        map.scan(observer, options)
    }

    /// Persists a loaded room if it changed, returning whether a write happened.
    pub fn save(&mut self, room: &RoomName) -> bool {
        match self.maps.get_mut(room) {
            Some(map) => map.save(&mut self.blob),
            None => false,
        }
    }

    /// Persists every changed room, returning the number of writes.
    pub fn save_all(&mut self) -> usize {
        let mut written = 0;
        for map in self.maps.values_mut() {
            if map.save(&mut self.blob) {
                written += 1;
            }
        }
        written
    }

    /// Borrows the persisted blob.
    #[must_use]
    pub fn blob(&self) -> &B {
        &self.blob
    }

    /// Consumes the atlas, handing back the persisted blob.
    #[must_use]
    pub fn into_blob(self) -> B {
        self.blob
    }

    fn split(&mut self, room: &RoomName) -> (&mut TerrainMap, &O) {
        let blob = &self.blob;
        let map = self
            .maps
            .entry(room.clone())
            .or_insert_with(|| TerrainMap::load(room.clone(), blob));
        (map, &self.observer)
    }
}

impl<B, O> MovementCostSource for TerrainAtlas<B, O>
where
    B: TerrainBlobStore,
    O: Observer,
{
    fn movement_cost(&mut self, room: &RoomName, cell: RoomCoord) -> Option<u32> {
        self.get(room, cell).map(|info| info.movement_cost)
    }
}
