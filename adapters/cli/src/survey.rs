use terrain_knowledge_core::{Observer, RoomName, TerrainBlobStore};
use terrain_knowledge_world::TerrainAtlas;

use crate::config::ScanConfig;

/// Outcome of scanning one room during a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RoomScan {
    pub(crate) room: RoomName,
    /// Lookups the room was offered.
    pub(crate) offered: usize,
    /// Lookups the scan actually performed.
    pub(crate) performed: usize,
    /// Cells known once the scan finished.
    pub(crate) known: usize,
}

/// Hands the per-tick lookup budget to visible rooms in turn.
///
/// The current room receives everything that is left of the budget. Only when
/// its scan performs fewer lookups than offered does the next room get a turn,
/// and that room inherits the remainder. The rotation carries over between
/// ticks, as does the cell where a forced rescan of each room stopped.
#[derive(Debug)]
pub(crate) struct Surveyor {
    scan: ScanConfig,
    rooms: Vec<RoomName>,
    current: usize,
    resume: Vec<usize>,
}

impl Surveyor {
    pub(crate) fn new(scan: ScanConfig, rooms: Vec<RoomName>) -> Self {
        let resume = vec![0; rooms.len()];
        Self {
            scan,
            rooms,
            current: 0,
            resume,
        }
    }

    /// Spends one tick's budget, returning a report per scanned room.
    pub(crate) fn tick<B, O>(&mut self, atlas: &mut TerrainAtlas<B, O>) -> Vec<RoomScan>
    where
        B: TerrainBlobStore,
        O: Observer,
    {
        let mut remaining = self.scan.max_lookups_per_tick;
        let mut finished = 0;
        let mut scans = Vec::new();

        while remaining > 0 && finished < self.rooms.len() {
            let index = self.current;
            let room = &self.rooms[index];
            let options = self
                .scan
                .options(remaining)
                .starting_at(self.resume[index]);
            let performed = atlas.scan(room, options);
            remaining -= performed;
            scans.push(RoomScan {
                room: room.clone(),
                offered: options.max_lookups,
                performed,
                known: atlas.terrain_map(room).known_cells(),
            });

            if performed < options.max_lookups {
                // the room ran out of work before the budget did
                self.resume[index] = 0;
                self.current = (index + 1) % self.rooms.len();
                finished += 1;
            } else if self.scan.force_update {
                self.resume[index] += performed;
            }
        }
        scans
    }
}
