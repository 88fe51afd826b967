//! Loading and saving terrain maps through the persisted blob.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use terrain_knowledge_core::{RoomName, TerrainBlobStore};
use terrain_knowledge_system_compression::{compress, decompress_into};

use crate::TerrainMap;

impl TerrainMap {
    /// Restores the map persisted for `room`, or starts from an unknown map.
    ///
    /// Corrupted strings are reported and discarded; the room is rediscovered
    /// from scratch.
    pub fn load<B>(room: RoomName, blob: &B) -> Self
    where
        B: TerrainBlobStore + ?Sized,
    {
        let mut map = Self::new(room);
        if let Some(compressed) = blob.read(&map.room) {
            if let Err(error) = decompress_into(&compressed, &mut map.cells) {
                log::error!("discarding terrain map for room {}: {error}", map.room);
            }
        }
        map
    }

    /// Writes the map back to the blob if it changed since it was loaded.
    ///
    /// Returns `true` when a write happened.
    pub fn save<B>(&mut self, blob: &mut B) -> bool
    where
        B: TerrainBlobStore + ?Sized,
    {
        if !self.dirty {
            return false;
        }
        log::debug!("saving terrain map for room {}", self.room);
        blob.write(&self.room, compress(self.cells.as_slice()));
        self.dirty = false;
        true
    }
}

/// In-memory blob keyed by room, serializable as a JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryBlobStore {
    entries: BTreeMap<RoomName, String>,
}

impl MemoryBlobStore {
    /// Creates an empty blob.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms with a persisted string.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no room has been persisted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates persisted strings in room order.
    pub fn iter(&self) -> impl Iterator<Item = (&RoomName, &str)> {
        self.entries
            .iter()
            .map(|(room, compressed)| (room, compressed.as_str()))
    }

    /// Drops the persisted string for a room, returning it if present.
    pub fn remove(&mut self, room: &RoomName) -> Option<String> {
        self.entries.remove(room)
    }
}

impl TerrainBlobStore for MemoryBlobStore {
    fn read(&self, room: &RoomName) -> Option<String> {
        self.entries.get(room).cloned()
    }

    fn write(&mut self, room: &RoomName, compressed: String) {
        let _ = self.entries.insert(room.clone(), compressed);
    }
}
