use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use terrain_knowledge_core::{
    Observation, Observer, RoomCoord, RoomName, StructureKind, TerrainCode, ROOM_AREA, ROOM_SIZE,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorldFile {
    rooms: Vec<RoomEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoomEntry {
    name: String,
    #[serde(default = "visible_by_default")]
    visible: bool,
    #[serde(default)]
    rows: Vec<String>,
}

fn visible_by_default() -> bool {
    true
}

#[derive(Debug)]
struct FixtureRoom {
    visible: bool,
    cells: Vec<TerrainCode>,
}

/// Scripted world that answers observations from a TOML description.
///
/// Every room lists the true terrain of its cells as fifty rows of storage
/// symbols. Hidden rooms may omit their rows.
#[derive(Debug, Default)]
pub(crate) struct FixtureWorld {
    rooms: BTreeMap<RoomName, FixtureRoom>,
}

impl FixtureWorld {
    /// Reads and validates a fixture world file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read world fixture at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid world fixture at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let file: WorldFile =
            toml::from_str(contents).context("failed to parse world fixture toml contents")?;

        let mut rooms = BTreeMap::new();
        for entry in file.rooms {
            let name = RoomName::new(entry.name);
            let cells = if entry.rows.is_empty() && !entry.visible {
                Vec::new()
            } else {
                parse_rows(&entry.rows).with_context(|| format!("room {name} has bad rows"))?
            };
            let room = FixtureRoom {
                visible: entry.visible,
                cells,
            };
            if rooms.insert(name.clone(), room).is_some() {
                bail!("world fixture contains duplicate room {name}");
            }
        }
        Ok(Self { rooms })
    }

    /// Rooms that can currently be observed, in name order.
    pub(crate) fn visible_rooms(&self) -> impl Iterator<Item = &RoomName> {
        self.rooms
            .iter()
            .filter(|(_, room)| room.visible)
            .map(|(name, _)| name)
    }
}

fn parse_rows(rows: &[String]) -> Result<Vec<TerrainCode>> {
    let size = usize::from(ROOM_SIZE);
    if rows.len() != size {
        bail!("expected {size} rows, found {}", rows.len());
    }

    let mut cells = Vec::with_capacity(ROOM_AREA);
    for (y, row) in rows.iter().enumerate() {
        let width = row.chars().count();
        if width != size {
            bail!("row {y} has {width} cells, expected {size}");
        }
        for (x, symbol) in row.chars().enumerate() {
            let code = TerrainCode::from_symbol(symbol)
                .with_context(|| format!("unknown symbol {symbol:?} at ({x}, {y})"))?;
            if code.is_unknown() {
                bail!("cell ({x}, {y}) must describe real terrain");
            }
            cells.push(code);
        }
    }
    Ok(cells)
}

impl Observer for FixtureWorld {
    fn observe(&self, room: &RoomName, cell: RoomCoord) -> Option<Observation> {
        let room = self.rooms.get(room).filter(|room| room.visible)?;
        let info = room.cells.get(cell.index())?.decode()?;

        let mut observation = Observation::of(info.terrain);
        if info.has_structure {
            observation = observation.with_structure(StructureKind::Other);
        }
        if info.has_road {
            observation = observation.with_structure(StructureKind::Road);
        }
        if info.has_rampart {
            observation = observation.with_structure(StructureKind::Rampart);
        }
        Some(observation)
    }
}
