use std::fmt::Write as _;

use terrain_knowledge_core::{RoomCoord, ROOM_AREA, ROOM_SIZE};
use terrain_knowledge_world::TerrainMap;

/// Character printed for cells that have not been discovered.
const UNKNOWN_GLYPH: char = '?';

/// Renders a map as fifty rows of storage symbols under a one-line summary.
pub(crate) fn render_map(map: &TerrainMap) -> String {
    let size = usize::from(ROOM_SIZE);
    let mut output = String::with_capacity(ROOM_AREA + size * 2 + 64);
    let _ = writeln!(
        output,
        "room {}: {}/{} cells known",
        map.room(),
        map.known_cells(),
        ROOM_AREA
    );

    for y in 0..ROOM_SIZE {
        for x in 0..ROOM_SIZE {
            let code = map.code(RoomCoord::new(x, y));
            output.push(if code.is_unknown() {
                UNKNOWN_GLYPH
            } else {
                code.symbol()
            });
        }
        output.push('\n');
    }
    output
}
