use std::{error::Error, fmt, fs, io, path::Path};

use serde::{Deserialize, Serialize};
use terrain_knowledge_world::MemoryBlobStore;

/// Version written into every memory file.
const MEMORY_VERSION: u32 = 1;

/// On-disk stand-in for the persisted key-value blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct MemoryFile {
    version: u32,
    /// Compressed terrain strings keyed by room.
    terrain: MemoryBlobStore,
}

/// Errors that can occur while reading or writing the memory file.
#[derive(Debug)]
pub(crate) enum MemoryFileError {
    /// The file exists but could not be read.
    Read(io::Error),
    /// The file could not be written.
    Write(io::Error),
    /// The blob could not be rendered as JSON.
    Encode(serde_json::Error),
    /// The file contents were not a valid memory document.
    InvalidPayload(serde_json::Error),
    /// The file was written by an unsupported version.
    UnsupportedVersion(u32),
}

impl fmt::Display for MemoryFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(error) => write!(f, "could not read memory file: {error}"),
            Self::Write(error) => write!(f, "could not write memory file: {error}"),
            Self::Encode(error) => write!(f, "could not encode memory file: {error}"),
            Self::InvalidPayload(error) => write!(f, "could not parse memory file: {error}"),
            Self::UnsupportedVersion(version) => {
                write!(f, "memory file version '{version}' is not supported")
            }
        }
    }
}

impl Error for MemoryFileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read(error) | Self::Write(error) => Some(error),
            Self::Encode(error) | Self::InvalidPayload(error) => Some(error),
            Self::UnsupportedVersion(_) => None,
        }
    }
}

/// Loads the persisted blob, starting empty when the file does not exist yet.
pub(crate) fn load(path: &Path) -> Result<MemoryBlobStore, MemoryFileError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            log::info!("no memory file at {}, starting empty", path.display());
            return Ok(MemoryBlobStore::new());
        }
        Err(error) => return Err(MemoryFileError::Read(error)),
    };
    decode(&contents)
}

/// Writes the persisted blob, replacing any previous file.
pub(crate) fn save(path: &Path, terrain: &MemoryBlobStore) -> Result<(), MemoryFileError> {
    let contents = encode(terrain)?;
    fs::write(path, contents).map_err(MemoryFileError::Write)
}

fn encode(terrain: &MemoryBlobStore) -> Result<String, MemoryFileError> {
    let document = MemoryFile {
        version: MEMORY_VERSION,
        terrain: terrain.clone(),
    };
    serde_json::to_string_pretty(&document).map_err(MemoryFileError::Encode)
}

fn decode(contents: &str) -> Result<MemoryBlobStore, MemoryFileError> {
    let document: MemoryFile =
        serde_json::from_str(contents).map_err(MemoryFileError::InvalidPayload)?;
    if document.version != MEMORY_VERSION {
        return Err(MemoryFileError::UnsupportedVersion(document.version));
    }
    Ok(document.terrain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain_knowledge_core::{RoomName, TerrainBlobStore};

    #[test]
    fn round_trip_populated_memory() {
        let mut terrain = MemoryBlobStore::new();
        terrain.write(&RoomName::new("W1N1"), "(ps)100u2300".to_owned());
        terrain.write(&RoomName::new("W1N2"), "w2500".to_owned());

        let encoded = encode(&terrain).expect("memory encodes");
        assert!(encoded.contains("\"version\": 1"));

        let decoded = decode(&encoded).expect("memory decodes");
        assert_eq!(decoded, terrain);
    }

    #[test]
    fn rejects_unknown_versions() {
        let result = decode(r#"{"version": 7, "terrain": {}}"#);
        assert!(matches!(result, Err(MemoryFileError::UnsupportedVersion(7))));
    }

    #[test]
    fn missing_file_loads_empty() {
        let directory = tempfile::tempdir().expect("temp dir");
        let terrain = load(&directory.path().join("memory.json")).expect("missing file is fine");
        assert!(terrain.is_empty());
    }

    #[test]
    fn save_then_load_restores_the_blob() {
        let directory = tempfile::tempdir().expect("temp dir");
        let path = directory.path().join("memory.json");
        let mut terrain = MemoryBlobStore::new();
        terrain.write(&RoomName::new("E5S5"), "s2500".to_owned());

        save(&path, &terrain).expect("save");
        assert_eq!(load(&path).expect("load"), terrain);
    }
}
