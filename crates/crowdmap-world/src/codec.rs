//! Reading and writing map files.
//!
//! The service never interprets the on-disk map format itself; it goes
//! through a [`MapCodec`]. [`JsonMapCodec`] is the implementation shipped
//! with the workspace: it stores the map as compact JSON and exports it as
//! indented JSON for human consumption.

use std::fs;
use std::path::Path;

use crate::error::WorldError;
use crate::map::MapSnapshot;

/// Encoder and decoder for the map file format.
///
/// Implementations are synchronous and should be called from a blocking
/// context when used inside an async runtime.
pub trait MapCodec: Send + Sync {
    /// Decode the map stored at `path`.
    fn read(&self, path: &Path) -> Result<MapSnapshot, WorldError>;

    /// Encode `map` in the native format and write it to `path`.
    fn write(&self, map: &MapSnapshot, path: &Path) -> Result<(), WorldError>;

    /// Write `map` to `path` as human-readable JSON.
    fn export_json(&self, map: &MapSnapshot, path: &Path) -> Result<(), WorldError>;
}

/// Map codec that uses JSON as the native format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMapCodec;

impl JsonMapCodec {
    /// Create the codec.
    pub const fn new() -> Self {
        Self
    }

    /// Decode a map from bytes.
    pub fn decode(bytes: &[u8]) -> Result<MapSnapshot, WorldError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encode a map to compact JSON bytes.
    pub fn encode(map: &MapSnapshot) -> Result<Vec<u8>, WorldError> {
        Ok(serde_json::to_vec(map)?)
    }
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), WorldError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| WorldError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, bytes).map_err(|source| WorldError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl MapCodec for JsonMapCodec {
    fn read(&self, path: &Path) -> Result<MapSnapshot, WorldError> {
        let bytes = fs::read(path).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::decode(&bytes)?;
        tracing::debug!(
            path = %path.display(),
            rooms = map.rooms.len(),
            areas = map.areas.len(),
            "map decoded"
        );
        Ok(map)
    }

    fn write(&self, map: &MapSnapshot, path: &Path) -> Result<(), WorldError> {
        write_bytes(path, &Self::encode(map)?)
    }

    fn export_json(&self, map: &MapSnapshot, path: &Path) -> Result<(), WorldError> {
        let bytes = serde_json::to_vec_pretty(map)?;
        write_bytes(path, &bytes)
    }
}
