//! dv-save: Save/restore system for the Delve dungeon crawler
//!
//! The save holds the explorer, the floor state table, quest state and the
//! cleared set. Live floors are never written; they are regenerated and
//! merged with the table on load.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use dv_core::GameState;

/// Current save file format version
pub const SAVE_VERSION: u32 = 1;

/// Save/restore errors
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Save file not found")]
    NotFound,

    #[error("Incompatible save version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },

    #[error("Invalid save file header")]
    InvalidHeader,
}

/// Save file header for versioning and the save browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveHeader {
    /// Magic identifier
    pub magic: String,
    /// Save format version
    pub version: u32,
    pub player_name: String,
    /// Floor at save time; 0 on the surface
    pub current_level: u32,
    /// Number of floors in the state table
    pub floors_visited: usize,
    pub timestamp: DateTime<Utc>,
}

impl SaveHeader {
    const MAGIC: &'static str = "DVRS";

    pub fn new(state: &GameState) -> Self {
        Self {
            magic: Self::MAGIC.to_string(),
            version: SAVE_VERSION,
            player_name: state.explorer.name.clone(),
            current_level: state.current_level,
            floors_visited: state.store.len(),
            timestamp: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.magic != Self::MAGIC {
            return Err(SaveError::InvalidHeader);
        }
        if self.version != SAVE_VERSION {
            return Err(SaveError::IncompatibleVersion {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}

/// Complete save file structure
#[derive(Serialize, Deserialize)]
pub struct SaveFile {
    pub header: SaveHeader,
    pub state: GameState,
}

#[derive(Serialize)]
struct SaveFileRef<'a> {
    header: SaveHeader,
    state: &'a GameState,
}

/// Only the header; the rest of the document is skipped while parsing
#[derive(Deserialize)]
struct HeaderOnly {
    header: SaveHeader,
}

fn open(path: &Path) -> Result<BufReader<File>, SaveError> {
    let file = File::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => SaveError::NotFound,
        _ => SaveError::Io(err),
    })?;
    Ok(BufReader::new(file))
}

/// Save game state to a file
pub fn save_game(state: &GameState, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let save_file = SaveFileRef {
        header: SaveHeader::new(state),
        state,
    };
    let writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(writer, &save_file)?;
    debug!(path = %path.as_ref().display(), floors = state.store.len(), "game saved");
    Ok(())
}

/// Save game state to a compact file (no pretty printing)
pub fn save_game_compact(state: &GameState, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let save_file = SaveFileRef {
        header: SaveHeader::new(state),
        state,
    };
    let writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer(writer, &save_file)?;
    debug!(path = %path.as_ref().display(), floors = state.store.len(), "game saved (compact)");
    Ok(())
}

/// Load game state from a file.
///
/// The returned state is on its saved level with no live floor;
/// `GameLoop::resume` rebuilds it.
pub fn load_game(path: impl AsRef<Path>) -> Result<GameState, SaveError> {
    let save_file: SaveFile = serde_json::from_reader(open(path.as_ref())?)?;
    save_file.header.validate()?;
    debug!(
        path = %path.as_ref().display(),
        player = %save_file.header.player_name,
        "game loaded"
    );
    Ok(save_file.state)
}

/// Load only the header from a save file (for the save browser)
pub fn load_header(path: impl AsRef<Path>) -> Result<SaveHeader, SaveError> {
    let only: HeaderOnly = serde_json::from_reader(open(path.as_ref())?)?;
    only.header.validate()?;
    Ok(only.header)
}

/// Check if a save file exists
pub fn save_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Delete a save file
pub fn delete_save(path: impl AsRef<Path>) -> Result<(), SaveError> {
    std::fs::remove_file(path)?;
    Ok(())
}

/// Directory holding save files
pub fn save_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("delve");
    path.push("saves");
    path
}

/// Get the default save path for a player name
pub fn default_save_path(player_name: &str) -> PathBuf {
    let mut path = save_dir();
    if let Err(err) = std::fs::create_dir_all(&path) {
        warn!(dir = %path.display(), %err, "could not create save directory");
    }
    path.push(format!("{}.json", player_name));
    path
}

/// List all save files in the default save directory
pub fn list_saves() -> Result<Vec<(PathBuf, SaveHeader)>, SaveError> {
    list_saves_in(save_dir())
}

/// List save files in `dir`, newest first. Unreadable files are skipped.
pub fn list_saves_in(dir: impl AsRef<Path>) -> Result<Vec<(PathBuf, SaveHeader)>, SaveError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut saves = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_none_or(|e| e != "json") {
            continue;
        }
        match load_header(&path) {
            Ok(header) => saves.push((path, header)),
            Err(err) => debug!(path = %path.display(), %err, "skipping unreadable save"),
        }
    }

    saves.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
    Ok(saves)
}
