//! Versioned JSON record of floor progress, written atomically.
//!
//! The save layer owns this format; the dungeon core only supplies the
//! snapshot it is derived from.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use core::{FloorSnapshot, RoomState};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub const PROGRESS_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RoomProgress {
    pub y: i32,
    pub x: i32,
    pub tags: Vec<String>,
    pub discovered: bool,
    pub cleared: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProgressFile {
    pub format_version: u32,
    pub seed: u64,
    pub room_size: u32,
    pub rooms: Vec<RoomProgress>,
}

impl ProgressFile {
    pub fn from_snapshot(snapshot: &FloorSnapshot) -> Self {
        Self {
            format_version: PROGRESS_FORMAT_VERSION,
            seed: snapshot.seed,
            room_size: snapshot.room_size,
            rooms: snapshot
                .rooms
                .iter()
                .map(|room| RoomProgress {
                    y: room.y,
                    x: room.x,
                    tags: room.tags.clone(),
                    discovered: room.state >= RoomState::Activated,
                    cleared: room.state == RoomState::Completed,
                })
                .collect(),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "Ironveil").map(|dirs| {
            let mut path = dirs.data_dir().to_path_buf();
            path.push("floor_progress.json");
            path
        })
    }

    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }
}
