//! Floor parameters and the plain-data snapshot surface for save layers.

use serde::{Deserialize, Serialize};

use crate::content::{self, keys};
use crate::types::{Direction, EnemyKind, GenerationError, RoomKind, RoomState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FloorParams {
    /// Side length of every room in tiles. Must be even, and large enough
    /// to hold a centered two-tile doorway gap inside the wall ring.
    pub room_size: u32,
    /// Soft target for total room count; growth may stop short of it.
    pub target_room_count: usize,
    /// Tile edge length in pixels.
    pub tile_len: u32,
    /// Asset key of the tile atlas image.
    pub atlas_key: String,
    /// Item keys reward chests may still roll this run.
    pub item_pool: Vec<String>,
}

impl Default for FloorParams {
    fn default() -> Self {
        Self {
            room_size: 8,
            target_room_count: 12,
            tile_len: 16,
            atlas_key: keys::IMAGE_TILE_ATLAS.to_string(),
            item_pool: content::default_item_pool(),
        }
    }
}

impl FloorParams {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.room_size % 2 != 0 {
            return Err(GenerationError::OddRoomSize(self.room_size));
        }
        if self.room_size < 6 {
            return Err(GenerationError::RoomSizeTooSmall(self.room_size));
        }
        Ok(())
    }

    /// World-space edge length of one room, in pixels.
    pub fn room_world_len(&self) -> f32 {
        (self.room_size * self.tile_len) as f32
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub y: i32,
    pub x: i32,
    pub kind: RoomKind,
    pub state: RoomState,
    pub connections: Vec<Direction>,
    pub tags: Vec<String>,
    pub enemy_pool: Vec<(EnemyKind, u32)>,
}

/// The floor reduced to plain data for the external save layer and the
/// inspection tooling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorSnapshot {
    pub seed: u64,
    pub room_size: u32,
    pub rooms: Vec<RoomSnapshot>,
}

impl FloorSnapshot {
    /// Stable byte encoding of everything generation decided, for
    /// fingerprinting. Lifecycle state is excluded on purpose: two runs of
    /// the same seed stay comparable while one of them is being played.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.room_size.to_le_bytes());
        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend(room.y.to_le_bytes());
            bytes.extend(room.x.to_le_bytes());
            bytes.push(match room.kind {
                RoomKind::Normal => 0,
                RoomKind::Spawn => 1,
                RoomKind::Boss => 2,
                RoomKind::Upgrade => 3,
            });
            let mut connection_mask = 0_u8;
            for direction in &room.connections {
                connection_mask |= match direction {
                    Direction::Up => 1,
                    Direction::Down => 2,
                    Direction::Left => 4,
                    Direction::Right => 8,
                };
            }
            bytes.push(connection_mask);
            bytes.push(room.tags.len() as u8);
            for tag in &room.tags {
                bytes.extend((tag.len() as u32).to_le_bytes());
                bytes.extend(tag.as_bytes());
            }
            bytes.push(room.enemy_pool.len() as u8);
            for (kind, count) in &room.enemy_pool {
                bytes.push(match kind {
                    EnemyKind::GraveRat => 0,
                    EnemyKind::BoneArcher => 1,
                    EnemyKind::PitSpider => 2,
                    EnemyKind::HollowKnight => 3,
                    EnemyKind::CryptTyrant => 4,
                });
                bytes.extend(count.to_le_bytes());
            }
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_room_sizes_are_rejected() {
        let params = FloorParams { room_size: 7, ..FloorParams::default() };
        assert_eq!(params.validate(), Err(GenerationError::OddRoomSize(7)));
    }

    #[test]
    fn sizes_without_space_for_a_doorway_are_rejected() {
        let params = FloorParams { room_size: 4, ..FloorParams::default() };
        assert_eq!(params.validate(), Err(GenerationError::RoomSizeTooSmall(4)));
    }

    #[test]
    fn default_params_validate() {
        assert_eq!(FloorParams::default().validate(), Ok(()));
    }

    #[test]
    fn canonical_bytes_change_with_room_content() {
        let room = RoomSnapshot {
            y: 0,
            x: 0,
            kind: RoomKind::Spawn,
            state: RoomState::Completed,
            connections: vec![Direction::Up, Direction::Left],
            tags: vec!["spawn".to_string()],
            enemy_pool: Vec::new(),
        };
        let base = FloorSnapshot { seed: 1, room_size: 8, rooms: vec![room.clone()] };

        let mut moved = base.clone();
        moved.rooms[0].x = 1;
        assert_ne!(base.canonical_bytes(), moved.canonical_bytes());

        let mut retagged = base.clone();
        retagged.rooms[0].tags.push("boss".to_string());
        assert_ne!(base.canonical_bytes(), retagged.canonical_bytes());
    }

    #[test]
    fn canonical_bytes_ignore_lifecycle_state() {
        let room = RoomSnapshot {
            y: 2,
            x: -1,
            kind: RoomKind::Normal,
            state: RoomState::Dormant,
            connections: vec![Direction::Down],
            tags: Vec::new(),
            enemy_pool: vec![(EnemyKind::GraveRat, 2)],
        };
        let dormant = FloorSnapshot { seed: 9, room_size: 8, rooms: vec![room.clone()] };
        let mut cleared = dormant.clone();
        cleared.rooms[0].state = RoomState::Completed;

        assert_eq!(dormant.canonical_bytes(), cleared.canonical_bytes());
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = FloorSnapshot {
            seed: 42,
            room_size: 8,
            rooms: vec![RoomSnapshot {
                y: 0,
                x: 0,
                kind: RoomKind::Spawn,
                state: RoomState::Completed,
                connections: vec![Direction::Up],
                tags: vec!["spawn".to_string()],
                enemy_pool: Vec::new(),
            }],
        };

        let json = serde_json::to_string(&snapshot).expect("serialize");
        let decoded: FloorSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(snapshot, decoded);
    }
}
