//! Boss and upgrade retrofits applied once the connectivity graph resolves.
//!
//! A retrofit never mutates the donor room: a replacement is constructed
//! from the donor's resolved connections and swapped into the arena, so the
//! bidirectionality invariant cannot be disturbed after the fact.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::rng::FloorRng;
use crate::types::{EnemyKind, GenerationError, GridPos, RoomKind};

use super::model::FloorParams;
use super::room::Room;

/// Replaces the farthest leaf with the boss room. The donor's single
/// doorway carries over as a forced door; every other direction stays shut,
/// and the encounter is a lone boss archetype.
pub(super) fn retrofit_boss_room(
    rooms: &mut BTreeMap<GridPos, Room>,
    params: &FloorParams,
) -> Result<GridPos, GenerationError> {
    let mut best: Option<(f32, GridPos)> = None;
    for (&coord, room) in rooms.iter() {
        if room.kind() != RoomKind::Normal || !room.is_leaf() {
            continue;
        }
        let distance = coord.distance_from_origin();
        let replace = match best {
            None => true,
            Some((best_distance, best_coord)) => {
                distance > best_distance
                    || (distance == best_distance
                        && (coord.y, coord.x) > (best_coord.y, best_coord.x))
            }
        };
        if replace {
            best = Some((distance, coord));
        }
    }

    let Some((_, coord)) = best else {
        return Err(GenerationError::NoLeafRoom);
    };
    if let Some(donor) = rooms.remove(&coord) {
        let pool = BTreeMap::from([(EnemyKind::CryptTyrant, 1)]);
        let replacement =
            Room::new(coord, params, RoomKind::Boss, donor.connections().clone(), pool);
        rooms.insert(coord, replacement);
    }
    debug!("boss room retrofitted at {coord:?}");
    Ok(coord)
}

/// Uniform pick among rooms that are neither spawn nor already special.
/// Degenerate graphs without a candidate skip the shrine with a warning.
pub(super) fn retrofit_upgrade_room(
    rooms: &mut BTreeMap<GridPos, Room>,
    params: &FloorParams,
    rng: &mut FloorRng,
) -> Option<GridPos> {
    let candidates: Vec<GridPos> = rooms
        .iter()
        .filter(|(_, room)| room.kind() == RoomKind::Normal)
        .map(|(&coord, _)| coord)
        .collect();
    if candidates.is_empty() {
        warn!("no candidate room for the upgrade shrine");
        return None;
    }

    let coord = candidates[rng.range_usize(candidates.len())];
    if let Some(donor) = rooms.remove(&coord) {
        let replacement = Room::new(
            coord,
            params,
            RoomKind::Upgrade,
            donor.connections().clone(),
            BTreeMap::new(),
        );
        rooms.insert(coord, replacement);
    }
    debug!("upgrade room retrofitted at {coord:?}");
    Some(coord)
}
