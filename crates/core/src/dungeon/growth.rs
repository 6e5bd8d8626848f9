//! Constrained random growth of the room graph.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::rng::FloorRng;
use crate::types::{Direction, EnemyKind, GridPos, RoomKind};

use super::model::FloorParams;
use super::room::Room;

/// How many doorways a room tries to open, as a function of distance from
/// spawn. The clamp keeps growth alive while the floor is below its target
/// count and stops all new branching once the target is reached.
fn connection_target(origin: GridPos, placed_rooms: usize, target_room_count: usize) -> usize {
    let decayed = 4 - (origin.distance_from_origin() / 4.0).floor() as i64;
    let base = decayed.max(0) as usize;
    if placed_rooms < target_room_count { base.max(1) } else { 0 }
}

/// Forced doors are added unconditionally first; the rest is a
/// shuffle-then-filter draw over the four directions until the target is
/// met or candidates run out. The returned order fixes worklist pushes.
fn draw_connections(
    rng: &mut FloorRng,
    forced: &BTreeSet<Direction>,
    blacklisted: &BTreeSet<Direction>,
    target: usize,
) -> Vec<Direction> {
    let mut drawn: Vec<Direction> = forced.iter().copied().collect();
    let mut candidates = Direction::ALL;
    rng.shuffle(&mut candidates);
    for direction in candidates {
        if drawn.len() >= target {
            break;
        }
        if blacklisted.contains(&direction) || drawn.contains(&direction) {
            continue;
        }
        drawn.push(direction);
    }
    drawn
}

/// Splits a new room's four directions by its already-placed neighbors:
/// a neighbor opening toward us forces the door, a neighbor that does not
/// reciprocate blacklists it. Unoccupied directions stay free.
fn neighbor_constraints(
    rooms: &BTreeMap<GridPos, Room>,
    origin: GridPos,
) -> (BTreeSet<Direction>, BTreeSet<Direction>) {
    let mut forced = BTreeSet::new();
    let mut blacklisted = BTreeSet::new();
    for direction in Direction::ALL {
        let Some(neighbor) = rooms.get(&origin.step(direction)) else {
            continue;
        };
        if neighbor.connections().contains(&direction.opposite()) {
            forced.insert(direction);
        } else {
            blacklisted.insert(direction);
        }
    }
    (forced, blacklisted)
}

pub(super) fn roll_enemy_pool(rng: &mut FloorRng, origin: GridPos) -> BTreeMap<EnemyKind, u32> {
    let distance = origin.distance_from_origin();
    let total = 2 + rng.range(3);
    let mut pool = BTreeMap::new();
    for _ in 0..total {
        *pool.entry(pick_enemy_kind(rng, distance)).or_insert(0) += 1;
    }
    pool
}

fn pick_enemy_kind(rng: &mut FloorRng, distance: f32) -> EnemyKind {
    let roll = rng.range(100);
    if distance < 3.0 {
        if roll < 70 { EnemyKind::GraveRat } else { EnemyKind::BoneArcher }
    } else if distance < 6.0 {
        if roll < 40 {
            EnemyKind::GraveRat
        } else if roll < 75 {
            EnemyKind::BoneArcher
        } else {
            EnemyKind::PitSpider
        }
    } else if roll < 30 {
        EnemyKind::BoneArcher
    } else if roll < 65 {
        EnemyKind::PitSpider
    } else {
        EnemyKind::HollowKnight
    }
}

/// Iterative flood fill over a LIFO worklist of pending (room, direction)
/// edges. Conflicting edges are discarded, so the worklist strictly shrinks
/// whenever growth stalls and the pass always terminates.
pub(super) fn grow_room_graph(
    rng: &mut FloorRng,
    params: &FloorParams,
) -> BTreeMap<GridPos, Room> {
    let mut rooms = BTreeMap::new();

    // The spawn room skips the distance rule entirely and always attempts
    // full branching.
    let spawn_connections =
        draw_connections(rng, &BTreeSet::new(), &BTreeSet::new(), Direction::ALL.len());
    let spawn = Room::new(
        GridPos::ORIGIN,
        params,
        RoomKind::Spawn,
        spawn_connections.iter().copied().collect(),
        BTreeMap::new(),
    );
    rooms.insert(GridPos::ORIGIN, spawn);

    let mut pending: Vec<(GridPos, Direction)> =
        spawn_connections.iter().map(|&direction| (GridPos::ORIGIN, direction)).collect();

    while let Some((from, direction)) = pending.pop() {
        let origin = from.step(direction);
        if rooms.contains_key(&origin) {
            // Already satisfied by the occupant's forced doors, or conflicting.
            continue;
        }

        let (forced, blacklisted) = neighbor_constraints(&rooms, origin);
        let target = connection_target(origin, rooms.len(), params.target_room_count);
        let drawn = draw_connections(rng, &forced, &blacklisted, target);
        let enemy_pool = roll_enemy_pool(rng, origin);

        let room = Room::new(
            origin,
            params,
            RoomKind::Normal,
            drawn.iter().copied().collect(),
            enemy_pool,
        );
        rooms.insert(origin, room);
        for direction in drawn {
            pending.push((origin, direction));
        }
    }

    debug!("room graph grown: {} rooms (target {})", rooms.len(), params.target_room_count);
    rooms
}
