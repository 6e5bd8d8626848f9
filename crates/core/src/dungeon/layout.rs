//! Wall and floor tile placement for a single room's edges and doorways.

use std::collections::{BTreeMap, BTreeSet};

use crate::tiles::{Tile, TileAtlas, TileError};
use crate::types::{Direction, GridPos, WorldPos};

pub(super) const FLOOR_TILE_INDEX: usize = 16;

const CORNER_TILE_INDICES: [(Corner, usize); 4] = [
    (Corner::TopLeft, 0),
    (Corner::TopRight, 1),
    (Corner::BottomLeft, 2),
    (Corner::BottomRight, 3),
];

#[derive(Clone, Copy)]
enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum WallRole {
    Straight,
    FrameLow,
    FrameHigh,
}

/// Atlas index for a wall segment on the given edge. Frame roles are the
/// door-frame tiles flanking a doorway gap, low/high along the edge axis.
pub(super) fn wall_tile_index(direction: Direction, role: WallRole) -> usize {
    let base = match direction {
        Direction::Up => 4,
        Direction::Down => 7,
        Direction::Left => 10,
        Direction::Right => 13,
    };
    base + match role {
        WallRole::Straight => 0,
        WallRole::FrameLow => 1,
        WallRole::FrameHigh => 2,
    }
}

/// The two local tile coordinates of a doorway gap: the center column/row
/// and its neighbor toward the low side for up/left edges, toward the high
/// side for down/right edges. `add_tiles` leaves exactly these cells open.
pub fn door_gap(size: u32, direction: Direction) -> [GridPos; 2] {
    let center = (size / 2) as i32;
    let edge = (size - 1) as i32;
    match direction {
        Direction::Up => [GridPos { y: 0, x: center - 1 }, GridPos { y: 0, x: center }],
        Direction::Down => [GridPos { y: edge, x: center }, GridPos { y: edge, x: center + 1 }],
        Direction::Left => [GridPos { y: center - 1, x: 0 }, GridPos { y: center, x: 0 }],
        Direction::Right => [GridPos { y: center, x: edge }, GridPos { y: center + 1, x: edge }],
    }
}

pub(super) struct RoomTiles {
    pub(super) walls: BTreeMap<GridPos, Tile>,
    pub(super) floors: BTreeMap<GridPos, Tile>,
}

/// Lays out one room's tiles. Floors cover the full grid so doorways stay
/// visually continuous; walls ring the edges except at open doorway gaps.
pub(super) fn place_room_tiles(
    origin: GridPos,
    size: u32,
    tile_len: u32,
    connections: &BTreeSet<Direction>,
    atlas: &TileAtlas,
) -> Result<RoomTiles, TileError> {
    let mut walls = BTreeMap::new();
    let mut floors = BTreeMap::new();

    for y in 0..size as i32 {
        for x in 0..size as i32 {
            let local = GridPos { y, x };
            floors.insert(local, make_tile(origin, size, tile_len, local, FLOOR_TILE_INDEX, false, atlas)?);
        }
    }

    for direction in Direction::ALL {
        let open = connections.contains(&direction);
        let gap = door_gap(size, direction);
        for local in edge_cells(size, direction) {
            if open && (local == gap[0] || local == gap[1]) {
                continue;
            }
            let role = if open {
                let value = axis_value(direction, local);
                if value == axis_value(direction, gap[0]) - 1 {
                    WallRole::FrameLow
                } else if value == axis_value(direction, gap[1]) + 1 {
                    WallRole::FrameHigh
                } else {
                    WallRole::Straight
                }
            } else {
                WallRole::Straight
            };
            let index = wall_tile_index(direction, role);
            walls.insert(local, make_tile(origin, size, tile_len, local, index, true, atlas)?);
        }
    }

    let edge = (size - 1) as i32;
    for (corner, index) in CORNER_TILE_INDICES {
        let local = match corner {
            Corner::TopLeft => GridPos { y: 0, x: 0 },
            Corner::TopRight => GridPos { y: 0, x: edge },
            Corner::BottomLeft => GridPos { y: edge, x: 0 },
            Corner::BottomRight => GridPos { y: edge, x: edge },
        };
        walls.insert(local, make_tile(origin, size, tile_len, local, index, true, atlas)?);
    }

    Ok(RoomTiles { walls, floors })
}

/// Cells of one edge, corners excluded (corners keep their own tiles).
fn edge_cells(size: u32, direction: Direction) -> Vec<GridPos> {
    let edge = (size - 1) as i32;
    (1..edge)
        .map(|along| match direction {
            Direction::Up => GridPos { y: 0, x: along },
            Direction::Down => GridPos { y: edge, x: along },
            Direction::Left => GridPos { y: along, x: 0 },
            Direction::Right => GridPos { y: along, x: edge },
        })
        .collect()
}

/// Coordinate that varies along the given edge.
fn axis_value(direction: Direction, local: GridPos) -> i32 {
    match direction {
        Direction::Up | Direction::Down => local.x,
        Direction::Left | Direction::Right => local.y,
    }
}

fn make_tile(
    origin: GridPos,
    size: u32,
    tile_len: u32,
    local: GridPos,
    index: usize,
    is_wall: bool,
    atlas: &TileAtlas,
) -> Result<Tile, TileError> {
    let room_len = (size * tile_len) as f32;
    let pos = WorldPos {
        x: origin.x as f32 * room_len + (local.x * tile_len as i32) as f32,
        y: origin.y as f32 * room_len + (local.y * tile_len as i32) as f32,
    };
    Ok(Tile { index, image: atlas.get(index)?.clone(), pos, is_wall })
}
