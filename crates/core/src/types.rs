use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    pub struct EntityId;
    pub struct SpriteId;
}

/// A room's position on the floor grid, in room units (not pixels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub y: i32,
    pub x: i32,
}

impl GridPos {
    pub const ORIGIN: GridPos = GridPos { y: 0, x: 0 };

    pub fn step(self, direction: Direction) -> GridPos {
        let offset = direction.offset();
        GridPos { y: self.y + offset.y, x: self.x + offset.x }
    }

    /// Euclidean distance to the floor origin, in room units.
    pub fn distance_from_origin(self) -> f32 {
        ((self.x * self.x + self.y * self.y) as f32).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit offset in grid space. Up is negative y, matching screen space.
    pub fn offset(self) -> GridPos {
        match self {
            Direction::Up => GridPos { y: -1, x: 0 },
            Direction::Down => GridPos { y: 1, x: 0 },
            Direction::Left => GridPos { y: 0, x: -1 },
            Direction::Right => GridPos { y: 0, x: 1 },
        }
    }
}

/// A point in world space, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

/// An axis-aligned rectangle in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl WorldRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> WorldPos {
        WorldPos { x: self.x + self.w / 2.0, y: self.y + self.h / 2.0 }
    }

    pub fn contains_point(&self, point: WorldPos) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn contains_rect(&self, other: &WorldRect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersects(&self, other: &WorldRect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    GraveRat,
    BoneArcher,
    PitSpider,
    HollowKnight,
    CryptTyrant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChestKind {
    Item,
    Coin,
    Health,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    Normal,
    Spawn,
    Boss,
    Upgrade,
}

/// Lifecycle of a room. Transitions only move forward; the derived ordering
/// makes that invariant checkable (`Dormant < Activated < Completed`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomState {
    Dormant,
    Activated,
    Completed,
}

/// What the external entity factory is asked to instantiate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityArchetype {
    Player,
    Enemy(EnemyKind),
    DoorBlocker(Direction),
    Chest(ChestKind),
    Shrine,
}

/// Render ordering for merged tile sprites. Floors draw behind walls,
/// shade overlays draw on top of everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RenderLayer {
    Floor,
    Wall,
    Overlay,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("room size {0} is odd; doorway gaps need an even tile count")]
    OddRoomSize(u32),
    #[error("room size {0} cannot hold a centered two-tile doorway gap")]
    RoomSizeTooSmall(u32),
    #[error("no leaf room available for the boss retrofit")]
    NoLeafRoom,
    #[error("missing image asset '{0}'")]
    MissingImage(String),
    #[error(transparent)]
    Tile(#[from] crate::tiles::TileError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositionError {
    #[error("no room covers world position ({x}, {y})")]
    OutOfBounds { x: f32, y: f32 },
}
