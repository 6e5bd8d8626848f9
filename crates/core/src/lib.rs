pub mod content;
pub mod dungeon;
pub mod image;
pub mod rng;
pub mod scene;
pub mod tiles;
pub mod types;

pub use dungeon::{Floor, FloorParams, FloorSnapshot, Room, RoomSnapshot, generate_floor};
pub use scene::{HeadlessScene, Scene};
pub use types::*;
