//! Dungeon floor domain split into coherent submodules.

mod floor;
mod growth;
mod layout;
mod model;
mod retrofit;
mod rewards;
mod room;

pub use floor::Floor;
pub use layout::door_gap;
pub use model::{FloorParams, FloorSnapshot, RoomSnapshot};
pub use room::Room;

use crate::scene::Scene;
use crate::types::GenerationError;

/// Builds and generates a floor in one call.
pub fn generate_floor(
    scene: &mut impl Scene,
    params: FloorParams,
    seed: Option<u64>,
) -> Result<Floor, GenerationError> {
    let mut floor = Floor::new(params)?;
    floor.generate(scene, seed)?;
    Ok(floor)
}
