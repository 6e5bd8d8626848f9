//! Floor orchestration: the generation passes, retrofits, per-frame update
//! dispatch, and the query surface.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::rng::{FloorRng, entropy_seed};
use crate::scene::Scene;
use crate::tiles::TileAtlas;
use crate::types::{
    Direction, EntityArchetype, EntityId, GenerationError, GridPos, PositionError, RoomKind,
    RoomState, WorldPos,
};

use super::model::{FloorParams, FloorSnapshot};
use super::room::Room;
use super::{growth, retrofit};

/// Owns the room arena and the single random stream behind it.
///
/// Rooms reference each other only by grid coordinate; the arena is the one
/// place a room can be looked up, swapped (retrofits), or iterated.
pub struct Floor {
    params: FloorParams,
    seed: u64,
    rng: FloorRng,
    rooms: BTreeMap<GridPos, Room>,
    item_pool: Vec<String>,
    player: Option<EntityId>,
}

impl Floor {
    /// Validates parameters up front: a bad room size must fail before any
    /// room exists.
    pub fn new(params: FloorParams) -> Result<Self, GenerationError> {
        params.validate()?;
        let item_pool = params.item_pool.clone();
        Ok(Self {
            params,
            seed: 0,
            rng: FloorRng::new(0),
            rooms: BTreeMap::new(),
            item_pool,
            player: None,
        })
    }

    /// Runs the whole generation pass synchronously: graph growth, the boss
    /// and upgrade retrofits, player placement, and tile materialization.
    /// Returns the resolved seed so callers can surface or persist it.
    ///
    /// Any error leaves no partially-built floor behind gameplay: the error
    /// propagates before the floor is handed to the frame loop.
    pub fn generate(
        &mut self,
        scene: &mut impl Scene,
        seed: Option<u64>,
    ) -> Result<u64, GenerationError> {
        let seed = seed.unwrap_or_else(entropy_seed);
        self.seed = seed;
        self.rng = FloorRng::new(seed);
        self.item_pool = self.params.item_pool.clone();

        self.rooms = growth::grow_room_graph(&mut self.rng, &self.params);
        retrofit::retrofit_boss_room(&mut self.rooms, &self.params)?;
        retrofit::retrofit_upgrade_room(&mut self.rooms, &self.params, &mut self.rng);

        if let Some(spawn) = self.rooms.get(&GridPos::ORIGIN) {
            let center = spawn.bounds().center();
            self.player = Some(scene.spawn_entity(EntityArchetype::Player, center));
        }

        let atlas_image = scene
            .image(&self.params.atlas_key)
            .map_err(|err| GenerationError::MissingImage(err.0))?
            .clone();
        let atlas = TileAtlas::new(&atlas_image, self.params.tile_len);

        let coords: Vec<GridPos> = self.rooms.keys().copied().collect();
        for coord in coords {
            let open: BTreeSet<Direction> = self.rooms[&coord]
                .connections()
                .iter()
                .copied()
                .filter(|&direction| self.rooms.contains_key(&coord.step(direction)))
                .collect();
            let Some(room) = self.rooms.get_mut(&coord) else {
                continue;
            };
            room.add_tiles(&atlas, scene)?;
            room.merge_tiles(scene);
            room.build_shade_mask(scene, &open);
            if room.kind() == RoomKind::Upgrade {
                room.install_shrine(scene);
            }
        }

        // The spawn room is never gated: activated, completed, and revealed
        // the moment the floor exists.
        if let Some(spawn) = self.rooms.get_mut(&GridPos::ORIGIN) {
            spawn.force_complete(scene);
        }

        debug!("floor generated: seed {seed}, {} rooms", self.rooms.len());
        Ok(seed)
    }

    /// One frame: every room checks its own transition conditions. Order
    /// between rooms carries no meaning; transitions are local and fire once.
    pub fn update(&mut self, scene: &mut impl Scene) {
        for room in self.rooms.values_mut() {
            room.update(scene, &mut self.rng, &mut self.item_pool);
        }
    }

    pub fn params(&self) -> &FloorParams {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn rooms(&self) -> &BTreeMap<GridPos, Room> {
        &self.rooms
    }

    pub fn room_at(&self, coord: GridPos) -> Option<&Room> {
        self.rooms.get(&coord)
    }

    pub fn spawn_room(&self) -> Option<&Room> {
        self.rooms.get(&GridPos::ORIGIN)
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    /// The room covering a world-space point.
    pub fn room_at_world(&self, point: WorldPos) -> Result<&Room, PositionError> {
        let len = self.params.room_world_len();
        let coord =
            GridPos { y: (point.y / len).floor() as i32, x: (point.x / len).floor() as i32 };
        self.rooms
            .get(&coord)
            .ok_or(PositionError::OutOfBounds { x: point.x, y: point.y })
    }

    pub fn completion_status(&self) -> (usize, usize) {
        let completed =
            self.rooms.values().filter(|room| room.state() == RoomState::Completed).count();
        (completed, self.rooms.len())
    }

    /// Administrative completion for debug tooling. False when no room
    /// occupies the coordinate.
    pub fn force_complete_room(&mut self, coord: GridPos, scene: &mut impl Scene) -> bool {
        match self.rooms.get_mut(&coord) {
            Some(room) => {
                room.force_complete(scene);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> FloorSnapshot {
        FloorSnapshot {
            seed: self.seed,
            room_size: self.params.room_size,
            rooms: self.rooms.values().map(Room::snapshot).collect(),
        }
    }
}
