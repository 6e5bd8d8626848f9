//! A single dungeon room: tile ownership, doorways, and the
//! dormant → activated → completed lifecycle.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::content::keys;
use crate::image::ImageBuffer;
use crate::rng::FloorRng;
use crate::scene::Scene;
use crate::tiles::{Tile, TileAtlas, TileBatch, TileError};
use crate::types::{
    Direction, EnemyKind, EntityArchetype, EntityId, GridPos, RenderLayer, RoomKind, RoomState,
    SpriteId, WorldPos, WorldRect,
};

use super::layout::{self, RoomTiles};
use super::model::{FloorParams, RoomSnapshot};
use super::rewards;

const ENEMY_PLACEMENT_ATTEMPTS: u32 = 32;
const DOOR_SOUND_VOLUME: f32 = 0.8;

pub struct Room {
    origin: GridPos,
    size: u32,
    tile_len: u32,
    kind: RoomKind,
    state: RoomState,
    connections: BTreeSet<Direction>,
    tags: BTreeSet<String>,
    enemy_pool: BTreeMap<EnemyKind, u32>,
    wall_tiles: BTreeMap<GridPos, Tile>,
    floor_tiles: BTreeMap<GridPos, Tile>,
    live_enemies: Vec<EntityId>,
    door_blockers: Vec<EntityId>,
    floor_sprite: Option<SpriteId>,
    wall_sprite: Option<SpriteId>,
    shade_sprite: Option<SpriteId>,
}

impl Room {
    pub(super) fn new(
        origin: GridPos,
        params: &FloorParams,
        kind: RoomKind,
        connections: BTreeSet<Direction>,
        enemy_pool: BTreeMap<EnemyKind, u32>,
    ) -> Self {
        let mut tags = BTreeSet::new();
        match kind {
            RoomKind::Normal => {}
            RoomKind::Spawn => {
                tags.insert("spawn".to_string());
            }
            RoomKind::Boss => {
                tags.insert("boss".to_string());
            }
            RoomKind::Upgrade => {
                tags.insert("upgrade".to_string());
            }
        }
        Self {
            origin,
            size: params.room_size,
            tile_len: params.tile_len,
            kind,
            state: RoomState::Dormant,
            connections,
            tags,
            enemy_pool,
            wall_tiles: BTreeMap::new(),
            floor_tiles: BTreeMap::new(),
            live_enemies: Vec::new(),
            door_blockers: Vec::new(),
            floor_sprite: None,
            wall_sprite: None,
            shade_sprite: None,
        }
    }

    pub fn origin(&self) -> GridPos {
        self.origin
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    pub fn state(&self) -> RoomState {
        self.state
    }

    pub fn connections(&self) -> &BTreeSet<Direction> {
        &self.connections
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn enemy_pool(&self) -> &BTreeMap<EnemyKind, u32> {
        &self.enemy_pool
    }

    /// A leaf has exactly one doorway.
    pub fn is_leaf(&self) -> bool {
        self.connections.len() == 1
    }

    pub fn bounds(&self) -> WorldRect {
        let len = (self.size * self.tile_len) as f32;
        WorldRect::new(self.origin.x as f32 * len, self.origin.y as f32 * len, len, len)
    }

    /// Bounds inset by the wall ring.
    pub fn interior(&self) -> WorldRect {
        let inset = self.tile_len as f32;
        let bounds = self.bounds();
        WorldRect::new(
            bounds.x + inset,
            bounds.y + inset,
            bounds.w - 2.0 * inset,
            bounds.h - 2.0 * inset,
        )
    }

    pub fn door_gap(&self, direction: Direction) -> [GridPos; 2] {
        layout::door_gap(self.size, direction)
    }

    /// World-space midpoint of a doorway gap, where door blockers sit.
    pub fn door_world_center(&self, direction: Direction) -> WorldPos {
        let [low, high] = self.door_gap(direction);
        let low_center = self.tile_world_rect(low).center();
        let high_center = self.tile_world_rect(high).center();
        WorldPos {
            x: (low_center.x + high_center.x) / 2.0,
            y: (low_center.y + high_center.y) / 2.0,
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            y: self.origin.y,
            x: self.origin.x,
            kind: self.kind,
            state: self.state,
            connections: self.connections.iter().copied().collect(),
            tags: self.tags.iter().cloned().collect(),
            enemy_pool: self.enemy_pool.iter().map(|(&kind, &count)| (kind, count)).collect(),
        }
    }

    /// Lays out this room's walls and floors and registers every wall rect
    /// into the scene's collidable set.
    pub(super) fn add_tiles(
        &mut self,
        atlas: &TileAtlas,
        scene: &mut impl Scene,
    ) -> Result<(), TileError> {
        let RoomTiles { walls, floors } = layout::place_room_tiles(
            self.origin,
            self.size,
            self.tile_len,
            &self.connections,
            atlas,
        )?;
        for tile in walls.values() {
            scene.add_collider(tile.rect());
        }
        self.wall_tiles = walls;
        self.floor_tiles = floors;
        Ok(())
    }

    /// Merges the per-tile images into one floor batch and one wall batch.
    /// The individual tiles are consumed: floors disappear entirely, walls
    /// live on only as the collision rects already registered.
    pub(super) fn merge_tiles(&mut self, scene: &mut impl Scene) {
        if let Some(batch) = TileBatch::merge(self.floor_tiles.values()) {
            self.floor_sprite = Some(scene.add_sprite(RenderLayer::Floor, batch.image, batch.origin));
        }
        if let Some(batch) = TileBatch::merge(self.wall_tiles.values()) {
            self.wall_sprite = Some(scene.add_sprite(RenderLayer::Wall, batch.image, batch.origin));
        }
        self.floor_tiles.clear();
        self.wall_tiles.clear();
    }

    /// Full-room black mask, punched through at doorway gaps toward placed
    /// neighbors. Fading it out on activation is the room reveal effect.
    pub(super) fn build_shade_mask(
        &mut self,
        scene: &mut impl Scene,
        open_directions: &BTreeSet<Direction>,
    ) {
        let len_px = self.size * self.tile_len;
        let mut mask = ImageBuffer::filled(len_px, len_px, [0, 0, 0, 255]);
        for &direction in open_directions {
            for cell in self.door_gap(direction) {
                mask.fill_rect(
                    cell.x as u32 * self.tile_len,
                    cell.y as u32 * self.tile_len,
                    self.tile_len,
                    self.tile_len,
                    [0, 0, 0, 0],
                );
            }
        }
        let bounds = self.bounds();
        self.shade_sprite =
            Some(scene.add_sprite(RenderLayer::Overlay, mask, WorldPos { x: bounds.x, y: bounds.y }));
    }

    /// The upgrade shrine and the collider for its base.
    pub(super) fn install_shrine(&self, scene: &mut impl Scene) {
        let center = self.bounds().center();
        scene.spawn_entity(EntityArchetype::Shrine, center);
        let len = self.tile_len as f32;
        scene.add_collider(WorldRect::new(center.x - len / 2.0, center.y - len / 2.0, len, len));
    }

    /// One lifecycle tick. Transitions only fire once; re-checking a room
    /// that already moved on is a no-op.
    pub(super) fn update(
        &mut self,
        scene: &mut impl Scene,
        rng: &mut FloorRng,
        item_pool: &mut Vec<String>,
    ) {
        match self.state {
            RoomState::Dormant => {
                if self.bounds().contains_rect(&scene.player_rect()) {
                    self.activate(scene, rng);
                }
            }
            RoomState::Activated => {
                self.live_enemies.retain(|&id| scene.entity_alive(id));
                if self.live_enemies.is_empty() {
                    self.complete(scene, rng, item_pool);
                }
            }
            RoomState::Completed => {}
        }
    }

    /// Administrative completion: no spawns, no reward, state jumps straight
    /// to completed and the reveal fade still runs.
    pub(super) fn force_complete(&mut self, scene: &mut impl Scene) {
        if self.state == RoomState::Completed {
            return;
        }
        self.enemy_pool.clear();
        for id in std::mem::take(&mut self.live_enemies) {
            scene.despawn_entity(id);
        }
        for id in std::mem::take(&mut self.door_blockers) {
            scene.despawn_entity(id);
        }
        if self.state == RoomState::Dormant
            && let Some(sprite) = self.shade_sprite
        {
            scene.start_fade(sprite);
        }
        self.state = RoomState::Completed;
    }

    fn activate(&mut self, scene: &mut impl Scene, rng: &mut FloorRng) {
        self.state = RoomState::Activated;
        debug!("room {:?} activated", self.origin);
        if let Some(sprite) = self.shade_sprite {
            scene.start_fade(sprite);
        }
        if !self.seals_doors() {
            return;
        }

        let pool = std::mem::take(&mut self.enemy_pool);
        for (kind, count) in pool {
            for _ in 0..count {
                let pos = self.sample_enemy_position(&*scene, rng);
                let id = scene.spawn_entity(EntityArchetype::Enemy(kind), pos);
                self.live_enemies.push(id);
            }
        }

        let directions: Vec<Direction> = self.connections.iter().copied().collect();
        for direction in directions {
            let pos = self.door_world_center(direction);
            let id = scene.spawn_entity(EntityArchetype::DoorBlocker(direction), pos);
            self.door_blockers.push(id);
        }
        scene.play_sound(keys::SOUND_DOORS_CLOSE, DOOR_SOUND_VOLUME);
    }

    fn complete(&mut self, scene: &mut impl Scene, rng: &mut FloorRng, item_pool: &mut Vec<String>) {
        self.state = RoomState::Completed;
        debug!("room {:?} completed", self.origin);

        let had_blockers = !self.door_blockers.is_empty();
        for id in std::mem::take(&mut self.door_blockers) {
            scene.despawn_entity(id);
        }
        if had_blockers {
            scene.play_sound(keys::SOUND_DOORS_OPEN, DOOR_SOUND_VOLUME);
        }

        if !self.grants_reward() {
            return;
        }
        if let Some(kind) = rewards::roll_reward(rng, item_pool) {
            scene.spawn_entity(EntityArchetype::Chest(kind), self.bounds().center());
        }
    }

    /// Random interior position, re-rolled while the enemy's rectangle
    /// overlaps a wall. Falls back to the interior center if every attempt
    /// collides.
    fn sample_enemy_position(&self, scene: &impl Scene, rng: &mut FloorRng) -> WorldPos {
        let interior = self.interior();
        let len = self.tile_len as f32;
        for _ in 0..ENEMY_PLACEMENT_ATTEMPTS {
            let x = rng.range_f32(interior.x, interior.right() - len);
            let y = rng.range_f32(interior.y, interior.bottom() - len);
            let candidate = WorldRect::new(x, y, len, len);
            if !scene.wall_overlaps(candidate) {
                return candidate.center();
            }
        }
        interior.center()
    }

    /// Rooms the player can be locked into. Spawn and upgrade rooms skip
    /// enemies and door seals entirely.
    fn seals_doors(&self) -> bool {
        matches!(self.kind, RoomKind::Normal | RoomKind::Boss)
    }

    /// The upgrade room has its own persistent shrine instead of a chest;
    /// the spawn room never fights, so it never earns one either.
    fn grants_reward(&self) -> bool {
        matches!(self.kind, RoomKind::Normal | RoomKind::Boss)
    }

    fn tile_world_rect(&self, local: GridPos) -> WorldRect {
        let len = self.tile_len as f32;
        let bounds = self.bounds();
        WorldRect::new(
            bounds.x + local.x as f32 * len,
            bounds.y + local.y as f32 * len,
            len,
            len,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::HeadlessScene;
    use crate::tiles::builtin_atlas;

    fn params() -> FloorParams {
        FloorParams::default()
    }

    fn room_with(kind: RoomKind, connections: &[Direction]) -> Room {
        Room::new(
            GridPos::ORIGIN,
            &params(),
            kind,
            connections.iter().copied().collect(),
            BTreeMap::from([(EnemyKind::GraveRat, 2)]),
        )
    }

    fn materialized(kind: RoomKind, connections: &[Direction]) -> (Room, HeadlessScene) {
        let mut scene = HeadlessScene::with_tile_atlas(16);
        let atlas = TileAtlas::new(&builtin_atlas(16), 16);
        let mut room = room_with(kind, connections);
        room.add_tiles(&atlas, &mut scene).expect("builtin atlas covers layout indices");
        room.merge_tiles(&mut scene);
        let open = room.connections().clone();
        room.build_shade_mask(&mut scene, &open);
        (room, scene)
    }

    fn enter(room: &Room, scene: &mut HeadlessScene) {
        let center = room.bounds().center();
        scene.set_player_rect(WorldRect::new(center.x - 6.0, center.y - 6.0, 12.0, 12.0));
    }

    #[test]
    fn door_world_center_sits_on_the_doorway_midpoint() {
        let room = room_with(RoomKind::Normal, &[Direction::Down]);
        assert_eq!(room.door_world_center(Direction::Down), WorldPos { x: 80.0, y: 120.0 });
    }

    #[test]
    fn merging_consumes_the_individual_tiles() {
        let (room, scene) = materialized(RoomKind::Normal, &[Direction::Down]);
        assert!(room.wall_tiles.is_empty());
        assert!(room.floor_tiles.is_empty());
        // One floor batch, one wall batch, one shade mask.
        assert_eq!(scene.sprites.len(), 3);
        // Collision keeps the per-tile rects: full perimeter minus the gap.
        assert_eq!(scene.colliders.len(), 26);
    }

    #[test]
    fn player_containment_activates_and_seals_a_normal_room() {
        let (mut room, mut scene) = materialized(RoomKind::Normal, &[Direction::Down, Direction::Left]);
        let mut rng = FloorRng::new(7);
        let mut pool = Vec::new();

        enter(&room, &mut scene);
        room.update(&mut scene, &mut rng, &mut pool);

        assert_eq!(room.state(), RoomState::Activated);
        assert!(room.enemy_pool().is_empty(), "pool is consumed on activation");
        assert_eq!(room.live_enemies.len(), 2);
        assert_eq!(room.door_blockers.len(), 2);
        assert_eq!(scene.sounds, vec![(keys::SOUND_DOORS_CLOSE.to_string(), DOOR_SOUND_VOLUME)]);
        assert_eq!(scene.fades.len(), 1);
    }

    #[test]
    fn a_partially_overlapping_player_does_not_activate() {
        let (mut room, mut scene) = materialized(RoomKind::Normal, &[Direction::Down]);
        let mut rng = FloorRng::new(7);
        let mut pool = Vec::new();

        let bounds = room.bounds();
        scene.set_player_rect(WorldRect::new(bounds.x - 4.0, bounds.y + 10.0, 12.0, 12.0));
        room.update(&mut scene, &mut rng, &mut pool);

        assert_eq!(room.state(), RoomState::Dormant);
    }

    #[test]
    fn spawned_enemies_stay_inside_the_interior() {
        let (mut room, mut scene) = materialized(RoomKind::Normal, &[Direction::Up]);
        let mut rng = FloorRng::new(99);
        let mut pool = Vec::new();

        enter(&room, &mut scene);
        room.update(&mut scene, &mut rng, &mut pool);

        let interior = room.interior();
        for (_, entity) in scene.entities.iter() {
            if let EntityArchetype::Enemy(_) = entity.archetype {
                assert!(interior.contains_point(entity.pos), "{:?} outside interior", entity.pos);
            }
        }
    }

    #[test]
    fn clearing_all_enemies_completes_and_unseals_the_room() {
        let (mut room, mut scene) = materialized(RoomKind::Normal, &[Direction::Down]);
        let mut rng = FloorRng::new(3);
        let mut pool = vec!["item_phase_dagger".to_string()];

        enter(&room, &mut scene);
        room.update(&mut scene, &mut rng, &mut pool);
        for id in scene.living_ids_where(|a| matches!(a, EntityArchetype::Enemy(_))) {
            scene.kill(id);
        }
        room.update(&mut scene, &mut rng, &mut pool);

        assert_eq!(room.state(), RoomState::Completed);
        assert!(room.door_blockers.is_empty());
        assert!(
            !scene
                .entities
                .values()
                .any(|entity| matches!(entity.archetype, EntityArchetype::DoorBlocker(_))),
            "door blockers are removed on completion"
        );
        let chests = scene
            .entities
            .values()
            .filter(|entity| matches!(entity.archetype, EntityArchetype::Chest(_)))
            .count();
        assert_eq!(chests, 1, "exactly one reward chest");
    }

    #[test]
    fn completed_rooms_never_regress() {
        let (mut room, mut scene) = materialized(RoomKind::Normal, &[Direction::Down]);
        let mut rng = FloorRng::new(3);
        let mut pool = Vec::new();

        enter(&room, &mut scene);
        room.update(&mut scene, &mut rng, &mut pool);
        for id in scene.living_ids_where(|a| matches!(a, EntityArchetype::Enemy(_))) {
            scene.kill(id);
        }
        room.update(&mut scene, &mut rng, &mut pool);
        assert_eq!(room.state(), RoomState::Completed);

        let chest_count = scene.entities.len();
        for _ in 0..5 {
            room.update(&mut scene, &mut rng, &mut pool);
        }
        assert_eq!(room.state(), RoomState::Completed);
        assert_eq!(scene.entities.len(), chest_count, "no further side effects");
    }

    #[test]
    fn upgrade_rooms_activate_without_enemies_or_seals_and_skip_the_reward() {
        let (mut room, mut scene) = materialized(RoomKind::Upgrade, &[Direction::Down]);
        let mut rng = FloorRng::new(17);
        let mut pool = vec!["item_phase_dagger".to_string()];

        enter(&room, &mut scene);
        room.update(&mut scene, &mut rng, &mut pool);
        assert_eq!(room.state(), RoomState::Activated);
        assert!(scene.entities.is_empty(), "no enemies, no blockers");
        assert!(scene.sounds.is_empty());
        assert_eq!(scene.fades.len(), 1, "the reveal fade still runs");

        room.update(&mut scene, &mut rng, &mut pool);
        assert_eq!(room.state(), RoomState::Completed);
        assert!(scene.entities.is_empty(), "no reward chest either");
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn force_complete_skips_every_side_effect_but_the_fade() {
        let (mut room, mut scene) = materialized(RoomKind::Normal, &[Direction::Up]);
        room.force_complete(&mut scene);

        assert_eq!(room.state(), RoomState::Completed);
        assert!(room.enemy_pool().is_empty());
        assert!(scene.entities.is_empty());
        assert_eq!(scene.fades.len(), 1);
    }
}
