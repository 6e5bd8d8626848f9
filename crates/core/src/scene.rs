//! Collaborator contracts toward the scene graph, asset store, and audio.
//!
//! The dungeon core never owns rendering or entity behavior; it asks the
//! scene to look up images, instantiate entities, and fire sound cues, and
//! reads back only the player rectangle and enemy liveness.

use std::collections::BTreeMap;

use slotmap::SlotMap;
use thiserror::Error;

use crate::content::keys;
use crate::image::ImageBuffer;
use crate::tiles::builtin_atlas;
use crate::types::{EntityArchetype, EntityId, RenderLayer, SpriteId, WorldPos, WorldRect};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no image registered for key '{0}'")]
pub struct UnknownImage(pub String);

pub trait Scene {
    /// Named image asset; absence is a lookup error.
    fn image(&self, key: &str) -> Result<&ImageBuffer, UnknownImage>;

    /// Instantiates a gameplay entity into the scene graph and registers it
    /// for id-based lookup.
    fn spawn_entity(&mut self, archetype: EntityArchetype, pos: WorldPos) -> EntityId;

    fn despawn_entity(&mut self, id: EntityId);

    /// False once the entity died or was despawned.
    fn entity_alive(&self, id: EntityId) -> bool;

    /// Registers a wall rectangle into the global collidable set.
    fn add_collider(&mut self, rect: WorldRect);

    /// Axis-aligned intersection test against the collidable set.
    fn wall_overlaps(&self, rect: WorldRect) -> bool;

    fn add_sprite(&mut self, layer: RenderLayer, image: ImageBuffer, pos: WorldPos) -> SpriteId;

    fn remove_sprite(&mut self, id: SpriteId);

    /// Begins the fade-out of an overlay sprite; purely visual.
    fn start_fade(&mut self, sprite: SpriteId);

    /// Fire-and-forget audio cue.
    fn play_sound(&mut self, key: &str, volume: f32);

    fn player_rect(&self) -> WorldRect;

    fn player_position(&self) -> WorldPos {
        self.player_rect().center()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpawnedEntity {
    pub archetype: EntityArchetype,
    pub pos: WorldPos,
    pub alive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneSprite {
    pub layer: RenderLayer,
    pub image: ImageBuffer,
    pub pos: WorldPos,
}

const PLAYER_RECT_LEN: f32 = 12.0;

/// Recording scene with no renderer behind it.
///
/// Backs the tools CLI and the test suites: every spawn, collider, sound,
/// and fade is kept for inspection, and the player rectangle is settable.
pub struct HeadlessScene {
    images: BTreeMap<String, ImageBuffer>,
    pub entities: SlotMap<EntityId, SpawnedEntity>,
    pub sprites: SlotMap<SpriteId, SceneSprite>,
    pub colliders: Vec<WorldRect>,
    pub sounds: Vec<(String, f32)>,
    pub fades: Vec<SpriteId>,
    player_rect: WorldRect,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self {
            images: BTreeMap::new(),
            entities: SlotMap::with_key(),
            sprites: SlotMap::with_key(),
            colliders: Vec::new(),
            sounds: Vec::new(),
            fades: Vec::new(),
            // Far outside any generated room until a player spawns.
            player_rect: WorldRect::new(-1.0e9, -1.0e9, PLAYER_RECT_LEN, PLAYER_RECT_LEN),
        }
    }

    /// Scene pre-loaded with the placeholder tile atlas.
    pub fn with_tile_atlas(tile_len: u32) -> Self {
        let mut scene = Self::new();
        scene.register_image(keys::IMAGE_TILE_ATLAS, builtin_atlas(tile_len));
        scene
    }

    pub fn register_image(&mut self, key: &str, image: ImageBuffer) {
        self.images.insert(key.to_string(), image);
    }

    pub fn set_player_rect(&mut self, rect: WorldRect) {
        self.player_rect = rect;
    }

    /// Marks an entity dead without removing it, as combat would.
    pub fn kill(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.alive = false;
        }
    }

    pub fn living_ids_where(
        &self,
        matches: impl Fn(&EntityArchetype) -> bool,
    ) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.alive && matches(&entity.archetype))
            .map(|(id, _)| id)
            .collect()
    }
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for HeadlessScene {
    fn image(&self, key: &str) -> Result<&ImageBuffer, UnknownImage> {
        self.images.get(key).ok_or_else(|| UnknownImage(key.to_string()))
    }

    fn spawn_entity(&mut self, archetype: EntityArchetype, pos: WorldPos) -> EntityId {
        if archetype == EntityArchetype::Player {
            self.player_rect = WorldRect::new(
                pos.x - PLAYER_RECT_LEN / 2.0,
                pos.y - PLAYER_RECT_LEN / 2.0,
                PLAYER_RECT_LEN,
                PLAYER_RECT_LEN,
            );
        }
        self.entities.insert(SpawnedEntity { archetype, pos, alive: true })
    }

    fn despawn_entity(&mut self, id: EntityId) {
        self.entities.remove(id);
    }

    fn entity_alive(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(|entity| entity.alive)
    }

    fn add_collider(&mut self, rect: WorldRect) {
        self.colliders.push(rect);
    }

    fn wall_overlaps(&self, rect: WorldRect) -> bool {
        self.colliders.iter().any(|collider| collider.intersects(&rect))
    }

    fn add_sprite(&mut self, layer: RenderLayer, image: ImageBuffer, pos: WorldPos) -> SpriteId {
        self.sprites.insert(SceneSprite { layer, image, pos })
    }

    fn remove_sprite(&mut self, id: SpriteId) {
        self.sprites.remove(id);
    }

    fn start_fade(&mut self, sprite: SpriteId) {
        self.fades.push(sprite);
    }

    fn play_sound(&mut self, key: &str, volume: f32) {
        self.sounds.push((key.to_string(), volume));
    }

    fn player_rect(&self) -> WorldRect {
        self.player_rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_lookup_fails_for_unknown_keys() {
        let scene = HeadlessScene::new();
        assert_eq!(scene.image("missing"), Err(UnknownImage("missing".to_string())));
    }

    #[test]
    fn killed_entities_stop_reporting_alive() {
        let mut scene = HeadlessScene::new();
        let id = scene.spawn_entity(
            EntityArchetype::Enemy(crate::types::EnemyKind::GraveRat),
            WorldPos { x: 4.0, y: 4.0 },
        );
        assert!(scene.entity_alive(id));

        scene.kill(id);
        assert!(!scene.entity_alive(id));
        assert!(scene.entities.contains_key(id), "corpse stays registered");
    }

    #[test]
    fn spawning_the_player_moves_the_player_rect() {
        let mut scene = HeadlessScene::new();
        scene.spawn_entity(EntityArchetype::Player, WorldPos { x: 100.0, y: 60.0 });

        let rect = scene.player_rect();
        assert_eq!(rect.center(), WorldPos { x: 100.0, y: 60.0 });
    }

    #[test]
    fn wall_overlap_checks_every_registered_collider() {
        let mut scene = HeadlessScene::new();
        scene.add_collider(WorldRect::new(0.0, 0.0, 16.0, 16.0));
        scene.add_collider(WorldRect::new(64.0, 0.0, 16.0, 16.0));

        assert!(scene.wall_overlaps(WorldRect::new(70.0, 4.0, 8.0, 8.0)));
        assert!(!scene.wall_overlaps(WorldRect::new(30.0, 30.0, 8.0, 8.0)));
    }
}
