//! Scene-graph collaborator backed by macroquad textures.
//!
//! Owns the entity registry, the merged tile sprites, the collidable set,
//! and the camera-relative draw pass. The dungeon core only ever sees the
//! `Scene` trait.

use std::collections::BTreeMap;

use core::content::keys;
use core::image::ImageBuffer;
use core::scene::{Scene, UnknownImage};
use core::tiles::builtin_atlas;
use core::{ChestKind, EntityArchetype, EntityId, RenderLayer, SpriteId, WorldPos, WorldRect};
use macroquad::prelude::{
    BLACK, Camera2D, Color, DARKGRAY, FilterMode, LIGHTGRAY, Texture2D, clear_background,
    draw_rectangle, draw_text, draw_texture, screen_height, screen_width, set_camera,
    set_default_camera, vec2,
};
use slotmap::SlotMap;

const PLAYER_LEN: f32 = 12.0;
const ENTITY_LEN: f32 = 12.0;
const FADE_PER_SECOND: f32 = 1.6;
const CAMERA_ZOOM: f32 = 2.0;

pub struct AppEntity {
    pub archetype: EntityArchetype,
    pub pos: WorldPos,
    pub alive: bool,
}

struct AppSprite {
    layer: RenderLayer,
    texture: Texture2D,
    pos: WorldPos,
    alpha: f32,
    fading: bool,
}

pub struct MacroquadScene {
    images: BTreeMap<String, ImageBuffer>,
    pub entities: SlotMap<EntityId, AppEntity>,
    sprites: SlotMap<SpriteId, AppSprite>,
    colliders: Vec<WorldRect>,
    pub recent_cues: Vec<String>,
    player_id: Option<EntityId>,
    player_rect: WorldRect,
}

impl MacroquadScene {
    pub fn new(tile_len: u32) -> Self {
        let mut images = BTreeMap::new();
        images.insert(keys::IMAGE_TILE_ATLAS.to_string(), builtin_atlas(tile_len));
        Self {
            images,
            entities: SlotMap::with_key(),
            sprites: SlotMap::with_key(),
            colliders: Vec::new(),
            recent_cues: Vec::new(),
            player_id: None,
            player_rect: WorldRect::new(-1.0e9, -1.0e9, PLAYER_LEN, PLAYER_LEN),
        }
    }

    /// Moves the player by the given delta, axis by axis, cancelling any
    /// axis that would push the player rect into a wall.
    pub fn move_player(&mut self, dx: f32, dy: f32) {
        let mut rect = self.player_rect;

        let horizontal = WorldRect::new(rect.x + dx, rect.y, rect.w, rect.h);
        if !self.wall_overlaps(horizontal) {
            rect.x = horizontal.x;
        }
        let vertical = WorldRect::new(rect.x, rect.y + dy, rect.w, rect.h);
        if !self.wall_overlaps(vertical) {
            rect.y = vertical.y;
        }

        self.player_rect = rect;
        if let Some(id) = self.player_id
            && let Some(player) = self.entities.get_mut(id)
        {
            player.pos = rect.center();
        }
    }

    /// Advances every running fade toward fully transparent.
    pub fn step_fades(&mut self, dt: f32) {
        for sprite in self.sprites.values_mut() {
            if sprite.fading {
                sprite.alpha = (sprite.alpha - FADE_PER_SECOND * dt).max(0.0);
            }
        }
    }

    /// One frame: world pass under a player-centered camera, then the HUD.
    pub fn draw(&self, status: &str) {
        clear_background(BLACK);

        let center = self.player_rect.center();
        set_camera(&Camera2D {
            target: vec2(center.x, center.y),
            zoom: vec2(CAMERA_ZOOM / screen_width(), CAMERA_ZOOM / screen_height()),
            ..Default::default()
        });

        let mut ordered: Vec<&AppSprite> = self.sprites.values().collect();
        ordered.sort_by_key(|sprite| sprite.layer);
        for sprite in ordered {
            if sprite.alpha <= 0.0 {
                continue;
            }
            let tint = Color::new(1.0, 1.0, 1.0, sprite.alpha);
            draw_texture(&sprite.texture, sprite.pos.x, sprite.pos.y, tint);
        }

        for entity in self.entities.values() {
            if !entity.alive {
                continue;
            }
            let half = ENTITY_LEN / 2.0;
            draw_rectangle(
                entity.pos.x - half,
                entity.pos.y - half,
                ENTITY_LEN,
                ENTITY_LEN,
                entity_color(&entity.archetype),
            );
        }

        set_default_camera();
        draw_text(status, 12.0, 24.0, 24.0, LIGHTGRAY);
        if let Some(cue) = self.recent_cues.last() {
            draw_text(cue, 12.0, 44.0, 20.0, DARKGRAY);
        }
    }
}

fn entity_color(archetype: &EntityArchetype) -> Color {
    match archetype {
        EntityArchetype::Player => Color::from_rgba(240, 240, 240, 255),
        EntityArchetype::Enemy(_) => Color::from_rgba(200, 60, 60, 255),
        EntityArchetype::DoorBlocker(_) => Color::from_rgba(120, 90, 40, 255),
        EntityArchetype::Chest(ChestKind::Item) => Color::from_rgba(220, 180, 60, 255),
        EntityArchetype::Chest(_) => Color::from_rgba(160, 140, 80, 255),
        EntityArchetype::Shrine => Color::from_rgba(90, 140, 220, 255),
    }
}

fn to_texture(image: &ImageBuffer) -> Texture2D {
    let texture =
        Texture2D::from_rgba8(image.width() as u16, image.height() as u16, image.pixels());
    texture.set_filter(FilterMode::Nearest);
    texture
}

impl Scene for MacroquadScene {
    fn image(&self, key: &str) -> Result<&ImageBuffer, UnknownImage> {
        self.images.get(key).ok_or_else(|| UnknownImage(key.to_string()))
    }

    fn spawn_entity(&mut self, archetype: EntityArchetype, pos: WorldPos) -> EntityId {
        let is_player = archetype == EntityArchetype::Player;
        let id = self.entities.insert(AppEntity { archetype, pos, alive: true });
        if is_player {
            self.player_id = Some(id);
            self.player_rect = WorldRect::new(
                pos.x - PLAYER_LEN / 2.0,
                pos.y - PLAYER_LEN / 2.0,
                PLAYER_LEN,
                PLAYER_LEN,
            );
        }
        id
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
        let texture = to_texture(&image);
        self.sprites.insert(AppSprite { layer, texture, pos, alpha: 1.0, fading: false })
    }

    fn remove_sprite(&mut self, id: SpriteId) {
        self.sprites.remove(id);
    }

    fn start_fade(&mut self, sprite: SpriteId) {
        if let Some(sprite) = self.sprites.get_mut(sprite) {
            sprite.fading = true;
        }
    }

    fn play_sound(&mut self, key: &str, volume: f32) {
        // Audio assets ride the same collaborator contract; until they are
        // bundled, cues surface on the HUD and in the log.
        log::debug!("sound cue {key} at volume {volume}");
        self.recent_cues.push(key.to_string());
    }

    fn player_rect(&self) -> WorldRect {
        self.player_rect
    }
}
