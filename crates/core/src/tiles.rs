//! Tile-atlas slicing, placed tiles, and render-batch merging.

use thiserror::Error;

use crate::image::ImageBuffer;
use crate::types::{WorldPos, WorldRect};

/// Atlas grid the built-in placeholder art and the index tables agree on.
pub const ATLAS_COLUMNS: u32 = 4;
pub const ATLAS_ROWS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    #[error("tile index {index} out of range for an atlas of {len} tiles")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Fixed-size tiles cut from an atlas image, indexed left-to-right then
/// top-to-bottom. Immutable after construction; share one per floor.
pub struct TileAtlas {
    tile_len: u32,
    tiles: Vec<ImageBuffer>,
}

impl TileAtlas {
    pub fn new(atlas: &ImageBuffer, tile_len: u32) -> Self {
        let columns = atlas.width() / tile_len;
        let rows = atlas.height() / tile_len;
        let mut tiles = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows {
            for column in 0..columns {
                tiles.push(atlas.sub_image(column * tile_len, row * tile_len, tile_len, tile_len));
            }
        }
        Self { tile_len, tiles }
    }

    pub fn tile_len(&self) -> u32 {
        self.tile_len
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&ImageBuffer, TileError> {
        self.tiles
            .get(index)
            .ok_or(TileError::IndexOutOfRange { index, len: self.tiles.len() })
    }
}

/// One placed tile: the atlas cut it came from, its world-space top-left,
/// and whether it joins the collidable set.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub index: usize,
    pub image: ImageBuffer,
    pub pos: WorldPos,
    pub is_wall: bool,
}

impl Tile {
    pub fn rect(&self) -> WorldRect {
        WorldRect::new(
            self.pos.x,
            self.pos.y,
            self.image.width() as f32,
            self.image.height() as f32,
        )
    }
}

/// Same-layer tiles of one room merged into a single pre-composited image.
///
/// Purely a draw-call compression; collision keeps using the per-tile rects,
/// never this bounding box.
#[derive(Clone, Debug, PartialEq)]
pub struct TileBatch {
    pub image: ImageBuffer,
    pub origin: WorldPos,
}

impl TileBatch {
    /// Merges the tiles into their minimal bounding box. `None` when the
    /// input is empty.
    pub fn merge<'a, I>(tiles: I) -> Option<TileBatch>
    where
        I: IntoIterator<Item = &'a Tile>,
    {
        let tiles: Vec<&Tile> = tiles.into_iter().collect();
        let first = tiles.first()?;

        let mut min_x = first.pos.x;
        let mut min_y = first.pos.y;
        let mut max_right = first.rect().right();
        let mut max_bottom = first.rect().bottom();
        for tile in &tiles[1..] {
            min_x = min_x.min(tile.pos.x);
            min_y = min_y.min(tile.pos.y);
            max_right = max_right.max(tile.rect().right());
            max_bottom = max_bottom.max(tile.rect().bottom());
        }

        let mut image =
            ImageBuffer::new((max_right - min_x).round() as u32, (max_bottom - min_y).round() as u32);
        for tile in &tiles {
            image.blit(
                &tile.image,
                (tile.pos.x - min_x).round() as u32,
                (tile.pos.y - min_y).round() as u32,
            );
        }

        Some(TileBatch { image, origin: WorldPos { x: min_x, y: min_y } })
    }
}

/// Placeholder atlas with one flat-colored tile per index, matching the
/// `ATLAS_COLUMNS × ATLAS_ROWS` grid the layout tables index into. Stands in
/// until real art is wired through the asset collaborator.
pub fn builtin_atlas(tile_len: u32) -> ImageBuffer {
    let mut atlas = ImageBuffer::new(ATLAS_COLUMNS * tile_len, ATLAS_ROWS * tile_len);
    for row in 0..ATLAS_ROWS {
        for column in 0..ATLAS_COLUMNS {
            let index = row * ATLAS_COLUMNS + column;
            atlas.fill_rect(
                column * tile_len,
                row * tile_len,
                tile_len,
                tile_len,
                [40 + (index * 9) as u8, 32 + (index * 5) as u8, 48 + (index * 7) as u8, 255],
            );
        }
    }
    atlas
}
