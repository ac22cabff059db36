//! Isometric projection between grid cells and screen pixels.

use glam::Vec2;

use crate::{GridCoord, MapPoint};

const DEFAULT_SPRITE_WIDTH: f32 = 64.0;
const DEFAULT_SPRITE_HEIGHT: f32 = 64.0;

/// Bidirectional transform between grid coordinates and screen coordinates.
///
/// The projected tile is `sprite_width` wide and half of `sprite_height` tall.
/// `offset` shifts the whole grid on screen and is expressed in tile units.
///
/// The inverse truncates, so [`IsoProjection::screen_to_map`] only recovers a
/// cell exactly when sampled inside that cell's top face, for example at
/// [`IsoProjection::pick_point`]. Arbitrary sub-cell points near a diamond edge
/// resolve to whichever neighbour the truncation favours. This is an
/// intentionally lossy inverse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsoProjection {
    tile_width: f32,
    tile_height: f32,
    offset: Vec2,
}

impl Default for IsoProjection {
    fn default() -> Self {
        Self::new(DEFAULT_SPRITE_WIDTH, DEFAULT_SPRITE_HEIGHT, Vec2::ZERO)
    }
}

impl IsoProjection {
    /// Creates a projection for sprites of the provided pixel size.
    #[must_use]
    pub fn new(sprite_width: f32, sprite_height: f32, offset: Vec2) -> Self {
        Self {
            tile_width: sprite_width,
            tile_height: sprite_height / 2.0,
            offset,
        }
    }

    /// Returns a copy of the projection shifted by a different grid offset.
    #[must_use]
    pub fn with_offset(self, offset: Vec2) -> Self {
        Self { offset, ..self }
    }

    /// Width of a projected tile in pixels.
    #[must_use]
    pub const fn tile_width(&self) -> f32 {
        self.tile_width
    }

    /// Height of a projected tile in pixels.
    #[must_use]
    pub const fn tile_height(&self) -> f32 {
        self.tile_height
    }

    /// Screen offset of the grid expressed in tile units.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Screen position of the top-left corner of the cell's sprite.
    #[must_use]
    pub fn map_to_screen(&self, cell: GridCoord) -> Vec2 {
        let x = cell.x() as f32;
        let y = cell.y() as f32;
        Vec2::new(
            (x - y) * (self.tile_width / 2.0) + self.offset.x * self.tile_width,
            (x + y) * (self.tile_height / 2.0) + self.offset.y * self.tile_height,
        )
    }

    /// Centre of the cell's top face, where the inverse is exact.
    #[must_use]
    pub fn pick_point(&self, cell: GridCoord) -> Vec2 {
        self.map_to_screen(cell) + Vec2::new(self.tile_width / 2.0, self.tile_height / 2.0)
    }

    /// Resolves a screen position into raw grid indices.
    ///
    /// Components that fall left of or above the grid are clamped to
    /// [`MapPoint::NONE`]; callers resolve bounds with [`MapPoint::within`].
    #[must_use]
    pub fn screen_to_map(&self, screen: Vec2) -> MapPoint {
        if self.tile_width <= f32::EPSILON || self.tile_height <= f32::EPSILON {
            return MapPoint::new(MapPoint::NONE, MapPoint::NONE);
        }

        let local = screen
            - Vec2::new(
                self.offset.x * self.tile_width,
                self.offset.y * self.tile_height,
            );
        let along = local.x / self.tile_width;
        let down = local.y / self.tile_height;

        MapPoint::new(truncate_axis(along + down - 0.5), truncate_axis(down - along + 0.5))
    }
}

fn truncate_axis(value: f32) -> i32 {
    if value < 0.0 || !value.is_finite() {
        MapPoint::NONE
    } else if value >= i32::MAX as f32 {
        i32::MAX
    } else {
        value as i32
    }
}
