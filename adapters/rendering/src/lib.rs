#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tile Lands adapters.

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use thiserror::Error;
use tile_lands_core::{GridCoord, TileKind, TileSnapshot};

/// Heading shown above the goal text.
pub const GOAL_PANEL_HEADING: &str = "Goals:";
/// Headline shown once every goal of a level holds.
pub const COMPLETION_TITLE: &str = "Congratulations";
/// Prompt shown below [`COMPLETION_TITLE`].
pub const COMPLETION_PROMPT: &str = "Press 'Space' for next level";
/// Message displayed when a forest grows.
pub const CELEBRATION_MESSAGE: &str = "A forest has grown!";
/// How long the forest celebration stays on screen.
pub const CELEBRATION_DURATION: Duration = Duration::from_millis(2_500);

const HOVER_LIGHTEN: f32 = 0.25;
const GRAB_LIGHTEN: f32 = 0.5;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Base fill color of a tile kind. Empty cells are not drawn.
#[must_use]
pub const fn kind_color(kind: TileKind) -> Option<Color> {
    match kind {
        TileKind::Empty => None,
        TileKind::Grass => Some(Color::from_rgb_u8(0x8b, 0xc3, 0x4a)),
        TileKind::Bush => Some(Color::from_rgb_u8(0x4c, 0xaf, 0x50)),
        TileKind::Tree => Some(Color::from_rgb_u8(0x2e, 0x7d, 0x32)),
        TileKind::Forest => Some(Color::from_rgb_u8(0x1b, 0x5e, 0x20)),
    }
}

/// Input snapshot gathered by adapters before updating the scene.
///
/// Key fields report whether the key is held; consumers derive presses.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position in screen pixels, if the cursor is inside the window.
    pub cursor: Option<Vec2>,
    /// Whether the primary mouse button is held.
    pub primary_down: bool,
    /// Whether the confirmation key is held.
    pub confirm: bool,
    /// Whether the reset key is held.
    pub reset: bool,
    /// Whether the skip-forward key is held.
    pub skip_forward: bool,
    /// Whether the skip-backward key is held.
    pub skip_backward: bool,
}

/// Pixel size of a single tile sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileFootprint {
    sprite_width: f32,
    sprite_height: f32,
}

impl TileFootprint {
    /// Creates a new footprint.
    ///
    /// Returns an error when either dimension is not a positive finite number.
    pub fn new(sprite_width: f32, sprite_height: f32) -> Result<Self, RenderingError> {
        let valid = |value: f32| value.is_finite() && value > 0.0;
        if !valid(sprite_width) || !valid(sprite_height) {
            return Err(RenderingError::InvalidFootprint {
                sprite_width,
                sprite_height,
            });
        }

        Ok(Self {
            sprite_width,
            sprite_height,
        })
    }

    /// Width of the sprite in pixels.
    #[must_use]
    pub const fn sprite_width(&self) -> f32 {
        self.sprite_width
    }

    /// Height of the sprite in pixels.
    #[must_use]
    pub const fn sprite_height(&self) -> f32 {
        self.sprite_height
    }

    /// Height of the diamond-shaped top face, half of the sprite height.
    #[must_use]
    pub fn face_height(&self) -> f32 {
        self.sprite_height / 2.0
    }
}

/// Tile rendered as an isometric diamond at its cached screen anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePresentation {
    /// Cell occupied by the tile.
    pub position: GridCoord,
    /// Top-left corner of the tile sprite in screen pixels.
    pub anchor: Vec2,
    /// Kind of the tile.
    pub kind: TileKind,
    /// Whether the pointer hovers the tile.
    pub hovered: bool,
    /// Whether the tile is being dragged.
    pub grabbed: bool,
    /// Offset of the composite forest sprite, zero elsewhere.
    pub decoration_offset: Vec2,
}

impl TilePresentation {
    /// Fill color after applying the hover or grab tint, or `None` for empty cells.
    #[must_use]
    pub fn fill_color(&self) -> Option<Color> {
        let base = kind_color(self.kind)?;
        Some(if self.grabbed {
            base.lighten(GRAB_LIGHTEN)
        } else if self.hovered {
            base.lighten(HOVER_LIGHTEN)
        } else {
            base
        })
    }

    /// Whether the tile carries the composite forest decoration.
    #[must_use]
    pub fn is_decorated(&self) -> bool {
        self.decoration_offset != Vec2::ZERO
    }
}

impl From<&TileSnapshot> for TilePresentation {
    fn from(snapshot: &TileSnapshot) -> Self {
        Self {
            position: snapshot.position,
            anchor: snapshot.screen_anchor,
            kind: snapshot.kind,
            hovered: snapshot.hovered,
            grabbed: snapshot.grabbed,
            decoration_offset: snapshot.decoration_offset,
        }
    }
}

/// Short-lived message announcing a freshly grown forest.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Celebration {
    /// Screen position the message is drawn at.
    pub anchor: Vec2,
    /// Time left before the message disappears.
    pub remaining: Duration,
}

impl Celebration {
    /// Creates a celebration lasting [`CELEBRATION_DURATION`].
    #[must_use]
    pub const fn new(anchor: Vec2) -> Self {
        Self {
            anchor,
            remaining: CELEBRATION_DURATION,
        }
    }

    /// Advances the timer, returning `false` once the message has expired.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        !self.remaining.is_zero()
    }
}

/// Scene description combining the tile grid and the heads-up display.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Pixel size of a tile sprite.
    pub footprint: TileFootprint,
    /// Tiles of the current grid in row-major order.
    pub tiles: Vec<TilePresentation>,
    /// Title of the level being played.
    pub level_title: String,
    /// Goal progress text, one line per requirement.
    pub goal_text: String,
    /// Whether the completion banner should be displayed.
    pub level_complete: bool,
    /// Active forest celebration, if any.
    pub celebration: Option<Celebration>,
}

impl Scene {
    /// Creates a scene without tiles.
    #[must_use]
    pub fn new(footprint: TileFootprint) -> Self {
        Self {
            footprint,
            tiles: Vec::new(),
            level_title: String::new(),
            goal_text: String::new(),
            level_complete: false,
            celebration: None,
        }
    }

    /// Replaces the tiles with the provided snapshots.
    pub fn set_tiles<'a, I>(&mut self, snapshots: I)
    where
        I: IntoIterator<Item = &'a TileSnapshot>,
    {
        self.tiles.clear();
        self.tiles
            .extend(snapshots.into_iter().map(TilePresentation::from));
    }

    /// Text of the goal panel, including its heading.
    #[must_use]
    pub fn goal_panel(&self) -> String {
        format!("{GOAL_PANEL_HEADING}\n{}", self.goal_text)
    }

    /// Advances the celebration timer and drops it once it expires.
    pub fn advance_celebration(&mut self, dt: Duration) {
        if let Some(celebration) = self.celebration.as_mut() {
            if !celebration.advance(dt) {
                self.celebration = None;
            }
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Tile Lands scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and mutates the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// Sprite dimensions must be positive to project a tile.
    #[error("tile sprite must have a positive size (received {sprite_width}x{sprite_height})")]
    InvalidFootprint {
        /// Provided sprite width.
        sprite_width: f32,
        /// Provided sprite height.
        sprite_height: f32,
    },
}
