#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Tile Lands.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Tiles are drawn as flat-shaded isometric diamonds. When an asset manifest
//! is supplied the textures it lists are drawn on top of the diamonds.

mod assets;

use std::{collections::VecDeque, path::PathBuf, sync::mpsc, time::Duration};

use anyhow::{Context, Result};
use glam::Vec2;
use log::info;
use macroquad::{
    color::WHITE,
    input::{
        is_key_down, is_key_pressed, is_mouse_button_down, mouse_position, KeyCode, MouseButton,
    },
    math::Vec2 as MacroquadVec2,
};
use tile_lands_core::TileKind;
use tile_lands_rendering::{
    kind_color, Celebration, Color, FrameInput, Presentation, RenderingBackend, Scene,
    TileFootprint, TilePresentation, CELEBRATION_DURATION, CELEBRATION_MESSAGE, COMPLETION_PROMPT,
    COMPLETION_TITLE,
};

use self::assets::AssetRegistry;

const WINDOW_WIDTH: i32 = 640;
const WINDOW_HEIGHT: i32 = 480;
const HUD_MARGIN: f32 = 16.0;
const HUD_LINE_HEIGHT: f32 = 24.0;
const OUTLINE_HOVERED: f32 = 1.5;
const OUTLINE_GRABBED: f32 = 3.0;

/// Snapshot of the keyboard observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// `Space` confirms a completed level.
    confirm: bool,
    /// `R` resets the current level.
    reset: bool,
    /// `N` skips to the next level when debug navigation is enabled.
    skip_forward: bool,
    /// `P` returns to the previous level when debug navigation is enabled.
    skip_backward: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            confirm: is_key_down(KeyCode::Space),
            reset: is_key_down(KeyCode::R),
            skip_forward: is_key_down(KeyCode::N),
            skip_backward: is_key_down(KeyCode::P),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    asset_manifest: Option<PathBuf>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures the TOML manifest listing tile textures. Without one, tiles are flat-shaded.
    #[must_use]
    pub fn with_asset_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.asset_manifest = manifest;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            let Some(removed) = self.frame_times.pop_front() else {
                break;
            };
            self.window_duration = self.window_duration.saturating_sub(removed);
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            asset_manifest,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (assets_init_sender, assets_init_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let registry = match asset_manifest {
                Some(path) => match AssetRegistry::from_manifest_path(&path)
                    .with_context(|| format!("failed to initialise assets from {}", path.display()))
                {
                    Ok(registry) => Some(registry),
                    Err(error) => {
                        let _ = assets_init_sender.send(Err(error));
                        return;
                    }
                },
                None => None,
            };
            let _ = assets_init_sender.send(Ok(()));

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let (cursor_x, cursor_y) = mouse_position();
                let frame_input = frame_input_from_observations(
                    Vec2::new(cursor_x, cursor_y),
                    screen,
                    is_mouse_button_down(MouseButton::Left),
                    keyboard,
                );

                update_scene(frame_dt, frame_input, &mut scene);

                draw_tiles(&scene, registry.as_ref());
                draw_hud(&scene, screen);

                if let Some(FpsMetrics {
                    per_second,
                    trailing_ten_seconds,
                }) = fps_counter.record_frame(frame_dt)
                {
                    if show_fps {
                        info!("FPS: {per_second:.2} (10s avg: {trailing_ten_seconds:.2})");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        assets_init_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn frame_input_from_observations(
    cursor: Vec2,
    screen: Vec2,
    primary_down: bool,
    keyboard: KeyboardShortcuts,
) -> FrameInput {
    let inside = cursor.x >= 0.0 && cursor.y >= 0.0 && cursor.x < screen.x && cursor.y < screen.y;

    FrameInput {
        cursor: inside.then_some(cursor),
        primary_down,
        confirm: keyboard.confirm,
        reset: keyboard.reset,
        skip_forward: keyboard.skip_forward,
        skip_backward: keyboard.skip_backward,
    }
}

/// Corners of a tile's top face: top, right, bottom, left.
fn top_face(anchor: Vec2, footprint: TileFootprint) -> [Vec2; 4] {
    let width = footprint.sprite_width();
    let height = footprint.face_height();
    [
        anchor + Vec2::new(width / 2.0, 0.0),
        anchor + Vec2::new(width, height / 2.0),
        anchor + Vec2::new(width / 2.0, height),
        anchor + Vec2::new(0.0, height / 2.0),
    ]
}

/// Indices of the tiles in back-to-front painting order.
fn draw_order(tiles: &[TilePresentation]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..tiles.len()).collect();
    order.sort_by_key(|index| {
        let position = tiles[*index].position;
        (position.x() + position.y(), position.x())
    });
    order
}

fn draw_tiles(scene: &Scene, registry: Option<&AssetRegistry>) {
    let footprint = scene.footprint;
    for index in draw_order(&scene.tiles) {
        let tile = &scene.tiles[index];
        let Some(fill) = tile.fill_color() else {
            continue;
        };
        let face = top_face(tile.anchor, footprint);
        macroquad::shapes::draw_triangle(
            to_macroquad_vec(face[0]),
            to_macroquad_vec(face[1]),
            to_macroquad_vec(face[2]),
            to_macroquad_color(fill),
        );
        macroquad::shapes::draw_triangle(
            to_macroquad_vec(face[0]),
            to_macroquad_vec(face[2]),
            to_macroquad_vec(face[3]),
            to_macroquad_color(fill),
        );

        let textured = match (registry, tile.kind) {
            (Some(_), TileKind::Forest) if !tile.is_decorated() => true,
            (Some(registry), kind) => registry.draw(
                kind,
                tile.anchor + tile.decoration_offset,
                Color::new(1.0, 1.0, 1.0, 1.0),
            ),
            (None, _) => false,
        };
        if !textured && tile.is_decorated() {
            draw_canopy(tile, footprint);
        }

        let outline = if tile.grabbed {
            Some(OUTLINE_GRABBED)
        } else if tile.hovered {
            Some(OUTLINE_HOVERED)
        } else {
            None
        };
        if let Some(thickness) = outline {
            draw_outline(face, thickness);
        }
    }
}

/// Flat stand-in for the composite forest sprite, centred on the 2×2 block.
fn draw_canopy(tile: &TilePresentation, footprint: TileFootprint) {
    let Some(color) = kind_color(TileKind::Forest) else {
        return;
    };
    let centre = tile.anchor + Vec2::new(footprint.sprite_width() / 2.0, 0.0);
    macroquad::shapes::draw_circle(
        centre.x,
        centre.y,
        footprint.face_height(),
        to_macroquad_color(color.lighten(0.15)),
    );
}

fn draw_outline(face: [Vec2; 4], thickness: f32) {
    for (index, start) in face.iter().enumerate() {
        let end = face[(index + 1) % face.len()];
        macroquad::shapes::draw_line(start.x, start.y, end.x, end.y, thickness, WHITE);
    }
}

fn draw_hud(scene: &Scene, screen: Vec2) {
    let mut y = HUD_MARGIN + HUD_LINE_HEIGHT;
    draw_label(&scene.level_title, HUD_MARGIN, y, 28.0, WHITE);
    for line in scene.goal_panel().lines() {
        y += HUD_LINE_HEIGHT;
        draw_label(line, HUD_MARGIN, y, 22.0, WHITE);
    }

    if scene.level_complete {
        let centre = screen / 2.0;
        draw_label(COMPLETION_TITLE, centre.x - 130.0, centre.y, 48.0, WHITE);
        draw_label(
            COMPLETION_PROMPT,
            centre.x - 150.0,
            centre.y + HUD_LINE_HEIGHT * 1.5,
            28.0,
            WHITE,
        );
    }

    if let Some(celebration) = scene.celebration {
        draw_celebration(celebration);
    }
}

fn draw_celebration(celebration: Celebration) {
    let fade = celebration.remaining.as_secs_f32() / CELEBRATION_DURATION.as_secs_f32();
    let mut color = WHITE;
    color.a = fade.clamp(0.0, 1.0);
    draw_label(
        CELEBRATION_MESSAGE,
        celebration.anchor.x - 80.0,
        celebration.anchor.y - HUD_LINE_HEIGHT,
        26.0,
        color,
    );
}

fn draw_label(text: &str, x: f32, y: f32, font_size: f32, color: macroquad::color::Color) {
    if text.is_empty() {
        return;
    }
    #[allow(clippy::let_unit_value)]
    let _ = macroquad::text::draw_text(text, x, y, font_size, color);
}

fn to_macroquad_vec(vector: Vec2) -> MacroquadVec2 {
    MacroquadVec2::new(vector.x, vector.y)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_lands_core::GridCoord;

    fn tile_at(x: u32, y: u32) -> TilePresentation {
        TilePresentation {
            position: GridCoord::new(x, y),
            anchor: Vec2::ZERO,
            kind: TileKind::Grass,
            hovered: false,
            grabbed: false,
            decoration_offset: Vec2::ZERO,
        }
    }

    #[test]
    fn cursor_outside_window_is_dropped() {
        let screen = Vec2::new(640.0, 480.0);
        let keyboard = KeyboardShortcuts {
            confirm: true,
            ..KeyboardShortcuts::default()
        };

        let inside = frame_input_from_observations(Vec2::new(10.0, 20.0), screen, true, keyboard);
        assert_eq!(inside.cursor, Some(Vec2::new(10.0, 20.0)));
        assert!(inside.primary_down);
        assert!(inside.confirm);

        let outside =
            frame_input_from_observations(Vec2::new(-1.0, 20.0), screen, false, keyboard);
        assert_eq!(outside.cursor, None);
        let beyond = frame_input_from_observations(Vec2::new(10.0, 480.0), screen, false, keyboard);
        assert_eq!(beyond.cursor, None);
    }

    #[test]
    fn top_face_spans_sprite_width_and_half_height() {
        let footprint = TileFootprint::new(64.0, 64.0).expect("positive footprint");
        let face = top_face(Vec2::new(100.0, 50.0), footprint);
        assert_eq!(
            face,
            [
                Vec2::new(132.0, 50.0),
                Vec2::new(164.0, 66.0),
                Vec2::new(132.0, 82.0),
                Vec2::new(100.0, 66.0),
            ]
        );
    }

    #[test]
    fn tiles_are_painted_back_to_front() {
        let tiles = [tile_at(0, 0), tile_at(0, 1), tile_at(1, 0), tile_at(1, 1)];
        assert_eq!(draw_order(&tiles), vec![0, 1, 2, 3]);

        let tiles = [tile_at(0, 2), tile_at(1, 0), tile_at(0, 0)];
        assert_eq!(draw_order(&tiles), vec![2, 1, 0]);
    }

    #[test]
    fn fps_counter_reports_average_frames_per_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);
        assert!(counter.record_frame(frame).is_none());
        assert!(counter.record_frame(frame).is_none());
        assert!(counter.record_frame(frame).is_none());

        let metrics = counter
            .record_frame(frame)
            .expect("should report FPS after one second of samples");
        assert!((metrics.per_second - 4.0).abs() <= 1e-3);
        assert!((metrics.trailing_ten_seconds - 4.0).abs() <= 1e-3);
        assert!(counter.record_frame(frame).is_none());
    }

    #[test]
    fn fps_counter_tracks_trailing_ten_second_average() {
        let mut counter = FpsCounter::default();

        for _ in 0..10 {
            for sample in 0..5 {
                let metrics = counter.record_frame(Duration::from_millis(200));
                if sample == 4 {
                    let metrics = metrics.expect("should report every second");
                    assert!((metrics.per_second - 5.0).abs() <= 1e-3);
                } else {
                    assert!(metrics.is_none());
                }
            }
        }

        for sample in 0..10 {
            let metrics = counter.record_frame(Duration::from_millis(100));
            if sample == 9 {
                let metrics = metrics.expect("should report every second");
                assert!((metrics.per_second - 10.0).abs() <= 1e-3);
                assert!((metrics.trailing_ten_seconds - 5.5).abs() <= 1e-3);
            } else {
                assert!(metrics.is_none());
            }
        }
    }
}
