#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Blaster Alley.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Consumers that need sound playback can opt back
//! in by enabling `macroquad/audio` in their own `Cargo.toml` dependency
//! specification.
//!
//! Scenes are described in the demo's 320x240 logical space; this adapter
//! scales that space uniformly into the window and letterboxes the remainder
//! with the clear color.

mod sprites;

use anyhow::{Context, Result};
use blaster_alley_core::{InputSnapshot, SPRITE_FRAME_HEIGHT, SPRITE_FRAME_WIDTH};
use blaster_alley_rendering::{
    ActorPresentation, Color, FrameInput, FrameOutcome, Presentation, ProjectilePresentation,
    RenderingBackend, Scene, LOGICAL_HEIGHT, LOGICAL_WIDTH, PROJECTILE_DRAW_SIZE,
};
use glam::Vec2;
use macroquad::{
    input::{is_key_down, is_key_pressed, KeyCode},
    math::Rect,
};
use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use self::sprites::{DrawParams, SpriteAtlas};

/// Default window width in physical pixels, twice the logical width.
const WINDOW_WIDTH: i32 = 640;

/// Default window height in physical pixels, twice the logical height.
const WINDOW_HEIGHT: i32 = 480;

/// Pause inserted after every presented frame to pace the fixed-tick loop.
const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(10);

/// Keyboard state observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardState {
    keys: InputSnapshot,
    quit_requested: bool,
}

impl KeyboardState {
    fn poll() -> Self {
        let keys = InputSnapshot {
            left: is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::Right),
            up: is_key_down(KeyCode::Up),
            down: is_key_down(KeyCode::Down),
            fire: is_key_down(KeyCode::Space),
        };
        let quit_requested = is_key_pressed(KeyCode::Escape);

        Self {
            keys,
            quit_requested,
        }
    }

    fn frame_input(self) -> FrameInput {
        FrameInput {
            keys: self.keys,
            quit_requested: self.quit_requested,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    frame_delay: Option<Duration>,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            frame_delay: Some(DEFAULT_FRAME_DELAY),
        }
    }
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

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures the pause inserted after each presented frame, or disables it.
    #[must_use]
    pub fn with_frame_delay(mut self, delay: Option<Duration>) -> Self {
        self.frame_delay = delay;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameOutcome + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            frame_delay,
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

        let (failure_sender, failure_receiver) = mpsc::channel::<anyhow::Error>();

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;

            let atlas = match SpriteAtlas::from_default_manifest()
                .context("failed to initialise sprite atlas")
            {
                Ok(atlas) => atlas,
                Err(error) => {
                    let _ = failure_sender.send(error);
                    return;
                }
            };

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardState::poll();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                if let FrameOutcome::Exit =
                    update_scene(frame_dt, keyboard.frame_input(), &mut scene)
                {
                    break;
                }

                macroquad::window::clear_background(background);

                let metrics = ViewMetrics::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );

                let render_start = Instant::now();
                let rendered = draw_scene(&atlas, &scene, &metrics);
                if let Err(error) = rendered {
                    let _ = failure_sender.send(error);
                    break;
                }
                let render_duration = render_start.elapsed();

                if show_fps {
                    if let Some(metrics) = fps_counter.record_frame(frame_dt, render_duration) {
                        println!(
                            "FPS: {:.2} | render: {:>6.2}ms",
                            metrics.per_second,
                            metrics.avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                if let Some(delay) = frame_delay {
                    std::thread::sleep(delay);
                }

                macroquad::window::next_frame().await;
            }
        });

        match failure_receiver.try_recv() {
            Ok(error) => Err(error),
            Err(_) => Ok(()),
        }
    }
}

/// Uniform scale and centering offsets mapping logical space to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ViewMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl ViewMetrics {
    fn new(screen_width: f32, screen_height: f32) -> Self {
        let width_ratio = screen_width / LOGICAL_WIDTH;
        let height_ratio = screen_height / LOGICAL_HEIGHT;
        let scale = width_ratio.min(height_ratio).max(0.0);
        let offset_x = (screen_width - LOGICAL_WIDTH * scale) * 0.5;
        let offset_y = (screen_height - LOGICAL_HEIGHT * scale) * 0.5;

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    fn project(&self, logical: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + logical.x * self.scale,
            self.offset_y + logical.y * self.scale,
        )
    }

    fn scaled(&self, logical_size: Vec2) -> Vec2 {
        logical_size * self.scale
    }
}

fn draw_scene(atlas: &SpriteAtlas, scene: &Scene, metrics: &ViewMetrics) -> Result<()> {
    if metrics.scale <= f32::EPSILON {
        return Ok(());
    }

    let backdrop = DrawParams::new(
        metrics.project(Vec2::ZERO),
        metrics.scaled(Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT)),
    );
    atlas.draw(scene.background, backdrop)?;

    draw_actor(atlas, &scene.player, metrics)?;
    draw_actor(atlas, &scene.enemy, metrics)?;

    for projectile in &scene.projectiles {
        draw_projectile(atlas, projectile, metrics)?;
    }

    Ok(())
}

fn draw_actor(atlas: &SpriteAtlas, actor: &ActorPresentation, metrics: &ViewMetrics) -> Result<()> {
    if !actor.visible {
        return Ok(());
    }

    let source = Rect::new(
        actor.frame as f32 * SPRITE_FRAME_WIDTH,
        0.0,
        SPRITE_FRAME_WIDTH,
        SPRITE_FRAME_HEIGHT,
    );
    let params = DrawParams::new(
        metrics.project(actor.position),
        metrics.scaled(Vec2::new(SPRITE_FRAME_WIDTH, SPRITE_FRAME_HEIGHT)),
    )
    .with_source(source)
    .with_flip_horizontal(actor.flip_horizontal);

    atlas.draw(actor.sheet, params)
}

fn draw_projectile(
    atlas: &SpriteAtlas,
    projectile: &ProjectilePresentation,
    metrics: &ViewMetrics,
) -> Result<()> {
    let params = DrawParams::new(
        metrics.project(projectile.position),
        metrics.scaled(Vec2::splat(PROJECTILE_DRAW_SIZE)),
    );

    atlas.draw(blaster_alley_rendering::SpriteKey::Projectile, params)
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns averaged metrics once one second
    /// of frame time has accumulated.
    fn record_frame(&mut self, frame: Duration, render: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        let render_accum = std::mem::take(&mut self.render_accum);

        if seconds <= f32::EPSILON || frames == 0 {
            return None;
        }

        Some(FpsMetrics {
            per_second: frames as f32 / seconds,
            avg_render: render_accum / frames,
        })
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_metrics_scale_doubles_for_a_640_by_480_window() {
        let metrics = ViewMetrics::new(640.0, 480.0);

        assert_eq!(metrics.scale, 2.0);
        assert_eq!(metrics.offset_x, 0.0);
        assert_eq!(metrics.offset_y, 0.0);
        assert_eq!(
            metrics.project(Vec2::new(50.0, 60.0)),
            Vec2::new(100.0, 120.0)
        );
    }

    #[test]
    fn view_metrics_letterbox_a_wide_window() {
        let metrics = ViewMetrics::new(800.0, 240.0);

        assert_eq!(metrics.scale, 1.0);
        assert_eq!(metrics.offset_x, 240.0);
        assert_eq!(metrics.offset_y, 0.0);
        assert_eq!(metrics.project(Vec2::ZERO), Vec2::new(240.0, 0.0));
    }

    #[test]
    fn view_metrics_clamp_degenerate_windows_to_zero_scale() {
        let metrics = ViewMetrics::new(0.0, 480.0);
        assert_eq!(metrics.scale, 0.0);
    }

    #[test]
    fn view_metrics_scale_sizes_uniformly() {
        let metrics = ViewMetrics::new(640.0, 480.0);
        assert_eq!(
            metrics.scaled(Vec2::new(40.0, 50.0)),
            Vec2::new(80.0, 100.0)
        );
    }

    #[test]
    fn fps_counter_reports_after_a_second_of_frames() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(100);
        let render = Duration::from_millis(2);

        for _ in 0..9 {
            assert!(counter.record_frame(frame, render).is_none());
        }

        let metrics = counter
            .record_frame(frame, render)
            .expect("one second of frames has accumulated");
        assert!((metrics.per_second - 10.0).abs() < 0.01);
        assert_eq!(metrics.avg_render, render);
    }

    #[test]
    fn fps_counter_resets_after_reporting() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(500);

        assert!(counter.record_frame(frame, Duration::ZERO).is_none());
        assert!(counter.record_frame(frame, Duration::ZERO).is_some());
        assert!(counter.record_frame(frame, Duration::ZERO).is_none());
    }
}
