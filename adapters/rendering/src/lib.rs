#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Blaster Alley adapters.
//!
//! Backends consume a [`Presentation`] describing the window and the initial
//! [`Scene`], then drive a per-frame closure that samples input, advances the
//! simulation one tick, and repopulates the scene. The scene works in the
//! demo's logical 320x240 coordinate space; how that space reaches the screen
//! (scaling, letterboxing) is the backend's concern.

use anyhow::Result as AnyResult;
use blaster_alley_core::{InputSnapshot, ENEMY_SHEET_FRAMES, PLAYER_SHEET_FRAMES};
use glam::Vec2;
use std::time::Duration;
use thiserror::Error;

/// Width of the logical coordinate space scenes are described in.
pub const LOGICAL_WIDTH: f32 = 320.0;

/// Height of the logical coordinate space scenes are described in.
pub const LOGICAL_HEIGHT: f32 = 240.0;

/// Side length of the square box a projectile is drawn as.
pub const PROJECTILE_DRAW_SIZE: f32 = 8.0;

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
}

/// Identifies a loadable texture asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Full-screen backdrop drawn behind the actors.
    Background,
    /// Player sprite sheet: four walk frames, idle, and firing.
    PlayerSheet,
    /// Enemy sprite sheet: idle plus the two death frames.
    EnemySheet,
    /// Projectile texture drawn as a fixed-size box.
    Projectile,
}

impl SpriteKey {
    /// Number of 40x50 frames laid out horizontally on the sheet.
    ///
    /// Non-sheet assets report a single frame.
    #[must_use]
    pub const fn frame_count(self) -> u32 {
        match self {
            Self::PlayerSheet => PLAYER_SHEET_FRAMES,
            Self::EnemySheet => ENEMY_SHEET_FRAMES,
            Self::Background | Self::Projectile => 1,
        }
    }
}

/// Input snapshot gathered by the backend before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Continuous key state sampled this frame.
    pub keys: InputSnapshot,
    /// Whether a discrete quit request (Escape) was observed this frame.
    pub quit_requested: bool,
}

/// Tells the backend whether to keep running after a frame update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum FrameOutcome {
    /// Render the updated scene and continue the loop.
    Continue,
    /// Stop the loop before presenting another frame.
    Exit,
}

/// Drawable actor: a sheet, a frame selection, and a screen placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorPresentation {
    /// Sheet the source frame is sliced from.
    pub sheet: SpriteKey,
    /// Top-left corner of the destination box in logical coordinates.
    pub position: Vec2,
    /// Zero-based frame index; selects a horizontal slice of the sheet.
    pub frame: u32,
    /// Whether the sprite is mirrored around its vertical axis.
    pub flip_horizontal: bool,
    /// Whether the actor should be drawn at all.
    pub visible: bool,
}

impl ActorPresentation {
    /// Creates a new actor presentation.
    ///
    /// Returns an error when `frame` does not index a valid region of the
    /// sheet; an out-of-range frame is a logic bug upstream, never a state
    /// the renderer silently clamps.
    pub fn new(
        sheet: SpriteKey,
        position: Vec2,
        frame: u32,
        flip_horizontal: bool,
        visible: bool,
    ) -> Result<Self, RenderingError> {
        if frame >= sheet.frame_count() {
            return Err(RenderingError::FrameOutOfRange {
                sheet,
                frame,
                frame_count: sheet.frame_count(),
            });
        }

        Ok(Self {
            sheet,
            position,
            frame,
            flip_horizontal,
            visible,
        })
    }
}

/// Drawable projectile; always an 8x8 box at its position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectilePresentation {
    /// Top-left corner of the box in logical coordinates.
    pub position: Vec2,
}

impl ProjectilePresentation {
    /// Creates a new projectile presentation at the provided position.
    #[must_use]
    pub const fn new(position: Vec2) -> Self {
        Self { position }
    }
}

/// Scene description combining the backdrop, actors, and projectiles.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Backdrop stretched across the logical viewport.
    pub background: SpriteKey,
    /// Player sprite.
    pub player: ActorPresentation,
    /// Enemy sprite.
    pub enemy: ActorPresentation,
    /// Live projectiles in slot order.
    pub projectiles: Vec<ProjectilePresentation>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        background: SpriteKey,
        player: ActorPresentation,
        enemy: ActorPresentation,
        projectiles: Vec<ProjectilePresentation>,
    ) -> Self {
        Self {
            background,
            player,
            enemy,
            projectiles,
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

/// Rendering backend capable of presenting Blaster Alley scenes.
pub trait RenderingBackend {
    /// Runs the backend until the update closure requests an exit or the
    /// window is closed.
    ///
    /// The closure receives the frame delta and the sampled input, mutates
    /// the scene, and decides whether the loop continues. The backend calls
    /// it exactly once per frame, making one invocation one simulation tick.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameOutcome + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RenderingError {
    /// The frame index does not select a valid sheet region.
    #[error("frame {frame} is out of range for {sheet:?} ({frame_count} frames)")]
    FrameOutOfRange {
        /// Sheet the frame was requested from.
        sheet: SpriteKey,
        /// Frame index that failed validation.
        frame: u32,
        /// Number of frames the sheet actually holds.
        frame_count: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_presentation_accepts_in_range_frames() {
        let actor = ActorPresentation::new(SpriteKey::EnemySheet, Vec2::ZERO, 7, true, true)
            .expect("frame 7 is the last enemy frame");

        assert_eq!(actor.frame, 7);
        assert!(actor.flip_horizontal);
    }

    #[test]
    fn actor_presentation_rejects_out_of_range_frames() {
        let error = ActorPresentation::new(SpriteKey::PlayerSheet, Vec2::ZERO, 6, false, true)
            .expect_err("the player sheet holds frames 0..=5");

        assert_eq!(
            error,
            RenderingError::FrameOutOfRange {
                sheet: SpriteKey::PlayerSheet,
                frame: 6,
                frame_count: 6,
            }
        );
    }

    #[test]
    fn sheet_frame_counts_match_asset_layout() {
        assert_eq!(SpriteKey::PlayerSheet.frame_count(), 6);
        assert_eq!(SpriteKey::EnemySheet.frame_count(), 8);
        assert_eq!(SpriteKey::Background.frame_count(), 1);
        assert_eq!(SpriteKey::Projectile.frame_count(), 1);
    }

    #[test]
    fn scene_new_preserves_every_channel() {
        let player = ActorPresentation::new(
            SpriteKey::PlayerSheet,
            Vec2::new(50.0, 0.0),
            4,
            false,
            true,
        )
        .expect("idle frame is valid");
        let enemy =
            ActorPresentation::new(SpriteKey::EnemySheet, Vec2::new(250.0, 60.0), 4, true, true)
                .expect("idle frame is valid");
        let projectiles = vec![ProjectilePresentation::new(Vec2::new(85.0, 20.0))];

        let scene = Scene::new(
            SpriteKey::Background,
            player,
            enemy,
            projectiles.clone(),
        );

        assert_eq!(scene.background, SpriteKey::Background);
        assert_eq!(scene.player, player);
        assert_eq!(scene.enemy, enemy);
        assert_eq!(scene.projectiles, projectiles);
    }

    #[test]
    fn color_from_bytes_normalises_channels() {
        let color = Color::from_rgb_u8(0, 0, 255);
        assert_eq!(color.blue, 1.0);
        assert_eq!(color.red, 0.0);
        assert_eq!(color.alpha, 1.0);
    }
}
