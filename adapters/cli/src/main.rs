#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Blaster Alley demo.
//!
//! Wires the authoritative world, the control sampler, and the macroquad
//! backend together: every presented frame samples the held keys, applies
//! the resulting command batch plus a clock tick, then republishes the
//! world state as a fresh scene.

use anyhow::{Context, Result};
use blaster_alley_core::{Command, Event};
use blaster_alley_rendering::{
    ActorPresentation, Color, FrameOutcome, Presentation, ProjectilePresentation, RenderingBackend,
    Scene, SpriteKey,
};
use blaster_alley_rendering_macroquad::MacroquadBackend;
use blaster_alley_system_control::ControlSampler;
use blaster_alley_world::{self as world, query, World};
use glam::Vec2;
use std::sync::mpsc;

const WINDOW_TITLE: &str = "Blaster Alley";

/// Letterbox bars and any undrawn margin render as plain black.
const CLEAR_COLOR: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Entry point for the Blaster Alley demo.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run()
}

fn run() -> Result<()> {
    let mut world = World::new();
    let sampler = ControlSampler::new();

    let scene = populate_scene(&world).context("failed to build the initial scene")?;
    let presentation = Presentation::new(WINDOW_TITLE, CLEAR_COLOR, scene);
    let backend = MacroquadBackend::new().with_vsync(true);

    // Frame callbacks cannot return errors, so scene failures travel out
    // through this channel and surface after the window loop ends.
    let (failure_sender, failure_receiver) = mpsc::channel::<anyhow::Error>();

    let mut commands = Vec::new();
    let mut events = Vec::new();
    backend.run(presentation, move |_frame_dt, input, scene| {
        if input.quit_requested {
            log::info!("quit requested, shutting down");
            return FrameOutcome::Exit;
        }

        commands.clear();
        sampler.handle(input.keys, &mut commands);
        commands.push(Command::Tick);

        events.clear();
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        log_events(&events);

        match populate_scene(&world) {
            Ok(next_scene) => {
                *scene = next_scene;
                FrameOutcome::Continue
            }
            Err(error) => {
                let _ = failure_sender.send(error.context("failed to repopulate the scene"));
                FrameOutcome::Exit
            }
        }
    })?;

    match failure_receiver.try_recv() {
        Ok(error) => Err(error),
        Err(_) => Ok(()),
    }
}

/// Rebuilds the drawable scene from the authoritative world state.
fn populate_scene(world: &World) -> Result<Scene> {
    let player = query::player(world);
    let enemy = query::enemy(world);

    let player = ActorPresentation::new(
        SpriteKey::PlayerSheet,
        Vec2::new(player.position.x(), player.position.y()),
        player.frame,
        player.facing.is_left(),
        player.visible,
    )
    .context("player state is not drawable")?;
    let enemy = ActorPresentation::new(
        SpriteKey::EnemySheet,
        Vec2::new(enemy.position.x(), enemy.position.y()),
        enemy.frame,
        enemy.facing.is_left(),
        enemy.visible,
    )
    .context("enemy state is not drawable")?;

    let projectiles = query::projectiles(world)
        .iter()
        .map(|projectile| {
            ProjectilePresentation::new(Vec2::new(
                projectile.position.x(),
                projectile.position.y(),
            ))
        })
        .collect();

    Ok(Scene::new(SpriteKey::Background, player, enemy, projectiles))
}

fn log_events(events: &[Event]) {
    for event in events {
        match event {
            Event::EnemySlain => log::info!("enemy slain"),
            Event::EnemyVanished => log::info!("enemy removed from the scene"),
            Event::PlayerJumped => log::debug!("player jumped"),
            Event::ProjectileSpawned { slot, .. } => {
                log::trace!("projectile spawned in slot {}", slot.get());
            }
            Event::ProjectileExpired { slot } => {
                log::trace!("projectile expired in slot {}", slot.get());
            }
            Event::TimeAdvanced { .. } => {}
        }
    }
}
