#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Blaster Alley demo.
//!
//! All mutation flows through [`apply`]; adapters and systems read the world
//! exclusively through the [`query`] module. One [`Command::Tick`] advances
//! physics, projectiles, and animations by exactly one simulation step, so a
//! frame of the outer loop is: sampled input commands first, `Tick` last.

use blaster_alley_core::{
    Command, Event, Facing, SlotIndex, ANIMATION_GATE, DEATH_FRAME_FIRST, DEATH_FRAME_LAST,
    FIRING_FRAME, GRAVITY_PER_TICK, GROUND_Y, IDLE_FRAME, JUMP_IMPULSE, MUZZLE_OFFSET_LEFT,
    MUZZLE_OFFSET_RIGHT, PROJECTILE_CAPACITY, PROJECTILE_SPEED, PROJECTILE_TRAVEL_BOUND,
    SPRITE_FRAME_HEIGHT, SPRITE_FRAME_WIDTH, WALK_FRAME_COUNT, WALK_SPEED,
};

const PLAYER_START_X: f32 = 50.0;
const PLAYER_START_Y: f32 = 0.0;
const ENEMY_START_X: f32 = 250.0;
const ENEMY_START_Y: f32 = 60.0;

/// Represents the authoritative Blaster Alley world state.
#[derive(Debug)]
pub struct World {
    player: Actor,
    enemy: Actor,
    projectiles: ProjectilePool,
    tick: u64,
}

impl World {
    /// Creates a new world in the demo's starting configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            player: Actor::spawned_at(PLAYER_START_X, PLAYER_START_Y, Facing::Right),
            enemy: Actor::spawned_at(ENEMY_START_X, ENEMY_START_Y, Facing::Left),
            projectiles: ProjectilePool::with_capacity(PROJECTILE_CAPACITY),
            tick: 0,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Walk { direction } => {
            if world.player.shooting {
                return;
            }

            let player = &mut world.player;
            match direction {
                Facing::Left => player.x -= WALK_SPEED,
                Facing::Right => player.x += WALK_SPEED,
            }
            player.walking = true;
            player.facing = direction;

            if world.tick % ANIMATION_GATE == 0 {
                player.frame = (player.frame + 1) % WALK_FRAME_COUNT;
            }
        }
        Command::Rest => {
            if world.player.shooting {
                return;
            }

            world.player.walking = false;
            world.player.frame = IDLE_FRAME;
        }
        Command::Fire => {
            if world.player.walking {
                return;
            }

            if world.tick % ANIMATION_GATE == 0 {
                let player = &mut world.player;
                player.frame = if player.frame == IDLE_FRAME {
                    FIRING_FRAME
                } else {
                    IDLE_FRAME
                };

                let (offset_x, offset_y, velocity) = if player.facing.is_left() {
                    let (dx, dy) = MUZZLE_OFFSET_LEFT;
                    (dx, dy, -PROJECTILE_SPEED)
                } else {
                    let (dx, dy) = MUZZLE_OFFSET_RIGHT;
                    (dx, dy, PROJECTILE_SPEED)
                };
                let x = player.x + offset_x;
                let y = player.y + offset_y;

                // A full pool drops the spawn without any observable effect.
                if let Some(slot) = world.projectiles.spawn(x, y, velocity) {
                    out_events.push(Event::ProjectileSpawned {
                        slot,
                        position: blaster_alley_core::Position::new(x, y),
                        velocity,
                    });
                }
            }

            world.player.shooting = true;
        }
        Command::CeaseFire => {
            if world.player.walking {
                return;
            }

            world.player.frame = IDLE_FRAME;
            world.player.shooting = false;
        }
        Command::Jump => {
            if world.player.dy == 0.0 {
                world.player.dy = JUMP_IMPULSE;
                out_events.push(Event::PlayerJumped);
            }
        }
        Command::Crouch => {
            // Reserved input; the key is accepted and currently does nothing.
        }
        Command::Tick => {
            integrate_player(&mut world.player);
            advance_projectiles(&mut world.projectiles, &mut world.enemy, out_events);
            advance_enemy_death(&mut world.enemy, world.tick, out_events);

            world.tick = world.tick.saturating_add(1);
            out_events.push(Event::TimeAdvanced { tick: world.tick });
        }
    }
}

fn integrate_player(player: &mut Actor) {
    player.y += player.dy;
    player.dy += GRAVITY_PER_TICK;
    if player.y > GROUND_Y {
        player.y = GROUND_Y;
        player.dy = 0.0;
    }
}

fn advance_projectiles(pool: &mut ProjectilePool, enemy: &mut Actor, out_events: &mut Vec<Event>) {
    for index in 0..pool.capacity() {
        let slot = SlotIndex::new(index as u32);
        let Some(projectile) = pool.slot_mut(slot) else {
            continue;
        };

        projectile.x += projectile.dx;
        let x = projectile.x;
        let y = projectile.y;

        // Strict interior containment of the projectile's point within the
        // enemy's sprite box. Killing is monotonic; the projectile keeps
        // travelling through the corpse until the travel bound removes it.
        let struck = x > enemy.x
            && x < enemy.x + SPRITE_FRAME_WIDTH
            && y > enemy.y
            && y < enemy.y + SPRITE_FRAME_HEIGHT;
        if struck && enemy.alive {
            enemy.alive = false;
            out_events.push(Event::EnemySlain);
        }

        if x < -PROJECTILE_TRAVEL_BOUND || x > PROJECTILE_TRAVEL_BOUND {
            pool.despawn(slot);
            out_events.push(Event::ProjectileExpired { slot });
        }
    }
}

fn advance_enemy_death(enemy: &mut Actor, tick: u64, out_events: &mut Vec<Event>) {
    if enemy.alive || tick % ANIMATION_GATE != 0 {
        return;
    }

    if enemy.frame < DEATH_FRAME_FIRST {
        enemy.frame = DEATH_FRAME_FIRST;
    } else {
        enemy.frame += 1;
        if enemy.frame > DEATH_FRAME_LAST {
            if enemy.visible {
                enemy.visible = false;
                out_events.push(Event::EnemyVanished);
            }
            enemy.frame = DEATH_FRAME_LAST;
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Actor, World};
    use blaster_alley_core::{ActorSnapshot, Position, ProjectileSnapshot, ProjectileView};

    /// Current value of the global tick counter.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick
    }

    /// Captures a read-only snapshot of the player actor.
    #[must_use]
    pub fn player(world: &World) -> ActorSnapshot {
        snapshot(&world.player)
    }

    /// Captures a read-only snapshot of the enemy actor.
    #[must_use]
    pub fn enemy(world: &World) -> ActorSnapshot {
        snapshot(&world.enemy)
    }

    /// Captures a read-only view of all live projectiles in slot order.
    #[must_use]
    pub fn projectiles(world: &World) -> ProjectileView {
        let snapshots: Vec<ProjectileSnapshot> = world
            .projectiles
            .iter()
            .map(|(slot, projectile)| ProjectileSnapshot {
                slot,
                position: Position::new(projectile.x, projectile.y),
                velocity: projectile.dx,
            })
            .collect();
        ProjectileView::from_snapshots(snapshots)
    }

    /// Number of live projectiles currently occupying pool slots.
    #[must_use]
    pub fn live_projectile_count(world: &World) -> usize {
        world.projectiles.live_count()
    }

    fn snapshot(actor: &Actor) -> ActorSnapshot {
        ActorSnapshot {
            position: Position::new(actor.x, actor.y),
            vertical_velocity: actor.dy,
            frame: actor.frame,
            walking: actor.walking,
            facing: actor.facing,
            shooting: actor.shooting,
            visible: actor.visible,
            alive: actor.alive,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Actor {
    x: f32,
    y: f32,
    dy: f32,
    frame: u32,
    walking: bool,
    facing: Facing,
    shooting: bool,
    visible: bool,
    alive: bool,
}

impl Actor {
    fn spawned_at(x: f32, y: f32, facing: Facing) -> Self {
        Self {
            x,
            y,
            dy: 0.0,
            frame: IDLE_FRAME,
            walking: false,
            facing,
            shooting: false,
            visible: true,
            alive: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Projectile {
    x: f32,
    y: f32,
    dx: f32,
}

/// Fixed-capacity slot table holding the live projectiles.
///
/// Occupancy of a slot index denotes existence; a vacated slot is reused by
/// the next spawn and no projectile identity survives that reuse.
#[derive(Clone, Debug)]
struct ProjectilePool {
    slots: Box<[Option<Projectile>]>,
}

impl ProjectilePool {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Places a projectile into the first empty slot in index order.
    ///
    /// Returns `None` when every slot is occupied; the spawn is dropped.
    fn spawn(&mut self, x: f32, y: f32, dx: f32) -> Option<SlotIndex> {
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(Projectile { x, y, dx });
        Some(SlotIndex::new(index as u32))
    }

    /// Frees the slot if occupied; freeing an empty slot is a no-op.
    fn despawn(&mut self, slot: SlotIndex) {
        if let Some(entry) = self.slots.get_mut(slot.get() as usize) {
            *entry = None;
        }
    }

    fn slot_mut(&mut self, slot: SlotIndex) -> Option<&mut Projectile> {
        self.slots.get_mut(slot.get() as usize)?.as_mut()
    }

    fn iter(&self) -> impl Iterator<Item = (SlotIndex, &Projectile)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| Some((SlotIndex::new(index as u32), entry.as_ref()?)))
    }

    fn live_count(&self) -> usize {
        self.slots.iter().filter(|entry| entry.is_some()).count()
    }
}
