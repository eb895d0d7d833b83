#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Blaster Alley demo.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! actually happened. Systems and renderers only ever observe the world
//! through read-only snapshots.

use serde::{Deserialize, Serialize};

/// Width of a single actor sprite frame in world units.
pub const SPRITE_FRAME_WIDTH: f32 = 40.0;

/// Height of a single actor sprite frame in world units.
pub const SPRITE_FRAME_HEIGHT: f32 = 50.0;

/// Horizontal distance the player covers per walking tick.
pub const WALK_SPEED: f32 = 3.0;

/// Vertical velocity applied when a grounded player jumps.
pub const JUMP_IMPULSE: f32 = -8.0;

/// Downward acceleration accumulated every physics tick.
pub const GRAVITY_PER_TICK: f32 = 0.5;

/// Vertical position at which the player is considered grounded.
pub const GROUND_Y: f32 = 60.0;

/// Horizontal speed of a freshly fired projectile.
pub const PROJECTILE_SPEED: f32 = 3.0;

/// Horizontal distance beyond which a projectile expires.
pub const PROJECTILE_TRAVEL_BOUND: f32 = 1000.0;

/// Maximum number of simultaneously live projectiles.
pub const PROJECTILE_CAPACITY: usize = 1000;

/// Number of ticks between animation frame advances.
pub const ANIMATION_GATE: u64 = 6;

/// Number of frames in the player's walking cycle.
pub const WALK_FRAME_COUNT: u32 = 4;

/// Frame shown while the player stands idle.
pub const IDLE_FRAME: u32 = 4;

/// Frame shown while the player discharges the blaster.
pub const FIRING_FRAME: u32 = 5;

/// First frame of the enemy death animation.
pub const DEATH_FRAME_FIRST: u32 = 6;

/// Final frame of the enemy death animation; the frame clamps here.
pub const DEATH_FRAME_LAST: u32 = 7;

/// Number of frames on the player sprite sheet.
pub const PLAYER_SHEET_FRAMES: u32 = 6;

/// Number of frames on the enemy sprite sheet.
pub const ENEMY_SHEET_FRAMES: u32 = 8;

/// Muzzle offset from the player's box origin when facing right.
pub const MUZZLE_OFFSET_RIGHT: (f32, f32) = (35.0, 20.0);

/// Muzzle offset from the player's box origin when facing left.
pub const MUZZLE_OFFSET_LEFT: (f32, f32) = (5.0, 20.0);

/// Horizontal orientation of an actor or a walking command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Toward decreasing x coordinates.
    Left,
    /// Toward increasing x coordinates.
    Right,
}

impl Facing {
    /// Reports whether the orientation points left.
    #[must_use]
    pub const fn is_left(self) -> bool {
        matches!(self, Self::Left)
    }
}

/// Index of a slot within the projectile pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotIndex(u32);

impl SlotIndex {
    /// Creates a new slot index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location expressed in world coordinates with a top-left origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from world coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Continuous keyboard state sampled once per tick by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    /// Left direction key held.
    pub left: bool,
    /// Right direction key held.
    pub right: bool,
    /// Jump key held.
    pub up: bool,
    /// Crouch key held; reserved, currently without effect.
    pub down: bool,
    /// Fire key held.
    pub fire: bool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests a one-tick horizontal step in the given direction.
    ///
    /// Ignored while the player is shooting.
    Walk {
        /// Direction of the requested step.
        direction: Facing,
    },
    /// Reports that no direction key is held; resets the walk cycle.
    ///
    /// Ignored while the player is shooting.
    Rest,
    /// Reports that the fire key is held this tick.
    ///
    /// Ignored while the player is walking.
    Fire,
    /// Reports that the fire key is released this tick.
    ///
    /// Ignored while the player is walking.
    CeaseFire,
    /// Requests a jump; applied only while the player is grounded.
    Jump,
    /// Reports that the crouch key is held. Reserved, currently a no-op.
    Crouch,
    /// Advances physics, projectiles, and animations by one tick.
    Tick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Value of the tick counter after the advance.
        tick: u64,
    },
    /// Confirms that a projectile was placed into a pool slot.
    ProjectileSpawned {
        /// Slot that now holds the projectile.
        slot: SlotIndex,
        /// Spawn position of the projectile.
        position: Position,
        /// Horizontal velocity assigned to the projectile.
        velocity: f32,
    },
    /// Confirms that a projectile crossed the travel bound and was removed.
    ProjectileExpired {
        /// Slot that was freed.
        slot: SlotIndex,
    },
    /// Announces that the player left the ground.
    PlayerJumped,
    /// Announces that a projectile struck the enemy for the first time.
    EnemySlain,
    /// Announces that the enemy's death animation finished and it was hidden.
    EnemyVanished,
}

/// Immutable representation of an actor's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Top-left corner of the actor's sprite box.
    pub position: Position,
    /// Vertical velocity; only the player accumulates gravity.
    pub vertical_velocity: f32,
    /// Animation frame index into the actor's sprite sheet.
    pub frame: u32,
    /// Whether a walking cycle is in progress.
    pub walking: bool,
    /// Horizontal orientation of the sprite.
    pub facing: Facing,
    /// Whether the fire pose is active.
    pub shooting: bool,
    /// Whether the actor should be drawn.
    pub visible: bool,
    /// Whether the actor is alive.
    pub alive: bool,
}

/// Immutable representation of a single live projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Slot that holds the projectile.
    pub slot: SlotIndex,
    /// Current position of the projectile.
    pub position: Position,
    /// Horizontal velocity of the projectile.
    pub velocity: f32,
}

/// Read-only view of all live projectiles in slot order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.slot);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live projectiles captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no projectiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{Facing, Position, ProjectileSnapshot, ProjectileView, SlotIndex};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn slot_index_round_trips_through_bincode() {
        assert_round_trip(&SlotIndex::new(999));
    }

    #[test]
    fn facing_round_trips_through_bincode() {
        assert_round_trip(&Facing::Left);
        assert_round_trip(&Facing::Right);
    }

    #[test]
    fn position_round_trips_through_bincode() {
        assert_round_trip(&Position::new(50.0, 60.0));
    }

    #[test]
    fn projectile_view_orders_snapshots_by_slot() {
        let view = ProjectileView::from_snapshots(vec![
            ProjectileSnapshot {
                slot: SlotIndex::new(7),
                position: Position::new(10.0, 20.0),
                velocity: 3.0,
            },
            ProjectileSnapshot {
                slot: SlotIndex::new(2),
                position: Position::new(30.0, 20.0),
                velocity: -3.0,
            },
        ]);

        let slots: Vec<u32> = view.iter().map(|snapshot| snapshot.slot.get()).collect();
        assert_eq!(slots, vec![2, 7]);
    }

    #[test]
    fn facing_reports_orientation() {
        assert!(Facing::Left.is_left());
        assert!(!Facing::Right.is_left());
    }
}
