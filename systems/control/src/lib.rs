#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input sampler that turns held keys into world commands.
//!
//! The sampler is stateless and never inspects the world: every gate that
//! depends on actor state (shooting blocks walking, walking blocks firing,
//! grounded-only jumps) lives in the world's `apply`. It only fixes the
//! command order the simulation expects — movement first, then fire, then
//! jump, then crouch — mirroring the per-tick evaluation order of the demo.

use blaster_alley_core::{Command, Facing, InputSnapshot};

/// Input sampler that emits one command batch per sampled tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct ControlSampler;

impl ControlSampler {
    /// Creates a new sampler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Maps the snapshot to commands, appending them to `out` in order.
    pub fn handle(&self, input: InputSnapshot, out: &mut Vec<Command>) {
        // Left wins over right when both are held, as the demo's key scan
        // checked left first.
        if input.left {
            out.push(Command::Walk {
                direction: Facing::Left,
            });
        } else if input.right {
            out.push(Command::Walk {
                direction: Facing::Right,
            });
        } else {
            out.push(Command::Rest);
        }

        if input.fire {
            out.push(Command::Fire);
        } else {
            out.push(Command::CeaseFire);
        }

        if input.up {
            out.push(Command::Jump);
        }

        if input.down {
            out.push(Command::Crouch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(input: InputSnapshot) -> Vec<Command> {
        let sampler = ControlSampler::new();
        let mut out = Vec::new();
        sampler.handle(input, &mut out);
        out
    }

    #[test]
    fn idle_keys_emit_rest_and_cease_fire() {
        assert_eq!(
            sample(InputSnapshot::default()),
            vec![Command::Rest, Command::CeaseFire]
        );
    }

    #[test]
    fn left_takes_priority_over_right() {
        let commands = sample(InputSnapshot {
            left: true,
            right: true,
            ..InputSnapshot::default()
        });

        assert_eq!(
            commands[0],
            Command::Walk {
                direction: Facing::Left
            }
        );
    }

    #[test]
    fn held_keys_emit_in_fixed_order() {
        let commands = sample(InputSnapshot {
            right: true,
            up: true,
            down: true,
            fire: true,
            left: false,
        });

        assert_eq!(
            commands,
            vec![
                Command::Walk {
                    direction: Facing::Right
                },
                Command::Fire,
                Command::Jump,
                Command::Crouch,
            ]
        );
    }
}
