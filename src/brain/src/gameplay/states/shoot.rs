use super::{StateAction, StateHandler, StateKind, Transition};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Drives the lined-up ball into the goal at normal speed.
pub struct ShootState;

impl StateHandler for ShootState {
    fn transitions(&self) -> &'static [Transition] {
        &[Transition {
            name: "DONE_SHOOT",
            guard: done_shoot,
        }]
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive_and_kick(Maneuver::DriveTowardGoal {
            backtrack: false,
            speed_factor: 0.8,
        })
    }
}

fn done_shoot(ctx: &StateContext) -> Option<StateKind> {
    (ctx.elapsed > 1.8).then_some(StateKind::Flank)
}
