use super::{StateAction, StateHandler, StateKind, Transition};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Hard shot for the far-goal / own-goal-at-the-back zone: same drive as
/// [`super::ShootState`] with a much higher speed factor and a shorter
/// burst.
pub struct SuperShootState;

impl StateHandler for SuperShootState {
    fn transitions(&self) -> &'static [Transition] {
        &[Transition {
            name: "DONE_SHOOT",
            guard: done_shoot,
        }]
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive_and_kick(Maneuver::DriveTowardGoal {
            backtrack: false,
            speed_factor: 1.7,
        })
    }
}

fn done_shoot(ctx: &StateContext) -> Option<StateKind> {
    (ctx.elapsed > 0.7).then_some(StateKind::Flank)
}
