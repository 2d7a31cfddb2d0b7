use super::{StateAction, StateHandler, StateKind, Transition, timeout_to_force_center};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Closes distance on the averaged ball until it is near enough to flank.
pub struct DriveState;

impl StateHandler for DriveState {
    fn transitions(&self) -> &'static [Transition] {
        &[
            Transition {
                name: "CAN_PICK_BALL",
                guard: can_pick_ball,
            },
            Transition {
                name: "TIMEOUT",
                guard: timeout_to_force_center,
            },
        ]
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive(Maneuver::DriveToBall)
    }
}

fn can_pick_ball(ctx: &StateContext) -> Option<StateKind> {
    let ball = ctx.balls().average_closest()?;
    (ball.dist < 0.7 && ctx.goals().target_goal().is_some()).then_some(StateKind::Flank)
}
