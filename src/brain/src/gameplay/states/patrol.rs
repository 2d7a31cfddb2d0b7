use super::{StateAction, StateHandler, StateKind, Transition, timeout_to_force_center};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Default roaming state: hold the field center until a playable ball
/// shows up.
pub struct PatrolState;

impl StateHandler for PatrolState {
    fn transitions(&self) -> &'static [Transition] {
        &[
            Transition {
                name: "SEE_BALLS_AND_CAN_FLANK",
                guard: see_balls_and_can_flank,
            },
            Transition {
                name: "TIMEOUT",
                guard: timeout_to_force_center,
            },
        ]
    }

    fn should_stick(&self, ctx: &StateContext) -> bool {
        ctx.elapsed < 1.0
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive(Maneuver::DriveToFieldCenter)
    }
}

fn see_balls_and_can_flank(ctx: &StateContext) -> Option<StateKind> {
    let can_flank = ctx.balls().any_visible()
        && ctx.edge().danger_zone() == Some(false)
        && ctx.goals().target_goal().is_some();
    can_flank.then_some(StateKind::Flank)
}
