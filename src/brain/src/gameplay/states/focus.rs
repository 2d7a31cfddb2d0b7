use super::{StateAction, StateHandler, StateKind, Transition};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Holds still while pointed at the goal, keeping the kicker armed.
pub struct FocusState;

impl StateHandler for FocusState {
    fn transitions(&self) -> &'static [Transition] {
        &[
            Transition {
                name: "NOT_ALLIGNED",
                guard: not_alligned,
            },
            Transition {
                name: "READY_TO_SHOOT",
                guard: ready_to_shoot,
            },
        ]
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive_and_kick(Maneuver::Stop)
    }
}

fn not_alligned(ctx: &StateContext) -> Option<StateKind> {
    (ctx.goals().alligned() != Some(true)).then_some(StateKind::TargetGoal)
}

fn ready_to_shoot(ctx: &StateContext) -> Option<StateKind> {
    (ctx.goals().alligned() == Some(true)).then_some(StateKind::Drive)
}
