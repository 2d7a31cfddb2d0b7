use super::{StateAction, StateHandler, StateKind, Transition};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Unconditional centering burst used to reset a bad position.
pub struct ForceCenterState;

impl StateHandler for ForceCenterState {
    fn transitions(&self) -> &'static [Transition] {
        &[Transition {
            name: "FORCE_CENTERED",
            guard: force_centered,
        }]
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive(Maneuver::DriveToFieldCenter)
    }
}

fn force_centered(ctx: &StateContext) -> Option<StateKind> {
    (ctx.elapsed > 2.0).then_some(StateKind::Flank)
}
