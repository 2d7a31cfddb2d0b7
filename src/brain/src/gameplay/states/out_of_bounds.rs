use super::{StateAction, StateHandler, StateKind, Transition};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Recovery from the field edge: center until the pooled edge distance
/// opens up again.
pub struct OutOfBoundsState;

impl StateHandler for OutOfBoundsState {
    fn transitions(&self) -> &'static [Transition] {
        &[Transition {
            name: "DONE_CENTERING",
            guard: done_centering,
        }]
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive(Maneuver::DriveToFieldCenter)
    }
}

fn done_centering(ctx: &StateContext) -> Option<StateKind> {
    let pooled = ctx.pooled_edge_length?;
    (pooled > 1.2 && !ctx.forced_recovery).then_some(StateKind::Patrol)
}
