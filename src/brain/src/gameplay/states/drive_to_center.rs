use super::{StateAction, StateHandler, StateKind, Transition};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Recovery damping for a TargetGoal transition storm: back off toward
/// the center, then retry the goal approach.
pub struct DriveToCenterState;

impl StateHandler for DriveToCenterState {
    fn transitions(&self) -> &'static [Transition] {
        &[
            Transition {
                name: "NO_CHANGE",
                guard: no_change,
            },
            Transition {
                name: "IN_CENTER",
                guard: in_center,
            },
        ]
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive(Maneuver::DriveToFieldCenter)
    }
}

fn no_change(ctx: &StateContext) -> Option<StateKind> {
    (ctx.elapsed > 0.75).then_some(StateKind::Patrol)
}

fn in_center(ctx: &StateContext) -> Option<StateKind> {
    (ctx.elapsed < 1.5).then_some(StateKind::TargetGoal)
}
