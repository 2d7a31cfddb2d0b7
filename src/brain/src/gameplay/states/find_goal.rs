use super::{StateAction, StateHandler, StateKind, Transition};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Brief search for a lost target goal while drifting to open field.
pub struct FindGoalState;

impl StateHandler for FindGoalState {
    fn transitions(&self) -> &'static [Transition] {
        &[
            Transition {
                name: "HAS_GOAL",
                guard: has_goal,
            },
            Transition {
                name: "NO_CHANGE",
                guard: no_change,
            },
        ]
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive(Maneuver::DriveToFieldCenter)
    }
}

fn has_goal(ctx: &StateContext) -> Option<StateKind> {
    ctx.goals().target_goal().map(|_| StateKind::TargetGoal)
}

fn no_change(ctx: &StateContext) -> Option<StateKind> {
    (ctx.elapsed > 0.75).then_some(StateKind::Patrol)
}
