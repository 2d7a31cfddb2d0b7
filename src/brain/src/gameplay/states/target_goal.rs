use super::{StateAction, StateHandler, StateKind, Transition};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Re-entries within the visit window that count as a transition storm.
const MAX_VISITS: usize = 4;

/// Pushes toward the target goal, escalating to recovery when the state
/// keeps getting re-entered.
pub struct TargetGoalState;

impl StateHandler for TargetGoalState {
    fn transitions(&self) -> &'static [Transition] {
        &[
            Transition {
                name: "TOO_MANY_VISITS",
                guard: too_many_visits,
            },
            Transition {
                name: "POINTED_AT_GOAL",
                guard: pointed_at_goal,
            },
            Transition {
                name: "NO_CHANGE",
                guard: no_change,
            },
            Transition {
                name: "LOST_GOAL",
                guard: lost_goal,
            },
        ]
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive_and_kick(Maneuver::DriveTowardGoal {
            backtrack: true,
            speed_factor: 0.8,
        })
    }
}

fn too_many_visits(ctx: &StateContext) -> Option<StateKind> {
    (ctx.visits > MAX_VISITS).then_some(StateKind::DriveToCenter)
}

fn pointed_at_goal(ctx: &StateContext) -> Option<StateKind> {
    (ctx.goals().alligned() == Some(true)).then_some(StateKind::Focus)
}

fn no_change(ctx: &StateContext) -> Option<StateKind> {
    (ctx.elapsed > 0.75).then_some(StateKind::Patrol)
}

fn lost_goal(ctx: &StateContext) -> Option<StateKind> {
    ctx.goals().target_goal().is_none().then_some(StateKind::FindGoal)
}
