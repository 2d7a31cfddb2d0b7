use super::{StateAction, StateHandler, StateKind, Transition};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Minimum clearance from either goal before leaving recovery (meters).
pub const SAFE_DISTANCE_TO_GOALS: f32 = 1.4;

/// Recovery that backs the robot away from whichever goal it crowded.
pub struct PenaltyState;

impl StateHandler for PenaltyState {
    fn transitions(&self) -> &'static [Transition] {
        &[
            Transition {
                name: "ENOUGH_FAR",
                guard: enough_far,
            },
            Transition {
                name: "TOO_CLOSE_TO_EDGE",
                guard: too_close_to_edge,
            },
        ]
    }

    fn animate(&self, _ctx: &StateContext) -> StateAction {
        StateAction::drive(Maneuver::DriveAwayFromGoal)
    }
}

fn enough_far(ctx: &StateContext) -> Option<StateKind> {
    let goals = ctx.goals();
    let own_clear = goals
        .own_goal()
        .map_or(true, |goal| goal.dist >= SAFE_DISTANCE_TO_GOALS);
    let target_clear = goals
        .target_goal()
        .map_or(true, |goal| goal.dist >= SAFE_DISTANCE_TO_GOALS);
    (own_clear && target_clear && !ctx.forced_recovery).then_some(StateKind::Patrol)
}

fn too_close_to_edge(ctx: &StateContext) -> Option<StateKind> {
    (ctx.edge().too_close_to_edge() == Some(true)).then_some(StateKind::OutOfBounds)
}
