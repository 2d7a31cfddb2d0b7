use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use super::context::StateContext;
use super::maneuver::Maneuver;

pub mod drive;
pub mod drive_to_center;
pub mod find_goal;
pub mod flank;
pub mod focus;
pub mod force_center;
pub mod out_of_bounds;
pub mod patrol;
pub mod penalty;
pub mod shoot;
pub mod super_shoot;
pub mod target_goal;

pub use drive::DriveState;
pub use drive_to_center::DriveToCenterState;
pub use find_goal::FindGoalState;
pub use flank::FlankState;
pub use focus::FocusState;
pub use force_center::ForceCenterState;
pub use out_of_bounds::OutOfBoundsState;
pub use patrol::PatrolState;
pub use penalty::PenaltyState;
pub use shoot::ShootState;
pub use super_shoot::SuperShootState;
pub use target_goal::TargetGoalState;

/// The behavioral states. Exactly one is current at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StateKind {
    ForceCenter,
    Patrol,
    Flank,
    Shoot,
    SuperShoot,
    Drive,
    FindGoal,
    DriveToCenter,
    TargetGoal,
    Focus,
    OutOfBounds,
    Penalty,
}

impl StateKind {
    /// Recovery states are subject to the forced minimum dwell.
    pub fn is_recovery(self) -> bool {
        matches!(
            self,
            StateKind::DriveToCenter | StateKind::OutOfBounds | StateKind::Penalty
        )
    }

    /// Capacity of the per-entry averaging pool.
    pub(crate) fn pool_capacity(self) -> usize {
        match self {
            StateKind::OutOfBounds => 15,
            _ => 7,
        }
    }

    pub(crate) fn handler(self) -> &'static dyn StateHandler {
        match self {
            StateKind::ForceCenter => &ForceCenterState,
            StateKind::Patrol => &PatrolState,
            StateKind::Flank => &FlankState,
            StateKind::Shoot => &ShootState,
            StateKind::SuperShoot => &SuperShootState,
            StateKind::Drive => &DriveState,
            StateKind::FindGoal => &FindGoalState,
            StateKind::DriveToCenter => &DriveToCenterState,
            StateKind::TargetGoal => &TargetGoalState,
            StateKind::Focus => &FocusState,
            StateKind::OutOfBounds => &OutOfBoundsState,
            StateKind::Penalty => &PenaltyState,
        }
    }
}

impl Display for StateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A named, guarded transition. Order within a handler's list is part of
/// the contract: the first guard returning a successor wins.
pub struct Transition {
    pub name: &'static str,
    pub guard: fn(&StateContext) -> Option<StateKind>,
}

/// What a state's animation wants done this tick.
pub struct StateAction {
    pub maneuver: Option<Maneuver>,
    pub kick: bool,
}

impl StateAction {
    pub fn idle() -> Self {
        StateAction {
            maneuver: None,
            kick: false,
        }
    }

    pub fn drive(maneuver: Maneuver) -> Self {
        StateAction {
            maneuver: Some(maneuver),
            kick: false,
        }
    }

    pub fn drive_and_kick(maneuver: Maneuver) -> Self {
        StateAction {
            maneuver: Some(maneuver),
            kick: true,
        }
    }
}

/// One behavioral state: an ordered guard list plus a per-tick animation.
pub trait StateHandler: Sync {
    fn transitions(&self) -> &'static [Transition];

    /// While true, guards are skipped and the state animates regardless.
    fn should_stick(&self, _ctx: &StateContext) -> bool {
        false
    }

    fn animate(&self, ctx: &StateContext) -> StateAction;
}

/// Runs the state's guard list top to bottom; the first hit wins.
pub fn evaluate_transitions(
    kind: StateKind,
    ctx: &StateContext,
) -> Option<(&'static str, StateKind)> {
    let handler = kind.handler();
    if handler.should_stick(ctx) {
        return None;
    }
    handler
        .transitions()
        .iter()
        .find_map(|transition| (transition.guard)(ctx).map(|next| (transition.name, next)))
}

/// Shared timeout guard: stuck states fall back to forced centering.
pub(crate) fn timeout_to_force_center(ctx: &StateContext) -> Option<StateKind> {
    (ctx.elapsed > 8.0).then_some(StateKind::ForceCenter)
}
