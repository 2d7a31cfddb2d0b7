use log::{info, warn};

use super::{StateAction, StateHandler, StateKind, Transition};
use crate::gameplay::context::StateContext;
use crate::gameplay::maneuver::Maneuver;

/// Kicker spin-up mismatch (rpm) that suppresses the shot and slows the
/// flanking motion.
const KICKER_MISMATCH_RPM: f32 = 200.0;

/// Circles the committed ball until it lines up with the target goal,
/// then hands over to a shooting state.
pub struct FlankState;

impl StateHandler for FlankState {
    fn transitions(&self) -> &'static [Transition] {
        &[
            Transition {
                name: "SHOULD_SHOOT",
                guard: should_shoot,
            },
            Transition {
                name: "TOO_CLOSE",
                guard: too_close,
            },
            Transition {
                name: "NO_FLANK",
                guard: no_flank,
            },
            Transition {
                name: "NO_BALLS",
                guard: no_balls,
            },
            Transition {
                name: "LOST_GOAL",
                guard: lost_goal,
            },
        ]
    }

    fn animate(&self, ctx: &StateContext) -> StateAction {
        let mut factor = 1.0;
        if let Some(ball) = ctx.balls().average_closest() {
            if ball.angle_deg_abs() > 9.0
                && ctx.kicker_speed_difference().abs() > KICKER_MISMATCH_RPM
            {
                factor = 0.3;
            }
        }
        StateAction::drive_and_kick(Maneuver::Flank {
            movement_factor: factor,
        })
    }
}

fn should_shoot(ctx: &StateContext) -> Option<StateKind> {
    let ball = ctx.balls().average_closest()?;
    if ball.angle_deg_abs() >= 6.0 || ball.dist >= 0.20 {
        return None;
    }

    if ctx.kicker_speed_difference() > KICKER_MISMATCH_RPM {
        warn!(
            "kicker {:.0} rpm over target, holding shot",
            ctx.kicker_speed_difference()
        );
        return None;
    }

    info!(
        "shot lined up: angle {:.1} dist {:.2}",
        ball.angle_deg(),
        ball.dist
    );
    Some(if ctx.goals().in_super_shoot_zone() {
        StateKind::SuperShoot
    } else {
        StateKind::Shoot
    })
}

fn too_close(ctx: &StateContext) -> Option<StateKind> {
    (ctx.goals().too_close() == Some(true)).then_some(StateKind::ForceCenter)
}

fn no_flank(ctx: &StateContext) -> Option<StateKind> {
    (ctx.goals().goal_to_ball_angle().is_none() && ctx.elapsed > 1.0)
        .then_some(StateKind::Patrol)
}

fn no_balls(ctx: &StateContext) -> Option<StateKind> {
    (!ctx.balls().any_visible()).then_some(StateKind::Patrol)
}

fn lost_goal(ctx: &StateContext) -> Option<StateKind> {
    (ctx.goals().target_goal().is_none() && !ctx.estimates.has_goal_distance_history())
        .then_some(StateKind::Patrol)
}
