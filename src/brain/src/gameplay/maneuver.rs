use nalgebra::{Rotation2, Vector2};

use super::context::StateContext;

/// A body velocity request: `x` right strafe, `y` forward, `w` clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub x: f32,
    pub y: f32,
    pub w: f32,
}

impl Motion {
    pub const STOP: Motion = Motion {
        x: 0.0,
        y: 0.0,
        w: 0.0,
    };

    pub fn new(x: f32, y: f32, w: f32) -> Self {
        Motion { x, y, w }
    }
}

/// The reactive maneuvers states animate with. Each computes a motion
/// from the tick context; absent inputs yield no motion at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Maneuver {
    Rotate { degrees: f32 },
    AlignToGoal { factor: f32 },
    DriveTowardGoal { backtrack: bool, speed_factor: f32 },
    DriveToBall,
    DriveToFieldCenter,
    DriveAwayFromGoal,
    Flank { movement_factor: f32 },
    Stop,
}

impl Maneuver {
    pub fn calculate(&self, ctx: &StateContext) -> Option<Motion> {
        match *self {
            Maneuver::Rotate { degrees } => Some(Motion::new(0.0, 0.0, -degrees / 360.0)),
            Maneuver::AlignToGoal { factor } => {
                let rotation = rotation_for_goal(ctx)?;
                Some(Motion::new(0.0, 0.02, rotation.clamp(-0.4, 0.4) * factor))
            }
            Maneuver::DriveTowardGoal {
                backtrack,
                speed_factor,
            } => drive_toward_goal(ctx, backtrack, speed_factor),
            Maneuver::DriveToBall => drive_to_ball(ctx),
            Maneuver::DriveToFieldCenter => {
                let (unit, _) = ctx.edge().closest_edge()?;
                Some(Motion::new(-unit.y, -unit.x, 0.0))
            }
            Maneuver::DriveAwayFromGoal => drive_away_from_goal(ctx),
            Maneuver::Flank { movement_factor } => flank(ctx, movement_factor),
            Maneuver::Stop => Some(Motion::STOP),
        }
    }
}

/// Restoring rotation toward the target goal, at least 0.01 in magnitude.
pub fn rotation_for_goal(ctx: &StateContext) -> Option<f32> {
    let goal_angle = ctx.goals().target_goal_angle()?;
    let maximum = 50.0;
    let angle = goal_angle.min(maximum);
    let factor = (angle / 40.0).tanh().abs();
    let rotate = -angle * factor / maximum;
    let sign = if rotate > 0.0 { 1.0 } else { -1.0 };
    Some(rotate.abs().max(0.01) * sign)
}

fn drive_toward_goal(ctx: &StateContext, backtrack: bool, speed_factor: f32) -> Option<Motion> {
    let rotation = rotation_for_goal(ctx)?;
    let angle = ctx.goals().target_goal_angle()?;

    let factor = (angle / 40.0).tanh().abs().min(0.4);

    if angle.abs() > 7.0 && backtrack {
        log::debug!("backtracking, goal at {angle:.1} deg");
        return Some(Motion::new(
            0.0,
            -0.08 * speed_factor - factor / 6.0,
            rotation * factor * 2.0,
        ));
    }

    Some(Motion::new(
        0.0,
        0.16 * speed_factor - factor / 6.0,
        rotation,
    ))
}

fn drive_to_ball(ctx: &StateContext) -> Option<Motion> {
    let ball = ctx.balls().average_closest()?;

    let cartesian = ball.cartesian();
    let (mut x, mut y) = (cartesian.x, cartesian.y);
    let min_speed = 0.3;
    let max_component = x.abs().max(y.abs());
    if max_component > 0.0 && max_component < min_speed {
        let scaling = min_speed / max_component;
        x *= scaling;
        y *= scaling;
    }

    let w = -ball.angle_deg() / 180.0;
    Some(Motion::new(y, x, w))
}

fn drive_away_from_goal(ctx: &StateContext) -> Option<Motion> {
    let goals = ctx.goals();
    let goal = match (goals.own_goal(), goals.target_goal()) {
        (Some(own), Some(target)) => Some(if own.dist > target.dist { own } else { target }),
        (own, target) => own.or(target),
    }?;

    let (mut x, mut y) = (goal.x(), goal.y());
    if goal.dist < 1.5 {
        x = -x;
        y = -y;
    }

    Some(Motion::new(y, x, 0.5))
}

/// Sideways vector that circles the committed ball into the shot line.
fn flank_vector(ctx: &StateContext) -> Option<(f32, f32)> {
    let ball = ctx.committed_ball?;
    let angle = ctx.goals().goal_to_ball_angle()?;

    let dist = ball.point.dist;
    if dist <= 0.0 {
        return None;
    }

    let unit: Vector2<f32> = ball.point.cartesian() / dist;
    if dist > 0.53 {
        return Some((unit.x * 0.6, unit.y * 0.6));
    }

    let sign = if angle > 0.0 { 1.0 } else { -1.0 };
    let tanh_factor = (angle / 15.0).tanh().abs();
    let mut delta_deg = angle.abs() * 1.7 + 10.0 + angle.abs() * tanh_factor;
    delta_deg = delta_deg.min(80.0) * sign;

    let rotated = Rotation2::new(delta_deg.to_radians()) * unit;

    let factor = ((angle / 60.0).tanh().abs() + 0.2) * 0.8;
    Some((rotated.x * factor, rotated.y * factor))
}

fn flank(ctx: &StateContext, movement_factor: f32) -> Option<Motion> {
    let goals = ctx.goals();
    let Some(goal_angle) = goals.target_goal_angle() else {
        return Some(Motion::new(0.0, 0.0, 0.05));
    };
    let rotation = rotation_for_goal(ctx).unwrap_or(0.0);
    let shooting_angle = goals.goal_to_ball_angle().unwrap_or(999.0);

    if goal_angle.abs() > (shooting_angle * 3.0).abs().max(10.0) {
        return Some(Motion::new(0.0, 0.0, rotation));
    }

    let (x, y) = flank_vector(ctx)?;

    let angle = goal_angle.min(50.0);
    let factor = (angle / 1.5).tanh().abs();
    Some(Motion::new(
        y * movement_factor,
        x * movement_factor,
        rotation / 1.4 * factor,
    ))
}
