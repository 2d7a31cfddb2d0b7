use std::collections::VecDeque;
use std::time::Instant;

use nalgebra::Vector2;

use crate::config::RobotConfig;
use crate::geometry::{PolarPoint, normalize_angle_deg};
use crate::perception::{Ball, RecognitionSnapshot};
use crate::smoothing::SmoothedScalar;

use super::tracker::BallTracker;

const GOAL_DISTANCE_CAP: usize = 11;
const ANGLE_ADJUST_CAP: usize = 11;
const CLOSEST_GOAL_CAP: usize = 4;
const EDGE_RING_CAP: usize = 10;

/// Distance assumed for an unseen goal when judging closeness (cm).
const UNSEEN_GOAL_CM: f32 = 400.0;

/// Smoothed estimates derived from the snapshot stream, refreshed once
/// per tick before the state machine runs.
pub struct Estimates {
    target_goal_distances: SmoothedScalar,
    angle_adjusts: SmoothedScalar,
    closest_goal: SmoothedScalar,
    edge_ring: VecDeque<Vector2<f32>>,
    real_distance: Option<f32>,
}

impl Default for Estimates {
    fn default() -> Self {
        Estimates {
            target_goal_distances: SmoothedScalar::new(GOAL_DISTANCE_CAP),
            angle_adjusts: SmoothedScalar::new(ANGLE_ADJUST_CAP),
            closest_goal: SmoothedScalar::new(CLOSEST_GOAL_CAP),
            edge_ring: VecDeque::with_capacity(EDGE_RING_CAP),
            real_distance: None,
        }
    }
}

impl Estimates {
    /// Feeds every smoother with this tick's snapshot.
    pub fn update(&mut self, snapshot: &RecognitionSnapshot, config: &RobotConfig) {
        let (target, own) = if config.targets_blue() {
            (snapshot.goal_blue, snapshot.goal_yellow)
        } else {
            (snapshot.goal_yellow, snapshot.goal_blue)
        };

        if let Some(goal) = target {
            self.target_goal_distances.push(goal.dist * 100.0);
        }
        if let Some(adjust) = snapshot.angle_adjust {
            self.angle_adjusts.push(adjust);
        }
        if let Some(edge) = snapshot.closest_edge {
            self.edge_ring.push_front(edge);
            self.edge_ring.truncate(EDGE_RING_CAP);
        }

        let sample = self
            .target_goal_distance()
            .unwrap_or(UNSEEN_GOAL_CM)
            .min(own.map_or(UNSEEN_GOAL_CM, |goal| goal.dist * 100.0))
            .min(UNSEEN_GOAL_CM);
        self.closest_goal.push(sample);
    }

    /// Smoothed target goal distance in centimeters.
    pub fn target_goal_distance(&self) -> Option<f32> {
        self.target_goal_distances.mean()
    }

    /// True once the target goal has been ranged at least once.
    pub fn has_goal_distance_history(&self) -> bool {
        !self.target_goal_distances.is_empty()
    }

    /// Smoothed recognizer calibration offset in degrees.
    pub fn target_angle_adjust(&self) -> f32 {
        self.angle_adjusts.mean().unwrap_or(0.0)
    }

    /// Smoothed distance to whichever goal is closest (cm).
    pub fn closest_goal_mean(&self) -> Option<f32> {
        self.closest_goal.mean()
    }

    /// Unit vector toward the nearest field edge plus the mean length.
    pub fn closest_edge(&self) -> Option<(Vector2<f32>, f32)> {
        if self.edge_ring.is_empty() {
            return None;
        }
        let mean = self
            .edge_ring
            .iter()
            .fold(Vector2::zeros(), |acc, edge| acc + edge)
            / self.edge_ring.len() as f32;
        let length = mean.norm();
        if length <= f32::EPSILON {
            return None;
        }
        Some((mean / length, length))
    }

    /// Shot distance for kicker calibration: the calibrated override when
    /// present, else the smoothed goal distance.
    pub fn shot_distance(&self) -> Option<f32> {
        self.real_distance.or_else(|| self.target_goal_distance())
    }

    pub fn set_real_distance(&mut self, distance_cm: Option<f32>) {
        self.real_distance = distance_cm;
    }
}

/// Everything a state's guards and animation read during one tick.
///
/// Built fresh at the top of each tick from a single snapshot reference;
/// nothing here outlives the tick.
pub struct StateContext<'a> {
    pub snapshot: &'a RecognitionSnapshot,
    pub config: &'a RobotConfig,
    pub tracker: &'a BallTracker,
    pub estimates: &'a Estimates,
    pub committed_ball: Option<Ball>,
    pub now: Instant,
    /// Seconds since the current state was entered.
    pub elapsed: f32,
    /// Entries of the current state within its visit window.
    pub visits: usize,
    /// True while a recovery state's forced dwell is active.
    pub forced_recovery: bool,
    /// Per-entry pooled edge length, fed only while out of bounds.
    pub pooled_edge_length: Option<f32>,
    pub desired_kicker_speed: f32,
    pub measured_kicker_speed: f32,
}

impl StateContext<'_> {
    #[inline]
    pub fn goals(&self) -> GoalOpsImpl<'_> {
        GoalOpsImpl { ctx: self }
    }

    #[inline]
    pub fn edge(&self) -> EdgeOpsImpl<'_> {
        EdgeOpsImpl { ctx: self }
    }

    #[inline]
    pub fn balls(&self) -> BallOpsImpl<'_> {
        BallOpsImpl { ctx: self }
    }

    /// Measured minus desired kicker rpm.
    pub fn kicker_speed_difference(&self) -> f32 {
        self.measured_kicker_speed - self.desired_kicker_speed
    }
}

pub struct GoalOpsImpl<'g> {
    ctx: &'g StateContext<'g>,
}

impl GoalOpsImpl<'_> {
    pub fn own_goal(&self) -> Option<PolarPoint> {
        if self.ctx.config.targets_blue() {
            self.ctx.snapshot.goal_yellow
        } else {
            self.ctx.snapshot.goal_blue
        }
    }

    pub fn target_goal(&self) -> Option<PolarPoint> {
        if self.ctx.config.targets_blue() {
            self.ctx.snapshot.goal_blue
        } else {
            self.ctx.snapshot.goal_yellow
        }
    }

    pub fn target_goal_angle(&self) -> Option<f32> {
        self.target_goal().map(|goal| goal.angle_deg())
    }

    /// Current target goal distance in centimeters.
    pub fn target_goal_dist(&self) -> Option<f32> {
        self.target_goal().map(|goal| goal.dist * 100.0)
    }

    /// Current own goal distance in centimeters.
    pub fn own_goal_dist(&self) -> Option<f32> {
        self.own_goal().map(|goal| goal.dist * 100.0)
    }

    /// Nearest visible goal in meters; zero when neither goal is seen.
    pub fn closest_goal_distance(&self) -> f32 {
        match (self.own_goal(), self.target_goal()) {
            (Some(own), Some(target)) => own.dist.min(target.dist),
            (Some(goal), None) | (None, Some(goal)) => goal.dist,
            (None, None) => 0.0,
        }
    }

    /// Whether the robot points at the target goal. The threshold tightens
    /// to 2 degrees beyond 300 cm.
    pub fn alligned(&self) -> Option<bool> {
        let angle = self.target_goal_angle()?;
        let dist = self.target_goal_dist()?;
        let threshold = if dist > 300.0 { 2.0 } else { 3.0 };
        Some(angle.abs() <= threshold)
    }

    /// Smoothed closest-goal distance under 55 cm.
    pub fn too_close(&self) -> Option<bool> {
        self.ctx
            .estimates
            .closest_goal_mean()
            .map(|mean| mean < 55.0)
    }

    /// Bearing from the target goal to the committed ball, in (-180, 180].
    pub fn goal_to_ball_angle(&self) -> Option<f32> {
        let goal_angle = self.target_goal_angle()?;
        let ball = self.ctx.committed_ball?;
        Some(normalize_angle_deg(ball.point.angle_deg() - goal_angle))
    }

    /// Far target or an own goal at our back: kick harder.
    pub fn in_super_shoot_zone(&self) -> bool {
        let far_target = self.target_goal_dist().is_some_and(|dist| dist > 400.0);
        let near_own = self.own_goal_dist().is_some_and(|dist| dist < 75.0);
        far_target || near_own
    }
}

pub struct EdgeOpsImpl<'e> {
    ctx: &'e StateContext<'e>,
}

impl EdgeOpsImpl<'_> {
    pub fn closest_edge(&self) -> Option<(Vector2<f32>, f32)> {
        self.ctx.estimates.closest_edge()
    }

    pub fn too_close_to_edge(&self) -> Option<bool> {
        self.closest_edge().map(|(_, length)| length < 0.4)
    }

    pub fn danger_zone(&self) -> Option<bool> {
        let (_, length) = self.closest_edge()?;
        Some(length < 1.1 || self.ctx.goals().closest_goal_distance() < 1.0)
    }

    pub fn blind_spot_for_shoot(&self) -> Option<bool> {
        let (_, length) = self.closest_edge()?;
        let own_far = self.ctx.goals().own_goal().map_or(true, |goal| goal.dist > 3.0);
        Some(own_far && length < 1.2)
    }
}

pub struct BallOpsImpl<'b> {
    ctx: &'b StateContext<'b>,
}

impl BallOpsImpl<'_> {
    pub fn any_visible(&self) -> bool {
        !self.ctx.snapshot.balls.is_empty()
    }

    pub fn committed(&self) -> Option<Ball> {
        self.ctx.committed_ball
    }

    pub fn average_closest(&self) -> Option<PolarPoint> {
        self.ctx.tracker.average_closest_ball()
    }
}
