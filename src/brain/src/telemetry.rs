use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::actuator::Actuator;
use crate::gameplay::Gameplay;

/// A polar sighting flattened for publication.
#[derive(Debug, Serialize)]
pub struct PointReport {
    pub angle_deg: f32,
    pub dist: f32,
}

#[derive(Debug, Serialize)]
pub struct TrackedBallReport {
    pub id: String,
    pub angle_deg: f32,
    pub dist: f32,
    pub age_secs: f32,
    pub suspicious: bool,
}

/// Point-in-time view of the decision core for the host process to
/// publish. Built on demand; holds no references into the core.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub field_id: String,
    pub robot_id: String,
    pub at: DateTime<Utc>,
    pub state: String,
    pub is_enabled: bool,
    pub recovery_count: u32,
    /// Recent re-entries of the goal-approach and penalty states.
    pub target_goal_visits: usize,
    pub penalty_visits: usize,
    pub desired_kicker_speed: f32,
    pub measured_kicker_speed: f32,
    pub target_goal_distance: Option<f32>,
    pub committed_ball: Option<PointReport>,
    pub tracked_balls: Vec<TrackedBallReport>,
}

impl<A: Actuator> Gameplay<A> {
    pub fn status(&self) -> StatusReport {
        let now = Instant::now();
        StatusReport {
            field_id: self.config.global.field_id.clone(),
            robot_id: self.config.global.robot_id.clone(),
            at: Utc::now(),
            state: self.current_state().to_string(),
            is_enabled: self.config.is_enabled(),
            recovery_count: self.recovery_counter,
            target_goal_visits: self.target_goal_visits.len(),
            penalty_visits: self.penalty_visits.len(),
            desired_kicker_speed: self.kicker.current_desired(),
            measured_kicker_speed: self.kicker.measured_speed(),
            target_goal_distance: self.estimates.target_goal_distance(),
            committed_ball: self.committed_ball.map(|ball| PointReport {
                angle_deg: ball.point.angle_deg(),
                dist: ball.point.dist,
            }),
            tracked_balls: self
                .tracker
                .identities()
                .map(|identified| TrackedBallReport {
                    id: identified.id.to_string(),
                    angle_deg: identified.ball.point.angle_deg(),
                    dist: identified.ball.point.dist,
                    age_secs: identified.age(now).as_secs_f32(),
                    suspicious: identified.ball.suspicious,
                })
                .collect(),
        }
    }
}
