//! Shared fixtures for the crate's unit tests.

use std::time::Instant;

use nalgebra::Vector2;

use crate::actuator::{Actuator, ActuatorError};
use crate::config::RobotConfig;
use crate::gameplay::context::{Estimates, StateContext};
use crate::gameplay::tracker::BallTracker;
use crate::geometry::PolarPoint;
use crate::perception::{Ball, RecognitionSnapshot};

pub(crate) fn polar_deg(angle_deg: f32, dist: f32) -> PolarPoint {
    PolarPoint::new(angle_deg.to_radians(), dist)
}

pub(crate) fn ball_deg(angle_deg: f32, dist: f32) -> Ball {
    Ball {
        point: polar_deg(angle_deg, dist),
        suspicious: false,
    }
}

pub(crate) struct SnapshotBuilder {
    snapshot: RecognitionSnapshot,
}

/// Frames are described from a blue-target perspective: `target_goal`
/// fills the blue goal, `own_goal` the yellow one.
pub(crate) fn snapshot() -> SnapshotBuilder {
    SnapshotBuilder {
        snapshot: RecognitionSnapshot::default(),
    }
}

impl SnapshotBuilder {
    pub fn ball(mut self, angle_deg: f32, dist: f32) -> Self {
        self.snapshot.balls.push(ball_deg(angle_deg, dist));
        self
    }

    pub fn target_goal(mut self, point: PolarPoint) -> Self {
        self.snapshot.goal_blue = Some(point);
        self
    }

    pub fn own_goal(mut self, point: PolarPoint) -> Self {
        self.snapshot.goal_yellow = Some(point);
        self
    }

    pub fn edge(mut self, x: f32, y: f32) -> Self {
        self.snapshot.closest_edge = Some(Vector2::new(x, y));
        self
    }

    pub fn angle_adjust(mut self, degrees: f32) -> Self {
        self.snapshot.angle_adjust = Some(degrees);
        self
    }

    pub fn build(self) -> RecognitionSnapshot {
        self.snapshot
    }
}

pub(crate) fn ctx_with<'a>(
    snapshot: &'a RecognitionSnapshot,
    config: &'a RobotConfig,
    tracker: &'a BallTracker,
    estimates: &'a Estimates,
) -> StateContext<'a> {
    StateContext {
        snapshot,
        config,
        tracker,
        estimates,
        committed_ball: None,
        now: Instant::now(),
        elapsed: 0.0,
        visits: 0,
        forced_recovery: false,
        pooled_edge_length: None,
        desired_kicker_speed: 0.0,
        measured_kicker_speed: 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ActuatorEvent {
    Xyw(f32, f32, f32),
    Thrower(u32),
    Apply,
}

/// Test double capturing every actuator call in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingActuator {
    pub started: bool,
    pub events: Vec<ActuatorEvent>,
}

impl Actuator for RecordingActuator {
    fn start(&mut self) -> Result<(), ActuatorError> {
        self.started = true;
        Ok(())
    }

    fn set_xyw(&mut self, x: f32, y: f32, w: f32) -> Result<(), ActuatorError> {
        self.events.push(ActuatorEvent::Xyw(x, y, w));
        Ok(())
    }

    fn set_thrower(&mut self, rpm: u32) -> Result<(), ActuatorError> {
        self.events.push(ActuatorEvent::Thrower(rpm));
        Ok(())
    }

    fn apply(&mut self) -> Result<(), ActuatorError> {
        self.events.push(ActuatorEvent::Apply);
        Ok(())
    }
}

impl RecordingActuator {
    pub fn motions(&self) -> Vec<(f32, f32, f32)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ActuatorEvent::Xyw(x, y, w) => Some((*x, *y, *w)),
                _ => None,
            })
            .collect()
    }

    pub fn throwers(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ActuatorEvent::Thrower(rpm) => Some(*rpm),
                _ => None,
            })
            .collect()
    }

    pub fn applies(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, ActuatorEvent::Apply))
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
