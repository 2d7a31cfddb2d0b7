use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::geometry::PolarPoint;

/// A single recognized ball. Immutable within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    #[serde(flatten)]
    pub point: PolarPoint,
    /// Set by the recognizer when the detection looks like a false positive.
    #[serde(default)]
    pub suspicious: bool,
}

impl Ball {
    pub fn new(angle: f32, dist: f32) -> Self {
        Ball {
            point: PolarPoint::new(angle, dist),
            suspicious: false,
        }
    }
}

/// One frame of recognition results, replacing the previous frame wholesale.
///
/// `balls` arrives ordered by ascending distance. `closest_edge` is a
/// robot-frame vector (meters) pointing at the nearest field edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognitionSnapshot {
    #[serde(default)]
    pub balls: Vec<Ball>,
    #[serde(default)]
    pub goal_blue: Option<PolarPoint>,
    #[serde(default)]
    pub goal_yellow: Option<PolarPoint>,
    #[serde(default)]
    pub closest_edge: Option<Vector2<f32>>,
    /// Calibration offset in degrees reported by the recognizer.
    #[serde(default)]
    pub angle_adjust: Option<f32>,
}

impl RecognitionSnapshot {
    /// Balls in pursuit order: clean detections first, suspicious ones
    /// last, ascending distance within each class.
    pub fn visible_balls(&self) -> Vec<Ball> {
        let (clean, suspicious): (Vec<Ball>, Vec<Ball>) =
            self.balls.iter().partition(|ball| !ball.suspicious);
        clean.into_iter().chain(suspicious).collect()
    }
}
