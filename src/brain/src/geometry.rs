use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// A direction and distance from the robot in the horizontal plane.
///
/// Zero angle points straight ahead, positive angles to the right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPoint {
    /// Bearing in radians.
    pub angle: f32,
    /// Range in meters.
    pub dist: f32,
}

impl PolarPoint {
    pub fn new(angle: f32, dist: f32) -> Self {
        PolarPoint { angle, dist }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.angle.sin() * self.dist
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.angle.cos() * self.dist
    }

    #[inline]
    pub fn angle_deg(&self) -> f32 {
        self.angle.to_degrees()
    }

    #[inline]
    pub fn angle_deg_abs(&self) -> f32 {
        self.angle.to_degrees().abs()
    }

    pub fn cartesian(&self) -> Vector2<f32> {
        Vector2::new(self.x(), self.y())
    }
}

/// Wraps an angle in degrees into (-180, 180].
pub fn normalize_angle_deg(deg: f32) -> f32 {
    let mut a = deg % 360.0;
    if a <= -180.0 {
        a += 360.0;
    }
    if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Separation of two sightings in the tracker's matching space.
///
/// The matching space scales each cartesian component by the sighting's
/// range, so identical angular jitter counts for more on far balls.
pub fn distance(a: &PolarPoint, b: &PolarPoint) -> f32 {
    let ax = a.x() * a.dist;
    let ay = a.y() * a.dist;
    let bx = b.x() * b.dist;
    let by = b.y() * b.dist;
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}
