use std::time::{Duration, Instant};

use crate::smoothing::SmoothedScalar;

/// How long a kick request keeps the thrower spinning.
pub const KICK_WINDOW: Duration = Duration::from_secs(1);

const MAX_KICKER_RPM: f32 = 11_000.0;
const MIN_KICKER_RPM: f32 = 4_650.0;
/// Reported when no usable shot distance exists.
const FALLBACK_KICKER_RPM: f32 = 5_500.0;
/// Penalty slope applied per degree of calibration offset.
const ADJUST_PENALTY_RPM: f32 = 150.0;

const DESIRED_CACHE_CAP: usize = 3;
const MEASURED_RPM_CAP: usize = 10;

/// Maps shot distance (cm) to kicker rpm. Supplied by the platform; the
/// core treats it as an opaque monotone curve.
pub type CalibrationCurve = Box<dyn Fn(f32) -> f32 + Send>;

/// Kicker speed calibration and the one-second kick window.
pub struct KickerControl {
    curve: CalibrationCurve,
    desired_cache: SmoothedScalar,
    measured_rpm: SmoothedScalar,
    last_kick: Option<Instant>,
}

impl KickerControl {
    pub fn new(curve: CalibrationCurve) -> Self {
        KickerControl {
            curve,
            desired_cache: SmoothedScalar::new(DESIRED_CACHE_CAP),
            measured_rpm: SmoothedScalar::new(MEASURED_RPM_CAP),
            last_kick: None,
        }
    }

    /// Feedback from the kicker controller's status stream.
    pub fn observe_rpm(&mut self, rpm: f32) {
        self.measured_rpm.push(rpm);
    }

    /// Smoothed measured kicker speed; zero until feedback arrives.
    pub fn measured_speed(&self) -> f32 {
        self.measured_rpm.mean().unwrap_or(0.0)
    }

    /// Calibrated speed for the given shot distance (cm), smoothed over
    /// the last three samples. Call once per tick.
    pub fn desired_speed(&mut self, distance_cm: Option<f32>, angle_adjust: f32) -> f32 {
        let Some(distance) = distance_cm.filter(|d| d.is_finite()) else {
            return FALLBACK_KICKER_RPM;
        };
        let distance = (distance * 100.0).round() / 100.0;

        let mut speed = (self.curve)(distance).abs().min(MAX_KICKER_RPM);
        speed -= ADJUST_PENALTY_RPM * (angle_adjust.abs() / 1.4).min(2.0);

        self.desired_cache.push(speed).max(MIN_KICKER_RPM)
    }

    /// The desired speed as last smoothed, without feeding the cache.
    pub fn current_desired(&self) -> f32 {
        self.desired_cache
            .mean()
            .map_or(FALLBACK_KICKER_RPM, |mean| mean.max(MIN_KICKER_RPM))
    }

    /// Re-arms the one-second kick window.
    pub fn arm(&mut self, now: Instant) {
        self.last_kick = Some(now);
    }

    /// True while the most recent kick is less than one second old.
    pub fn continue_to_kick(&self, now: Instant) -> bool {
        self.last_kick
            .is_some_and(|at| now.saturating_duration_since(at) < KICK_WINDOW)
    }

    #[cfg(test)]
    pub(crate) fn backdate_kick(&mut self, by: Duration) {
        if let Some(at) = self.last_kick {
            self.last_kick = Some(at - by);
        }
    }
}
