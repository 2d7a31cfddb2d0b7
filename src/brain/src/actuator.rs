use thiserror::Error;

/// Kicker rpm ceiling accepted by the motor controller.
pub const MAX_THROWER_RPM: u32 = 15_000;

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("actuator transport failed: {0}")]
    Transport(String),
    #[error("actuator rejected setpoint: {0}")]
    Rejected(String),
}

/// Narrow seam to the motor and kicker drivers.
///
/// Setpoints are queued by the setters and flushed together by `apply`.
/// Errors are propagated to the driver loop, never handled in the core.
pub trait Actuator {
    /// One-time bring-up.
    fn start(&mut self) -> Result<(), ActuatorError>;

    /// Instantaneous body velocity request: `x` right strafe, `y` forward,
    /// `w` clockwise viewed from above, each in [-1, 1].
    fn set_xyw(&mut self, x: f32, y: f32, w: f32) -> Result<(), ActuatorError>;

    /// Kicker rpm request, at most [`MAX_THROWER_RPM`].
    fn set_thrower(&mut self, rpm: u32) -> Result<(), ActuatorError>;

    /// Flush queued setpoints.
    fn apply(&mut self) -> Result<(), ActuatorError>;
}
