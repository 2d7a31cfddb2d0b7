//! Decision core for an autonomous soccer robot.
//!
//! Consumes a stream of recognition snapshots (balls, goals, field edges)
//! and produces motion and kicker commands through a narrow actuator
//! seam: locate a ball, flank it relative to the target goal, and shoot,
//! while steering clear of field edges and the own goal.

pub mod actuator;
pub mod config;
pub mod gameplay;
pub mod geometry;
pub mod perception;
pub mod smoothing;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;

pub use actuator::*;
pub use config::*;
pub use gameplay::*;
pub use geometry::*;
pub use perception::*;
pub use smoothing::*;
pub use telemetry::*;
