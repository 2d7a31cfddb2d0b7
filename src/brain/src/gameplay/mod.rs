pub mod context;
pub mod kicker;
pub mod maneuver;
pub mod states;
pub mod tracker;

pub use context::*;
pub use kicker::*;
pub use maneuver::*;
pub use states::*;
pub use tracker::*;

use std::time::{Duration, Instant};

use log::info;

use crate::actuator::{Actuator, ActuatorError};
use crate::config::RobotConfig;
use crate::perception::{Ball, RecognitionSnapshot};
use crate::smoothing::SmoothedScalar;

/// Forced recovery dwell added per recorded recovery entry (seconds).
const RECOVERY_FACTOR: f32 = 0.5;
const MAX_FORCED_RECOVERY_SECS: f32 = 5.0;
const TARGET_GOAL_VISIT_WINDOW: Duration = Duration::from_millis(500);
const PENALTY_VISIT_WINDOW: Duration = Duration::from_secs(2);

/// The live state: which variant is current, when it was entered, and its
/// per-entry averaging pool.
pub(crate) struct CurrentState {
    pub kind: StateKind,
    pub entered_at: Instant,
    pub pool: SmoothedScalar,
}

impl CurrentState {
    fn new(kind: StateKind, entered_at: Instant) -> Self {
        CurrentState {
            kind,
            entered_at,
            pool: SmoothedScalar::new(kind.pool_capacity()),
        }
    }
}

enum TickOutcome {
    Transition {
        name: &'static str,
        next: StateKind,
    },
    Animate {
        motion: Option<Motion>,
        kick: bool,
    },
}

/// The decision core. Owns tracker state, smoothers, and the current
/// behavioral state; driven by one `step` per recognition event from a
/// single thread.
pub struct Gameplay<A: Actuator> {
    pub config: RobotConfig,
    pub(crate) actuator: A,
    pub(crate) recognition: RecognitionSnapshot,
    pub(crate) tracker: BallTracker,
    pub(crate) estimates: Estimates,
    pub(crate) kicker: KickerControl,
    pub(crate) state: CurrentState,
    pub(crate) recovery_counter: u32,
    pub(crate) target_goal_visits: Vec<Instant>,
    pub(crate) penalty_visits: Vec<Instant>,
    pub(crate) committed_ball: Option<Ball>,
}

impl<A: Actuator> Gameplay<A> {
    pub fn new(config: RobotConfig, actuator: A, curve: CalibrationCurve) -> Self {
        Gameplay {
            config,
            actuator,
            recognition: RecognitionSnapshot::default(),
            tracker: BallTracker::default(),
            estimates: Estimates::default(),
            kicker: KickerControl::new(curve),
            state: CurrentState::new(StateKind::Patrol, Instant::now()),
            recovery_counter: 0,
            target_goal_visits: Vec::new(),
            penalty_visits: Vec::new(),
            committed_ball: None,
        }
    }

    /// One-time bring-up: starts the actuator, resets the process-wide
    /// counters, and begins in ForceCenter.
    pub fn start(&mut self) -> Result<(), ActuatorError> {
        self.actuator.start()?;
        self.recovery_counter = 0;
        self.target_goal_visits.clear();
        self.penalty_visits.clear();
        self.enter_state(StateKind::ForceCenter, Instant::now());
        Ok(())
    }

    pub fn current_state(&self) -> StateKind {
        self.state.kind
    }

    pub fn recovery_count(&self) -> u32 {
        self.recovery_counter
    }

    /// Feedback from the kicker controller's status stream.
    pub fn observe_kicker_rpm(&mut self, rpm: f32) {
        self.kicker.observe_rpm(rpm);
    }

    /// Calibrated shot distance override (cm).
    pub fn set_real_distance(&mut self, distance_cm: Option<f32>) {
        self.estimates.set_real_distance(distance_cm);
    }

    /// Advances the core by one tick. A missing snapshot is a no-op.
    ///
    /// Smoothers and the tracker consume the snapshot even while gameplay
    /// is disabled; the state machine and actuation only run when enabled.
    pub fn step(&mut self, recognition: Option<RecognitionSnapshot>) -> Result<(), ActuatorError> {
        let Some(snapshot) = recognition else {
            return Ok(());
        };
        let now = Instant::now();

        self.recognition = snapshot;
        self.estimates.update(&self.recognition, &self.config);

        let visible = self.recognition.visible_balls();
        self.tracker.refresh(&visible, now);
        self.committed_ball = self.tracker.closest_ball(&visible, now);
        let committed = self.committed_ball;
        self.tracker.update_recent_closest(committed.as_ref());

        if !self.config.is_enabled() {
            return Ok(());
        }
        self.tick(now)
    }

    fn tick(&mut self, now: Instant) -> Result<(), ActuatorError> {
        let desired = self.kicker.desired_speed(
            self.estimates.shot_distance(),
            self.estimates.target_angle_adjust(),
        );

        let pooled_edge_length = if self.state.kind == StateKind::OutOfBounds {
            self.estimates
                .closest_edge()
                .map(|(_, length)| self.state.pool.push(length))
        } else {
            None
        };

        let elapsed = now
            .saturating_duration_since(self.state.entered_at)
            .as_secs_f32();
        let forced_window =
            (self.recovery_counter as f32 * RECOVERY_FACTOR).min(MAX_FORCED_RECOVERY_SECS);
        let forced_recovery = self.state.kind.is_recovery() && elapsed < forced_window;

        let visits = match self.state.kind {
            StateKind::TargetGoal => {
                count_recent(&self.target_goal_visits, now, TARGET_GOAL_VISIT_WINDOW)
            }
            StateKind::Penalty => count_recent(&self.penalty_visits, now, PENALTY_VISIT_WINDOW),
            _ => 0,
        };

        let outcome = {
            let ctx = StateContext {
                snapshot: &self.recognition,
                config: &self.config,
                tracker: &self.tracker,
                estimates: &self.estimates,
                committed_ball: self.committed_ball,
                now,
                elapsed,
                visits,
                forced_recovery,
                pooled_edge_length,
                desired_kicker_speed: desired,
                measured_kicker_speed: self.kicker.measured_speed(),
            };

            match evaluate_transitions(self.state.kind, &ctx) {
                Some((name, next)) => TickOutcome::Transition { name, next },
                None => {
                    let action = self.state.kind.handler().animate(&ctx);
                    TickOutcome::Animate {
                        motion: action.maneuver.and_then(|maneuver| maneuver.calculate(&ctx)),
                        kick: action.kick,
                    }
                }
            }
        };

        match outcome {
            TickOutcome::Transition { name, next } => {
                info!("{}: {} --> {}", self.state.kind, name, next);
                self.enter_state(next, now);
            }
            TickOutcome::Animate { motion, kick } => {
                if let Some(motion) = motion {
                    self.actuator.set_xyw(
                        motion.x.clamp(-1.0, 1.0),
                        motion.y.clamp(-1.0, 1.0),
                        motion.w.clamp(-1.0, 1.0),
                    )?;
                }
                if kick {
                    self.kicker.arm(now);
                    if self.kicker.continue_to_kick(now) {
                        self.actuator.set_thrower(desired.round() as u32)?;
                    }
                }
            }
        }

        self.actuator.apply()
    }

    pub(crate) fn enter_state(&mut self, kind: StateKind, now: Instant) {
        if kind.is_recovery() {
            self.recovery_counter += 1;
        }
        match kind {
            StateKind::TargetGoal => {
                record_visit(&mut self.target_goal_visits, now, TARGET_GOAL_VISIT_WINDOW);
            }
            StateKind::Penalty => {
                record_visit(&mut self.penalty_visits, now, PENALTY_VISIT_WINDOW);
            }
            _ => {}
        }
        self.state = CurrentState::new(kind, now);
    }

    #[cfg(test)]
    pub(crate) fn backdate_state(&mut self, by: Duration) {
        self.state.entered_at -= by;
    }
}

fn count_recent(visits: &[Instant], now: Instant, window: Duration) -> usize {
    visits
        .iter()
        .filter(|at| now.saturating_duration_since(**at) < window)
        .count()
}

fn record_visit(visits: &mut Vec<Instant>, now: Instant, window: Duration) {
    visits.push(now);
    visits.retain(|at| now.saturating_duration_since(*at) < window);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingActuator, polar_deg, snapshot};

    fn linear_curve() -> CalibrationCurve {
        Box::new(|d| 3_500.0 + d * 18.0)
    }

    fn enabled_gameplay() -> Gameplay<RecordingActuator> {
        Gameplay::new(
            RobotConfig::enabled(),
            RecordingActuator::default(),
            linear_curve(),
        )
    }

    fn playable_frame() -> RecognitionSnapshot {
        snapshot()
            .ball(0.0, 0.4)
            .target_goal(polar_deg(2.0, 2.0))
            .own_goal(polar_deg(180.0, 2.0))
            .edge(0.0, 1.5)
            .build()
    }

    #[test]
    fn start_brings_up_actuator_and_forces_centering() {
        let mut gameplay = enabled_gameplay();
        assert_eq!(gameplay.current_state(), StateKind::Patrol);
        gameplay.start().unwrap();
        assert!(gameplay.actuator.started);
        assert_eq!(gameplay.current_state(), StateKind::ForceCenter);
        assert_eq!(gameplay.recovery_count(), 0);
    }

    #[test]
    fn missing_snapshot_is_a_no_op() {
        let mut gameplay = enabled_gameplay();
        gameplay.step(None).unwrap();
        assert!(gameplay.actuator.events.is_empty());
        assert_eq!(gameplay.tracker.tracked_count(), 0);
    }

    // Scenario: Patrol sees a centered, reachable ball.
    #[test]
    fn patrol_advances_to_flank_on_playable_ball() {
        let mut gameplay = enabled_gameplay();
        gameplay.backdate_state(Duration::from_secs(2));

        gameplay.step(Some(playable_frame())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Flank);
        // The transition tick animates nothing and never spins the kicker.
        assert!(gameplay.actuator.motions().is_empty());
        assert!(gameplay.actuator.throwers().is_empty());
        assert_eq!(gameplay.actuator.applies(), 1);

        gameplay.actuator.clear();
        gameplay.step(Some(playable_frame())).unwrap();
        let motions = gameplay.actuator.motions();
        assert_eq!(motions.len(), 1);
        let (_, y, w) = motions[0];
        assert!(y > 0.0, "expected forward progress, got {y}");
        assert!(w.abs() > 0.0);
        // Flank kicks: dist_to_rpm(200 cm) smoothed.
        assert_eq!(gameplay.actuator.throwers(), vec![7_100]);
    }

    #[test]
    fn patrol_sticks_for_its_first_second() {
        let mut gameplay = enabled_gameplay();
        gameplay.step(Some(playable_frame())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Patrol);
        assert_eq!(gameplay.actuator.motions().len(), 1);
    }

    // Scenario: Flank achieves shooting geometry.
    #[test]
    fn flank_hands_over_to_shoot() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::Flank, Instant::now() - Duration::from_millis(500));
        gameplay.observe_kicker_rpm(7_150.0);

        let frame = snapshot()
            .ball(3.0, 0.15)
            .target_goal(polar_deg(2.0, 2.0))
            .edge(0.0, 1.5)
            .build();
        gameplay.step(Some(frame.clone())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Shoot);

        gameplay.actuator.clear();
        gameplay.step(Some(frame)).unwrap();
        let motions = gameplay.actuator.motions();
        assert_eq!(motions.len(), 1);
        let (x, y, w) = motions[0];
        let factor = (2.0f32 / 40.0).tanh().abs();
        assert_eq!(x, 0.0);
        assert!((y - (0.16 * 0.8 - factor / 6.0)).abs() < 1e-5);
        assert!((w - -0.01).abs() < 1e-6);
        assert_eq!(gameplay.actuator.throwers(), vec![7_100]);
    }

    // Scenario: super-shoot zone.
    #[test]
    fn far_goal_selects_super_shoot() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::Flank, Instant::now() - Duration::from_millis(500));

        let frame = snapshot()
            .ball(3.0, 0.15)
            .target_goal(polar_deg(2.0, 4.5))
            .edge(0.0, 1.5)
            .build();
        gameplay.step(Some(frame.clone())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::SuperShoot);

        gameplay.actuator.clear();
        gameplay.step(Some(frame.clone())).unwrap();
        let motions = gameplay.actuator.motions();
        let (_, y, _) = motions[0];
        let factor = (2.0f32 / 40.0).tanh().abs();
        assert!((y - (0.16 * 1.7 - factor / 6.0)).abs() < 1e-5);

        // The burst ends after 0.7 s.
        gameplay.backdate_state(Duration::from_millis(800));
        gameplay.step(Some(frame)).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Flank);
    }

    // Scenario: ball lost mid-flank.
    #[test]
    fn flank_without_ball_returns_to_patrol() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::Flank, Instant::now() - Duration::from_millis(1_200));

        let frame = snapshot()
            .target_goal(polar_deg(2.0, 2.0))
            .edge(0.0, 1.5)
            .build();
        gameplay.step(Some(frame.clone())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Patrol);
        assert_eq!(gameplay.tracker.tracked_count(), 0);

        // Patrol sticks and keeps centering.
        gameplay.actuator.clear();
        gameplay.step(Some(frame)).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Patrol);
        let motions = gameplay.actuator.motions();
        assert_eq!(motions.len(), 1);
        assert!((motions[0].0 - -1.0).abs() < 1e-5);
    }

    // Scenario: edge hazard while patrolling.
    #[test]
    fn patrol_holds_position_in_danger_zone() {
        let mut gameplay = enabled_gameplay();
        gameplay.backdate_state(Duration::from_secs(3));

        let frame = snapshot()
            .ball(0.0, 0.4)
            .target_goal(polar_deg(2.0, 2.0))
            .own_goal(polar_deg(180.0, 2.0))
            .edge(0.0, 0.3)
            .build();
        gameplay.step(Some(frame.clone())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Patrol);
        assert_eq!(gameplay.actuator.motions().len(), 1);

        // Past the eight-second mark Patrol gives up and forces centering.
        gameplay.backdate_state(Duration::from_millis(5_200));
        gameplay.step(Some(frame)).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::ForceCenter);
    }

    // Scenario: disabled gameplay.
    #[test]
    fn disabled_gameplay_consumes_but_never_acts() {
        let mut gameplay = Gameplay::new(
            RobotConfig::default(),
            RecordingActuator::default(),
            linear_curve(),
        );
        gameplay.step(Some(playable_frame())).unwrap();

        assert!(gameplay.actuator.events.is_empty());
        assert_eq!(gameplay.tracker.tracked_count(), 1);
        assert!(gameplay.estimates.has_goal_distance_history());
        assert_eq!(gameplay.current_state(), StateKind::Patrol);
    }

    #[test]
    fn each_tick_emits_at_most_one_command_pair() {
        let mut gameplay = enabled_gameplay();
        gameplay.backdate_state(Duration::from_secs(2));

        let frames = [
            playable_frame(),
            playable_frame(),
            snapshot().target_goal(polar_deg(2.0, 2.0)).build(),
            snapshot().build(),
            playable_frame(),
        ];
        for frame in frames {
            gameplay.actuator.clear();
            gameplay.step(Some(frame)).unwrap();
            assert!(gameplay.actuator.motions().len() <= 1);
            assert!(gameplay.actuator.throwers().len() <= 1);
            assert_eq!(gameplay.actuator.applies(), 1);
        }
    }

    #[test]
    fn force_center_releases_into_flank() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::ForceCenter, Instant::now() - Duration::from_millis(2_100));
        gameplay.step(Some(playable_frame())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Flank);
    }

    #[test]
    fn target_goal_visit_storm_escalates_to_recovery() {
        let mut gameplay = enabled_gameplay();
        let now = Instant::now();
        for _ in 0..5 {
            gameplay.enter_state(StateKind::TargetGoal, now);
        }

        let frame = snapshot().target_goal(polar_deg(10.0, 2.0)).build();
        gameplay.step(Some(frame)).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::DriveToCenter);
        assert_eq!(gameplay.recovery_count(), 1);
    }

    #[test]
    fn target_goal_focuses_when_alligned() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::TargetGoal, Instant::now());

        let frame = snapshot().target_goal(polar_deg(0.5, 2.0)).build();
        gameplay.step(Some(frame.clone())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Focus);

        // Focus holds alignment and releases into Drive.
        gameplay.step(Some(frame)).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Drive);
    }

    #[test]
    fn target_goal_without_goal_searches() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::TargetGoal, Instant::now());
        gameplay.step(Some(snapshot().build())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::FindGoal);

        // FindGoal re-acquires immediately when the goal reappears.
        gameplay
            .step(Some(snapshot().target_goal(polar_deg(5.0, 2.0)).build()))
            .unwrap();
        assert_eq!(gameplay.current_state(), StateKind::TargetGoal);
    }

    #[test]
    fn find_goal_gives_up_after_deadline() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::FindGoal, Instant::now() - Duration::from_millis(800));
        gameplay.step(Some(snapshot().build())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Patrol);
    }

    #[test]
    fn drive_to_center_sentinel_retries_target_goal() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::DriveToCenter, Instant::now());
        gameplay.step(Some(snapshot().build())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::TargetGoal);
    }

    #[test]
    fn drive_to_center_times_out_to_patrol() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::DriveToCenter, Instant::now() - Duration::from_millis(900));
        gameplay.step(Some(snapshot().build())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Patrol);
    }

    #[test]
    fn drive_closes_in_then_flanks() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::Drive, Instant::now());

        // Close, centered ball builds the averaged estimate this tick.
        let frame = snapshot()
            .ball(0.0, 0.4)
            .target_goal(polar_deg(2.0, 2.0))
            .build();
        gameplay.step(Some(frame)).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Flank);
    }

    #[test]
    fn drive_times_out_to_force_center() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::Drive, Instant::now() - Duration::from_millis(8_100));
        gameplay.step(Some(snapshot().build())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::ForceCenter);
    }

    #[test]
    fn out_of_bounds_respects_forced_recovery_dwell() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::OutOfBounds, Instant::now());
        assert_eq!(gameplay.recovery_count(), 1);

        // Edge is already clear, but the forced dwell (0.5 s) pins us.
        let frame = snapshot().edge(0.0, 1.5).build();
        gameplay.step(Some(frame.clone())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::OutOfBounds);

        gameplay.backdate_state(Duration::from_millis(600));
        gameplay.step(Some(frame)).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Patrol);
    }

    #[test]
    fn penalty_releases_when_goals_are_clear() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::Penalty, Instant::now() - Duration::from_secs(1));
        gameplay.step(Some(snapshot().build())).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Patrol);
    }

    #[test]
    fn penalty_escalates_to_out_of_bounds_at_the_edge() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::Penalty, Instant::now() - Duration::from_secs(1));

        let frame = snapshot()
            .own_goal(polar_deg(180.0, 0.5))
            .edge(0.0, 0.3)
            .build();
        gameplay.step(Some(frame)).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::OutOfBounds);
        assert_eq!(gameplay.recovery_count(), 2);
    }

    #[test]
    fn penalty_animates_away_from_the_crowded_goal() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::Penalty, Instant::now() - Duration::from_secs(1));

        let frame = snapshot()
            .own_goal(polar_deg(180.0, 0.5))
            .edge(0.0, 1.0)
            .build();
        gameplay.step(Some(frame)).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Penalty);
        let motions = gameplay.actuator.motions();
        assert_eq!(motions.len(), 1);
        assert_eq!(motions[0].2, 0.5);
    }

    #[test]
    fn flank_too_close_to_goal_forces_centering() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::Flank, Instant::now());

        // Repeated frames with the goal right on top of us drive the
        // smoothed closest-goal distance under 55 cm.
        let frame = snapshot()
            .ball(0.0, 0.4)
            .target_goal(polar_deg(2.0, 0.4))
            .edge(0.0, 1.5)
            .build();
        for _ in 0..4 {
            if gameplay.current_state() != StateKind::Flank {
                break;
            }
            gameplay.step(Some(frame.clone())).unwrap();
        }
        assert_eq!(gameplay.current_state(), StateKind::ForceCenter);
    }

    #[test]
    fn motion_components_are_clamped_to_unit_range() {
        let mut gameplay = enabled_gameplay();
        gameplay.enter_state(StateKind::Penalty, Instant::now());

        // The crowded own goal keeps Penalty active while the far target
        // goal makes drive_away_from_goal emit a raw |x| of 3.
        let frame = snapshot()
            .target_goal(polar_deg(180.0, 3.0))
            .own_goal(polar_deg(0.0, 1.0))
            .build();
        gameplay.step(Some(frame)).unwrap();
        assert_eq!(gameplay.current_state(), StateKind::Penalty);
        assert_eq!(gameplay.actuator.motions().len(), 1);
        for (x, y, w) in gameplay.actuator.motions() {
            assert!((-1.0..=1.0).contains(&x));
            assert!((-1.0..=1.0).contains(&y));
            assert!((-1.0..=1.0).contains(&w));
        }
    }
}
