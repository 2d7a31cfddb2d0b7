use std::collections::HashMap;
use std::time::{Duration, Instant};

use itertools::Itertools;
use log::debug;
use uuid::Uuid;

use crate::geometry::{PolarPoint, distance};
use crate::perception::Ball;

/// How long an identifier survives without a fresh sighting.
const IDENTITY_TTL: Duration = Duration::from_millis(200);
/// How long the committed ball keeps priority over closer candidates.
const COMMIT_TTL: Duration = Duration::from_secs(2);
/// Sightings closer than this (matching space) may refresh an identifier.
const MATCH_RADIUS: f32 = 0.05;
/// Ring length for the "recent close, centered balls" aggregate.
const RECENT_CLOSEST_CAP: usize = 5;

/// A ball with a stable identity across frames.
#[derive(Debug, Clone, Copy)]
pub struct BallIdentifier {
    pub id: Uuid,
    pub ball: Ball,
    pub last_seen: Instant,
}

impl BallIdentifier {
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }
}

/// Assigns stable identifiers to balls across frames and selects the
/// committed "current ball" the states pursue.
#[derive(Debug, Default)]
pub struct BallTracker {
    identities: HashMap<Uuid, BallIdentifier>,
    last_ball: Option<(Uuid, Instant)>,
    recent_closest: Vec<PolarPoint>,
}

impl BallTracker {
    /// Rebuilds the identity map from this tick's visible balls.
    ///
    /// Visible balls are walked in reverse distance order; each is matched
    /// against the previous map's nearest identifier, accepted only when
    /// the separation is under both `MATCH_RADIUS` and `0.4 * dist / 10`.
    pub fn refresh(&mut self, visible: &[Ball], now: Instant) {
        let mut next: HashMap<Uuid, BallIdentifier> = HashMap::new();

        for ball in visible.iter().rev() {
            let max_delta = 0.4 * ball.point.dist / 10.0;
            let matched = self
                .identities
                .values()
                .map(|old| (distance(&ball.point, &old.ball.point), old.id))
                .filter(|(sep, _)| *sep < MATCH_RADIUS && *sep < max_delta)
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, id)| id);

            let id = matched.unwrap_or_else(Uuid::new_v4);
            next.insert(
                id,
                BallIdentifier {
                    id,
                    ball: *ball,
                    last_seen: now,
                },
            );
        }

        // Safety net against a stalled tick; a no-op in steady state.
        next.retain(|_, identified| {
            let stale = identified.age(now) > IDENTITY_TTL;
            if stale {
                debug!("dropping stale ball {}", identified.id);
            }
            !stale
        });

        self.identities = next;
    }

    /// The committed current ball for this tick.
    ///
    /// A previously chosen identifier younger than two seconds keeps
    /// priority; otherwise the nearest tracked ball wins, falling back to
    /// the nearest raw sighting when the tracker is empty.
    pub fn closest_ball(&mut self, visible: &[Ball], now: Instant) -> Option<Ball> {
        let committed_id = self
            .last_ball
            .filter(|(_, seen)| now.saturating_duration_since(*seen) < COMMIT_TTL)
            .map(|(id, _)| id);

        if let Some(identified) = committed_id.and_then(|id| self.identities.get(&id)) {
            self.last_ball = Some((identified.id, identified.last_seen));
            return Some(identified.ball);
        }

        let nearest_tracked = self
            .identities
            .values()
            .sorted_by(|a, b| a.ball.point.dist.total_cmp(&b.ball.point.dist))
            .sorted_by_key(|identified| identified.ball.suspicious)
            .next();

        if let Some(identified) = nearest_tracked {
            self.last_ball = Some((identified.id, identified.last_seen));
            return Some(identified.ball);
        }

        self.last_ball = None;
        visible.first().copied()
    }

    /// Feeds the recent-closest ring: one sample per tick when the
    /// committed ball is close and centered, otherwise the ring shrinks
    /// by one.
    pub fn update_recent_closest(&mut self, committed: Option<&Ball>) {
        match committed {
            Some(ball) if ball.point.dist < 0.5 && ball.point.angle_deg_abs() < 15.0 => {
                self.recent_closest.insert(0, ball.point);
                self.recent_closest.truncate(RECENT_CLOSEST_CAP);
            }
            _ => {
                self.recent_closest.pop();
            }
        }
    }

    /// Arithmetic mean over the recent-closest ring.
    pub fn average_closest_ball(&self) -> Option<PolarPoint> {
        if self.recent_closest.is_empty() {
            return None;
        }
        let n = self.recent_closest.len() as f32;
        let angle = self.recent_closest.iter().map(|p| p.angle).sum::<f32>() / n;
        let dist = self.recent_closest.iter().map(|p| p.dist).sum::<f32>() / n;
        Some(PolarPoint::new(angle, dist))
    }

    pub fn identities(&self) -> impl Iterator<Item = &BallIdentifier> {
        self.identities.values()
    }

    pub fn tracked_count(&self) -> usize {
        self.identities.len()
    }

    #[cfg(test)]
    pub(crate) fn backdate_commit(&mut self, by: Duration) {
        if let Some((id, seen)) = self.last_ball {
            self.last_ball = Some((id, seen - by));
        }
    }

    #[cfg(test)]
    pub(crate) fn seed_recent_closest(&mut self, points: Vec<PolarPoint>) {
        self.recent_closest = points;
    }
}
