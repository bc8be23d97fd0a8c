//! Session timer state machine
//!
//! This module tracks behavior episodes across a monitoring session: attempt
//! counts (one per contiguous episode), cumulative behavior duration, and
//! cumulative stress-free (idle) duration. The machine has two states, Idle
//! and Active, and is driven once per frame with the frame's behavior label
//! and timestamp. Transitions are pure arithmetic over timestamps and cannot
//! fail; negative clock deltas are clamped to zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BehaviorLabel, SessionSnapshot};

/// Seconds between two timestamps, clamped to zero when the clock moved
/// backwards.
fn elapsed_sec(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let ms = (to - from).num_milliseconds();
    (ms.max(0) as f64) / 1000.0
}

/// Debounced accumulator for behavior episodes and idle time.
///
/// Owned and mutated exclusively by the frame-processing loop; all state is
/// in-memory for a single monitoring session. `to_json`/`from_json` allow a
/// host to carry a session across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimer {
    /// Whether a behavior episode is in progress
    active: bool,
    /// Start of the current episode, set while active
    episode_start: Option<DateTime<Utc>>,
    /// Committed behavior duration in seconds
    accumulated_sec: f64,
    /// Number of episodes started this session
    attempt_count: u32,
    /// Whether the warning fired for the current episode
    warning_active: bool,
    /// Start of the current idle stretch, when idling
    idle_start: Option<DateTime<Utc>>,
    /// Committed idle duration in seconds
    accumulated_idle_sec: f64,
    /// When the most recent episode started
    last_behavior_at: Option<DateTime<Utc>>,
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTimer {
    /// Create a timer in the Idle state with all accumulators at zero.
    pub fn new() -> Self {
        Self {
            active: false,
            episode_start: None,
            accumulated_sec: 0.0,
            attempt_count: 0,
            warning_active: false,
            idle_start: None,
            accumulated_idle_sec: 0.0,
            last_behavior_at: None,
        }
    }

    /// Fold one frame's behavior label into the timer and return a snapshot.
    pub fn tick(&mut self, label: BehaviorLabel, now: DateTime<Utc>) -> SessionSnapshot {
        if label.is_behavior() {
            if !self.active {
                // Rising edge: a new episode begins
                self.active = true;
                self.episode_start = Some(now);
                self.last_behavior_at = Some(now);
                if !self.warning_active {
                    self.attempt_count += 1;
                    self.warning_active = true;
                }
            }
            // Commit any running idle stretch
            if let Some(idle_start) = self.idle_start.take() {
                self.accumulated_idle_sec += elapsed_sec(idle_start, now);
            }
        } else {
            if self.active {
                // Falling edge: commit the episode duration
                if let Some(start) = self.episode_start.take() {
                    self.accumulated_sec += elapsed_sec(start, now);
                }
                self.active = false;
            }
            self.warning_active = false;
            if self.idle_start.is_none() {
                self.idle_start = Some(now);
            }
        }

        self.snapshot(now)
    }

    /// Point-in-time view of the session, with live durations.
    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        let stress_duration_sec = match (self.active, self.episode_start) {
            (true, Some(start)) => self.accumulated_sec + elapsed_sec(start, now),
            _ => self.accumulated_sec,
        };

        let idle_duration_sec = match self.idle_start {
            Some(start) => self.accumulated_idle_sec + elapsed_sec(start, now),
            None => self.accumulated_idle_sec,
        };

        SessionSnapshot {
            attempt_count: self.attempt_count,
            stress_duration_sec,
            warning_active: self.warning_active,
            idle_duration_sec,
            last_behavior_ago_sec: self.last_behavior_at.map(|at| elapsed_sec(at, now)),
        }
    }

    /// Number of episodes started this session.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Whether a behavior episode is in progress.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Zero all fields for a session restart.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Load timer state from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize timer state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap()
    }

    fn at(sec: f64) -> DateTime<Utc> {
        t0() + Duration::milliseconds((sec * 1000.0) as i64)
    }

    #[test]
    fn test_initial_state() {
        let timer = SessionTimer::new();
        let snap = timer.snapshot(t0());

        assert_eq!(snap.attempt_count, 0);
        assert_eq!(snap.stress_duration_sec, 0.0);
        assert_eq!(snap.idle_duration_sec, 0.0);
        assert!(!snap.warning_active);
        assert!(snap.last_behavior_ago_sec.is_none());
    }

    #[test]
    fn test_one_attempt_per_episode_regardless_of_length() {
        let mut timer = SessionTimer::new();

        // 1000 frames at ~30fps of continuous behavior
        for i in 0..1000 {
            timer.tick(BehaviorLabel::NailBiting, at(i as f64 / 30.0));
        }

        assert_eq!(timer.attempt_count(), 1);

        // A single-frame episode also counts exactly once
        let mut timer = SessionTimer::new();
        timer.tick(BehaviorLabel::NailBiting, t0());
        assert_eq!(timer.attempt_count(), 1);
    }

    #[test]
    fn test_empty_frames_are_idempotent() {
        let mut timer = SessionTimer::new();

        for i in 0..100 {
            let snap = timer.tick(BehaviorLabel::None, at(i as f64));
            assert_eq!(snap.attempt_count, 0);
            assert_eq!(snap.stress_duration_sec, 0.0);
        }
    }

    #[test]
    fn test_continuous_active_duration_matches_clock() {
        let mut timer = SessionTimer::new();

        // 10 seconds of continuous behavior at 30fps
        let frames = 300;
        for i in 0..=frames {
            timer.tick(BehaviorLabel::NailBiting, at(i as f64 / 30.0));
        }
        let snap = timer.snapshot(at(10.0));

        assert!((snap.stress_duration_sec - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_two_episodes_accumulate() {
        let mut timer = SessionTimer::new();

        // Active 0.0-3.0s
        timer.tick(BehaviorLabel::NailBiting, at(0.0));
        timer.tick(BehaviorLabel::NailBiting, at(1.5));
        // Idle 3.0-5.0s
        timer.tick(BehaviorLabel::None, at(3.0));
        timer.tick(BehaviorLabel::None, at(4.0));
        // Active 5.0-6.0s
        timer.tick(BehaviorLabel::HairPulling, at(5.0));
        let snap = timer.tick(BehaviorLabel::None, at(6.0));

        assert_eq!(snap.attempt_count, 2);
        assert!((snap.stress_duration_sec - 4.0).abs() < 0.001);
        assert!((snap.idle_duration_sec - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_warning_active_tracks_episode() {
        let mut timer = SessionTimer::new();

        let snap = timer.tick(BehaviorLabel::NailBiting, at(0.0));
        assert!(snap.warning_active);

        let snap = timer.tick(BehaviorLabel::NailBiting, at(1.0));
        assert!(snap.warning_active);

        let snap = timer.tick(BehaviorLabel::None, at(2.0));
        assert!(!snap.warning_active);
    }

    #[test]
    fn test_live_duration_mid_episode() {
        let mut timer = SessionTimer::new();

        timer.tick(BehaviorLabel::NailBiting, at(0.0));
        let snap = timer.snapshot(at(2.5));
        assert!((snap.stress_duration_sec - 2.5).abs() < 0.001);

        // Committed value frozen after the episode ends
        timer.tick(BehaviorLabel::None, at(3.0));
        let snap = timer.snapshot(at(10.0));
        assert!((snap.stress_duration_sec - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_last_behavior_ago() {
        let mut timer = SessionTimer::new();

        timer.tick(BehaviorLabel::NailBiting, at(0.0));
        timer.tick(BehaviorLabel::None, at(1.0));

        let snap = timer.snapshot(at(5.0));
        assert!((snap.last_behavior_ago_sec.unwrap() - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_idle_accrues_from_first_idle_frame() {
        let mut timer = SessionTimer::new();

        timer.tick(BehaviorLabel::None, at(0.0));
        let snap = timer.snapshot(at(4.0));
        assert!((snap.idle_duration_sec - 4.0).abs() < 0.001);
    }

    #[test]
    fn test_backwards_clock_clamps_to_zero() {
        let mut timer = SessionTimer::new();

        timer.tick(BehaviorLabel::NailBiting, at(10.0));
        // Clock jumps backwards; the delta must clamp, not go negative
        let snap = timer.tick(BehaviorLabel::None, at(5.0));

        assert_eq!(snap.stress_duration_sec, 0.0);
        assert_eq!(snap.attempt_count, 1);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut timer = SessionTimer::new();

        timer.tick(BehaviorLabel::NailBiting, at(0.0));
        timer.tick(BehaviorLabel::None, at(3.0));
        assert_eq!(timer.attempt_count(), 1);

        timer.reset();
        let snap = timer.snapshot(at(4.0));
        assert_eq!(snap.attempt_count, 0);
        assert_eq!(snap.stress_duration_sec, 0.0);
        assert_eq!(snap.idle_duration_sec, 0.0);
        assert!(snap.last_behavior_ago_sec.is_none());
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut timer = SessionTimer::new();
        timer.tick(BehaviorLabel::NailBiting, at(0.0));
        timer.tick(BehaviorLabel::None, at(2.0));

        let json = timer.to_json().unwrap();
        let loaded = SessionTimer::from_json(&json).unwrap();

        assert_eq!(loaded.attempt_count(), 1);
        let snap = loaded.snapshot(at(2.0));
        assert!((snap.stress_duration_sec - 2.0).abs() < 0.001);
    }
}
