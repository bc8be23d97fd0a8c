//! Warning alert gating
//!
//! The presentation sink plays the warning sound on a fire-and-forget
//! background task; this module provides the rate limit for it. Triggers are
//! at least one second apart regardless of how many frames report an active
//! warning. The playback itself stays outside the core.

use chrono::{DateTime, Duration, Utc};

/// Minimum milliseconds between warning triggers
pub const MIN_TRIGGER_INTERVAL_MS: i64 = 1_000;

/// Rate-limit gate for warning side effects.
#[derive(Debug, Clone, Default)]
pub struct WarningGate {
    last_fired: Option<DateTime<Utc>>,
}

impl WarningGate {
    pub fn new() -> Self {
        Self { last_fired: None }
    }

    /// Whether the warning side effect should fire now.
    ///
    /// Returns true and arms the gate when `warning_active` is set and at
    /// least the minimum interval has passed since the last trigger. A clock
    /// that moved backwards reads as zero elapsed time and does not fire.
    pub fn check(&mut self, warning_active: bool, now: DateTime<Utc>) -> bool {
        if !warning_active {
            return false;
        }

        let ready = match self.last_fired {
            None => true,
            Some(last) => now - last >= Duration::milliseconds(MIN_TRIGGER_INTERVAL_MS),
        };

        if ready {
            self.last_fired = Some(now);
        }
        ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap() + Duration::milliseconds(ms)
    }

    #[test]
    fn test_inactive_never_fires() {
        let mut gate = WarningGate::new();
        assert!(!gate.check(false, at(0)));
        assert!(!gate.check(false, at(5_000)));
    }

    #[test]
    fn test_first_active_frame_fires() {
        let mut gate = WarningGate::new();
        assert!(gate.check(true, at(0)));
    }

    #[test]
    fn test_rate_limited_to_one_second() {
        let mut gate = WarningGate::new();

        assert!(gate.check(true, at(0)));
        // 30fps worth of active frames inside the window stay silent
        for ms in (33..1_000).step_by(33) {
            assert!(!gate.check(true, at(ms)));
        }
        assert!(gate.check(true, at(1_000)));
    }

    #[test]
    fn test_backwards_clock_does_not_fire() {
        let mut gate = WarningGate::new();
        assert!(gate.check(true, at(5_000)));
        assert!(!gate.check(true, at(4_000)));
    }
}
