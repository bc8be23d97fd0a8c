//! Stress-relief tip scheduling
//!
//! This module decides when the presentation sink should surface a tip and
//! which text to show. Tips appear once the session reaches five attempts and
//! then every five attempts after the last one shown. Text may come from an
//! external fetch collaborator; fetched tips are cached for five minutes and
//! any fetch failure falls back to a built-in tip. Neither the classifier nor
//! the session timer depends on this module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Attempt count at which the first tip is shown
pub const TIP_THRESHOLD: u32 = 5;

/// Minimum attempts between consecutive tips
pub const TIP_INTERVAL: u32 = 5;

/// How long a fetched tip stays fresh, in seconds
pub const TIP_CACHE_TTL_SEC: i64 = 300;

/// Built-in tips used when no external source is available or it fails.
pub const FALLBACK_TIPS: [&str; 6] = [
    "Take 5 deep breaths - inhale for 4 seconds, hold for 4, exhale for 6",
    "Try squeezing a stress ball instead - it gives your hands something to do",
    "Take a short walk - physical movement helps reduce stress hormones",
    "Drink some water - dehydration can increase stress responses",
    "Listen to calming music for 2 minutes - it can lower your heart rate",
    "Try the 5-4-3-2-1 grounding technique: notice 5 things you see, 4 you can \
     touch, 3 you hear, 2 you smell, 1 you taste",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedTip {
    text: String,
    fetched_at: DateTime<Utc>,
}

/// Scheduler and cache for stress-relief tips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipDispenser {
    /// Attempt count when a tip was last shown
    last_shown_at: u32,
    /// Most recently fetched tip, if any
    cached: Option<CachedTip>,
    /// Cache time-to-live in seconds
    ttl_sec: i64,
}

impl Default for TipDispenser {
    fn default() -> Self {
        Self::new()
    }
}

impl TipDispenser {
    pub fn new() -> Self {
        Self {
            last_shown_at: 0,
            cached: None,
            ttl_sec: TIP_CACHE_TTL_SEC,
        }
    }

    /// Create a dispenser with a specific cache TTL in seconds.
    pub fn with_ttl(ttl_sec: i64) -> Self {
        Self {
            last_shown_at: 0,
            cached: None,
            ttl_sec,
        }
    }

    /// Whether a tip is due at the given attempt count.
    ///
    /// An attempt count below the last-shown mark (the session was reset
    /// without resetting the dispenser) is never due.
    pub fn is_due(&self, attempt_count: u32) -> bool {
        attempt_count >= TIP_THRESHOLD
            && attempt_count.saturating_sub(self.last_shown_at) >= TIP_INTERVAL
    }

    /// Clear the schedule for a session restart. The cached tip text is kept;
    /// its TTL governs freshness independently of the session.
    pub fn reset(&mut self) {
        self.last_shown_at = 0;
    }

    /// Return a tip if one is due, marking it as shown.
    ///
    /// `fetch` is the external tip collaborator; it is only invoked when a tip
    /// is due and the cache is stale. A fetch failure is swallowed and a
    /// built-in tip is returned instead.
    pub fn dispense<F>(
        &mut self,
        attempt_count: u32,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Option<String>
    where
        F: FnOnce() -> Result<String, MonitorError>,
    {
        if !self.is_due(attempt_count) {
            return None;
        }
        self.last_shown_at = attempt_count;

        if let Some(cached) = &self.cached {
            let age_sec = (now - cached.fetched_at).num_seconds();
            if (0..self.ttl_sec).contains(&age_sec) {
                return Some(cached.text.clone());
            }
        }

        match fetch() {
            Ok(text) => {
                self.cached = Some(CachedTip {
                    text: text.clone(),
                    fetched_at: now,
                });
                Some(text)
            }
            Err(_) => Some(Self::fallback_tip(attempt_count).to_string()),
        }
    }

    /// Deterministic rotation through the built-in tips.
    pub fn fallback_tip(attempt_count: u32) -> &'static str {
        let index = (attempt_count / TIP_INTERVAL) as usize % FALLBACK_TIPS.len();
        FALLBACK_TIPS[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap()
    }

    fn no_fetch() -> Result<String, MonitorError> {
        Err(MonitorError::TipSourceUnavailable("offline".to_string()))
    }

    #[test]
    fn test_not_due_below_threshold() {
        let mut dispenser = TipDispenser::new();
        for attempts in 0..TIP_THRESHOLD {
            assert!(dispenser.dispense(attempts, t0(), no_fetch).is_none());
        }
    }

    #[test]
    fn test_due_at_threshold_then_every_interval() {
        let mut dispenser = TipDispenser::new();

        assert!(dispenser.dispense(5, t0(), no_fetch).is_some());
        // Not again until 5 more attempts
        assert!(dispenser.dispense(6, t0(), no_fetch).is_none());
        assert!(dispenser.dispense(9, t0(), no_fetch).is_none());
        assert!(dispenser.dispense(10, t0(), no_fetch).is_some());
        assert!(dispenser.dispense(14, t0(), no_fetch).is_none());
        assert!(dispenser.dispense(15, t0(), no_fetch).is_some());
    }

    #[test]
    fn test_fetch_failure_falls_back() {
        let mut dispenser = TipDispenser::new();
        let tip = dispenser.dispense(5, t0(), no_fetch).unwrap();
        assert!(FALLBACK_TIPS.contains(&tip.as_str()));
    }

    #[test]
    fn test_fetched_tip_cached_within_ttl() {
        let mut dispenser = TipDispenser::new();

        let tip = dispenser
            .dispense(5, t0(), || Ok("fetched tip".to_string()))
            .unwrap();
        assert_eq!(tip, "fetched tip");

        // Within the TTL the cache is served and fetch is not called
        let tip = dispenser
            .dispense(10, t0() + Duration::seconds(60), || {
                panic!("fetch should not be called")
            })
            .unwrap();
        assert_eq!(tip, "fetched tip");
    }

    #[test]
    fn test_cache_expires_after_ttl() {
        let mut dispenser = TipDispenser::new();
        dispenser
            .dispense(5, t0(), || Ok("first".to_string()))
            .unwrap();

        let later = t0() + Duration::seconds(TIP_CACHE_TTL_SEC + 1);
        let tip = dispenser
            .dispense(10, later, || Ok("second".to_string()))
            .unwrap();
        assert_eq!(tip, "second");
    }

    #[test]
    fn test_attempt_count_below_last_shown_not_due() {
        let mut dispenser = TipDispenser::new();
        assert!(dispenser.dispense(10, t0(), no_fetch).is_some());

        // Session reset dropped the attempt count below the last-shown mark
        assert!(!dispenser.is_due(5));
        assert!(dispenser.dispense(5, t0(), no_fetch).is_none());
    }

    #[test]
    fn test_reset_restarts_schedule() {
        let mut dispenser = TipDispenser::new();
        assert!(dispenser.dispense(10, t0(), no_fetch).is_some());

        dispenser.reset();
        assert!(dispenser.dispense(5, t0(), no_fetch).is_some());
    }

    #[test]
    fn test_fallback_rotation_is_deterministic() {
        let a = TipDispenser::fallback_tip(5);
        let b = TipDispenser::fallback_tip(10);
        assert_eq!(a, TipDispenser::fallback_tip(5));
        assert_ne!(a, b);
    }
}
