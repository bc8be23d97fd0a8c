//! Behavior classification
//!
//! This module assigns a behavior label to a frame from its resolved geometry.
//! Policy: the globally closest fingertip-to-target Euclidean distance is
//! compared against the sensitivity threshold (strict `<`). The mouth center
//! is evaluated before the hair anchor, so an exact distance tie resolves to
//! nail-biting. Nearest-point distance is used rather than zone containment so
//! the label does not flicker at zone boundaries; the zones are still resolved
//! and reported for presentation overlays.

use crate::error::MonitorError;
use crate::types::{BehaviorLabel, Classification, Point, ResolvedGeometry};

/// Lowest accepted sensitivity (pixels); stricter detection.
pub const SENSITIVITY_MIN: u32 = 30;
/// Highest accepted sensitivity (pixels); looser detection.
pub const SENSITIVITY_MAX: u32 = 80;

/// Classifier holding a validated pixel-distance threshold
#[derive(Debug, Clone)]
pub struct BehaviorClassifier {
    sensitivity_px: f64,
}

impl BehaviorClassifier {
    /// Create a classifier with the given sensitivity threshold.
    ///
    /// Sensitivity must lie in `[SENSITIVITY_MIN, SENSITIVITY_MAX]`.
    pub fn new(sensitivity: u32) -> Result<Self, MonitorError> {
        if !(SENSITIVITY_MIN..=SENSITIVITY_MAX).contains(&sensitivity) {
            return Err(MonitorError::InvalidSensitivity(
                sensitivity,
                SENSITIVITY_MIN,
                SENSITIVITY_MAX,
            ));
        }
        Ok(Self {
            sensitivity_px: sensitivity as f64,
        })
    }

    /// The configured threshold in pixels.
    pub fn sensitivity(&self) -> u32 {
        self.sensitivity_px as u32
    }

    /// Classify a frame from its resolved geometry.
    ///
    /// An absent hand or absent face always yields `BehaviorLabel::None`
    /// (treated as infinite distance). When a hand is present but no face,
    /// the hand point defaults to the first fingertip.
    pub fn classify(&self, geometry: &ResolvedGeometry) -> Classification {
        if geometry.finger_tips.is_empty() {
            return Classification::none();
        }

        // Targets in evaluation order: mouth first, so exact ties resolve to
        // nail-biting.
        let targets: [(Option<Point>, BehaviorLabel); 2] = [
            (geometry.mouth_center, BehaviorLabel::NailBiting),
            (geometry.hair_anchor, BehaviorLabel::HairPulling),
        ];

        let mut best: Option<(f64, Point, BehaviorLabel)> = None;
        for tip in &geometry.finger_tips {
            for (target, label) in &targets {
                let Some(target) = target else { continue };
                let distance = tip.distance_to(*target);
                if best.map_or(true, |(d, _, _)| distance < d) {
                    best = Some((distance, *tip, *label));
                }
            }
        }

        match best {
            Some((distance, tip, label)) => Classification {
                // Threshold is strict: a distance equal to the sensitivity is
                // not a behavior.
                label: if distance < self.sensitivity_px {
                    label
                } else {
                    BehaviorLabel::None
                },
                hand_point: Some(tip),
                distance_px: Some(distance),
            },
            None => Classification {
                label: BehaviorLabel::None,
                hand_point: geometry.finger_tips.first().copied(),
                distance_px: None,
            },
        }
    }
}
