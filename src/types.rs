//! Core types for the NailGuard detection pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: pixel-space geometry, behavior labels, session snapshots, and the
//! report payload delivered to the presentation sink.

use serde::{Deserialize, Serialize};

/// Behavior detected in a single frame.
///
/// Labels are mutually exclusive and computed fresh every frame; a label is
/// never carried over from a previous frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorLabel {
    None,
    NailBiting,
    HairPulling,
}

impl BehaviorLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorLabel::None => "none",
            BehaviorLabel::NailBiting => "nail_biting",
            BehaviorLabel::HairPulling => "hair_pulling",
        }
    }

    /// True for any label other than `None`.
    pub fn is_behavior(&self) -> bool {
        !matches!(self, BehaviorLabel::None)
    }
}

/// A point in pixel space.
///
/// Absence of a landmark is expressed as `Option<Point>`; a point is never
/// partially present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point, in pixels.
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        dx.hypot(dy)
    }
}

/// Axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceZone {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
}

impl FaceZone {
    /// Whether a point falls inside the zone (edges inclusive).
    ///
    /// Classification keys off nearest-point distance, not containment; this
    /// is for presentation-layer hit-testing against the reported zones.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }
}

/// The two face regions derived once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceZones {
    /// Hair-pulling region: forehead down to the face vertical midpoint.
    pub upper: FaceZone,
    /// Nail-biting region: face vertical midpoint down to the chin.
    pub lower: FaceZone,
}

/// Pixel-space points of interest resolved from raw landmarks.
///
/// Produced by the geometry stage; carries no side effects. Drawing overlays
/// from these values is the presentation layer's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedGeometry {
    /// Fingertip points (thumb, index, middle, ring, pinky). Empty when no
    /// hand was detected.
    pub finger_tips: Vec<Point>,
    /// Midpoint of the two mouth-margin landmarks, if a face was detected.
    pub mouth_center: Option<Point>,
    /// Forehead landmark extended upward by one head-height, if a face was
    /// detected.
    pub hair_anchor: Option<Point>,
    /// Upper/lower face zones, if a face was detected.
    pub zones: Option<FaceZones>,
}

impl ResolvedGeometry {
    /// Geometry for a frame where nothing was detected.
    pub fn empty() -> Self {
        Self {
            finger_tips: Vec::new(),
            mouth_center: None,
            hair_anchor: None,
            zones: None,
        }
    }
}

/// Classifier output for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Behavior label for the frame.
    pub label: BehaviorLabel,
    /// The fingertip closest to a target, when a hand was detected. Falls back
    /// to the first fingertip when no face target exists.
    pub hand_point: Option<Point>,
    /// Distance in pixels from `hand_point` to the winning target, when both a
    /// hand and a face were detected.
    pub distance_px: Option<f64>,
}

impl Classification {
    /// Classification for a frame with no usable detection.
    pub fn none() -> Self {
        Self {
            label: BehaviorLabel::None,
            hand_point: None,
            distance_px: None,
        }
    }
}

/// Full per-frame analysis: resolved geometry plus classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    pub classification: Classification,
    pub geometry: ResolvedGeometry,
}

/// Point-in-time view of the session timer.
///
/// Durations are live: mid-episode the stress duration includes the time since
/// the episode started, and mid-idle the idle duration includes the time since
/// idling began.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Number of behavior episodes started this session.
    pub attempt_count: u32,
    /// Cumulative behavior duration in seconds.
    pub stress_duration_sec: f64,
    /// Whether a warning is currently active (a behavior episode is running).
    pub warning_active: bool,
    /// Cumulative stress-free duration in seconds.
    pub idle_duration_sec: f64,
    /// Seconds since the last behavior episode started, if any occurred.
    pub last_behavior_ago_sec: Option<f64>,
}

/// Report producer metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report provenance information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub source_device_id: String,
    pub observed_at_utc: String,
    pub computed_at_utc: String,
}

/// Per-frame section of the report payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFrame {
    pub behavior: BehaviorLabel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand_point: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth_center: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hair_anchor: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<FaceZones>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_distance_px: Option<f64>,
}

/// Complete report payload consumed by the presentation sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPayload {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub frame: ReportFrame,
    pub session: SessionSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behavior_label_serialization() {
        let label = BehaviorLabel::NailBiting;
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, "\"nail_biting\"");

        let parsed: BehaviorLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, BehaviorLabel::NailBiting);
    }

    #[test]
    fn test_behavior_label_is_behavior() {
        assert!(!BehaviorLabel::None.is_behavior());
        assert!(BehaviorLabel::NailBiting.is_behavior());
        assert!(BehaviorLabel::HairPulling.is_behavior());
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert!((a.distance_to(b) - 5.0).abs() < f64::EPSILON);
        assert!((b.distance_to(a) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zone_containment() {
        let zone = FaceZone {
            top: 100,
            bottom: 200,
            left: 50,
            right: 150,
        };

        assert!(zone.contains(Point::new(100, 150)));
        assert!(zone.contains(Point::new(50, 100))); // edges inclusive
        assert!(!zone.contains(Point::new(49, 150)));
        assert!(!zone.contains(Point::new(100, 201)));
    }
}
