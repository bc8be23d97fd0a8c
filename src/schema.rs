//! Raw frame input schema
//!
//! This module defines the versioned schema for per-frame observations coming
//! from the external landmark source, plus parsing and validation. Coordinates
//! arrive normalized to 0..1; the geometry stage scales them to pixel space.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

/// Current input schema version
pub const SCHEMA_VERSION: &str = "frame.raw.v1";

/// Number of landmarks in a hand landmark set
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Minimum face mesh length covering every landmark index the geometry stage
/// reads (the face-right margin, index 454, is the highest).
pub const FACE_LANDMARK_MIN: usize = 455;

/// A normalized landmark coordinate (0..1 relative to frame dimensions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single frame observation from the landmark source.
///
/// Zero-or-one hand landmark sets (fixed 21 points) and zero-or-one face
/// landmark sets (fixed mesh topology). A missing set means nothing was
/// detected in the frame; it is a normal condition, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFrame {
    /// Capture timestamp (UTC)
    pub timestamp: DateTime<Utc>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Hand landmarks, absent when no hand was detected
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand: Option<Vec<NormalizedPoint>>,
    /// Face mesh landmarks, absent when no face was detected
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<Vec<NormalizedPoint>>,
    /// Device identifier for provenance tracking
    #[serde(default = "default_device_id")]
    pub device_id: String,
}

fn default_device_id() -> String {
    "unknown".to_string()
}

impl RawFrame {
    /// Validate structural invariants of the frame.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.width == 0 || self.height == 0 {
            return Err(MonitorError::InvalidFrame(format!(
                "frame dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }

        if let Some(hand) = &self.hand {
            if hand.len() != HAND_LANDMARK_COUNT {
                return Err(MonitorError::InvalidFrame(format!(
                    "hand landmark set must contain {} points, got {}",
                    HAND_LANDMARK_COUNT,
                    hand.len()
                )));
            }
        }

        if let Some(face) = &self.face {
            if face.len() < FACE_LANDMARK_MIN {
                return Err(MonitorError::InvalidFrame(format!(
                    "face landmark set must contain at least {} points, got {}",
                    FACE_LANDMARK_MIN,
                    face.len()
                )));
            }
        }

        Ok(())
    }
}

/// Parse and validate a raw frame from JSON.
pub fn parse_frame(json: &str) -> Result<RawFrame, MonitorError> {
    let frame: RawFrame =
        serde_json::from_str(json).map_err(|e| MonitorError::ParseError(e.to_string()))?;
    frame.validate()?;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_frame_json() -> &'static str {
        r#"{
            "timestamp": "2024-01-15T14:00:00Z",
            "width": 1280,
            "height": 720
        }"#
    }

    #[test]
    fn test_parse_empty_frame() {
        let frame = parse_frame(empty_frame_json()).unwrap();
        assert_eq!(frame.width, 1280);
        assert_eq!(frame.height, 720);
        assert!(frame.hand.is_none());
        assert!(frame.face.is_none());
        assert_eq!(frame.device_id, "unknown");
    }

    #[test]
    fn test_parse_frame_with_hand() {
        let points: Vec<String> = (0..HAND_LANDMARK_COUNT)
            .map(|i| format!(r#"{{"x": 0.{i}, "y": 0.5}}"#, i = i % 10))
            .collect();
        let json = format!(
            r#"{{
                "timestamp": "2024-01-15T14:00:00Z",
                "width": 640,
                "height": 480,
                "device_id": "cam-0",
                "hand": [{}]
            }}"#,
            points.join(",")
        );

        let frame = parse_frame(&json).unwrap();
        assert_eq!(frame.hand.as_ref().unwrap().len(), HAND_LANDMARK_COUNT);
        assert_eq!(frame.device_id, "cam-0");
    }

    #[test]
    fn test_invalid_json() {
        let result = parse_frame("not valid json");
        assert!(matches!(result, Err(MonitorError::ParseError(_))));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let json = r#"{
            "timestamp": "2024-01-15T14:00:00Z",
            "width": 0,
            "height": 720
        }"#;
        let result = parse_frame(json);
        assert!(matches!(result, Err(MonitorError::InvalidFrame(_))));
    }

    #[test]
    fn test_short_hand_set_rejected() {
        let json = r#"{
            "timestamp": "2024-01-15T14:00:00Z",
            "width": 640,
            "height": 480,
            "hand": [{"x": 0.5, "y": 0.5}]
        }"#;
        let result = parse_frame(json);
        assert!(matches!(result, Err(MonitorError::InvalidFrame(_))));
    }

    #[test]
    fn test_short_face_mesh_rejected() {
        let json = r#"{
            "timestamp": "2024-01-15T14:00:00Z",
            "width": 640,
            "height": 480,
            "face": [{"x": 0.5, "y": 0.5}, {"x": 0.4, "y": 0.4}]
        }"#;
        let result = parse_frame(json);
        assert!(matches!(result, Err(MonitorError::InvalidFrame(_))));
    }
}
