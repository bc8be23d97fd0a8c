//! Report encoding
//!
//! This module encodes a frame analysis and session snapshot into the
//! versioned JSON report consumed by the presentation sink (rendering, sound,
//! popups). Ensures all required fields are present and properly formatted.

use chrono::Utc;
use uuid::Uuid;

use crate::error::MonitorError;
use crate::schema::RawFrame;
use crate::types::{
    FrameAnalysis, ReportFrame, ReportPayload, ReportProducer, ReportProvenance, SessionSnapshot,
};
use crate::{NAILGUARD_VERSION, PRODUCER_NAME};

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for producing report payloads
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a frame analysis and session snapshot into a report payload.
    pub fn encode(
        &self,
        frame: &RawFrame,
        analysis: &FrameAnalysis,
        session: &SessionSnapshot,
    ) -> ReportPayload {
        let computed_at = Utc::now();

        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: NAILGUARD_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            source_device_id: frame.device_id.clone(),
            observed_at_utc: frame.timestamp.to_rfc3339(),
            computed_at_utc: computed_at.to_rfc3339(),
        };

        let frame_body = ReportFrame {
            behavior: analysis.classification.label,
            hand_point: analysis.classification.hand_point,
            mouth_center: analysis.geometry.mouth_center,
            hair_anchor: analysis.geometry.hair_anchor,
            zones: analysis.geometry.zones,
            target_distance_px: analysis.classification.distance_px,
        };

        ReportPayload {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            frame: frame_body,
            session: session.clone(),
        }
    }

    /// Encode to a JSON string.
    pub fn encode_to_json(
        &self,
        frame: &RawFrame,
        analysis: &FrameAnalysis,
        session: &SessionSnapshot,
    ) -> Result<String, MonitorError> {
        let payload = self.encode(frame, analysis, session);
        serde_json::to_string(&payload).map_err(MonitorError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BehaviorLabel, Classification, Point, ResolvedGeometry};
    use chrono::TimeZone;

    fn make_inputs() -> (RawFrame, FrameAnalysis, SessionSnapshot) {
        let frame = RawFrame {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap(),
            width: 640,
            height: 480,
            hand: None,
            face: None,
            device_id: "cam-0".to_string(),
        };

        let analysis = FrameAnalysis {
            classification: Classification {
                label: BehaviorLabel::NailBiting,
                hand_point: Some(Point::new(320, 240)),
                distance_px: Some(25.0),
            },
            geometry: ResolvedGeometry::empty(),
        };

        let session = SessionSnapshot {
            attempt_count: 3,
            stress_duration_sec: 12.5,
            warning_active: true,
            idle_duration_sec: 40.0,
            last_behavior_ago_sec: Some(0.0),
        };

        (frame, analysis, session)
    }

    #[test]
    fn test_encode_report_fields() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let (frame, analysis, session) = make_inputs();

        let json = encoder.encode_to_json(&frame, &analysis, &session).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["report_version"], REPORT_VERSION);
        assert_eq!(payload["producer"]["name"], PRODUCER_NAME);
        assert_eq!(payload["producer"]["instance_id"], "test-instance");
        assert_eq!(payload["provenance"]["source_device_id"], "cam-0");
        assert_eq!(
            payload["provenance"]["observed_at_utc"],
            "2024-01-15T14:00:00+00:00"
        );
        assert_eq!(payload["frame"]["behavior"], "nail_biting");
        assert_eq!(payload["frame"]["hand_point"]["x"], 320);
        assert_eq!(payload["session"]["attempt_count"], 3);
        assert_eq!(payload["session"]["warning_active"], true);
    }

    #[test]
    fn test_absent_geometry_omitted() {
        let encoder = ReportEncoder::new();
        let (frame, mut analysis, session) = make_inputs();
        analysis.classification = Classification::none();

        let json = encoder.encode_to_json(&frame, &analysis, &session).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(payload["frame"].get("hand_point").is_none());
        assert!(payload["frame"].get("mouth_center").is_none());
        assert!(payload["frame"].get("zones").is_none());
    }
}
