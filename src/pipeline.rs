//! Pipeline orchestration
//!
//! This module provides the public API for NailGuard. It orchestrates the
//! full pipeline from a raw frame observation to the report consumed by the
//! presentation sink.
//!
//! Frames are processed one at a time, fully synchronously: a frame is
//! resolved, classified, and folded into the session timer before the next
//! frame is read. The session timer is owned exclusively by the processor.

use crate::classifier::BehaviorClassifier;
use crate::encoder::ReportEncoder;
use crate::error::MonitorError;
use crate::geometry::GeometryResolver;
use crate::schema::{parse_frame, RawFrame};
use crate::timer::SessionTimer;
use crate::types::{FrameAnalysis, SessionSnapshot};

/// Process a single frame JSON observation into a report JSON (stateless,
/// one-shot). The session timer starts fresh, so this is mainly useful for
/// probing the classifier; use [`MonitorProcessor`] for a live session.
///
/// # Arguments
/// * `frame_json` - Raw frame observation JSON (`frame.raw.v1`)
/// * `sensitivity` - Pixel-distance threshold, valid range 30-80
///
/// # Example
/// ```ignore
/// let report_json = frame_to_report(frame_json, 50)?;
/// ```
pub fn frame_to_report(frame_json: String, sensitivity: u32) -> Result<String, MonitorError> {
    let mut processor = MonitorProcessor::new(sensitivity)?;
    processor.process(&frame_json)
}

/// Stateful frame processor owning the session timer.
///
/// Pipeline stages per frame:
/// 1. Schema - Parse and validate the raw frame
/// 2. GeometryResolver - Resolve pixel-space points of interest
/// 3. BehaviorClassifier - Assign a behavior label
/// 4. SessionTimer - Fold the label into session accounting
/// 5. ReportEncoder - Encode the report payload
pub struct MonitorProcessor {
    classifier: BehaviorClassifier,
    timer: SessionTimer,
    encoder: ReportEncoder,
}

impl MonitorProcessor {
    /// Create a processor with the given sensitivity threshold (30-80 px).
    pub fn new(sensitivity: u32) -> Result<Self, MonitorError> {
        Ok(Self {
            classifier: BehaviorClassifier::new(sensitivity)?,
            timer: SessionTimer::new(),
            encoder: ReportEncoder::new(),
        })
    }

    /// Process one frame observation JSON and return the report JSON.
    pub fn process(&mut self, frame_json: &str) -> Result<String, MonitorError> {
        let frame = parse_frame(frame_json)?;
        let (analysis, snapshot) = self.analyze(&frame)?;
        self.encoder.encode_to_json(&frame, &analysis, &snapshot)
    }

    /// Typed equivalent of [`process`](Self::process) for embedding: run the
    /// geometry, classification, and timer stages on an already-parsed frame.
    ///
    /// The frame is validated first; a malformed landmark set (wrong hand
    /// length, short face mesh) is rejected before the geometry stage reads
    /// fixed indices, and the session timer is not advanced.
    pub fn analyze(
        &mut self,
        frame: &RawFrame,
    ) -> Result<(FrameAnalysis, SessionSnapshot), MonitorError> {
        frame.validate()?;

        let geometry = GeometryResolver::resolve(frame);
        let classification = self.classifier.classify(&geometry);
        let snapshot = self.timer.tick(classification.label, frame.timestamp);

        Ok((
            FrameAnalysis {
                classification,
                geometry,
            },
            snapshot,
        ))
    }

    /// Change the sensitivity threshold mid-session. Session accounting is
    /// unaffected.
    pub fn set_sensitivity(&mut self, sensitivity: u32) -> Result<(), MonitorError> {
        self.classifier = BehaviorClassifier::new(sensitivity)?;
        Ok(())
    }

    /// The configured sensitivity threshold in pixels.
    pub fn sensitivity(&self) -> u32 {
        self.classifier.sensitivity()
    }

    /// Number of behavior episodes started this session.
    pub fn attempt_count(&self) -> u32 {
        self.timer.attempt_count()
    }

    /// Zero the session timer for a session restart.
    pub fn reset_session(&mut self) {
        self.timer.reset();
    }

    /// Save session timer state to JSON for persistence.
    pub fn save_session(&self) -> Result<String, MonitorError> {
        self.timer
            .to_json()
            .map_err(|e| MonitorError::EncodingError(e.to_string()))
    }

    /// Load session timer state from JSON.
    pub fn load_session(&mut self, json: &str) -> Result<(), MonitorError> {
        self.timer =
            SessionTimer::from_json(json).map_err(|e| MonitorError::ParseError(e.to_string()))?;
        Ok(())
    }
}
