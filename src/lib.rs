//! NailGuard - On-device compute engine for webcam-based self-grooming
//! behavior detection
//!
//! NailGuard turns per-frame hand and face landmarks into behavior warnings
//! and session statistics through a deterministic pipeline: schema parsing →
//! geometry resolution → behavior classification → session accounting →
//! report encoding.
//!
//! ## Modules
//!
//! - **Frame pipeline**: Process landmark observations into reports for the
//!   presentation sink (`pipeline`, `geometry`, `classifier`, `timer`)
//! - **Presentation helpers**: Warning rate limiting and tip scheduling
//!   (`alert`, `tips`)

pub mod alert;
pub mod classifier;
pub mod encoder;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod schema;
pub mod timer;
pub mod tips;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use alert::WarningGate;
pub use classifier::{BehaviorClassifier, SENSITIVITY_MAX, SENSITIVITY_MIN};
pub use error::MonitorError;
pub use pipeline::{frame_to_report, MonitorProcessor};
pub use timer::SessionTimer;
pub use tips::TipDispenser;

// Schema exports
pub use schema::{parse_frame, RawFrame, SCHEMA_VERSION};

// Core type exports
pub use types::{BehaviorLabel, FaceZone, FaceZones, Point, SessionSnapshot};

/// NailGuard version embedded in all report payloads
pub const NAILGUARD_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "nailguard";
