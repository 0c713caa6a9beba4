//! Synheart Gesture - On-device hand gesture recognition and action dispatch
//!
//! Gesture turns a stream of hand landmark frames into user-facing actions
//! through a deterministic pipeline: landmark flattening → sliding window →
//! classification → confidence gate → stability check → cooldowns → dispatch.
//!
//! ## Entry points
//!
//! - **GestureEngine**: Frame-by-frame state machine for hosts with an
//!   asynchronous model (classification requests are ticketed)
//! - **GestureProcessor**: Engine paired with an in-process `Classifier`
//! - **FFI**: C bindings over the engine for mobile and desktop hosts

pub mod buffer;
pub mod classifier;
pub mod config;
pub mod cooldown;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod frame;
pub mod gate;
pub mod landmark;
pub mod pipeline;
pub mod stability;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use classifier::{ClassificationResult, Classifier, TemplateClassifier};
pub use config::GestureConfig;
pub use engine::{ClassifyRequest, EnginePhase, EngineState, FrameOutcome, GestureEngine};
pub use error::GestureError;
pub use pipeline::{replay_frames, GestureProcessor};

// Schema exports
pub use frame::{FrameAdapter, FrameRecord, FRAME_SCHEMA_VERSION};

pub use types::{
    ActionKind, ActionReport, ActionRequest, EngineEvent, GestureLabel, Notification, Status,
    StatusUpdate,
};

/// Gesture version reported by the CLI and FFI
pub const GESTURE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "synheart-gesture";
