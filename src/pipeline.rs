//! Pipeline orchestration
//!
//! This module provides the synchronous public API for Synheart Gesture. It
//! drives a `GestureEngine` with an in-process `Classifier`: every frame runs
//! through normalization, buffering and, when a window is ready, classification
//! and decision, producing an ordered list of engine events.
//!
//! Hosts whose model runs asynchronously should drive `GestureEngine` directly
//! (or through the FFI layer) and complete requests as results arrive.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::classifier::Classifier;
use crate::config::GestureConfig;
use crate::engine::{EngineState, GestureEngine};
use crate::error::GestureError;
use crate::frame::FrameRecord;
use crate::landmark::LandmarkVector;
use crate::types::{ActionReport, EngineEvent};

/// Replay a recorded frame stream through a fresh engine (stateless, one-shot).
///
/// # Arguments
/// * `frames` - Tracker frames in arrival order
/// * `config` - Engine configuration
/// * `classifier` - Model used for every full window
///
/// # Returns
/// All engine events in emission order
///
/// # Example
/// ```ignore
/// let events = replay_frames(&frames, GestureConfig::default(), model)?;
/// ```
pub fn replay_frames<C: Classifier>(
    frames: &[FrameRecord],
    config: GestureConfig,
    classifier: C,
) -> Result<Vec<EngineEvent>, GestureError> {
    let mut processor = GestureProcessor::new(config, classifier)?;
    Ok(processor.process_frames(frames))
}

/// Stateful processor pairing the engine with an in-process classifier.
pub struct GestureProcessor<C> {
    engine: GestureEngine,
    classifier: C,
}

impl<C: Classifier> GestureProcessor<C> {
    /// Create a processor, checking that the model matches the configuration
    pub fn new(config: GestureConfig, classifier: C) -> Result<Self, GestureError> {
        if classifier.labels() != config.labels.as_slice() {
            return Err(GestureError::InvalidConfig(format!(
                "model labels {:?} do not match configured labels {:?}",
                classifier.labels(),
                config.labels
            )));
        }
        if let Some(width) = classifier.input_width() {
            if width != config.feature_len() {
                return Err(GestureError::InvalidConfig(format!(
                    "model expects {} features per frame, config produces {}",
                    width,
                    config.feature_len()
                )));
            }
        }
        Ok(Self {
            engine: GestureEngine::new(config)?,
            classifier,
        })
    }

    /// Process a single frame and return the events it produced.
    ///
    /// Malformed frames are dropped with a warning; they never stop the stream.
    pub fn process_frame(&mut self, frame: &FrameRecord) -> Vec<EngineEvent> {
        let vector = match frame.to_vector(self.engine.config().landmark_count) {
            Ok(vector) => vector,
            Err(e) => {
                warn!(timestamp = %frame.timestamp, error = %e, "dropping malformed frame");
                return Vec::new();
            }
        };
        self.step(vector, frame.timestamp)
    }

    /// Process frames in order, concatenating their events
    pub fn process_frames(&mut self, frames: &[FrameRecord]) -> Vec<EngineEvent> {
        frames
            .iter()
            .flat_map(|frame| self.process_frame(frame))
            .collect()
    }

    /// Feed back an action outcome from whoever executed it
    pub fn report_action(&mut self, report: ActionReport) -> Vec<EngineEvent> {
        self.engine.report_action(report)
    }

    pub fn restart(&mut self) {
        self.engine.restart();
    }

    pub fn state(&self) -> EngineState {
        self.engine.state()
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    fn step(&mut self, vector: Option<LandmarkVector>, now: DateTime<Utc>) -> Vec<EngineEvent> {
        let outcome = self.engine.on_frame(vector, now);
        let mut events = outcome.events;

        if let Some(request) = outcome.classify {
            let result = self.classifier.classify(&request.window);
            events.extend(self.engine.complete_classification(request.ticket, result, now));
        }

        events
    }
}
