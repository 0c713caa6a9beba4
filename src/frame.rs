//! hand.frame.v1 input schema
//!
//! One record per tracker frame. A frame without landmarks means no hand was
//! detected in that frame.
//!
//! ```json
//! {"schema_version": "hand.frame.v1", "timestamp": "2024-01-15T14:00:00.033Z",
//!  "landmarks": [{"x": 0.51, "y": 0.62, "z": -0.03}, ...]}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::GestureError;
use crate::landmark::{Landmark, LandmarkVector};

/// Current frame schema version
pub const FRAME_SCHEMA_VERSION: &str = "hand.frame.v1";

fn default_schema_version() -> String {
    FRAME_SCHEMA_VERSION.to_string()
}

/// Which hand the tracker believes it saw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
}

/// A single tracker observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
    /// Hand points, or `None` when no hand is in view
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<Handedness>,
    /// Tracker's own confidence in the hand detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_confidence: Option<f32>,
}

impl FrameRecord {
    pub fn with_hand(timestamp: DateTime<Utc>, landmarks: Vec<Landmark>) -> Self {
        Self {
            schema_version: default_schema_version(),
            timestamp,
            landmarks: Some(landmarks),
            handedness: None,
            tracking_confidence: None,
        }
    }

    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            schema_version: default_schema_version(),
            timestamp,
            landmarks: None,
            handedness: None,
            tracking_confidence: None,
        }
    }

    pub fn has_hand(&self) -> bool {
        self.landmarks.is_some()
    }

    /// Validate the record against the schema and the expected point count
    pub fn validate(&self, expected_points: usize) -> Result<(), FrameValidationError> {
        if self.schema_version != FRAME_SCHEMA_VERSION {
            return Err(FrameValidationError::InvalidSchemaVersion {
                expected: FRAME_SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }
        if let Some(confidence) = self.tracking_confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(FrameValidationError::InvalidTrackingConfidence(confidence));
            }
        }
        if let Some(points) = &self.landmarks {
            if points.len() != expected_points {
                return Err(FrameValidationError::WrongPointCount {
                    expected: expected_points,
                    actual: points.len(),
                });
            }
            if let Some(index) = points
                .iter()
                .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
            {
                return Err(FrameValidationError::NonFinitePoint(index));
            }
        }
        Ok(())
    }

    /// Flatten the hand points for the engine. `Ok(None)` means no hand.
    pub fn to_vector(
        &self,
        expected_points: usize,
    ) -> Result<Option<LandmarkVector>, GestureError> {
        self.landmarks
            .as_deref()
            .map(|points| LandmarkVector::from_landmarks(points, expected_points))
            .transpose()
    }
}

/// Frame schema validation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("Expected {expected} landmarks, got {actual}")]
    WrongPointCount { expected: usize, actual: usize },

    #[error("Non-finite coordinate at landmark {0}")]
    NonFinitePoint(usize),

    #[error("Tracking confidence {0} outside 0..=1")]
    InvalidTrackingConfidence(f32),
}

/// Validation result for a single record
#[derive(Debug, Clone)]
pub struct FrameValidationResult {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub error: FrameValidationError,
}

/// Parsing helpers for frame streams
pub struct FrameAdapter;

impl FrameAdapter {
    /// Parse a JSON array of frame records
    pub fn parse_array(json: &str) -> Result<Vec<FrameRecord>, GestureError> {
        let frames: Vec<FrameRecord> = serde_json::from_str(json)?;
        Ok(frames)
    }

    /// Parse newline-delimited frame records, skipping blank lines
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<FrameRecord>, GestureError> {
        let mut frames = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<FrameRecord>(trimmed) {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    return Err(GestureError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(frames)
    }

    /// Collect validation failures (empty when every frame is valid)
    pub fn validate_frames(
        frames: &[FrameRecord],
        expected_points: usize,
    ) -> Vec<FrameValidationResult> {
        frames
            .iter()
            .enumerate()
            .filter_map(|(index, frame)| {
                frame
                    .validate(expected_points)
                    .err()
                    .map(|error| FrameValidationResult {
                        index,
                        timestamp: frame.timestamp,
                        error,
                    })
            })
            .collect()
    }
}
