//! Error types for Synheart Gesture

use thiserror::Error;

/// Errors that can occur while ingesting frames, classifying windows or
/// loading configuration
#[derive(Debug, Error)]
pub enum GestureError {
    #[error("Failed to parse frame payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid landmark vector: expected {expected} values, got {actual}")]
    InvalidLandmarks { expected: usize, actual: usize },

    #[error("Non-finite landmark coordinate at point {0}")]
    NonFiniteLandmark(usize),

    #[error("Unknown gesture label: {0}")]
    UnknownLabel(String),

    #[error("Probability vector has {actual} entries for {expected} labels")]
    ProbabilityShape { expected: usize, actual: usize },

    #[error("Classification failed: {0}")]
    ClassificationFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),
}
