//! Engine configuration
//!
//! Every tunable of the gesture engine lives here. Defaults reproduce the
//! production behaviour; a JSON file may override any subset of fields.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::buffer::DEFAULT_SEQUENCE_LENGTH;
use crate::error::GestureError;
use crate::landmark::{COORDS_PER_LANDMARK, HAND_LANDMARK_COUNT};
use crate::types::{ActionKind, GestureLabel};

/// Minimum top-1 probability for a gesture to be accepted
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.85;

/// Minimum gap between the top-1 and top-2 probabilities
pub const DEFAULT_MIN_MARGIN: f32 = 0.25;

/// Quiet period between two fired gestures (ms)
pub const DEFAULT_GESTURE_COOLDOWN_MS: u64 = 1500;

/// Quiet period between two invocations of the same action (ms)
pub const DEFAULT_ACTION_COOLDOWN_MS: u64 = 2500;

/// Upper bound accepted for any cooldown (one hour)
pub const MAX_COOLDOWN_MS: u64 = 60 * 60 * 1000;

/// Gesture engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Model output order: probability `i` belongs to `labels[i]`
    pub labels: Vec<GestureLabel>,
    /// Labels allowed to trigger actions
    pub allowed: Vec<GestureLabel>,
    /// Frames per classification window
    pub sequence_length: usize,
    /// Points per tracked hand
    pub landmark_count: usize,
    pub min_confidence: f32,
    pub min_margin: f32,
    pub gesture_cooldown_ms: u64,
    /// Per-action cooldowns; missing actions use the default
    pub action_cooldowns_ms: BTreeMap<ActionKind, u64>,
}

impl Default for GestureConfig {
    fn default() -> Self {
        let mut action_cooldowns_ms = BTreeMap::new();
        action_cooldowns_ms.insert(ActionKind::CaptureAndUpload, DEFAULT_ACTION_COOLDOWN_MS);
        action_cooldowns_ms.insert(ActionKind::FetchAndPresent, DEFAULT_ACTION_COOLDOWN_MS);

        Self {
            labels: vec![GestureLabel::Screenshot, GestureLabel::TransferScreenshot],
            allowed: vec![GestureLabel::Screenshot, GestureLabel::TransferScreenshot],
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            landmark_count: HAND_LANDMARK_COUNT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_margin: DEFAULT_MIN_MARGIN,
            gesture_cooldown_ms: DEFAULT_GESTURE_COOLDOWN_MS,
            action_cooldowns_ms,
        }
    }
}

impl GestureConfig {
    /// Length of one flattened landmark vector
    pub fn feature_len(&self) -> usize {
        self.landmark_count * COORDS_PER_LANDMARK
    }

    pub fn gesture_cooldown(&self) -> Duration {
        cooldown_duration(self.gesture_cooldown_ms)
    }

    pub fn action_cooldown(&self, action: ActionKind) -> Duration {
        let ms = self
            .action_cooldowns_ms
            .get(&action)
            .copied()
            .unwrap_or(DEFAULT_ACTION_COOLDOWN_MS);
        cooldown_duration(ms)
    }

    /// Check internal consistency
    pub fn validate(&self) -> Result<(), GestureError> {
        if self.sequence_length == 0 {
            return Err(GestureError::InvalidConfig(
                "sequence_length must be at least 1".to_string(),
            ));
        }
        if self.landmark_count == 0 {
            return Err(GestureError::InvalidConfig(
                "landmark_count must be at least 1".to_string(),
            ));
        }
        if self.labels.is_empty() {
            return Err(GestureError::InvalidConfig("labels must not be empty".to_string()));
        }
        for (i, label) in self.labels.iter().enumerate() {
            if self.labels[..i].contains(label) {
                return Err(GestureError::InvalidConfig(format!(
                    "duplicate label {}",
                    label
                )));
            }
        }
        if let Some(label) = self.allowed.iter().find(|l| !self.labels.contains(l)) {
            return Err(GestureError::InvalidConfig(format!(
                "allowed label {} is not produced by the model",
                label
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(GestureError::InvalidConfig(format!(
                "min_confidence {} outside 0..=1",
                self.min_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.min_margin) {
            return Err(GestureError::InvalidConfig(format!(
                "min_margin {} outside 0..=1",
                self.min_margin
            )));
        }
        if self.gesture_cooldown_ms > MAX_COOLDOWN_MS {
            return Err(GestureError::InvalidConfig(format!(
                "gesture_cooldown_ms {} exceeds {}",
                self.gesture_cooldown_ms, MAX_COOLDOWN_MS
            )));
        }
        if let Some((action, ms)) = self
            .action_cooldowns_ms
            .iter()
            .find(|(_, ms)| **ms > MAX_COOLDOWN_MS)
        {
            return Err(GestureError::InvalidConfig(format!(
                "cooldown {} ms for {} exceeds {}",
                ms, action, MAX_COOLDOWN_MS
            )));
        }
        Ok(())
    }

    /// Load and validate configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, GestureError> {
        let config: GestureConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Milliseconds to `Duration`, clamped to `MAX_COOLDOWN_MS`
fn cooldown_duration(ms: u64) -> Duration {
    let ms = i64::try_from(ms.min(MAX_COOLDOWN_MS)).unwrap_or(i64::MAX);
    Duration::milliseconds(ms)
}
