//! Landmark normalization
//!
//! Turns one tracker observation (a list of 3-D hand points) into the flat
//! feature vector the sequence model consumes: `[x0, y0, z0, x1, y1, z1, ...]`.

use serde::{Deserialize, Serialize};

use crate::error::GestureError;

/// Number of points reported by the hand tracker
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Coordinates per landmark point
pub const COORDS_PER_LANDMARK: usize = 3;

/// A single tracked hand point in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Flattened landmark coordinates for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkVector(Vec<f32>);

impl LandmarkVector {
    /// Flatten tracker points, checking the point count and coordinate sanity
    pub fn from_landmarks(
        landmarks: &[Landmark],
        expected_points: usize,
    ) -> Result<Self, GestureError> {
        if landmarks.len() != expected_points {
            return Err(GestureError::InvalidLandmarks {
                expected: expected_points * COORDS_PER_LANDMARK,
                actual: landmarks.len() * COORDS_PER_LANDMARK,
            });
        }

        let mut values = Vec::with_capacity(landmarks.len() * COORDS_PER_LANDMARK);
        for (index, point) in landmarks.iter().enumerate() {
            if !(point.x.is_finite() && point.y.is_finite() && point.z.is_finite()) {
                return Err(GestureError::NonFiniteLandmark(index));
            }
            values.extend_from_slice(&[point.x, point.y, point.z]);
        }

        Ok(Self(values))
    }

    /// Wrap an already-flattened vector, checking its length
    pub fn from_flat(values: Vec<f32>, expected_len: usize) -> Result<Self, GestureError> {
        if values.len() != expected_len {
            return Err(GestureError::InvalidLandmarks {
                expected: expected_len,
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(GestureError::NonFiniteLandmark(index / COORDS_PER_LANDMARK));
        }
        Ok(Self(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}
