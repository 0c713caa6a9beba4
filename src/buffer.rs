//! Sliding window of landmark vectors
//!
//! The sequence model consumes a fixed number of consecutive frames. The buffer
//! keeps only the most recent `capacity` vectors; clearing it is how the engine
//! forces fresh evidence to accumulate after a decision.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::landmark::LandmarkVector;

/// Default number of frames per classification window
pub const DEFAULT_SEQUENCE_LENGTH: usize = 10;

/// Fixed-capacity FIFO of landmark vectors
#[derive(Debug, Clone)]
pub struct SequenceBuffer {
    frames: VecDeque<LandmarkVector>,
    capacity: usize,
}

impl Default for SequenceBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_LENGTH)
    }
}

impl SequenceBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a vector, evicting the oldest once over capacity
    pub fn push(&mut self, vector: LandmarkVector) {
        self.frames.push_back(vector);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the current contents, only once the buffer is full
    pub fn window(&self) -> Option<Window> {
        if !self.is_full() {
            return None;
        }
        Some(Window {
            frames: self.frames.iter().cloned().collect(),
        })
    }
}

/// An immutable, full sequence of frames (oldest first) handed to a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    frames: Vec<LandmarkVector>,
}

impl Window {
    pub fn frames(&self) -> &[LandmarkVector] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Width of each frame vector (0 for an empty window)
    pub fn feature_len(&self) -> usize {
        self.frames.first().map(LandmarkVector::len).unwrap_or(0)
    }

    /// Row-major `[frames x features]` layout expected by tensor runtimes
    pub fn to_flat(&self) -> Vec<f32> {
        let mut flat = Vec::with_capacity(self.len() * self.feature_len());
        for frame in &self.frames {
            flat.extend_from_slice(frame.as_slice());
        }
        flat
    }

    /// Per-feature mean across all frames
    pub fn mean_vector(&self) -> Vec<f32> {
        let width = self.feature_len();
        let mut sums = vec![0.0f32; width];
        for frame in &self.frames {
            for (sum, value) in sums.iter_mut().zip(frame.as_slice()) {
                *sum += value;
            }
        }
        if !self.frames.is_empty() {
            let n = self.frames.len() as f32;
            sums.iter_mut().for_each(|s| *s /= n);
        }
        sums
    }
}
