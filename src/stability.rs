//! Gesture-change hysteresis
//!
//! A newly seen label is only remembered on first sight. It becomes eligible to
//! fire once a later, entirely fresh window classifies to the same label.

use crate::types::GestureLabel;

/// Result of observing a gated label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// The label differs from the last confirmed one and was just recorded
    Changed {
        previous: Option<GestureLabel>,
        current: GestureLabel,
    },
    /// Same label as last time: eligible to fire
    Stable(GestureLabel),
}

#[derive(Debug, Clone, Default)]
pub struct StabilityTracker {
    last_confirmed: Option<GestureLabel>,
}

impl StabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, label: GestureLabel) -> Stability {
        if self.last_confirmed == Some(label) {
            return Stability::Stable(label);
        }
        let previous = self.last_confirmed.replace(label);
        Stability::Changed {
            previous,
            current: label,
        }
    }

    pub fn last_confirmed(&self) -> Option<GestureLabel> {
        self.last_confirmed
    }

    pub fn reset(&mut self) {
        self.last_confirmed = None;
    }
}
