//! Statistical gating of classification results
//!
//! A result is only trusted when its top label is allow-listed, is not the
//! model's "unknown" class, and wins with enough confidence and margin.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::classifier::ClassificationResult;
use crate::config::GestureConfig;
use crate::types::GestureLabel;

/// Why a result was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    /// The classifier produced no scores at all
    Empty,
    NotAllowed { label: GestureLabel },
    UnknownClass,
    LowConfidence { confidence: f32 },
    LowMargin { margin: f32 },
}

/// Outcome of gating one result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    Accepted {
        label: GestureLabel,
        confidence: f32,
        margin: f32,
    },
    Rejected(RejectReason),
}

/// Allow-list, confidence and margin thresholds
#[derive(Debug, Clone)]
pub struct GestureGate {
    allowed: BTreeSet<GestureLabel>,
    min_confidence: f32,
    min_margin: f32,
}

impl GestureGate {
    pub fn new(
        allowed: impl IntoIterator<Item = GestureLabel>,
        min_confidence: f32,
        min_margin: f32,
    ) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            min_confidence,
            min_margin,
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(
            config.allowed.iter().copied(),
            config.min_confidence,
            config.min_margin,
        )
    }

    pub fn evaluate(&self, result: &ClassificationResult) -> GateDecision {
        let top1 = match result.top1() {
            Some(top1) => top1,
            None => return GateDecision::Rejected(RejectReason::Empty),
        };
        let margin = result.margin();

        if !self.allowed.contains(&top1.label) {
            return GateDecision::Rejected(RejectReason::NotAllowed { label: top1.label });
        }
        if top1.label.is_unknown() {
            return GateDecision::Rejected(RejectReason::UnknownClass);
        }
        // Negated comparisons so NaN never passes.
        if !(top1.probability >= self.min_confidence) {
            return GateDecision::Rejected(RejectReason::LowConfidence {
                confidence: top1.probability,
            });
        }
        if !(margin >= self.min_margin) {
            return GateDecision::Rejected(RejectReason::LowMargin { margin });
        }

        GateDecision::Accepted {
            label: top1.label,
            confidence: top1.probability,
            margin,
        }
    }
}
