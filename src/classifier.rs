//! Classification model interface
//!
//! The sequence model itself is an external capability. This module defines the
//! shape of its output (`ClassificationResult`), the trait in-process models
//! implement, and a small template-matching model used for replay and tests.

use serde::{Deserialize, Serialize};

use crate::buffer::Window;
use crate::error::GestureError;
use crate::types::GestureLabel;

/// Probability assigned to one label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: GestureLabel,
    pub probability: f32,
}

/// Per-label probabilities for a single window, in model output order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    scores: Vec<LabelScore>,
}

impl ClassificationResult {
    /// Pair a raw probability vector with the model's label order
    pub fn from_probabilities(
        labels: &[GestureLabel],
        probabilities: &[f32],
    ) -> Result<Self, GestureError> {
        if labels.len() != probabilities.len() {
            return Err(GestureError::ProbabilityShape {
                expected: labels.len(),
                actual: probabilities.len(),
            });
        }
        if let Some(p) = probabilities.iter().find(|p| !p.is_finite()) {
            return Err(GestureError::ClassificationFailed(format!(
                "non-finite probability {}",
                p
            )));
        }

        Ok(Self {
            scores: labels
                .iter()
                .zip(probabilities)
                .map(|(&label, &probability)| LabelScore { label, probability })
                .collect(),
        })
    }

    pub fn scores(&self) -> &[LabelScore] {
        &self.scores
    }

    /// Scores sorted by descending probability; ties keep model order
    pub fn ranked(&self) -> Vec<LabelScore> {
        let mut ranked = self.scores.clone();
        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        ranked
    }

    pub fn top1(&self) -> Option<LabelScore> {
        self.ranked().first().copied()
    }

    /// Top-1 minus top-2 probability (0 when there is no second class)
    pub fn margin(&self) -> f32 {
        let ranked = self.ranked();
        match (ranked.first(), ranked.get(1)) {
            (Some(top1), Some(top2)) => top1.probability - top2.probability,
            _ => 0.0,
        }
    }
}

/// An in-process sequence classifier
pub trait Classifier {
    /// Output label order
    fn labels(&self) -> &[GestureLabel];

    /// Landmark vector width the model was built for, when it is known up front
    fn input_width(&self) -> Option<usize> {
        None
    }

    /// Classify a full window
    fn classify(&mut self, window: &Window) -> Result<ClassificationResult, GestureError>;
}

/// Default softmax temperature for template matching
pub const DEFAULT_TEMPERATURE: f32 = 0.01;

/// Nearest-template classifier: one mean landmark vector per label
///
/// The window is averaged over time and compared to each template by mean
/// squared distance; a softmax over the negated distances gives probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateClassifier {
    labels: Vec<GestureLabel>,
    templates: Vec<Vec<f32>>,
    #[serde(default = "default_temperature")]
    temperature: f32,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl TemplateClassifier {
    pub fn new(
        labels: Vec<GestureLabel>,
        templates: Vec<Vec<f32>>,
        temperature: f32,
    ) -> Result<Self, GestureError> {
        let model = Self {
            labels,
            templates,
            temperature,
        };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), GestureError> {
        if self.labels.is_empty() {
            return Err(GestureError::InvalidModel("model has no labels".to_string()));
        }
        if self.labels.len() != self.templates.len() {
            return Err(GestureError::InvalidModel(format!(
                "{} labels but {} templates",
                self.labels.len(),
                self.templates.len()
            )));
        }
        let width = self.templates[0].len();
        if width == 0 || self.templates.iter().any(|t| t.len() != width) {
            return Err(GestureError::InvalidModel(
                "templates must share a non-zero width".to_string(),
            ));
        }
        if !(self.temperature > 0.0) {
            return Err(GestureError::InvalidModel(format!(
                "temperature must be positive, got {}",
                self.temperature
            )));
        }
        Ok(())
    }

    /// Width of the landmark vectors this model expects
    pub fn feature_len(&self) -> usize {
        self.templates.first().map(Vec::len).unwrap_or(0)
    }

    pub fn from_json(json: &str) -> Result<Self, GestureError> {
        let model: TemplateClassifier = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Classifier for TemplateClassifier {
    fn labels(&self) -> &[GestureLabel] {
        &self.labels
    }

    fn input_width(&self) -> Option<usize> {
        Some(self.feature_len())
    }

    fn classify(&mut self, window: &Window) -> Result<ClassificationResult, GestureError> {
        if window.feature_len() != self.feature_len() {
            return Err(GestureError::ClassificationFailed(format!(
                "window width {} does not match model width {}",
                window.feature_len(),
                self.feature_len()
            )));
        }

        let mean = window.mean_vector();
        let logits: Vec<f32> = self
            .templates
            .iter()
            .map(|template| {
                let mse = template
                    .iter()
                    .zip(&mean)
                    .map(|(t, m)| (t - m) * (t - m))
                    .sum::<f32>()
                    / template.len() as f32;
                -mse / self.temperature
            })
            .collect();

        ClassificationResult::from_probabilities(&self.labels, &softmax(&logits))
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SequenceBuffer;
    use crate::landmark::LandmarkVector;

    const LABELS: [GestureLabel; 2] = [GestureLabel::Screenshot, GestureLabel::TransferScreenshot];

    fn window_of(value: f32, width: usize, frames: usize) -> Window {
        let mut buffer = SequenceBuffer::new(frames);
        for _ in 0..frames {
            buffer.push(LandmarkVector::from_flat(vec![value; width], width).unwrap());
        }
        buffer.window().unwrap()
    }

    #[test]
    fn test_top1_and_margin() {
        let result = ClassificationResult::from_probabilities(&LABELS, &[0.1, 0.9]).unwrap();
        let top1 = result.top1().unwrap();
        assert_eq!(top1.label, GestureLabel::TransferScreenshot);
        assert!((top1.probability - 0.9).abs() < 1e-6);
        assert!((result.margin() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_single_class_margin_is_zero() {
        let result =
            ClassificationResult::from_probabilities(&[GestureLabel::Screenshot], &[0.99]).unwrap();
        assert_eq!(result.margin(), 0.0);
    }

    #[test]
    fn test_ties_keep_model_order() {
        let result = ClassificationResult::from_probabilities(&LABELS, &[0.5, 0.5]).unwrap();
        assert_eq!(result.top1().unwrap().label, GestureLabel::Screenshot);
        assert_eq!(result.margin(), 0.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = ClassificationResult::from_probabilities(&LABELS, &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            GestureError::ProbabilityShape {
                expected: 2,
                actual: 1
            }
        ));
        assert!(ClassificationResult::from_probabilities(&LABELS, &[f32::NAN, 0.5]).is_err());
    }

    #[test]
    fn test_template_picks_nearest() {
        let mut model =
            TemplateClassifier::new(LABELS.to_vec(), vec![vec![0.2; 6], vec![0.8; 6]], 0.01)
                .unwrap();

        let result = model.classify(&window_of(0.75, 6, 4)).unwrap();
        let top1 = result.top1().unwrap();
        assert_eq!(top1.label, GestureLabel::TransferScreenshot);
        assert!(top1.probability > 0.99);

        let sum: f32 = result.scores().iter().map(|s| s.probability).sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_template_width_mismatch() {
        let mut model =
            TemplateClassifier::new(LABELS.to_vec(), vec![vec![0.2; 6], vec![0.8; 6]], 0.01)
                .unwrap();
        assert!(model.classify(&window_of(0.5, 3, 4)).is_err());
    }

    #[test]
    fn test_template_model_json() {
        let json = r#"{
            "labels": ["SS", "transfer_SS"],
            "templates": [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]
        }"#;
        let model = TemplateClassifier::from_json(json).unwrap();
        assert_eq!(model.feature_len(), 3);
        assert_eq!(model.input_width(), Some(3));
        assert_eq!(model.labels(), &LABELS);

        let bad = r#"{"labels": ["SS"], "templates": [[0.0], [1.0]]}"#;
        assert!(TemplateClassifier::from_json(bad).is_err());
    }
}
