//! Gesture engine
//!
//! The per-frame state machine that turns a noisy stream of landmark vectors
//! into debounced gesture triggers:
//!
//! ```text
//! frame ─► SequenceBuffer ─► (full) ClassifyRequest ─► host runs the model
//!                                                          │
//!   complete_classification ◄──────────────────────────────┘
//!        │
//!        ├─ GestureGate rejects ─────────► "unknown gesture", buffer cleared
//!        ├─ StabilityTracker: new label ─► remember label, buffer cleared
//!        ├─ global cooldown active ──────► "Class: <label>" only, buffer kept
//!        └─ fire ────────────────────────► "Class: <label>", ActionDispatcher,
//!                                          buffer cleared
//! ```
//!
//! Classification is deferred: `on_frame` hands out a ticketed request and never
//! waits for it. Only the request matching the current ticket may complete, and
//! its result is judged against the engine state at completion time, so a
//! result that arrives after the hand left (or after a restart) has no effect.
//!
//! Phases and transitions:
//!
//! | from                        | event                          | to         |
//! |-----------------------------|--------------------------------|------------|
//! | any                         | no hand                        | NoHand     |
//! | NoHand                      | hand appears                   | Detecting  |
//! | any hand phase              | accepted label != last label   | Confirming |
//! | Confirming, Cooldown, Ready | same label, cooldown active    | Cooldown   |
//! | Confirming, Cooldown, Ready | same label, cooldown elapsed   | Ready      |
//! | any hand phase              | gate rejection                 | unchanged  |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::buffer::{SequenceBuffer, Window};
use crate::classifier::ClassificationResult;
use crate::config::GestureConfig;
use crate::dispatcher::ActionDispatcher;
use crate::error::GestureError;
use crate::gate::{GateDecision, GestureGate};
use crate::landmark::LandmarkVector;
use crate::stability::{Stability, StabilityTracker};
use crate::types::{
    ActionReport, EngineEvent, GestureLabel, Notification, NotificationLevel, Status,
    StatusUpdate,
};

/// Named engine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    /// No hand in view
    NoHand,
    /// Hand in view, no label confirmed yet
    Detecting,
    /// A new label was seen and awaits a fresh window
    Confirming,
    /// Label stable but the global cooldown holds it back
    Cooldown,
    /// A gesture fired; the same label may fire again after the cooldown
    Ready,
}

/// Snapshot of the decision-relevant engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub hand_present: bool,
    pub last_confirmed_label: Option<GestureLabel>,
    pub last_trigger_at: Option<DateTime<Utc>>,
    pub phase: EnginePhase,
    pub buffered_frames: usize,
    pub pending_ticket: Option<u64>,
}

/// A window waiting to be classified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyRequest {
    pub ticket: u64,
    pub window: Window,
    pub submitted_at: DateTime<Utc>,
}

/// Everything produced by one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameOutcome {
    pub events: Vec<EngineEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classify: Option<ClassifyRequest>,
    /// The frame was malformed and ignored
    #[serde(default)]
    pub dropped: bool,
}

pub struct GestureEngine {
    config: GestureConfig,
    buffer: SequenceBuffer,
    gate: GestureGate,
    stability: StabilityTracker,
    dispatcher: ActionDispatcher,
    hand_present: bool,
    last_trigger_at: Option<DateTime<Utc>>,
    phase: EnginePhase,
    pending: Option<u64>,
    next_ticket: u64,
}

impl GestureEngine {
    pub fn new(config: GestureConfig) -> Result<Self, GestureError> {
        config.validate()?;
        Ok(Self {
            buffer: SequenceBuffer::new(config.sequence_length),
            gate: GestureGate::from_config(&config),
            stability: StabilityTracker::new(),
            dispatcher: ActionDispatcher::from_config(&config),
            config,
            hand_present: false,
            last_trigger_at: None,
            phase: EnginePhase::NoHand,
            pending: None,
            next_ticket: 1,
        })
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn state(&self) -> EngineState {
        EngineState {
            hand_present: self.hand_present,
            last_confirmed_label: self.stability.last_confirmed(),
            last_trigger_at: self.last_trigger_at,
            phase: self.phase,
            buffered_frames: self.buffer.len(),
            pending_ticket: self.pending,
        }
    }

    /// Feed one tracker frame. `None` means no hand was detected.
    pub fn on_frame(&mut self, vector: Option<LandmarkVector>, now: DateTime<Utc>) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();

        let vector = match vector {
            Some(vector) => vector,
            None => {
                self.hand_lost(now, &mut outcome.events);
                return outcome;
            }
        };

        if vector.len() != self.config.feature_len() {
            warn!(
                expected = self.config.feature_len(),
                actual = vector.len(),
                "dropping frame with malformed landmark vector"
            );
            outcome.dropped = true;
            return outcome;
        }

        if !self.hand_present {
            self.hand_present = true;
            self.transition(EnginePhase::Detecting);
            outcome.events.push(status(Status::Detecting, None, now));
        }

        self.buffer.push(vector);
        if let Some(ticket) = self.pending {
            trace!(ticket, "classification in flight");
            return outcome;
        }

        if let Some(window) = self.buffer.window() {
            let ticket = self.next_ticket;
            self.next_ticket += 1;
            self.pending = Some(ticket);
            trace!(ticket, "window submitted for classification");
            outcome.classify = Some(ClassifyRequest {
                ticket,
                window,
                submitted_at: now,
            });
        }

        outcome
    }

    /// Deliver the result of a classification request
    pub fn complete_classification(
        &mut self,
        ticket: u64,
        result: Result<ClassificationResult, GestureError>,
        now: DateTime<Utc>,
    ) -> Vec<EngineEvent> {
        if self.pending != Some(ticket) {
            debug!(ticket, pending = ?self.pending, "discarding stale classification");
            return Vec::new();
        }
        self.pending = None;

        match result {
            Ok(result) => self.decide(&result, now),
            Err(e) => {
                warn!(ticket, error = %e, "classification failed");
                vec![EngineEvent::Notification(Notification::new(
                    NotificationLevel::Error,
                    format!("Gesture classification failed: {}", e),
                    now,
                ))]
            }
        }
    }

    /// Feed back the outcome of a dispatched action
    pub fn report_action(&mut self, report: ActionReport) -> Vec<EngineEvent> {
        vec![EngineEvent::Notification(self.dispatcher.complete(report))]
    }

    /// Explicit restart: forget everything except per-action cooldowns
    pub fn restart(&mut self) {
        debug!("engine restart");
        self.buffer.clear();
        self.stability.reset();
        self.hand_present = false;
        self.last_trigger_at = None;
        self.pending = None;
        self.transition(EnginePhase::NoHand);
    }

    fn decide(&mut self, result: &ClassificationResult, now: DateTime<Utc>) -> Vec<EngineEvent> {
        let (label, confidence) = match self.gate.evaluate(result) {
            GateDecision::Accepted {
                label,
                confidence,
                margin,
            } => {
                trace!(%label, confidence, margin, "gate accepted");
                (label, confidence)
            }
            GateDecision::Rejected(reason) => {
                debug!(?reason, "gate rejected window");
                self.buffer.clear();
                return vec![status(Status::Unknown, None, now)];
            }
        };

        if let Stability::Changed { previous, current } = self.stability.observe(label) {
            debug!(?previous, %current, "gesture changed, awaiting fresh window");
            self.buffer.clear();
            self.transition(EnginePhase::Confirming);
            return Vec::new();
        }

        let class = Status::Class { label };
        if self.global_cooldown_active(now) {
            trace!(%label, "global cooldown active");
            self.transition(EnginePhase::Cooldown);
            return vec![status(class, Some(confidence), now)];
        }

        self.last_trigger_at = Some(now);
        let mut events = vec![status(class, Some(confidence), now)];
        if let Some(request) = self.dispatcher.dispatch(label, now) {
            events.push(EngineEvent::ActionDispatched(request));
        }
        self.buffer.clear();
        self.transition(EnginePhase::Ready);
        events
    }

    fn global_cooldown_active(&self, now: DateTime<Utc>) -> bool {
        self.last_trigger_at
            .map(|last| now - last <= self.config.gesture_cooldown())
            .unwrap_or(false)
    }

    fn hand_lost(&mut self, now: DateTime<Utc>, events: &mut Vec<EngineEvent>) {
        if !self.hand_present {
            return;
        }
        debug!(buffered = self.buffer.len(), "hand lost");
        self.hand_present = false;
        self.buffer.clear();
        self.stability.reset();
        self.pending = None;
        self.transition(EnginePhase::NoHand);
        events.push(status(Status::NoGesture, None, now));
    }

    fn transition(&mut self, next: EnginePhase) {
        if self.phase != next {
            debug!(from = ?self.phase, to = ?next, "phase transition");
            self.phase = next;
        }
    }
}

fn status(status: Status, confidence: Option<f32>, at: DateTime<Utc>) -> EngineEvent {
    EngineEvent::Status(StatusUpdate::new(status, confidence, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionKind;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    const LABELS: [GestureLabel; 2] = [GestureLabel::Screenshot, GestureLabel::TransferScreenshot];

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    fn hand() -> Option<LandmarkVector> {
        Some(LandmarkVector::from_flat(vec![0.5; 63], 63).unwrap())
    }

    fn engine() -> GestureEngine {
        GestureEngine::new(GestureConfig::default()).unwrap()
    }

    fn confident(label: GestureLabel) -> ClassificationResult {
        let probabilities = match label {
            GestureLabel::Screenshot => [0.95, 0.05],
            _ => [0.05, 0.95],
        };
        ClassificationResult::from_probabilities(&LABELS, &probabilities).unwrap()
    }

    fn screenshot() -> Result<ClassificationResult, GestureError> {
        Ok(confident(GestureLabel::Screenshot))
    }

    /// SS at confidence 0.95 with margin 0.4
    fn narrow_screenshot() -> Result<ClassificationResult, GestureError> {
        ClassificationResult::from_probabilities(&LABELS, &[0.95, 0.55])
    }

    /// Push frames 33 ms apart starting at `start_ms` until a request appears
    fn fill_window(engine: &mut GestureEngine, start_ms: i64) -> (ClassifyRequest, i64) {
        let mut t = start_ms;
        for _ in 0..engine.config().sequence_length {
            let outcome = engine.on_frame(hand(), at(t));
            if let Some(request) = outcome.classify {
                return (request, t);
            }
            t += 33;
        }
        panic!("buffer never filled");
    }

    fn statuses(events: &[EngineEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| e.as_status().map(|s| s.text.clone()))
            .collect()
    }

    fn actions(events: &[EngineEvent]) -> Vec<ActionKind> {
        events.iter().filter_map(|e| e.as_action().map(|a| a.action)).collect()
    }

    /// Confirm then fire `label`, returning the time of the firing completion
    fn confirm_and_fire(engine: &mut GestureEngine, label: GestureLabel, start_ms: i64) -> i64 {
        let (request, t) = fill_window(engine, start_ms);
        engine.complete_classification(request.ticket, Ok(confident(label)), at(t));
        let (request, t) = fill_window(engine, t + 33);
        let events = engine.complete_classification(request.ticket, Ok(confident(label)), at(t));
        assert_eq!(actions(&events).len(), 1);
        t
    }

    #[test]
    fn test_initial_state() {
        let engine = engine();
        assert_eq!(
            engine.state(),
            EngineState {
                hand_present: false,
                last_confirmed_label: None,
                last_trigger_at: None,
                phase: EnginePhase::NoHand,
                buffered_frames: 0,
                pending_ticket: None,
            }
        );
    }

    #[test]
    fn test_rising_edge_reports_detecting_without_classifying() {
        let mut engine = engine();
        let outcome = engine.on_frame(hand(), at(0));
        assert_eq!(statuses(&outcome.events), vec!["detecting gesture..."]);
        assert!(outcome.classify.is_none());
        assert_eq!(engine.phase(), EnginePhase::Detecting);
        assert_eq!(engine.state().buffered_frames, 1);
    }

    #[test]
    fn test_no_classification_on_partial_window() {
        let mut engine = engine();
        for i in 0..9 {
            assert!(engine.on_frame(hand(), at(i * 33)).classify.is_none());
        }
        let outcome = engine.on_frame(hand(), at(9 * 33));
        let request = outcome.classify.unwrap();
        assert_eq!(request.window.len(), 10);
        assert_eq!(request.window.feature_len(), 63);
    }

    #[test]
    fn test_buffer_never_exceeds_capacity() {
        let mut engine = engine();
        for i in 0..40 {
            engine.on_frame(hand(), at(i * 33));
            assert!(engine.state().buffered_frames <= 10);
        }
        // one request stays in flight; frames keep sliding
        assert_eq!(engine.state().buffered_frames, 10);
        assert_eq!(engine.state().pending_ticket, Some(1));
    }

    #[test]
    fn test_scenario_a_change_then_fire() {
        let mut engine = engine();
        // establish transfer_SS and fire it
        let fired_at = confirm_and_fire(&mut engine, GestureLabel::TransferScreenshot, 0);

        // gesture changes to SS: first window only records the change
        let (request, t) = fill_window(&mut engine, fired_at + 2_000);
        let events = engine.complete_classification(request.ticket, narrow_screenshot(), at(t));
        assert!(events.is_empty());
        assert_eq!(engine.state().last_confirmed_label, Some(GestureLabel::Screenshot));
        assert_eq!(engine.state().buffered_frames, 0);
        assert_eq!(engine.phase(), EnginePhase::Confirming);

        // fresh window, same label, cooldown elapsed: fires
        let (request, t) = fill_window(&mut engine, t + 33);
        let events = engine.complete_classification(request.ticket, narrow_screenshot(), at(t));
        assert_eq!(statuses(&events), vec!["Class: SS"]);
        assert_eq!(actions(&events), vec![ActionKind::CaptureAndUpload]);
        assert_eq!(engine.state().buffered_frames, 0);
        assert_eq!(engine.state().last_trigger_at, Some(at(t)));
        assert_eq!(engine.phase(), EnginePhase::Ready);
    }

    #[test]
    fn test_scenario_b_global_cooldown_holds_dispatch() {
        let mut engine = engine();
        let fired_at = confirm_and_fire(&mut engine, GestureLabel::Screenshot, 0);

        // next full window of the same label 500 ms later
        let mut request = None;
        for i in 0..10 {
            let outcome = engine.on_frame(hand(), at(fired_at + 200 + i * 33));
            request = outcome.classify.or(request);
        }
        let request = request.unwrap();
        let events = engine.complete_classification(
            request.ticket,
            narrow_screenshot(),
            at(fired_at + 500),
        );

        assert_eq!(statuses(&events), vec!["Class: SS"]);
        let update = events[0].as_status().unwrap();
        assert!((update.confidence_pct.unwrap() - 95.0).abs() < 1e-3);
        assert!(actions(&events).is_empty());
        // buffer kept so classification can re-run as frames slide in
        assert_eq!(engine.state().buffered_frames, 10);
        assert_eq!(engine.phase(), EnginePhase::Cooldown);

        let outcome = engine.on_frame(hand(), at(fired_at + 533));
        assert!(outcome.classify.is_some());
    }

    #[test]
    fn test_cooldown_boundary_is_inclusive() {
        let mut engine = engine();
        let fired_at = confirm_and_fire(&mut engine, GestureLabel::Screenshot, 0);

        let (request, _) = fill_window(&mut engine, fired_at + 33);
        let events = engine.complete_classification(
            request.ticket,
            screenshot(),
            at(fired_at + 1_500),
        );
        assert!(actions(&events).is_empty());

        let outcome = engine.on_frame(hand(), at(fired_at + 1_501));
        let request = outcome.classify.unwrap();
        let events = engine.complete_classification(
            request.ticket,
            screenshot(),
            at(fired_at + 2_600),
        );
        assert_eq!(actions(&events), vec![ActionKind::CaptureAndUpload]);
    }

    #[test]
    fn test_scenario_c_low_confidence_is_unknown() {
        let mut engine = engine();
        let (request, t) = fill_window(&mut engine, 0);
        let result = ClassificationResult::from_probabilities(&LABELS, &[0.6, 0.4]).unwrap();
        let events = engine.complete_classification(request.ticket, Ok(result), at(t));

        assert_eq!(statuses(&events), vec!["unknown gesture"]);
        assert_eq!(events[0].as_status().unwrap().confidence_pct, None);
        assert!(actions(&events).is_empty());
        assert_eq!(engine.state().buffered_frames, 0);
        assert_eq!(engine.state().last_confirmed_label, None);
    }

    #[test]
    fn test_rejection_keeps_confirmed_label() {
        let mut engine = engine();
        let (request, t) = fill_window(&mut engine, 0);
        engine.complete_classification(request.ticket, screenshot(), at(t));

        let (request, t) = fill_window(&mut engine, t + 33);
        let result = ClassificationResult::from_probabilities(&LABELS, &[0.55, 0.45]).unwrap();
        engine.complete_classification(request.ticket, Ok(result), at(t));
        assert_eq!(engine.state().last_confirmed_label, Some(GestureLabel::Screenshot));

        // the label is still confirmed, so the next good window fires
        let (request, t) = fill_window(&mut engine, t + 33);
        let events = engine.complete_classification(request.ticket, screenshot(), at(t));
        assert_eq!(actions(&events), vec![ActionKind::CaptureAndUpload]);
    }

    #[test]
    fn test_scenario_d_hand_lost_mid_buffer() {
        let mut engine = engine();
        let (request, t) = fill_window(&mut engine, 0);
        engine.complete_classification(request.ticket, screenshot(), at(t));

        for i in 0..6 {
            engine.on_frame(hand(), at(t + 33 * (i + 1)));
        }
        assert_eq!(engine.state().buffered_frames, 6);

        let outcome = engine.on_frame(None, at(t + 400));
        assert_eq!(statuses(&outcome.events), vec!["no gesture detected"]);
        assert_eq!(engine.state().buffered_frames, 0);
        assert_eq!(engine.state().last_confirmed_label, None);
        assert!(!engine.state().hand_present);
        assert_eq!(engine.phase(), EnginePhase::NoHand);

        // repeated no-hand frames are silent
        assert!(engine.on_frame(None, at(t + 433)).events.is_empty());

        // reappearance starts over from detecting
        let outcome = engine.on_frame(hand(), at(t + 466));
        assert_eq!(statuses(&outcome.events), vec!["detecting gesture..."]);
        assert_eq!(engine.state().buffered_frames, 1);
    }

    #[test]
    fn test_label_is_unconfirmed_after_hand_loss() {
        let mut engine = engine();
        let fired_at = confirm_and_fire(&mut engine, GestureLabel::Screenshot, 0);
        engine.on_frame(None, at(fired_at + 100));

        // same label again, long after the cooldowns: still needs reconfirmation
        let (request, t) = fill_window(&mut engine, fired_at + 5_000);
        let events = engine.complete_classification(request.ticket, screenshot(), at(t));
        assert!(actions(&events).is_empty());
        assert_eq!(engine.phase(), EnginePhase::Confirming);
    }

    #[test]
    fn test_trigger_time_survives_hand_loss() {
        let mut engine = engine();
        let fired_at = confirm_and_fire(&mut engine, GestureLabel::Screenshot, 0);
        engine.on_frame(None, at(fired_at + 33));
        assert_eq!(engine.state().last_trigger_at, Some(at(fired_at)));

        // re-enter with the other gesture and confirm it inside the 1500 ms window
        let (request, t) = fill_window(&mut engine, fired_at + 66);
        let transfer = Ok(confident(GestureLabel::TransferScreenshot));
        assert!(engine.complete_classification(request.ticket, transfer, at(t)).is_empty());

        let (request, t) = fill_window(&mut engine, t + 33);
        assert!(t - fired_at <= 1_500);
        let transfer = Ok(confident(GestureLabel::TransferScreenshot));
        let events = engine.complete_classification(request.ticket, transfer, at(t));
        assert_eq!(statuses(&events), vec!["Class: transfer_SS"]);
        assert!(actions(&events).is_empty());
        assert_eq!(engine.phase(), EnginePhase::Cooldown);
    }

    #[test]
    fn test_completion_after_restart_is_discarded() {
        let mut engine = engine();
        let (request, t) = fill_window(&mut engine, 0);
        engine.restart();

        let events = engine.complete_classification(request.ticket, screenshot(), at(t + 10));
        assert!(events.is_empty());
        assert_eq!(engine.state().last_confirmed_label, None);
        assert_eq!(engine.state().pending_ticket, None);
        assert_eq!(engine.phase(), EnginePhase::NoHand);

        // a fresh window after restart gets a new ticket
        let (fresh, _) = fill_window(&mut engine, t + 100);
        assert_ne!(fresh.ticket, request.ticket);
    }

    #[test]
    fn test_stale_completion_after_hand_loss_is_discarded() {
        let mut engine = engine();
        let (stale, t) = fill_window(&mut engine, 0);
        engine.on_frame(None, at(t + 33));

        let (fresh, t) = fill_window(&mut engine, t + 66);
        assert_ne!(stale.ticket, fresh.ticket);

        let events = engine.complete_classification(stale.ticket, screenshot(), at(t));
        assert!(events.is_empty());
        assert_eq!(engine.state().last_confirmed_label, None);
        assert_eq!(engine.state().pending_ticket, Some(fresh.ticket));

        engine.complete_classification(fresh.ticket, screenshot(), at(t));
        assert_eq!(engine.state().last_confirmed_label, Some(GestureLabel::Screenshot));
    }

    #[test]
    fn test_duplicate_completion_is_ignored() {
        let mut engine = engine();
        let (request, t) = fill_window(&mut engine, 0);
        engine.complete_classification(request.ticket, screenshot(), at(t));
        let events = engine.complete_classification(request.ticket, screenshot(), at(t + 1));
        assert!(events.is_empty());
    }

    #[test]
    fn test_classifier_failure_notifies_and_keeps_buffer() {
        let mut engine = engine();
        let (request, t) = fill_window(&mut engine, 0);
        let events = engine.complete_classification(
            request.ticket,
            Err(GestureError::ClassificationFailed("model offline".to_string())),
            at(t),
        );

        let notification = events[0].as_notification().unwrap();
        assert_eq!(notification.level, NotificationLevel::Error);
        assert!(notification.message.contains("model offline"));
        assert_eq!(engine.state().buffered_frames, 10);
        assert_eq!(engine.state().pending_ticket, None);

        // processing continues: the next frame resubmits
        assert!(engine.on_frame(hand(), at(t + 33)).classify.is_some());
    }

    #[test]
    fn test_malformed_vector_is_dropped() {
        let mut engine = engine();
        let short = LandmarkVector::from_flat(vec![0.5; 60], 60).unwrap();
        let outcome = engine.on_frame(Some(short), at(0));
        assert!(outcome.dropped);
        assert!(outcome.events.is_empty());
        assert_eq!(engine.state().buffered_frames, 0);
        assert!(!engine.state().hand_present);
    }

    #[test]
    fn test_per_action_cooldown_outlasts_global() {
        let mut engine = engine();
        let fired_at = confirm_and_fire(&mut engine, GestureLabel::Screenshot, 0);

        // past the global cooldown but inside the 2500 ms action cooldown
        let (request, _) = fill_window(&mut engine, fired_at + 33);
        let events = engine.complete_classification(
            request.ticket,
            screenshot(),
            at(fired_at + 2_000),
        );
        assert_eq!(statuses(&events), vec!["Class: SS"]);
        assert!(actions(&events).is_empty());
        // the gesture still counted as a trigger
        assert_eq!(engine.state().last_trigger_at, Some(at(fired_at + 2_000)));
        assert_eq!(engine.state().buffered_frames, 0);
    }

    #[test]
    fn test_report_action_becomes_notification() {
        let mut engine = engine();
        let (request, t) = fill_window(&mut engine, 0);
        engine.complete_classification(request.ticket, screenshot(), at(t));
        let (request, t) = fill_window(&mut engine, t + 33);
        let events = engine.complete_classification(request.ticket, screenshot(), at(t));
        let action = events[1].as_action().unwrap().clone();

        let events = engine.report_action(ActionReport::succeeded(&action, at(t + 250)));
        let notification = events[0].as_notification().unwrap();
        assert_eq!(notification.level, NotificationLevel::Success);
        assert_eq!(notification.latency_ms, Some(250));
    }

    #[test]
    fn test_restart_resets_trigger_time() {
        let mut engine = engine();
        confirm_and_fire(&mut engine, GestureLabel::TransferScreenshot, 0);
        engine.restart();

        let state = engine.state();
        assert_eq!(state.last_trigger_at, None);
        assert_eq!(state.last_confirmed_label, None);
        assert_eq!(state.phase, EnginePhase::NoHand);
        assert_eq!(state.buffered_frames, 0);
    }
}
