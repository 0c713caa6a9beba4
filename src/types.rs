//! Core types for the Synheart Gesture engine
//!
//! This module defines the data structures that flow between the engine and its
//! collaborators: gesture labels, action kinds, status updates, action requests
//! and reports, and the notifications surfaced to feedback layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::GestureError;

/// Gesture labels known to the classification model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GestureLabel {
    /// Screenshot gesture
    #[serde(rename = "SS")]
    Screenshot,
    /// Transfer (paste) the last screenshot
    #[serde(rename = "transfer_SS")]
    TransferScreenshot,
    /// Explicit "no known gesture" class
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::Screenshot => "SS",
            GestureLabel::TransferScreenshot => "transfer_SS",
            GestureLabel::Unknown => "UNKNOWN",
        }
    }

    /// Whether this label denotes the model's "unknown" class
    pub fn is_unknown(&self) -> bool {
        matches!(self, GestureLabel::Unknown)
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GestureLabel {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SS" => Ok(GestureLabel::Screenshot),
            "transfer_SS" => Ok(GestureLabel::TransferScreenshot),
            "UNKNOWN" => Ok(GestureLabel::Unknown),
            other => Err(GestureError::UnknownLabel(other.to_string())),
        }
    }
}

/// Side-effecting action bound to a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Capture the shared screen and upload the image
    CaptureAndUpload,
    /// Fetch the most recently uploaded image and present it
    FetchAndPresent,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CaptureAndUpload => "capture_and_upload",
            ActionKind::FetchAndPresent => "fetch_and_present",
        }
    }

    /// Action triggered by a confirmed gesture, if any
    pub fn for_label(label: GestureLabel) -> Option<ActionKind> {
        match label {
            GestureLabel::Screenshot => Some(ActionKind::CaptureAndUpload),
            GestureLabel::TransferScreenshot => Some(ActionKind::FetchAndPresent),
            GestureLabel::Unknown => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable detection state surfaced to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Status {
    NoGesture,
    Detecting,
    Unknown,
    Class { label: GestureLabel },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NoGesture => f.write_str("no gesture detected"),
            Status::Detecting => f.write_str("detecting gesture..."),
            Status::Unknown => f.write_str("unknown gesture"),
            Status::Class { label } => write!(f, "Class: {}", label),
        }
    }
}

/// A status change, optionally paired with the classifier confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: Status,
    /// Rendered status text
    pub text: String,
    /// Confidence percentage (0-100), blank when not meaningful
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_pct: Option<f32>,
    pub at: DateTime<Utc>,
}

impl StatusUpdate {
    pub fn new(status: Status, confidence: Option<f32>, at: DateTime<Utc>) -> Self {
        Self {
            status,
            text: status.to_string(),
            confidence_pct: confidence.map(|p| p * 100.0),
            at,
        }
    }

    /// Confidence formatted with two decimals, or an empty string
    pub fn confidence_label(&self) -> String {
        self.confidence_pct
            .map(|pct| format!("{:.2}", pct))
            .unwrap_or_default()
    }
}

/// A single fire-and-forget action invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Correlates the request with its later report
    pub dispatch_id: Uuid,
    pub action: ActionKind,
    pub label: GestureLabel,
    /// Feedback cue (sound/flash key) for presentation collaborators
    pub cue: String,
    pub requested_at: DateTime<Utc>,
}

/// Outcome of an action, reported back by whoever executed it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    pub dispatch_id: Uuid,
    pub action: ActionKind,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl ActionReport {
    pub fn succeeded(request: &ActionRequest, completed_at: DateTime<Utc>) -> Self {
        Self {
            dispatch_id: request.dispatch_id,
            action: request.action,
            success: true,
            message: None,
            completed_at,
        }
    }

    pub fn failed(
        request: &ActionRequest,
        message: impl Into<String>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            dispatch_id: request.dispatch_id,
            action: request.action,
            success: false,
            message: Some(message.into()),
            completed_at,
        }
    }
}

/// Severity of a notification (maps onto toast styles)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Side-channel message for toast/sound collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch_id: Option<Uuid>,
    /// Gesture response time (dispatch to completion), when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<i64>,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            level,
            message: message.into(),
            dispatch_id: None,
            latency_ms: None,
            at,
        }
    }
}

/// Everything the engine surfaces to its observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    Status(StatusUpdate),
    ActionDispatched(ActionRequest),
    Notification(Notification),
}

impl EngineEvent {
    pub fn as_status(&self) -> Option<&StatusUpdate> {
        match self {
            EngineEvent::Status(update) => Some(update),
            _ => None,
        }
    }

    pub fn as_action(&self) -> Option<&ActionRequest> {
        match self {
            EngineEvent::ActionDispatched(request) => Some(request),
            _ => None,
        }
    }

    pub fn as_notification(&self) -> Option<&Notification> {
        match self {
            EngineEvent::Notification(notification) => Some(notification),
            _ => None,
        }
    }
}
