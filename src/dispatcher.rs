//! Gesture to action dispatch
//!
//! Maps a fired gesture onto its action, applies the per-action cooldown and
//! issues a fire-and-forget `ActionRequest`. Execution happens outside the
//! engine; the executor reports back with an `ActionReport`, which becomes a
//! notification. Nothing here retries, and reporting is optional: only the
//! latest request per action is remembered for latency.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::GestureConfig;
use crate::cooldown::CooldownRegistry;
use crate::types::{
    ActionKind, ActionReport, ActionRequest, GestureLabel, Notification, NotificationLevel,
};

/// The most recent unreported request for one action
#[derive(Debug, Clone, Copy)]
struct InFlight {
    dispatch_id: Uuid,
    requested_at: DateTime<Utc>,
}

/// Issues action requests subject to per-action cooldowns
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    cooldowns: CooldownRegistry<ActionKind>,
    intervals: BTreeMap<ActionKind, chrono::Duration>,
    in_flight: BTreeMap<ActionKind, InFlight>,
}

impl ActionDispatcher {
    pub fn from_config(config: &GestureConfig) -> Self {
        let intervals = [ActionKind::CaptureAndUpload, ActionKind::FetchAndPresent]
            .into_iter()
            .map(|action| (action, config.action_cooldown(action)))
            .collect();

        Self {
            cooldowns: CooldownRegistry::new(),
            intervals,
            in_flight: BTreeMap::new(),
        }
    }

    /// Request the action bound to `label`. Returns `None` when the label has
    /// no action or the action is still cooling down.
    pub fn dispatch(&mut self, label: GestureLabel, now: DateTime<Utc>) -> Option<ActionRequest> {
        let action = match ActionKind::for_label(label) {
            Some(action) => action,
            None => {
                debug!(%label, "no action bound to gesture");
                return None;
            }
        };

        let interval = self.intervals[&action];
        if !self.cooldowns.try_acquire(&action, interval, now) {
            debug!(%action, "action cooling down, dropped");
            return None;
        }

        let request = ActionRequest {
            dispatch_id: Uuid::new_v4(),
            action,
            label,
            cue: label.as_str().to_string(),
            requested_at: now,
        };
        info!(%action, %label, dispatch_id = %request.dispatch_id, "action dispatched");
        let superseded = self.in_flight.insert(
            action,
            InFlight {
                dispatch_id: request.dispatch_id,
                requested_at: now,
            },
        );
        if let Some(previous) = superseded {
            debug!(%action, dispatch_id = %previous.dispatch_id, "unreported dispatch superseded");
        }
        Some(request)
    }

    /// Turn an executor report into a user-facing notification
    pub fn complete(&mut self, report: ActionReport) -> Notification {
        let latency_ms = match self.in_flight.get(&report.action).copied() {
            Some(pending) if pending.dispatch_id == report.dispatch_id => {
                let latency = report.completed_at - pending.requested_at;
                self.in_flight.remove(&report.action);
                Some(latency.num_milliseconds())
            }
            _ => {
                warn!(
                    dispatch_id = %report.dispatch_id,
                    "report for unknown or superseded dispatch"
                );
                None
            }
        };

        let (level, message) = if report.success {
            let message = match report.action {
                ActionKind::CaptureAndUpload => "Screenshot captured and uploaded",
                ActionKind::FetchAndPresent => "Transfer successful",
            };
            (NotificationLevel::Success, message.to_string())
        } else {
            let detail = report.message.as_deref().unwrap_or("unknown error");
            warn!(action = %report.action, error = detail, "action failed");
            let message = match report.action {
                ActionKind::CaptureAndUpload => format!("Screenshot failed: {}", detail),
                ActionKind::FetchAndPresent => format!("Transfer failed: {}", detail),
            };
            (NotificationLevel::Error, message)
        };

        if let Some(ms) = latency_ms {
            info!(
                action = %report.action,
                latency_ms = ms,
                success = report.success,
                "gesture response"
            );
        }

        Notification {
            level,
            message,
            dispatch_id: Some(report.dispatch_id),
            latency_ms,
            at: report.completed_at,
        }
    }

    /// Requests issued but not yet reported (at most one per action)
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}
