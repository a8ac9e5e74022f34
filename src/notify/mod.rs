//! Outbound notifications.
//!
//! The monitor describes what happened as a [`Notification`] and hands it to a
//! [`Notifier`]. Delivery failures are reported back but never retried or
//! allowed to stop monitoring.

pub mod webhook;

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

pub use webhook::WebhookNotifier;

use crate::diff::Consistency;
use crate::session::{SessionProgress, SessionSummary};
use crate::types::{BattleEvent, Snapshot, TeamName};

/// Errors from delivering a notification.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("notification could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("notification endpoint unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notification endpoint rejected delivery (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Whether the first poll reached the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MonitorStatus {
    Connected { snapshot: Snapshot },
    Unreachable { error: String },
}

/// Something worth telling the squadron about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// Outcome of the first poll. `Unreachable` is sent at most once until the
    /// source is reached.
    MonitorStatus {
        team: TeamName,
        #[serde(flatten)]
        status: MonitorStatus,
    },

    /// A battle opened a new session. Followed by the matching `BattleRecorded`.
    SessionStarted {
        team: TeamName,
        started_at: DateTime<Utc>,
        starting_rating: i64,
    },

    BattleRecorded {
        team: TeamName,
        event: BattleEvent,
        consistency: Consistency,
        progress: SessionProgress,
    },

    SessionEnded {
        team: TeamName,
        summary: SessionSummary,
    },
}

impl Notification {
    pub fn team(&self) -> &TeamName {
        match self {
            Notification::MonitorStatus { team, .. }
            | Notification::SessionStarted { team, .. }
            | Notification::BattleRecorded { team, .. }
            | Notification::SessionEnded { team, .. } => team,
        }
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::MonitorStatus { .. } => "monitor_status",
            Notification::SessionStarted { .. } => "session_started",
            Notification::BattleRecorded { .. } => "battle_recorded",
            Notification::SessionEnded { .. } => "session_ended",
        }
    }
}

/// Delivers notifications somewhere.
pub trait Notifier: Send + Sync {
    fn publish(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

impl<N: Notifier> Notifier for Arc<N> {
    fn publish(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), PublishError>> + Send {
        (**self).publish(notification)
    }
}

/// Writes notifications to the log. Used when no endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn publish(&self, notification: &Notification) -> Result<(), PublishError> {
        let body = serde_json::to_string(notification)?;
        info!(
            team = %notification.team(),
            kind = notification.kind(),
            %body,
            "Notification"
        );
        Ok(())
    }
}

/// Either configured notifier, so the binary can pick one at startup.
#[derive(Debug, Clone)]
pub enum AnyNotifier {
    Log(LogNotifier),
    Webhook(WebhookNotifier),
}

impl Notifier for AnyNotifier {
    async fn publish(&self, notification: &Notification) -> Result<(), PublishError> {
        match self {
            AnyNotifier::Log(n) => n.publish(notification).await,
            AnyNotifier::Webhook(n) => n.publish(notification).await,
        }
    }
}
