//! Event intake: from domain events to award attempts.
//!
//! [`EventIntake::run`] consumes the platform event bus. Every event is
//! handled on its own task so producers never wait on badge work, and every
//! badge candidate of an event runs on its own task so one failing (or
//! panicking) candidate cannot stop its siblings.

use std::sync::Arc;

use catchlog_core::badges::BadgeKind;
use catchlog_core::domain_events::DomainEvent;
use catchlog_core::predicates::PredicateRegistry;
use catchlog_events::PlatformEvent;
use tokio::sync::broadcast;
use tokio::task::JoinSet;

use crate::coordinator::{AwardCoordinator, AwardOutcome, BadgeNotification};
use crate::error::AwardError;
use crate::gateway::{load_snapshot, ActivityGateway};
use crate::notifier::NotificationSink;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Terminal state of one (event, candidate) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateStatus {
    Granted(BadgeNotification),
    SkippedLocked,
    SkippedAlreadyAwarded,
    FailedNotFound,
    FailedCollaborator,
}

/// What happened to one badge candidate of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateReport {
    pub badge: BadgeKind,
    pub status: CandidateStatus,
}

impl CandidateStatus {
    fn from_result(result: Result<AwardOutcome, AwardError>) -> Self {
        match result {
            Ok(AwardOutcome::Granted(notification)) => Self::Granted(notification),
            Ok(AwardOutcome::SkippedLocked) => Self::SkippedLocked,
            Ok(AwardOutcome::SkippedAlreadyAwarded) => Self::SkippedAlreadyAwarded,
            Err(e) if e.is_not_found() => Self::FailedNotFound,
            Err(_) => Self::FailedCollaborator,
        }
    }
}

// ---------------------------------------------------------------------------
// EventIntake
// ---------------------------------------------------------------------------

/// Consumes domain events and drives the award coordinator.
///
/// Cheap to clone; all collaborators sit behind `Arc`.
#[derive(Clone)]
pub struct EventIntake {
    gateway: Arc<dyn ActivityGateway>,
    coordinator: Arc<AwardCoordinator>,
    predicates: Arc<PredicateRegistry>,
    sink: Arc<dyn NotificationSink>,
}

impl EventIntake {
    pub fn new(
        gateway: Arc<dyn ActivityGateway>,
        coordinator: Arc<AwardCoordinator>,
        predicates: Arc<PredicateRegistry>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            gateway,
            coordinator,
            predicates,
            sink,
        }
    }

    /// Run the intake loop.
    ///
    /// Each received event is dispatched to its own task. The loop exits
    /// when the channel is closed (i.e. the
    /// [`EventBus`](catchlog_events::EventBus) is dropped); tasks already
    /// dispatched run to completion.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let intake = self.clone();
                    tokio::spawn(async move {
                        intake.handle_platform_event(&event).await;
                    });
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Badge intake lagged, skipped events are never redelivered and their badges are not granted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, badge intake shutting down");
                    break;
                }
            }
        }
    }

    /// Decode a bus event and process it if it is a known domain event.
    ///
    /// Unknown event types are ignored; malformed payloads are logged.
    pub async fn handle_platform_event(&self, event: &PlatformEvent) -> Vec<CandidateReport> {
        match event.domain_event() {
            Ok(Some(domain_event)) => self.process(&domain_event).await,
            Ok(None) => {
                tracing::debug!(event_type = %event.event_type, "Not a badge event, ignoring");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    event_type = %event.event_type,
                    "Malformed domain event payload, skipping"
                );
                Vec::new()
            }
        }
    }

    /// Evaluate predicates for `event` and attempt every candidate.
    ///
    /// Reports are returned in badge order. A candidate whose task panicked
    /// is logged and omitted.
    pub async fn process(&self, event: &DomainEvent) -> Vec<CandidateReport> {
        let user_id = event.recipient_user_id();

        let snapshot = match load_snapshot(self.gateway.as_ref(), event).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    user_id,
                    event_type = event.event_type(),
                    "Failed to load activity snapshot"
                );
                return Vec::new();
            }
        };

        let candidates = self.predicates.evaluate(event, &snapshot);
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut tasks = JoinSet::new();
        for badge in candidates {
            let coordinator = Arc::clone(&self.coordinator);
            let sink = Arc::clone(&self.sink);
            tasks.spawn(async move {
                let result = coordinator.award(user_id, badge.code()).await;
                if let Err(e) = &result {
                    log_failure(user_id, badge, e);
                }

                let status = CandidateStatus::from_result(result);
                if let CandidateStatus::Granted(notification) = &status {
                    sink.deliver(notification).await;
                }
                CandidateReport { badge, status }
            });
        }

        let mut reports = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::error!(error = %e, user_id, "Badge award task failed");
                }
            }
        }
        reports.sort_by_key(|r| r.badge);
        reports
    }
}

fn log_failure(user_id: i64, badge: BadgeKind, error: &AwardError) {
    if error.is_not_found() {
        tracing::warn!(
            error = %error,
            user_id,
            badge_code = badge.code(),
            "Badge award referenced a missing user or badge"
        );
    } else {
        tracing::error!(
            error = %error,
            user_id,
            badge_code = badge.code(),
            "Badge award failed"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
