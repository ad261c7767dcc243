//! # Sync Notifications
//!
//! One user-visible notification per branch switch. The desktop shell shows
//! it as a toast; the agent binary writes it to the log.

use lats_core::SyncReport;
use tracing::{info, warn};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncNotification {
    pub level: NotificationLevel,
    pub message: String,
}

impl SyncNotification {
    /// Builds the notification summarising a finished branch switch.
    ///
    /// ```rust
    /// use lats_core::SyncReportBuilder;
    /// use lats_sync::notify::{NotificationLevel, SyncNotification};
    ///
    /// let report = SyncReportBuilder::new().finish(10);
    /// let note = SyncNotification::for_report("Arusha", &report);
    /// assert_eq!(note.level, NotificationLevel::Success);
    /// assert_eq!(note.message, "Switched to Arusha");
    /// ```
    pub fn for_report(branch_name: &str, report: &SyncReport) -> Self {
        if report.success {
            SyncNotification {
                level: NotificationLevel::Success,
                message: format!("Switched to {}", branch_name),
            }
        } else {
            SyncNotification {
                level: NotificationLevel::Error,
                message: format!(
                    "Switched to {} with {} error(s)",
                    branch_name,
                    report.errors.len()
                ),
            }
        }
    }
}

/// Receives user-facing sync notifications.
pub trait SyncNotifier: Send + Sync {
    fn notify(&self, notification: &SyncNotification);
}

/// Discards notifications (for tests and headless runs).
pub struct NoOpNotifier;

impl SyncNotifier for NoOpNotifier {
    fn notify(&self, _notification: &SyncNotification) {}
}

/// Writes notifications to the tracing log.
pub struct LogNotifier;

impl SyncNotifier for LogNotifier {
    fn notify(&self, notification: &SyncNotification) {
        match notification.level {
            NotificationLevel::Success => info!(message = %notification.message, "Sync notification"),
            NotificationLevel::Error => warn!(message = %notification.message, "Sync notification"),
        }
    }
}
