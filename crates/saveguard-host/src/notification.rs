//! Notification contract
//!
//! The service is generic over the action type so callers keep their own
//! closed action catalog; the host renders labels and hands the chosen
//! action back to the caller.

use serde::{Deserialize, Serialize};

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational
    Info,
    /// Warning
    Warning,
    /// Error
    Error,
}

/// Notification request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification<A> {
    /// Severity
    pub severity: Severity,
    /// Message text
    pub message: String,
    /// Primary actions, in display order
    pub actions: Vec<A>,
}

impl<A> Notification<A> {
    /// Create notification
    #[inline]
    pub fn new(severity: Severity, message: impl Into<String>, actions: Vec<A>) -> Self {
        Self {
            severity,
            message: message.into(),
            actions,
        }
    }
}

/// Handle to a shown notification
pub trait NotificationHandle: Send + Sync {
    /// Hide the notification; calling twice is harmless
    fn dispose(&self);
}

/// Shows notifications
pub trait NotificationService<A>: Send + Sync {
    /// Show a notification
    fn notify(&self, notification: Notification<A>) -> Box<dyn NotificationHandle>;
}
