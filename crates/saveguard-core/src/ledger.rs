//! Notification bookkeeping
//!
//! - [`NotificationLedger`]: at most one live save-failure notification per
//!   resource
//! - [`PendingHelpNotices`]: transient hints shown after the comparison view
//!   opens, dismissed together when a recovery command starts

use crate::action::{NoticeId, RecoveryAction};
use crate::classifier::Presentation;
use dashmap::DashMap;
use parking_lot::Mutex;
use saveguard_host::{Notification, NotificationHandle, NotificationService, Resource, Severity};
use std::fmt;
use std::sync::Arc;

/// Shared notification service type
pub type Notifier = Arc<dyn NotificationService<RecoveryAction>>;

/// Per-resource save-failure notifications
pub struct NotificationLedger {
    notifier: Notifier,
    entries: DashMap<Resource, Box<dyn NotificationHandle>>,
}

impl NotificationLedger {
    /// Create empty ledger
    #[inline]
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self {
            notifier,
            entries: DashMap::new(),
        }
    }

    /// Show `presentation` for `resource`, replacing any live entry
    pub fn present(&self, resource: &Resource, presentation: Presentation) {
        self.clear(resource);

        let handle = self.notifier.notify(Notification::new(
            Severity::Error,
            presentation.message,
            presentation.actions,
        ));

        // Another caller may have presented in between; retire its handle too.
        if let Some(previous) = self.entries.insert(resource.clone(), handle) {
            previous.dispose();
        }
        tracing::debug!(resource = %resource, "Presented save failure notification");
    }

    /// Dispose and forget the entry for `resource`; no-op when absent
    pub fn clear(&self, resource: &Resource) {
        if let Some((_, handle)) = self.entries.remove(resource) {
            handle.dispose();
            tracing::debug!(resource = %resource, "Cleared save failure notification");
        }
    }

    /// Dispose every entry
    pub fn clear_all(&self) {
        let resources: Vec<Resource> = self.entries.iter().map(|e| e.key().clone()).collect();
        for resource in resources {
            self.clear(&resource);
        }
    }

    /// Check for a live entry
    #[inline]
    #[must_use]
    pub fn contains(&self, resource: &Resource) -> bool {
        self.entries.contains_key(resource)
    }

    /// Number of live entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries are live
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for NotificationLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationLedger")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Hints shown while a conflict is being resolved
pub struct PendingHelpNotices {
    notifier: Notifier,
    notices: Mutex<Vec<(NoticeId, Box<dyn NotificationHandle>)>>,
}

impl PendingHelpNotices {
    /// Create empty queue
    #[inline]
    #[must_use]
    pub fn new(notifier: Notifier) -> Self {
        Self {
            notifier,
            notices: Mutex::new(Vec::new()),
        }
    }

    /// Show an informational notice; `actions` receives the notice id so
    /// actions can refer back to it
    pub fn push(
        &self,
        message: impl Into<String>,
        actions: impl FnOnce(NoticeId) -> Vec<RecoveryAction>,
    ) -> NoticeId {
        let id = NoticeId::new();
        let handle = self
            .notifier
            .notify(Notification::new(Severity::Info, message, actions(id)));
        self.notices.lock().push((id, handle));
        id
    }

    /// Dismiss one notice; no-op when absent
    pub fn dismiss(&self, id: NoticeId) {
        let removed = {
            let mut notices = self.notices.lock();
            notices
                .iter()
                .position(|(n, _)| *n == id)
                .map(|idx| notices.remove(idx))
        };
        if let Some((_, handle)) = removed {
            handle.dispose();
        }
    }

    /// Dismiss all notices, oldest first
    pub fn clear_all(&self) {
        let drained: Vec<_> = self.notices.lock().drain(..).collect();
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "Dismissing pending help notices");
        }
        for (_, handle) in drained {
            handle.dispose();
        }
    }

    /// Number of pending notices
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    /// Check if no notices are pending
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }
}

impl fmt::Debug for PendingHelpNotices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingHelpNotices")
            .field("notices", &self.len())
            .finish()
    }
}
