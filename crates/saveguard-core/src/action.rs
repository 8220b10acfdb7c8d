//! Recovery action catalog
//!
//! A closed set of tagged variants. Each carries the parameters it needs;
//! all of them are dispatched by
//! [`SaveErrorHandler::run_action`](crate::SaveErrorHandler::run_action).

use crate::messages;
use saveguard_host::Resource;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Identifier of a pending help notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NoticeId(pub Ulid);

impl NoticeId {
    /// Generate new notice ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for NoticeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NoticeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notice an action is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NoticeRef {
    /// Ledger entry for a resource
    Ledger(Resource),
    /// Pending help notice
    Help(NoticeId),
}

/// Kind of a recovery action, without parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Retry,
    SaveAs,
    Discard,
    OverwriteReadonly,
    SaveElevated,
    ResolveConflict,
    LearnMore,
    DontShowAgain,
}

/// User-invocable recovery action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Re-issue the save
    Retry { resource: Resource },
    /// Save under a new target
    SaveAs { resource: Resource },
    /// Revert to disk content
    Discard { resource: Resource },
    /// Save removing write protection
    OverwriteReadonly { resource: Resource },
    /// Save with elevated privileges
    SaveElevated {
        resource: Resource,
        overwrite_readonly: bool,
    },
    /// Open the disk/in-memory comparison view
    ResolveConflict { resource: Resource },
    /// Open the documentation link
    LearnMore,
    /// Stop showing the conflict hint and dismiss `notice`
    DontShowAgain { notice: NoticeRef },
}

impl RecoveryAction {
    /// Kind of this action
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Retry { .. } => ActionKind::Retry,
            Self::SaveAs { .. } => ActionKind::SaveAs,
            Self::Discard { .. } => ActionKind::Discard,
            Self::OverwriteReadonly { .. } => ActionKind::OverwriteReadonly,
            Self::SaveElevated { .. } => ActionKind::SaveElevated,
            Self::ResolveConflict { .. } => ActionKind::ResolveConflict,
            Self::LearnMore => ActionKind::LearnMore,
            Self::DontShowAgain { .. } => ActionKind::DontShowAgain,
        }
    }

    /// Stable identifier for hosts that bind keys or telemetry to actions
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self.kind() {
            ActionKind::Retry => "saveguard.retry",
            ActionKind::SaveAs => "saveguard.saveAs",
            ActionKind::Discard => "saveguard.discard",
            ActionKind::OverwriteReadonly => "saveguard.overwriteReadonly",
            ActionKind::SaveElevated => "saveguard.saveElevated",
            ActionKind::ResolveConflict => "saveguard.resolveConflict",
            ActionKind::LearnMore => "saveguard.learnMore",
            ActionKind::DontShowAgain => "saveguard.dontShowAgain",
        }
    }

    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Retry { .. } => "Retry",
            Self::SaveAs { .. } => "Save As...",
            Self::Discard { .. } => "Discard",
            Self::OverwriteReadonly { .. } => "Overwrite",
            Self::SaveElevated {
                overwrite_readonly: true,
                ..
            } => messages::overwrite_elevated_label(),
            Self::SaveElevated { .. } => messages::elevated_label(),
            Self::ResolveConflict { .. } => "Resolve",
            Self::LearnMore => "Learn More",
            Self::DontShowAgain { .. } => "Don't Show Again",
        }
    }

    /// Resource the action operates on
    #[must_use]
    pub fn resource(&self) -> Option<&Resource> {
        match self {
            Self::Retry { resource }
            | Self::SaveAs { resource }
            | Self::Discard { resource }
            | Self::OverwriteReadonly { resource }
            | Self::SaveElevated { resource, .. }
            | Self::ResolveConflict { resource } => Some(resource),
            Self::LearnMore | Self::DontShowAgain { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_kind_and_resource() {
        let r = Resource::file("/a.txt");
        let action = RecoveryAction::SaveElevated {
            resource: r.clone(),
            overwrite_readonly: false,
        };
        assert_eq!(action.kind(), ActionKind::SaveElevated);
        assert_eq!(action.resource(), Some(&r));
        assert_eq!(RecoveryAction::LearnMore.resource(), None);
    }

    #[test]
    fn elevated_label_mentions_overwrite_when_readonly() {
        let r = Resource::file("/a.txt");
        let overwrite = RecoveryAction::SaveElevated {
            resource: r.clone(),
            overwrite_readonly: true,
        };
        let retry = RecoveryAction::SaveElevated {
            resource: r,
            overwrite_readonly: false,
        };
        assert_eq!(overwrite.label(), messages::overwrite_elevated_label());
        assert_eq!(retry.label(), messages::elevated_label());
    }

    #[test]
    fn action_ids_are_unique() {
        let r = Resource::file("/a.txt");
        let all = [
            RecoveryAction::Retry { resource: r.clone() },
            RecoveryAction::SaveAs { resource: r.clone() },
            RecoveryAction::Discard { resource: r.clone() },
            RecoveryAction::OverwriteReadonly { resource: r.clone() },
            RecoveryAction::SaveElevated {
                resource: r.clone(),
                overwrite_readonly: false,
            },
            RecoveryAction::ResolveConflict { resource: r.clone() },
            RecoveryAction::LearnMore,
            RecoveryAction::DontShowAgain {
                notice: NoticeRef::Ledger(r),
            },
        ];
        let ids: std::collections::HashSet<_> = all.iter().map(RecoveryAction::id).collect();
        assert_eq!(ids.len(), all.len());
    }
}
