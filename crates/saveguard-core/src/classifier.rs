//! Save failure classification
//!
//! Maps a raw [`SaveError`] to a [`FailureKind`] and decides what the user
//! sees: message text and the ordered action set. Classification is total
//! (unknown results are `Generic`) and has no side effects; the only
//! external state it reads is the suppression flag.

use crate::action::{NoticeRef, RecoveryAction};
use crate::messages;
use crate::suppression::SuppressionFlag;
use saveguard_host::{Resource, SaveError};
use serde::{Deserialize, Serialize};

/// Classified failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// Disk content newer than the model's base
    StaleWrite,
    /// Write protected
    ReadOnly,
    /// Write protected although the attempt already tried to overwrite
    ReadOnlyElevationAttempted,
    /// Insufficient permissions
    PermissionDenied,
    /// Anything else
    Generic,
}

impl FailureKind {
    /// Classify a raw save error
    #[must_use]
    pub fn of(error: &SaveError) -> Self {
        if error.is_stale_write() {
            Self::StaleWrite
        } else if error.is_permission_denied() {
            Self::PermissionDenied
        } else if error.tried_overwrite() {
            Self::ReadOnlyElevationAttempted
        } else if error.is_readonly() {
            Self::ReadOnly
        } else {
            Self::Generic
        }
    }
}

/// Focus state of the comparison view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictSession {
    /// Resource under comparison
    pub resource: Resource,
    /// Focused view is the comparison view for `resource`
    pub viewing_conflict: bool,
}

impl ConflictSession {
    /// Check whether the comparison view for `resource` is focused
    #[inline]
    #[must_use]
    pub fn is_viewing(&self, resource: &Resource) -> bool {
        self.viewing_conflict && &self.resource == resource
    }
}

/// What to show for a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// Message text
    pub message: String,
    /// Actions, in display order
    pub actions: Vec<RecoveryAction>,
}

/// Classification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Failure kind
    pub kind: FailureKind,
    /// `None` when nothing should be shown
    pub presentation: Option<Presentation>,
}

/// Error classifier
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    suppression: SuppressionFlag,
}

impl ErrorClassifier {
    /// Create classifier reading `suppression`
    #[inline]
    #[must_use]
    pub fn new(suppression: SuppressionFlag) -> Self {
        Self { suppression }
    }

    /// Classify a failed save of `resource`
    #[must_use]
    pub fn classify(
        &self,
        resource: &Resource,
        error: &SaveError,
        session: Option<&ConflictSession>,
    ) -> Classification {
        let kind = FailureKind::of(error);
        let name = resource.basename();

        let presentation = match kind {
            FailureKind::StaleWrite => {
                let viewing = session.is_some_and(|s| s.is_viewing(resource));
                if viewing && self.suppression.is_set() {
                    None
                } else if viewing {
                    Some(Presentation {
                        message: messages::CONFLICT_EDITOR_HELP.to_string(),
                        actions: vec![
                            RecoveryAction::LearnMore,
                            RecoveryAction::DontShowAgain {
                                notice: NoticeRef::Ledger(resource.clone()),
                            },
                        ],
                    })
                } else {
                    Some(Presentation {
                        message: messages::stale_write(name),
                        actions: vec![RecoveryAction::ResolveConflict {
                            resource: resource.clone(),
                        }],
                    })
                }
            }
            _ => Some(Self::non_stale(resource, name, error, kind)),
        };

        tracing::debug!(
            resource = %resource,
            ?kind,
            silent = presentation.is_none(),
            "Classified save failure"
        );

        Classification { kind, presentation }
    }

    fn non_stale(resource: &Resource, name: &str, error: &SaveError, kind: FailureKind) -> Presentation {
        let tried_overwrite = kind == FailureKind::ReadOnlyElevationAttempted;

        let (message, primary) = match kind {
            FailureKind::PermissionDenied | FailureKind::ReadOnlyElevationAttempted => {
                let message = if tried_overwrite {
                    messages::readonly_retry_elevated(name)
                } else {
                    messages::permission_denied(name)
                };
                let action = RecoveryAction::SaveElevated {
                    resource: resource.clone(),
                    overwrite_readonly: tried_overwrite,
                };
                (message, action)
            }
            FailureKind::ReadOnly => (
                messages::readonly_overwrite(name),
                RecoveryAction::OverwriteReadonly {
                    resource: resource.clone(),
                },
            ),
            FailureKind::Generic | FailureKind::StaleWrite => (
                messages::generic(name, &error.message),
                RecoveryAction::Retry {
                    resource: resource.clone(),
                },
            ),
        };

        Presentation {
            message,
            actions: vec![
                primary,
                RecoveryAction::SaveAs {
                    resource: resource.clone(),
                },
                RecoveryAction::Discard {
                    resource: resource.clone(),
                },
            ],
        }
    }
}
