//! Error types for save-failure recovery
//!
//! Recovery failures fall in two groups:
//! - save failures, which re-enter classification and produce a new
//!   notification
//! - everything else (acquisition, revert, editor, commands), which goes to
//!   the host's unexpected-error channel and is never retried

use saveguard_host::{HostError, Resource, SaveError};

/// Recovery error
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecoveryError {
    /// Model reference could not be acquired
    #[error("cannot acquire model for {resource}: {source}")]
    Acquire {
        resource: Resource,
        #[source]
        source: HostError,
    },

    /// Reverting to disk content failed
    #[error("{0}")]
    Revert(#[source] HostError),

    /// Reapplying local content failed
    #[error("reapplying local changes failed: {0}")]
    Reapply(#[source] HostError),

    /// Save failed
    #[error("save failed: {0}")]
    Save(#[from] SaveError),

    /// Elevated save failed
    #[error("elevated save failed: {0}")]
    ElevatedSave(#[source] SaveError),

    /// Editor open/close failed
    #[error("{0}")]
    Editor(#[source] HostError),

    /// Command or external collaborator failed
    #[error("{0}")]
    Command(#[source] HostError),

    /// Content provider registration failed
    #[error("cannot register conflict content provider: {0}")]
    Registration(#[source] HostError),

    /// Configuration rejected
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Active editor is not the comparison view for the resource
    #[error("no conflict editor active for {0}")]
    NoConflictEditor(Resource),
}

impl RecoveryError {
    /// Create acquisition error
    #[inline]
    pub fn acquire(resource: &Resource, source: HostError) -> Self {
        Self::Acquire {
            resource: resource.clone(),
            source,
        }
    }

    /// Check if the error re-enters save-failure classification
    #[inline]
    #[must_use]
    pub fn is_save_failure(&self) -> bool {
        matches!(self, Self::Save(_))
    }

    /// Save error to classify, if any
    #[inline]
    #[must_use]
    pub fn as_save_error(&self) -> Option<&SaveError> {
        match self {
            Self::Save(e) => Some(e),
            _ => None,
        }
    }
}
