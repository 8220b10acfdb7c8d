//! Conflict resolution command sequences
//!
//! Both commands run against the focused comparison view:
//!
//! ```text
//! acquire ─► dismiss help ─┬─ accept: snapshot ─► revert ─► reapply ─► save ─┬─► reopen ─► close ─► release
//!                          └─ revert: revert ────────────────────────────────┘
//! ```
//!
//! Every step awaits the previous one. The model reference is a drop guard,
//! so it is released on every exit path, including failures.

use crate::error::RecoveryError;
use crate::ledger::PendingHelpNotices;
use crate::tracker::ConflictViewTracker;
use saveguard_host::{
    ActiveEditor, EditorDescriptor, EditorInput, EditorService, HostError, ModelService, Resource,
    SaveOptions,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Conflict resolution command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolutionCommand {
    /// Keep local edits and overwrite the disk content
    AcceptLocal,
    /// Drop local edits and load the disk content
    RevertLocal,
}

impl fmt::Display for ResolutionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AcceptLocal => write!(f, "accept local changes"),
            Self::RevertLocal => write!(f, "revert local changes"),
        }
    }
}

/// Runs conflict resolution commands
pub struct RecoveryOrchestrator {
    models: Arc<dyn ModelService>,
    editors: Arc<dyn EditorService>,
    tracker: Arc<ConflictViewTracker>,
    help: Arc<PendingHelpNotices>,
}

impl RecoveryOrchestrator {
    /// Create orchestrator
    pub fn new(
        models: Arc<dyn ModelService>,
        editors: Arc<dyn EditorService>,
        tracker: Arc<ConflictViewTracker>,
        help: Arc<PendingHelpNotices>,
    ) -> Self {
        Self {
            models,
            editors,
            tracker,
            help,
        }
    }

    /// Run `command` for `resource`
    ///
    /// # Errors
    /// - `RecoveryError::NoConflictEditor` if the focused view is not the
    ///   comparison view for `resource`
    /// - `RecoveryError::Acquire` if no model reference can be obtained
    /// - `RecoveryError::Revert` / `Reapply` if loading disk content or
    ///   reapplying local content fails
    /// - `RecoveryError::Save` if the final save fails
    /// - `RecoveryError::Editor` if reopening or closing views fails
    pub async fn run(&self, command: ResolutionCommand, resource: &Resource) -> Result<(), RecoveryError> {
        let editor = self
            .editors
            .active_editor()
            .filter(|e| self.tracker.conflict_resource_of(&e.input).as_ref() == Some(resource))
            .ok_or_else(|| RecoveryError::NoConflictEditor(resource.clone()))?;

        // 1. Acquire
        let reference = self
            .models
            .acquire(resource)
            .await
            .map_err(|e| RecoveryError::acquire(resource, e))?;
        let model = reference.model().clone();
        if model.is_disposed() {
            return Err(RecoveryError::acquire(resource, HostError::Disposed(resource.clone())));
        }

        // 2. The session ends regardless of outcome
        self.help.clear_all();

        // 3. Bring the model in sync with disk
        match command {
            ResolutionCommand::AcceptLocal => {
                let local = model.snapshot();
                model.revert().await.map_err(RecoveryError::Revert)?;
                model.apply_content(&local).map_err(RecoveryError::Reapply)?;
                model.save(SaveOptions::default()).await?;
            }
            ResolutionCommand::RevertLocal => {
                model.revert().await.map_err(RecoveryError::Revert)?;
            }
        }
        tracing::debug!(resource = %resource, %command, "Model in sync with disk");

        // 4. Swap the comparison view for a normal editor
        self.reopen(resource, &editor).await?;

        drop(reference);
        Ok(())
    }

    async fn reopen(&self, resource: &Resource, editor: &ActiveEditor) -> Result<(), RecoveryError> {
        let descriptor = EditorDescriptor::new(EditorInput::file(resource.clone()))
            .pinned()
            .with_view_state(editor.view_state);

        self.editors
            .open_editor(descriptor, editor.group)
            .await
            .map_err(RecoveryError::Editor)?;
        self.editors
            .close_editor(editor.group, &editor.input)
            .await
            .map_err(RecoveryError::Editor)
    }
}

impl fmt::Debug for RecoveryOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryOrchestrator")
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}
