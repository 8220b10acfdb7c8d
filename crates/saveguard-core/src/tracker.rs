//! Conflict view tracking
//!
//! Caches whether the focused editor is the disk/in-memory comparison view
//! and for which resource. State is recomputed only when the host reports an
//! active-editor change; reads never recompute.

use crate::classifier::ConflictSession;
use parking_lot::RwLock;
use saveguard_host::{ContextKeys, EditorInput, EditorService, Resource};
use std::fmt;
use std::sync::Arc;

/// Tracks the focused comparison view
pub struct ConflictViewTracker {
    editors: Arc<dyn EditorService>,
    context: Arc<dyn ContextKeys>,
    context_key: String,
    conflict_scheme: String,
    session: RwLock<Option<ConflictSession>>,
}

impl ConflictViewTracker {
    /// Create tracker; call [`refresh`](Self::refresh) to pick up the
    /// current editor
    pub fn new(
        editors: Arc<dyn EditorService>,
        context: Arc<dyn ContextKeys>,
        context_key: impl Into<String>,
        conflict_scheme: impl Into<String>,
    ) -> Self {
        Self {
            editors,
            context,
            context_key: context_key.into(),
            conflict_scheme: conflict_scheme.into(),
            session: RwLock::new(None),
        }
    }

    /// Re-evaluate the active editor and sync the context flag
    pub fn refresh(&self) {
        let resource = self
            .editors
            .active_editor()
            .and_then(|editor| self.conflict_resource_of(&editor.input));

        let viewing = resource.is_some();
        let changed = {
            let mut session = self.session.write();
            let next = resource.map(|resource| ConflictSession {
                resource,
                viewing_conflict: true,
            });
            let changed = *session != next;
            *session = next;
            changed
        };

        self.context.set(&self.context_key, viewing);
        if changed {
            tracing::debug!(viewing, "Conflict view focus changed");
        }
    }

    /// Comparison-view resource of `input`, if it is one
    ///
    /// Left side on the conflict scheme, right side an ordinary file editor.
    #[must_use]
    pub fn conflict_resource_of(&self, input: &EditorInput) -> Option<Resource> {
        match input {
            EditorInput::Diff {
                original, modified, ..
            } if original.resource().scheme() == self.conflict_scheme
                && modified.is_file_editor() =>
            {
                Some(modified.resource().clone())
            }
            _ => None,
        }
    }

    /// Focused view is a comparison view
    #[inline]
    #[must_use]
    pub fn is_viewing_conflict(&self) -> bool {
        self.session
            .read()
            .as_ref()
            .is_some_and(|s| s.viewing_conflict)
    }

    /// Resource of the focused comparison view
    #[inline]
    #[must_use]
    pub fn conflict_resource(&self) -> Option<Resource> {
        self.session.read().as_ref().map(|s| s.resource.clone())
    }

    /// Current session
    #[inline]
    #[must_use]
    pub fn session(&self) -> Option<ConflictSession> {
        self.session.read().clone()
    }
}

impl fmt::Debug for ConflictViewTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConflictViewTracker")
            .field("conflict_scheme", &self.conflict_scheme)
            .field("session", &*self.session.read())
            .finish()
    }
}
