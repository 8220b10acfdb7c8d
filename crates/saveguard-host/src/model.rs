//! Document model contract
//!
//! Models are shared: the [`ModelService`] hands out reference-counted
//! [`ModelRef`]s and never locks a document exclusively. Dropping a
//! [`ModelRef`] releases its reference.

use crate::error::{HostError, SaveError, SaveOptions};
use crate::resource::Resource;
use std::fmt;
use std::sync::Arc;

/// Editable in-memory document
#[async_trait::async_trait]
pub trait TextFileModel: Send + Sync {
    /// Resource the model is bound to
    fn resource(&self) -> Resource;

    /// Current in-memory content, including unsaved edits
    fn snapshot(&self) -> String;

    /// Replace the content as a single undoable edit
    fn apply_content(&self, content: &str) -> Result<(), HostError>;

    /// Has unsaved edits
    fn is_dirty(&self) -> bool;

    /// Model was disposed
    fn is_disposed(&self) -> bool;

    /// Load disk content, dropping local edits and the stale state
    async fn revert(&self) -> Result<(), HostError>;

    /// Write the content to disk
    async fn save(&self, options: SaveOptions) -> Result<(), SaveError>;
}

/// Counted reference to a model
///
/// The release callback runs exactly once, when the reference drops.
pub struct ModelRef {
    model: Arc<dyn TextFileModel>,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl ModelRef {
    /// Wrap a model with its release callback
    pub fn new(model: Arc<dyn TextFileModel>, release: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            model,
            release: Some(Box::new(release)),
        }
    }

    /// Referenced model
    #[inline]
    #[must_use]
    pub fn model(&self) -> &Arc<dyn TextFileModel> {
        &self.model
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRef")
            .field("resource", &self.model.resource())
            .field("released", &self.release.is_none())
            .finish()
    }
}

impl Drop for ModelRef {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Resolves models by resource
#[async_trait::async_trait]
pub trait ModelService: Send + Sync {
    /// Acquire a reference to the model for `resource`
    ///
    /// Succeeds when the document is already open elsewhere.
    async fn acquire(&self, resource: &Resource) -> Result<ModelRef, HostError>;
}
