//! Document lifecycle events

use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Lifecycle event reported by the document layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentEvent {
    /// Document written to disk
    Saved(Resource),
    /// Document reloaded from disk
    Reverted(Resource),
}

impl DocumentEvent {
    /// Resource the event concerns
    #[inline]
    #[must_use]
    pub fn resource(&self) -> &Resource {
        match self {
            Self::Saved(r) | Self::Reverted(r) => r,
        }
    }
}

/// Create a lifecycle event channel
#[must_use]
pub fn channel(capacity: usize) -> (broadcast::Sender<DocumentEvent>, broadcast::Receiver<DocumentEvent>) {
    broadcast::channel(capacity)
}
