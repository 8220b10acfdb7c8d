//! Remaining collaborator contracts
//!
//! Storage, context flags, commands, content providers, disk reads,
//! external links and the unexpected-error channel.

use crate::error::{HostError, SaveError, SaveOptions};
use crate::resource::Resource;
use std::sync::Arc;

/// Persistent key-value storage
pub trait StateStore: Send + Sync {
    /// Read a boolean, `false` when unset
    fn get_bool(&self, key: &str) -> bool;

    /// Persist a boolean
    fn store(&self, key: &str, value: bool);
}

/// Context flags consumed by the rest of the host UI
pub trait ContextKeys: Send + Sync {
    /// Set a boolean flag
    fn set(&self, key: &str, value: bool);
}

/// Save/revert commands
///
/// Failures are returned to the caller, which decides how to surface them.
#[async_trait::async_trait]
pub trait CommandService: Send + Sync {
    /// Save the document
    async fn save(&self, resource: &Resource, options: SaveOptions) -> Result<(), SaveError>;

    /// Save under a user-chosen target
    async fn save_as(&self, resource: &Resource) -> Result<(), HostError>;

    /// Revert the document to disk content
    async fn revert(&self, resource: &Resource) -> Result<(), HostError>;
}

/// Read-only content source for a private scheme
#[async_trait::async_trait]
pub trait ContentProvider: Send + Sync {
    /// Content of a resource on the provider's scheme
    async fn provide(&self, resource: &Resource) -> Result<String, HostError>;
}

/// Registry of content providers by scheme
pub trait ContentProviderRegistry: Send + Sync {
    /// Register `provider` for `scheme`
    ///
    /// # Errors
    /// `HostError::SchemeTaken` if another provider owns the scheme
    fn register(&self, scheme: &str, provider: Arc<dyn ContentProvider>) -> Result<(), HostError>;
}

/// Reads content as currently on disk
#[async_trait::async_trait]
pub trait DiskReader: Send + Sync {
    /// Read disk content of an on-disk resource
    async fn read(&self, resource: &Resource) -> Result<String, HostError>;
}

/// Opens external references (documentation links)
pub trait ExternalOpener: Send + Sync {
    /// Open `url`
    fn open(&self, url: &str) -> Result<(), HostError>;
}

/// Channel for failures that are not save errors
pub trait ErrorReporter: Send + Sync {
    /// Surface an unexpected error
    fn report(&self, error: &(dyn std::error::Error + Send + Sync));
}
