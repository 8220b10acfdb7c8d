//! Disk snapshot content for the comparison view's left side

use saveguard_host::{ContentProvider, DiskReader, HostError, Resource, FILE_SCHEME};
use std::fmt;
use std::sync::Arc;

/// Serves `conflict-scheme://path` as the disk content of `file://path`
pub struct ConflictContentProvider {
    disk: Arc<dyn DiskReader>,
}

impl ConflictContentProvider {
    /// Create provider reading through `disk`
    #[inline]
    #[must_use]
    pub fn new(disk: Arc<dyn DiskReader>) -> Self {
        Self { disk }
    }
}

#[async_trait::async_trait]
impl ContentProvider for ConflictContentProvider {
    async fn provide(&self, resource: &Resource) -> Result<String, HostError> {
        let on_disk = resource.with_scheme(FILE_SCHEME);
        self.disk.read(&on_disk).await
    }
}

impl fmt::Debug for ConflictContentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConflictContentProvider").finish_non_exhaustive()
    }
}
