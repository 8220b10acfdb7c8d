use parking_lot::Mutex;
use saveguard_host::{DiskReader, HostError, Resource};
use std::collections::HashMap;

/// Write protection of a fake file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protection {
    #[default]
    None,
    /// Writable once `overwrite_readonly` is set
    ReadOnly,
    /// Writable only with `write_elevated`
    ReadOnlyLocked,
    /// Writable only with `write_elevated`
    PermissionDenied,
}

#[derive(Debug, Clone, Default)]
struct DiskFile {
    content: String,
    version: u64,
    protection: Protection,
}

/// Versioned in-memory file system
#[derive(Debug, Default)]
pub struct FakeDisk {
    files: Mutex<HashMap<Resource, DiskFile>>,
}

impl FakeDisk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write content from outside the editor, bumping the version
    pub fn write(&self, resource: &Resource, content: &str) -> u64 {
        let mut files = self.files.lock();
        let file = files.entry(resource.clone()).or_default();
        file.content = content.to_string();
        file.version += 1;
        file.version
    }

    pub fn set_protection(&self, resource: &Resource, protection: Protection) {
        self.files
            .lock()
            .entry(resource.clone())
            .or_default()
            .protection = protection;
    }

    pub fn protection(&self, resource: &Resource) -> Protection {
        self.files
            .lock()
            .get(resource)
            .map(|f| f.protection)
            .unwrap_or_default()
    }

    pub fn read_now(&self, resource: &Resource) -> Option<String> {
        self.files.lock().get(resource).map(|f| f.content.clone())
    }

    pub fn version(&self, resource: &Resource) -> u64 {
        self.files.lock().get(resource).map_or(0, |f| f.version)
    }
}

#[async_trait::async_trait]
impl DiskReader for FakeDisk {
    async fn read(&self, resource: &Resource) -> Result<String, HostError> {
        self.read_now(resource)
            .ok_or_else(|| HostError::read_failed(resource, "no such file"))
    }
}
