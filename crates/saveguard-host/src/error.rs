//! Error types shared across the host boundary
//!
//! - [`SaveError`]: a failed save as reported by the document model
//! - [`HostError`]: any other collaborator failure (model acquisition,
//!   revert, editor open/close, commands)

use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// Result code of a failed file operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileOperationResult {
    /// Disk content changed since the model's base version
    ModifiedSince,
    /// Target is write protected
    ReadOnly,
    /// Process lacks permission to write the target
    PermissionDenied,
    /// Target does not exist
    NotFound,
    /// Content exceeds the writable size
    TooLarge,
    /// Target is a directory
    IsDirectory,
    /// Anything else
    Other,
}

/// Options a save was attempted with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Remove write protection before writing
    pub overwrite_readonly: bool,
    /// Write with elevated privileges
    pub write_elevated: bool,
}

impl SaveOptions {
    /// Plain save
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With write protection removal
    #[inline]
    #[must_use]
    pub fn overwrite_readonly(mut self) -> Self {
        self.overwrite_readonly = true;
        self
    }

    /// With elevated write
    #[inline]
    #[must_use]
    pub fn write_elevated(mut self) -> Self {
        self.write_elevated = true;
        self
    }
}

/// A failed save
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SaveError {
    /// Operation result code
    pub result: FileOperationResult,
    /// Human-readable message of the underlying failure
    pub message: String,
    /// Options the failed attempt used
    pub options: SaveOptions,
}

impl SaveError {
    /// Create save error
    #[inline]
    pub fn new(result: FileOperationResult, message: impl Into<String>) -> Self {
        Self {
            result,
            message: message.into(),
            options: SaveOptions::default(),
        }
    }

    /// Record the options the failed attempt used
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: SaveOptions) -> Self {
        self.options = options;
        self
    }

    /// Disk content is newer than the model's base
    #[inline]
    #[must_use]
    pub fn is_stale_write(&self) -> bool {
        self.result == FileOperationResult::ModifiedSince
    }

    /// Target is write protected
    #[inline]
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.result == FileOperationResult::ReadOnly
    }

    /// Write protected even though the attempt already tried to remove
    /// the protection
    #[inline]
    #[must_use]
    pub fn tried_overwrite(&self) -> bool {
        self.is_readonly() && self.options.overwrite_readonly
    }

    /// Insufficient permissions
    #[inline]
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        self.result == FileOperationResult::PermissionDenied
    }
}

/// Collaborator failures other than save errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// No model could be resolved for the resource
    #[error("model unavailable: {0}")]
    ModelUnavailable(Resource),

    /// Model was disposed while in use
    #[error("model disposed: {0}")]
    Disposed(Resource),

    /// Revert to disk content failed
    #[error("revert failed for {resource}: {message}")]
    RevertFailed { resource: Resource, message: String },

    /// Reading disk content failed
    #[error("read failed for {resource}: {message}")]
    ReadFailed { resource: Resource, message: String },

    /// Editor could not be opened or closed
    #[error("editor operation failed: {0}")]
    Editor(String),

    /// Command dispatch failed
    #[error("command failed: {0}")]
    Command(String),

    /// A save issued through a command failed
    #[error("save failed: {0}")]
    Save(#[from] SaveError),

    /// Provider already registered for scheme
    #[error("content provider already registered for scheme '{0}'")]
    SchemeTaken(String),

    /// External reference could not be opened
    #[error("cannot open '{0}'")]
    Open(String),
}

impl HostError {
    /// Create revert failure
    pub fn revert_failed(resource: &Resource, message: impl Into<String>) -> Self {
        Self::RevertFailed {
            resource: resource.clone(),
            message: message.into(),
        }
    }

    /// Create read failure
    pub fn read_failed(resource: &Resource, message: impl Into<String>) -> Self {
        Self::ReadFailed {
            resource: resource.clone(),
            message: message.into(),
        }
    }
}
