//! Editor views and the editor service contract

use crate::error::HostError;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// Editor group (split pane) identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "group-{}", self.0)
    }
}

/// What an editor view renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorInput {
    /// Ordinary editor over an on-disk document
    File { resource: Resource },
    /// Read-only document served by a content provider
    Virtual { resource: Resource },
    /// Two-sided comparison
    Diff {
        label: String,
        original: Box<EditorInput>,
        modified: Box<EditorInput>,
    },
}

impl EditorInput {
    /// File editor input
    #[inline]
    #[must_use]
    pub fn file(resource: Resource) -> Self {
        Self::File { resource }
    }

    /// Comparison of `original` (left) against `modified` (right)
    #[must_use]
    pub fn diff(label: impl Into<String>, original: EditorInput, modified: EditorInput) -> Self {
        Self::Diff {
            label: label.into(),
            original: Box::new(original),
            modified: Box::new(modified),
        }
    }

    /// Resource this input renders; for comparisons, the right side
    #[must_use]
    pub fn resource(&self) -> &Resource {
        match self {
            Self::File { resource } | Self::Virtual { resource } => resource,
            Self::Diff { modified, .. } => modified.resource(),
        }
    }

    /// Ordinary file editor
    #[inline]
    #[must_use]
    pub fn is_file_editor(&self) -> bool {
        matches!(self, Self::File { .. })
    }
}

/// Scroll and cursor state of a text view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    /// Cursor line (1-based)
    pub line: u32,
    /// Cursor column (1-based)
    pub column: u32,
    /// First visible line
    pub scroll_top: u32,
}

/// Editor open request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorDescriptor {
    /// Input to render
    pub input: EditorInput,
    /// Keep the editor open instead of previewing it
    pub pinned: bool,
    /// Restore this view state
    pub view_state: Option<ViewState>,
}

impl EditorDescriptor {
    /// Create descriptor
    #[inline]
    #[must_use]
    pub fn new(input: EditorInput) -> Self {
        Self {
            input,
            pinned: false,
            view_state: None,
        }
    }

    /// Pin the editor
    #[inline]
    #[must_use]
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// With view state
    #[inline]
    #[must_use]
    pub fn with_view_state(mut self, view_state: Option<ViewState>) -> Self {
        self.view_state = view_state;
        self
    }
}

/// The focused editor view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEditor {
    /// Rendered input
    pub input: EditorInput,
    /// Group the view lives in
    pub group: GroupId,
    /// View state of the editable side
    pub view_state: Option<ViewState>,
}

/// Editor view service
#[async_trait::async_trait]
pub trait EditorService: Send + Sync {
    /// Currently focused editor view
    fn active_editor(&self) -> Option<ActiveEditor>;

    /// Open an editor in `group`
    async fn open_editor(&self, descriptor: EditorDescriptor, group: GroupId)
        -> Result<(), HostError>;

    /// Close the view rendering `input` in `group`
    async fn close_editor(&self, group: GroupId, input: &EditorInput) -> Result<(), HostError>;
}
