//! Saveguard Host - collaborator contracts
//!
//! The save-failure recovery component never talks to an editor directly.
//! Everything it needs from the surrounding application is described here:
//!
//! - **Resources**: `scheme://path` identifiers ([`Resource`])
//! - **Models**: reference-counted editable documents ([`ModelService`])
//! - **Editors**: active view, open/close ([`EditorService`])
//! - **Notifications**: show/dispose ([`NotificationService`])
//! - **Storage, context flags, commands, content providers**
//! - **Lifecycle events**: saved/reverted broadcasts ([`DocumentEvent`])

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod editor;
pub mod error;
pub mod events;
pub mod model;
pub mod notification;
pub mod resource;
pub mod services;

pub use editor::{ActiveEditor, EditorDescriptor, EditorInput, EditorService, GroupId, ViewState};
pub use error::{FileOperationResult, HostError, SaveError, SaveOptions};
pub use events::DocumentEvent;
pub use model::{ModelRef, ModelService, TextFileModel};
pub use notification::{Notification, NotificationHandle, NotificationService, Severity};
pub use resource::{Resource, ResourceError, FILE_SCHEME};
pub use services::{
    CommandService, ContentProvider, ContentProviderRegistry, ContextKeys, DiskReader,
    ErrorReporter, ExternalOpener, StateStore,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
