//! Saveguard Core - save-failure recovery
//!
//! Reacts to failed saves:
//! - Classifies the failure and picks a message and actions
//! - Keeps at most one failure notification per document
//! - Tracks whether the focused view compares a document with disk
//! - Resolves conflicts by accepting or reverting local changes
//!
//! # Example
//!
//! ```rust,ignore
//! use saveguard_core::{HostServices, RecoveryConfig, SaveErrorHandler};
//!
//! # async fn example(services: HostServices) -> Result<(), Box<dyn std::error::Error>> {
//! let handler = std::sync::Arc::new(SaveErrorHandler::new(services, RecoveryConfig::new())?);
//!
//! // On every failed save:
//! // handler.on_save_error(&resource, &error);
//! // From the comparison view:
//! // handler.accept_local_changes(&resource).await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod action;
pub mod classifier;
pub mod config;
pub mod error;
pub mod handler;
pub mod ledger;
pub mod messages;
pub mod orchestrator;
pub mod provider;
pub mod suppression;
pub mod tracker;

pub use action::{ActionKind, NoticeId, NoticeRef, RecoveryAction};
pub use classifier::{Classification, ConflictSession, ErrorClassifier, FailureKind, Presentation};
pub use config::{ConfigError, RecoveryConfig};
pub use error::RecoveryError;
pub use handler::{HostServices, RecoveryOutcome, SaveErrorHandler};
pub use ledger::{NotificationLedger, Notifier, PendingHelpNotices};
pub use orchestrator::{RecoveryOrchestrator, ResolutionCommand};
pub use provider::ConflictContentProvider;
pub use suppression::SuppressionFlag;
pub use tracker::ConflictViewTracker;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring the handler into a host
    pub use crate::{
        FailureKind, HostServices, RecoveryAction, RecoveryConfig, RecoveryOutcome,
        SaveErrorHandler,
    };
    pub use saveguard_host::{DocumentEvent, Resource, SaveError};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
