//! Save error handler
//!
//! Entry point for the host. Owns the classifier, ledger, tracker, help
//! notices and orchestrator, and routes every failure either back into
//! classification (save failures) or to the unexpected-error channel.

use crate::action::{NoticeRef, RecoveryAction};
use crate::classifier::{Classification, ErrorClassifier, FailureKind};
use crate::config::RecoveryConfig;
use crate::error::RecoveryError;
use crate::ledger::{NotificationLedger, Notifier, PendingHelpNotices};
use crate::messages;
use crate::orchestrator::{RecoveryOrchestrator, ResolutionCommand};
use crate::provider::ConflictContentProvider;
use crate::suppression::SuppressionFlag;
use crate::tracker::ConflictViewTracker;
use dashmap::DashSet;
use saveguard_host::{
    CommandService, ContentProviderRegistry, ContextKeys, DiskReader, DocumentEvent,
    EditorDescriptor, EditorInput, EditorService, ErrorReporter, ExternalOpener, ModelService,
    Resource, SaveError, SaveOptions, StateStore,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Collaborators the handler is built from
#[derive(Clone)]
pub struct HostServices {
    pub models: Arc<dyn ModelService>,
    pub editors: Arc<dyn EditorService>,
    pub notifier: Notifier,
    pub state: Arc<dyn StateStore>,
    pub context: Arc<dyn ContextKeys>,
    pub commands: Arc<dyn CommandService>,
    pub providers: Arc<dyn ContentProviderRegistry>,
    pub disk: Arc<dyn DiskReader>,
    pub opener: Arc<dyn ExternalOpener>,
    pub reporter: Arc<dyn ErrorReporter>,
    /// Saved/reverted events of the document layer
    pub events: broadcast::Sender<DocumentEvent>,
}

impl fmt::Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}

/// How a recovery request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryOutcome {
    /// Finished successfully
    Completed,
    /// A previous request for the resource is still running
    AlreadyInFlight,
    /// A save failed and was classified again
    SaveFailed(FailureKind),
    /// Failed; surfaced on the unexpected-error channel
    Reported,
}

/// Removes the in-flight marker when dropped
struct InFlight<'a> {
    set: &'a DashSet<Resource>,
    resource: Resource,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.resource);
    }
}

/// Save-failure recovery facade
pub struct SaveErrorHandler {
    config: RecoveryConfig,
    editors: Arc<dyn EditorService>,
    commands: Arc<dyn CommandService>,
    opener: Arc<dyn ExternalOpener>,
    reporter: Arc<dyn ErrorReporter>,
    suppression: SuppressionFlag,
    classifier: ErrorClassifier,
    ledger: Arc<NotificationLedger>,
    help: Arc<PendingHelpNotices>,
    tracker: Arc<ConflictViewTracker>,
    orchestrator: RecoveryOrchestrator,
    in_flight: DashSet<Resource>,
    listener: JoinHandle<()>,
}

impl SaveErrorHandler {
    /// Create handler, register the conflict content provider and start
    /// clearing notifications on saved/reverted events
    ///
    /// The lifecycle subscription lives as long as the handler.
    ///
    /// # Errors
    /// - `RecoveryError::Config` if `config` is invalid
    /// - `RecoveryError::Registration` if the conflict scheme is taken
    ///
    /// # Panics
    /// If called outside a tokio runtime
    pub fn new(services: HostServices, config: RecoveryConfig) -> Result<Self, RecoveryError> {
        config
            .validate()
            .map_err(|e| RecoveryError::Config(e.to_string()))?;

        services
            .providers
            .register(
                &config.conflict_scheme,
                Arc::new(ConflictContentProvider::new(services.disk.clone())),
            )
            .map_err(RecoveryError::Registration)?;

        let suppression = SuppressionFlag::new(services.state.clone(), config.suppression_key.clone());
        let tracker = Arc::new(ConflictViewTracker::new(
            services.editors.clone(),
            services.context.clone(),
            config.context_key.clone(),
            config.conflict_scheme.clone(),
        ));
        let help = Arc::new(PendingHelpNotices::new(services.notifier.clone()));
        let orchestrator = RecoveryOrchestrator::new(
            services.models.clone(),
            services.editors.clone(),
            tracker.clone(),
            help.clone(),
        );
        tracker.refresh();

        let ledger = Arc::new(NotificationLedger::new(services.notifier));
        let listener = spawn_lifecycle_listener(Arc::clone(&ledger), services.events.subscribe());

        tracing::info!(scheme = %config.conflict_scheme, "Save error handler ready");

        Ok(Self {
            classifier: ErrorClassifier::new(suppression.clone()),
            ledger,
            editors: services.editors,
            commands: services.commands,
            opener: services.opener,
            reporter: services.reporter,
            suppression,
            help,
            tracker,
            orchestrator,
            in_flight: DashSet::new(),
            listener,
            config,
        })
    }

    /// Classify a failed save of `resource` and show the result
    pub fn on_save_error(&self, resource: &Resource, error: &SaveError) -> Classification {
        tracing::warn!(resource = %resource, error = %error, "Save failed");

        let session = self.tracker.session();
        let classification = self.classifier.classify(resource, error, session.as_ref());
        if let Some(presentation) = classification.presentation.clone() {
            self.ledger.present(resource, presentation);
        }
        classification
    }

    /// Re-evaluate the focused editor
    pub fn on_active_editor_changed(&self) {
        self.tracker.refresh();
    }

    /// Clear the notification of a saved or reverted document
    ///
    /// Events on [`HostServices::events`] are handled already; this is for
    /// events the host learns about some other way.
    pub fn on_document_event(&self, event: &DocumentEvent) {
        self.ledger.clear(event.resource());
    }

    /// Check whether the lifecycle subscription is still running
    #[inline]
    #[must_use]
    pub fn is_listening(&self) -> bool {
        !self.listener.is_finished()
    }

    /// Keep local edits and overwrite disk content
    pub async fn accept_local_changes(&self, resource: &Resource) -> RecoveryOutcome {
        self.resolve(ResolutionCommand::AcceptLocal, resource).await
    }

    /// Drop local edits and load disk content
    pub async fn revert_local_changes(&self, resource: &Resource) -> RecoveryOutcome {
        self.resolve(ResolutionCommand::RevertLocal, resource).await
    }

    async fn resolve(&self, command: ResolutionCommand, resource: &Resource) -> RecoveryOutcome {
        let Some(_guard) = self.begin(resource) else {
            return RecoveryOutcome::AlreadyInFlight;
        };
        tracing::info!(resource = %resource, %command, "Resolving save conflict");

        let outcome = match self.orchestrator.run(command, resource).await {
            Ok(()) => {
                self.ledger.clear(resource);
                tracing::info!(resource = %resource, %command, "Save conflict resolved");
                RecoveryOutcome::Completed
            }
            Err(e) => self.route_failure(resource, e),
        };
        self.tracker.refresh();
        outcome
    }

    /// Run a recovery action
    pub async fn run_action(&self, action: RecoveryAction) -> RecoveryOutcome {
        tracing::debug!(action = action.id(), "Running recovery action");

        match action {
            RecoveryAction::Retry { resource } => self.save(&resource, SaveOptions::new()).await,
            RecoveryAction::OverwriteReadonly { resource } => {
                self.save(&resource, SaveOptions::new().overwrite_readonly())
                    .await
            }
            RecoveryAction::SaveElevated {
                resource,
                overwrite_readonly,
            } => {
                let options = SaveOptions {
                    overwrite_readonly,
                    write_elevated: true,
                };
                match self.commands.save(&resource, options).await {
                    Ok(()) => {
                        self.ledger.clear(&resource);
                        RecoveryOutcome::Completed
                    }
                    Err(e) => self.route_failure(&resource, RecoveryError::ElevatedSave(e)),
                }
            }
            RecoveryAction::SaveAs { resource } => match self.commands.save_as(&resource).await {
                Ok(()) => RecoveryOutcome::Completed,
                Err(e) => self.route_failure(&resource, RecoveryError::Command(e)),
            },
            RecoveryAction::Discard { resource } => match self.commands.revert(&resource).await {
                Ok(()) => {
                    self.ledger.clear(&resource);
                    RecoveryOutcome::Completed
                }
                Err(e) => self.route_failure(&resource, RecoveryError::Command(e)),
            },
            RecoveryAction::ResolveConflict { resource } => self.open_comparison(&resource).await,
            RecoveryAction::LearnMore => match self.opener.open(&self.config.learn_more_url) {
                Ok(()) => RecoveryOutcome::Completed,
                Err(e) => {
                    let err = RecoveryError::Command(e);
                    self.reporter.report(&err);
                    RecoveryOutcome::Reported
                }
            },
            RecoveryAction::DontShowAgain { notice } => {
                self.suppression.set();
                match notice {
                    NoticeRef::Ledger(resource) => self.ledger.clear(&resource),
                    NoticeRef::Help(id) => self.help.dismiss(id),
                }
                RecoveryOutcome::Completed
            }
        }
    }

    async fn save(&self, resource: &Resource, options: SaveOptions) -> RecoveryOutcome {
        match self.commands.save(resource, options).await {
            Ok(()) => {
                self.ledger.clear(resource);
                RecoveryOutcome::Completed
            }
            Err(e) => self.route_failure(resource, RecoveryError::Save(e)),
        }
    }

    async fn open_comparison(&self, resource: &Resource) -> RecoveryOutcome {
        let Some(_guard) = self.begin(resource) else {
            return RecoveryOutcome::AlreadyInFlight;
        };

        let name = resource.basename();
        let input = EditorInput::diff(
            messages::compare_label(name, &self.config.product_name),
            EditorInput::Virtual {
                resource: resource.with_scheme(self.config.conflict_scheme.as_str()),
            },
            EditorInput::file(resource.clone()),
        );
        let group = self
            .editors
            .active_editor()
            .map(|e| e.group)
            .unwrap_or_default();

        if let Err(e) = self
            .editors
            .open_editor(EditorDescriptor::new(input).pinned(), group)
            .await
        {
            return self.route_failure(resource, RecoveryError::Editor(e));
        }
        self.tracker.refresh();

        if !self.suppression.is_set() {
            self.help.push(messages::CONFLICT_EDITOR_HELP, |id| {
                vec![
                    RecoveryAction::LearnMore,
                    RecoveryAction::DontShowAgain {
                        notice: NoticeRef::Help(id),
                    },
                ]
            });
        }
        RecoveryOutcome::Completed
    }

    fn route_failure(&self, resource: &Resource, error: RecoveryError) -> RecoveryOutcome {
        if let Some(save_error) = error.as_save_error() {
            let classification = self.on_save_error(resource, save_error);
            return RecoveryOutcome::SaveFailed(classification.kind);
        }
        tracing::warn!(resource = %resource, error = %error, "Recovery failed");
        self.reporter.report(&error);
        RecoveryOutcome::Reported
    }

    fn begin(&self, resource: &Resource) -> Option<InFlight<'_>> {
        if !self.in_flight.insert(resource.clone()) {
            tracing::debug!(resource = %resource, "Recovery already in flight");
            return None;
        }
        Some(InFlight {
            set: &self.in_flight,
            resource: resource.clone(),
        })
    }

    /// Notification ledger
    #[inline]
    #[must_use]
    pub fn ledger(&self) -> &NotificationLedger {
        &self.ledger
    }

    /// Pending help notices
    #[inline]
    #[must_use]
    pub fn help_notices(&self) -> &PendingHelpNotices {
        &self.help
    }

    /// Conflict view tracker
    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &ConflictViewTracker {
        &self.tracker
    }

    /// Suppression flag
    #[inline]
    #[must_use]
    pub fn suppression(&self) -> &SuppressionFlag {
        &self.suppression
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Check whether a recovery for `resource` is running
    #[inline]
    #[must_use]
    pub fn is_in_flight(&self, resource: &Resource) -> bool {
        self.in_flight.contains(resource)
    }
}

impl Drop for SaveErrorHandler {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Clear ledger entries for every saved/reverted event on `events`
///
/// The task ends when the channel closes.
fn spawn_lifecycle_listener(
    ledger: Arc<NotificationLedger>,
    mut events: broadcast::Receiver<DocumentEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => ledger.clear(event.resource()),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Lifecycle listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("Lifecycle listener stopped");
    })
}

impl fmt::Debug for SaveErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveErrorHandler")
            .field("config", &self.config)
            .field("ledger", &self.ledger)
            .field("tracker", &self.tracker)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFLICT_SCHEME;
    use saveguard_host::TextFileModel;
    use saveguard_test_utils::Workbench;

    fn services(bench: &Workbench<RecoveryAction>) -> HostServices {
        HostServices {
            models: bench.models.clone(),
            editors: bench.editors.clone(),
            notifier: bench.notifier.clone(),
            state: bench.state.clone(),
            context: bench.context.clone(),
            commands: bench.commands.clone(),
            providers: bench.registry.clone(),
            disk: bench.disk.clone(),
            opener: bench.opener.clone(),
            reporter: bench.reporter.clone(),
            events: bench.models.events(),
        }
    }

    #[tokio::test]
    async fn new_registers_conflict_provider() {
        let bench = Workbench::new();
        let _handler = SaveErrorHandler::new(services(&bench), RecoveryConfig::new()).unwrap();

        assert!(bench.registry.provider(DEFAULT_CONFLICT_SCHEME).is_some());
    }

    #[tokio::test]
    async fn new_rejects_taken_scheme() {
        let bench = Workbench::new();
        let _first = SaveErrorHandler::new(services(&bench), RecoveryConfig::new()).unwrap();

        let second = SaveErrorHandler::new(services(&bench), RecoveryConfig::new());
        assert!(matches!(second, Err(RecoveryError::Registration(_))));
    }

    #[tokio::test]
    async fn new_rejects_invalid_config() {
        let bench = Workbench::new();
        let config = RecoveryConfig::new().with_conflict_scheme("");

        let result = SaveErrorHandler::new(services(&bench), config);
        assert!(matches!(result, Err(RecoveryError::Config(_))));
        assert!(bench.registry.provider("").is_none());
    }

    #[tokio::test]
    async fn new_subscribes_to_lifecycle_events_once() {
        let bench = Workbench::new();
        let events = bench.models.events();
        let handler = SaveErrorHandler::new(services(&bench), RecoveryConfig::new()).unwrap();

        assert!(handler.is_listening());
        assert_eq!(events.receiver_count(), 1);
    }

    #[tokio::test]
    async fn dropping_handler_ends_subscription() {
        let bench = Workbench::new();
        let events = bench.models.events();
        let handler = SaveErrorHandler::new(services(&bench), RecoveryConfig::new()).unwrap();

        drop(handler);

        tokio::time::timeout(std::time::Duration::from_secs(1), async {
            while events.receiver_count() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("subscription released");
    }

    #[tokio::test]
    async fn second_invocation_while_in_flight_is_noop() {
        let bench = Workbench::new();
        let handler = SaveErrorHandler::new(services(&bench), RecoveryConfig::new()).unwrap();
        let (resource, model) = bench.conflicted_document("/w/a.txt", "base", "local", "disk");
        bench.focus_comparison(&resource, DEFAULT_CONFLICT_SCHEME);
        handler.on_active_editor_changed();

        let guard = handler.begin(&resource).unwrap();
        assert!(handler.is_in_flight(&resource));

        let outcome = handler.accept_local_changes(&resource).await;
        assert_eq!(outcome, RecoveryOutcome::AlreadyInFlight);
        assert_eq!(bench.models.acquisitions(), 0);
        assert_eq!(model.snapshot(), "local");

        drop(guard);
        assert!(!handler.is_in_flight(&resource));

        let outcome = handler.accept_local_changes(&resource).await;
        assert_eq!(outcome, RecoveryOutcome::Completed);
        assert!(!handler.is_in_flight(&resource));
    }

    #[tokio::test]
    async fn resolve_conflict_while_in_flight_is_noop() {
        let bench = Workbench::new();
        let handler = SaveErrorHandler::new(services(&bench), RecoveryConfig::new()).unwrap();
        let (resource, _model) = bench.conflicted_document("/w/a.txt", "base", "local", "disk");

        let _guard = handler.begin(&resource).unwrap();
        let outcome = handler
            .run_action(RecoveryAction::ResolveConflict {
                resource: resource.clone(),
            })
            .await;

        assert_eq!(outcome, RecoveryOutcome::AlreadyInFlight);
        assert!(bench.editors.opened().is_empty());
    }

    #[tokio::test]
    async fn other_resources_are_not_blocked() {
        let bench = Workbench::new();
        let handler = SaveErrorHandler::new(services(&bench), RecoveryConfig::new()).unwrap();
        let (busy, _) = bench.conflicted_document("/w/busy.txt", "base", "local", "disk");
        let (free, _) = bench.conflicted_document("/w/free.txt", "base", "local", "disk");
        bench.focus_comparison(&free, DEFAULT_CONFLICT_SCHEME);

        let _guard = handler.begin(&busy).unwrap();
        let outcome = handler.revert_local_changes(&free).await;

        assert_eq!(outcome, RecoveryOutcome::Completed);
    }

    #[tokio::test]
    async fn guard_released_after_failure() {
        let bench = Workbench::new();
        let handler = SaveErrorHandler::new(services(&bench), RecoveryConfig::new()).unwrap();
        let (resource, _model) = bench.conflicted_document("/w/a.txt", "base", "local", "disk");

        // Not on the comparison view
        let outcome = handler.accept_local_changes(&resource).await;

        assert_eq!(outcome, RecoveryOutcome::Reported);
        assert!(!handler.is_in_flight(&resource));
        assert_eq!(bench.reporter.reports().len(), 1);
    }
}
