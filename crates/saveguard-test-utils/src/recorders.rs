use parking_lot::Mutex;
use saveguard_host::{
    CommandService, ContentProvider, ContentProviderRegistry, ContextKeys, ErrorReporter,
    ExternalOpener, HostError, Notification, NotificationHandle, NotificationService, Resource,
    SaveError, SaveOptions, StateStore, TextFileModel,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::model::FakeModelService;

/// Key-value store kept in memory
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    values: Mutex<HashMap<String, bool>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get_bool(&self, key: &str) -> bool {
        self.values.lock().get(key).copied().unwrap_or(false)
    }

    fn store(&self, key: &str, value: bool) {
        self.values.lock().insert(key.to_string(), value);
    }
}

/// Context keys with readable values
#[derive(Debug, Default)]
pub struct RecordingContextKeys {
    values: Mutex<HashMap<String, bool>>,
}

impl RecordingContextKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<bool> {
        self.values.lock().get(key).copied()
    }
}

impl ContextKeys for RecordingContextKeys {
    fn set(&self, key: &str, value: bool) {
        self.values.lock().insert(key.to_string(), value);
    }
}

struct RecordedHandle {
    disposals: Arc<AtomicUsize>,
}

impl NotificationHandle for RecordedHandle {
    fn dispose(&self) {
        self.disposals.fetch_add(1, Ordering::SeqCst);
    }
}

/// Notification service keeping every notification, in order
pub struct RecordingNotifier<A> {
    shown: Mutex<Vec<(Notification<A>, Arc<AtomicUsize>)>>,
}

impl<A: Clone> RecordingNotifier<A> {
    pub fn new() -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn shown_count(&self) -> usize {
        self.shown.lock().len()
    }

    /// The `index`-th notification ever shown
    ///
    /// # Panics
    /// If fewer notifications were shown
    pub fn notification(&self, index: usize) -> Notification<A> {
        self.shown.lock()[index].0.clone()
    }

    pub fn dispose_count(&self, index: usize) -> usize {
        self.shown.lock()[index].1.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self, index: usize) -> bool {
        self.dispose_count(index) > 0
    }

    /// Notifications not yet disposed
    pub fn active(&self) -> Vec<Notification<A>> {
        self.shown
            .lock()
            .iter()
            .filter(|(_, d)| d.load(Ordering::SeqCst) == 0)
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn active_messages(&self) -> Vec<String> {
        self.active().into_iter().map(|n| n.message).collect()
    }
}

impl<A: Clone> Default for RecordingNotifier<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Clone + Send + Sync> NotificationService<A> for RecordingNotifier<A> {
    fn notify(&self, notification: Notification<A>) -> Box<dyn NotificationHandle> {
        let disposals = Arc::new(AtomicUsize::new(0));
        self.shown.lock().push((notification, disposals.clone()));
        Box::new(RecordedHandle { disposals })
    }
}

/// Unexpected-error channel keeping messages
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &(dyn std::error::Error + Send + Sync)) {
        self.reports.lock().push(error.to_string());
    }
}

/// External opener keeping URLs
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl ExternalOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<(), HostError> {
        self.opened.lock().push(url.to_string());
        Ok(())
    }
}

/// Content provider registry keyed by scheme
#[derive(Default)]
pub struct FakeContentRegistry {
    providers: Mutex<HashMap<String, Arc<dyn ContentProvider>>>,
}

impl FakeContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(&self, scheme: &str) -> Option<Arc<dyn ContentProvider>> {
        self.providers.lock().get(scheme).cloned()
    }
}

impl ContentProviderRegistry for FakeContentRegistry {
    fn register(&self, scheme: &str, provider: Arc<dyn ContentProvider>) -> Result<(), HostError> {
        let mut providers = self.providers.lock();
        if providers.contains_key(scheme) {
            return Err(HostError::SchemeTaken(scheme.to_string()));
        }
        providers.insert(scheme.to_string(), provider);
        Ok(())
    }
}

/// Commands routed to [`FakeModelService`] models
#[derive(Debug)]
pub struct FakeCommands {
    models: Arc<FakeModelService>,
    save_as: Mutex<Vec<Resource>>,
    fail_save_as: AtomicBool,
}

impl FakeCommands {
    pub fn new(models: Arc<FakeModelService>) -> Self {
        Self {
            models,
            save_as: Mutex::new(Vec::new()),
            fail_save_as: AtomicBool::new(false),
        }
    }

    pub fn save_as_requests(&self) -> Vec<Resource> {
        self.save_as.lock().clone()
    }

    pub fn fail_save_as(&self, fail: bool) {
        self.fail_save_as.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl CommandService for FakeCommands {
    async fn save(&self, resource: &Resource, options: SaveOptions) -> Result<(), SaveError> {
        match self.models.model(resource) {
            Some(model) => model.save(options).await,
            None => Err(SaveError::new(
                saveguard_host::FileOperationResult::NotFound,
                "no open model",
            )
            .with_options(options)),
        }
    }

    async fn save_as(&self, resource: &Resource) -> Result<(), HostError> {
        if self.fail_save_as.load(Ordering::SeqCst) {
            return Err(HostError::Command("save dialog failed".to_string()));
        }
        self.save_as.lock().push(resource.clone());
        Ok(())
    }

    async fn revert(&self, resource: &Resource) -> Result<(), HostError> {
        let model = self
            .models
            .model(resource)
            .ok_or_else(|| HostError::ModelUnavailable(resource.clone()))?;
        model.revert().await
    }
}
