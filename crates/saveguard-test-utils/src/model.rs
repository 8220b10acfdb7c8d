use crate::disk::{FakeDisk, Protection};
use parking_lot::Mutex;
use saveguard_host::{
    DocumentEvent, FileOperationResult, HostError, ModelRef, ModelService, Resource, SaveError,
    SaveOptions, TextFileModel,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Default)]
struct ModelState {
    content: String,
    saved: String,
    base_version: u64,
    undo: Vec<String>,
    saves: usize,
    reverts: usize,
    fail_next_save: Option<FileOperationResult>,
    fail_next_revert: bool,
    fail_next_apply: bool,
}

/// Text model with an undo stack, backed by [`FakeDisk`]
#[derive(Debug)]
pub struct FakeTextModel {
    resource: Resource,
    disk: Arc<FakeDisk>,
    events: broadcast::Sender<DocumentEvent>,
    state: Mutex<ModelState>,
    disposed: AtomicBool,
}

impl FakeTextModel {
    fn load(resource: Resource, disk: Arc<FakeDisk>, events: broadcast::Sender<DocumentEvent>) -> Self {
        let content = disk.read_now(&resource).unwrap_or_default();
        let state = ModelState {
            saved: content.clone(),
            content,
            base_version: disk.version(&resource),
            ..ModelState::default()
        };
        Self {
            resource,
            disk,
            events,
            state: Mutex::new(state),
            disposed: AtomicBool::new(false),
        }
    }

    /// Make the next save fail with `result`
    pub fn fail_next_save(&self, result: FileOperationResult) {
        self.state.lock().fail_next_save = Some(result);
    }

    /// Make the next revert fail
    pub fn fail_next_revert(&self) {
        self.state.lock().fail_next_revert = true;
    }

    /// Make the next content edit fail
    pub fn fail_next_apply(&self) {
        self.state.lock().fail_next_apply = true;
    }

    /// Undo the last edit, returning the restored content
    pub fn undo(&self) -> Option<String> {
        let mut state = self.state.lock();
        let previous = state.undo.pop()?;
        state.content = previous.clone();
        Some(previous)
    }

    /// Undo stack, oldest first
    pub fn undo_history(&self) -> Vec<String> {
        self.state.lock().undo.clone()
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().saves
    }

    pub fn revert_count(&self) -> usize {
        self.state.lock().reverts
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    fn emit(&self, event: DocumentEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

#[async_trait::async_trait]
impl TextFileModel for FakeTextModel {
    fn resource(&self) -> Resource {
        self.resource.clone()
    }

    fn snapshot(&self) -> String {
        self.state.lock().content.clone()
    }

    fn apply_content(&self, content: &str) -> Result<(), HostError> {
        if self.is_disposed() {
            return Err(HostError::Disposed(self.resource.clone()));
        }
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_next_apply) {
            return Err(HostError::Editor("injected edit failure".to_string()));
        }
        if state.content != content {
            let previous = std::mem::replace(&mut state.content, content.to_string());
            state.undo.push(previous);
        }
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        let state = self.state.lock();
        state.content != state.saved
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    async fn revert(&self) -> Result<(), HostError> {
        {
            let mut state = self.state.lock();
            if std::mem::take(&mut state.fail_next_revert) {
                return Err(HostError::revert_failed(&self.resource, "injected revert failure"));
            }
            let disk_content = self
                .disk
                .read_now(&self.resource)
                .ok_or_else(|| HostError::revert_failed(&self.resource, "no such file"))?;
            if state.content != disk_content {
                let previous = std::mem::replace(&mut state.content, disk_content.clone());
                state.undo.push(previous);
            }
            state.saved = disk_content;
            state.base_version = self.disk.version(&self.resource);
            state.reverts += 1;
        }
        self.emit(DocumentEvent::Reverted(self.resource.clone()));
        Ok(())
    }

    async fn save(&self, options: SaveOptions) -> Result<(), SaveError> {
        let fail = |result, message: &str| Err(SaveError::new(result, message).with_options(options));
        {
            let mut state = self.state.lock();
            if self.is_disposed() {
                return fail(FileOperationResult::Other, "model disposed");
            }
            if let Some(result) = state.fail_next_save.take() {
                return fail(result, "injected save failure");
            }
            if self.disk.version(&self.resource) != state.base_version {
                return fail(FileOperationResult::ModifiedSince, "file modified since");
            }
            match self.disk.protection(&self.resource) {
                Protection::PermissionDenied if !options.write_elevated => {
                    return fail(FileOperationResult::PermissionDenied, "EACCES: permission denied");
                }
                Protection::ReadOnly if !options.overwrite_readonly && !options.write_elevated => {
                    return fail(FileOperationResult::ReadOnly, "EROFS: file is read-only");
                }
                Protection::ReadOnlyLocked if !options.write_elevated => {
                    return fail(FileOperationResult::ReadOnly, "EROFS: file is read-only");
                }
                _ => {}
            }
            let content = state.content.clone();
            state.base_version = self.disk.write(&self.resource, &content);
            state.saved = content;
            state.saves += 1;
        }
        self.emit(DocumentEvent::Saved(self.resource.clone()));
        Ok(())
    }
}

/// Model registry with reference counting
#[derive(Debug)]
pub struct FakeModelService {
    disk: Arc<FakeDisk>,
    events: broadcast::Sender<DocumentEvent>,
    models: Mutex<HashMap<Resource, Arc<FakeTextModel>>>,
    refs: Arc<Mutex<HashMap<Resource, usize>>>,
    acquisitions: AtomicUsize,
    fail_acquire: AtomicBool,
}

impl FakeModelService {
    pub fn new(disk: Arc<FakeDisk>) -> Self {
        let (events, _) = saveguard_host::events::channel(64);
        Self {
            disk,
            events,
            models: Mutex::new(HashMap::new()),
            refs: Arc::new(Mutex::new(HashMap::new())),
            acquisitions: AtomicUsize::new(0),
            fail_acquire: AtomicBool::new(false),
        }
    }

    /// Open (or return) the model for `resource`, loading disk content
    pub fn open(&self, resource: &Resource) -> Arc<FakeTextModel> {
        self.models
            .lock()
            .entry(resource.clone())
            .or_insert_with(|| {
                Arc::new(FakeTextModel::load(
                    resource.clone(),
                    self.disk.clone(),
                    self.events.clone(),
                ))
            })
            .clone()
    }

    pub fn model(&self, resource: &Resource) -> Option<Arc<FakeTextModel>> {
        self.models.lock().get(resource).cloned()
    }

    /// Lifecycle event sender shared by all models
    pub fn events(&self) -> broadcast::Sender<DocumentEvent> {
        self.events.clone()
    }

    /// Outstanding references for `resource`
    pub fn ref_count(&self, resource: &Resource) -> usize {
        self.refs.lock().get(resource).copied().unwrap_or(0)
    }

    /// Total successful acquisitions
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    pub fn fail_acquire(&self, fail: bool) {
        self.fail_acquire.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ModelService for FakeModelService {
    async fn acquire(&self, resource: &Resource) -> Result<ModelRef, HostError> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(HostError::ModelUnavailable(resource.clone()));
        }
        let model = self
            .model(resource)
            .ok_or_else(|| HostError::ModelUnavailable(resource.clone()))?;

        *self.refs.lock().entry(resource.clone()).or_insert(0) += 1;
        self.acquisitions.fetch_add(1, Ordering::SeqCst);

        let refs = Arc::clone(&self.refs);
        let key = resource.clone();
        Ok(ModelRef::new(model, move || {
            if let Some(count) = refs.lock().get_mut(&key) {
                *count = count.saturating_sub(1);
            }
        }))
    }
}
