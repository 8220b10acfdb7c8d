//! Testing utilities for the saveguard workspace
//!
//! In-memory fakes for every host collaborator plus a [`Workbench`] that
//! wires them together around one shared [`FakeDisk`].

#![allow(missing_docs)]

mod disk;
mod editor;
mod model;
mod recorders;

pub use disk::{FakeDisk, Protection};
pub use editor::FakeEditorService;
pub use model::{FakeModelService, FakeTextModel};
pub use recorders::{
    FakeCommands, FakeContentRegistry, MemoryStateStore, RecordingContextKeys, RecordingNotifier,
    RecordingOpener, RecordingReporter,
};

use saveguard_host::{EditorInput, GroupId, Resource, TextFileModel, ViewState};
use std::sync::Arc;

/// All fakes, sharing one disk
pub struct Workbench<A> {
    pub disk: Arc<FakeDisk>,
    pub models: Arc<FakeModelService>,
    pub editors: Arc<FakeEditorService>,
    pub notifier: Arc<RecordingNotifier<A>>,
    pub state: Arc<MemoryStateStore>,
    pub context: Arc<RecordingContextKeys>,
    pub commands: Arc<FakeCommands>,
    pub registry: Arc<FakeContentRegistry>,
    pub opener: Arc<RecordingOpener>,
    pub reporter: Arc<RecordingReporter>,
}

impl<A: Clone> Workbench<A> {
    pub fn new() -> Self {
        let disk = Arc::new(FakeDisk::new());
        let models = Arc::new(FakeModelService::new(disk.clone()));
        Self {
            commands: Arc::new(FakeCommands::new(models.clone())),
            disk,
            models,
            editors: Arc::new(FakeEditorService::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            state: Arc::new(MemoryStateStore::new()),
            context: Arc::new(RecordingContextKeys::new()),
            registry: Arc::new(FakeContentRegistry::new()),
            opener: Arc::new(RecordingOpener::new()),
            reporter: Arc::new(RecordingReporter::new()),
        }
    }

    /// Create `path` on disk with `content` and open a model for it
    pub fn open_document(&self, path: &str, content: &str) -> (Resource, Arc<FakeTextModel>) {
        let resource = Resource::file(path);
        self.disk.write(&resource, content);
        let model = self.models.open(&resource);
        self.editors.set_active(EditorInput::file(resource.clone()), GroupId(1));
        (resource, model)
    }

    /// Open a document, edit it locally, then change it on disk
    ///
    /// # Panics
    /// If the local edit cannot be applied
    pub fn conflicted_document(
        &self,
        path: &str,
        base: &str,
        local: &str,
        disk: &str,
    ) -> (Resource, Arc<FakeTextModel>) {
        let (resource, model) = self.open_document(path, base);
        model.apply_content(local).expect("fresh model accepts edits");
        self.disk.write(&resource, disk);
        (resource, model)
    }

    /// Focus the comparison view for `resource`
    pub fn focus_comparison(&self, resource: &Resource, conflict_scheme: &str) {
        self.editors.set_active_with_view_state(
            EditorInput::diff(
                resource.basename(),
                EditorInput::Virtual {
                    resource: resource.with_scheme(conflict_scheme),
                },
                EditorInput::file(resource.clone()),
            ),
            GroupId(1),
            Some(ViewState {
                line: 1,
                column: 1,
                scroll_top: 0,
            }),
        );
    }
}

impl<A: Clone> Default for Workbench<A> {
    fn default() -> Self {
        Self::new()
    }
}
