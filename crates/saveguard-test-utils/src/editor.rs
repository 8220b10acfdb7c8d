use parking_lot::Mutex;
use saveguard_host::{
    ActiveEditor, EditorDescriptor, EditorInput, EditorService, GroupId, HostError, ViewState,
};
use std::sync::atomic::{AtomicBool, Ordering};

/// Editor service recording opens and closes
///
/// Opening an editor makes it the active one.
#[derive(Debug, Default)]
pub struct FakeEditorService {
    active: Mutex<Option<ActiveEditor>>,
    opened: Mutex<Vec<(EditorDescriptor, GroupId)>>,
    closed: Mutex<Vec<(GroupId, EditorInput)>>,
    fail_open: AtomicBool,
}

impl FakeEditorService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active(&self, input: EditorInput, group: GroupId) {
        self.set_active_with_view_state(input, group, None);
    }

    pub fn set_active_with_view_state(
        &self,
        input: EditorInput,
        group: GroupId,
        view_state: Option<ViewState>,
    ) {
        *self.active.lock() = Some(ActiveEditor {
            input,
            group,
            view_state,
        });
    }

    pub fn clear_active(&self) {
        *self.active.lock() = None;
    }

    pub fn opened(&self) -> Vec<(EditorDescriptor, GroupId)> {
        self.opened.lock().clone()
    }

    pub fn closed(&self) -> Vec<(GroupId, EditorInput)> {
        self.closed.lock().clone()
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl EditorService for FakeEditorService {
    fn active_editor(&self) -> Option<ActiveEditor> {
        self.active.lock().clone()
    }

    async fn open_editor(&self, descriptor: EditorDescriptor, group: GroupId) -> Result<(), HostError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(HostError::Editor("injected open failure".to_string()));
        }
        self.set_active_with_view_state(descriptor.input.clone(), group, descriptor.view_state);
        self.opened.lock().push((descriptor, group));
        Ok(())
    }

    async fn close_editor(&self, group: GroupId, input: &EditorInput) -> Result<(), HostError> {
        let mut active = self.active.lock();
        if active
            .as_ref()
            .is_some_and(|a| a.group == group && &a.input == input)
        {
            *active = None;
        }
        drop(active);
        self.closed.lock().push((group, input.clone()));
        Ok(())
    }
}
