//! Shared fixtures for handler integration tests

#![allow(dead_code)]

use saveguard_core::{Classification, HostServices, RecoveryAction, RecoveryConfig, SaveErrorHandler};
use saveguard_host::{CommandService, Resource, SaveOptions};
use saveguard_test_utils::Workbench;
use std::sync::Arc;

pub type Bench = Workbench<RecoveryAction>;

pub fn services(bench: &Bench) -> HostServices {
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

/// Fresh workbench plus a handler wired to it
pub fn setup() -> (Bench, Arc<SaveErrorHandler>) {
    let bench = Bench::new();
    let handler = SaveErrorHandler::new(services(&bench), RecoveryConfig::new())
        .expect("default config is valid");
    (bench, Arc::new(handler))
}

/// Save `resource` the way the host would, routing a failure to the handler
pub async fn host_save(
    bench: &Bench,
    handler: &SaveErrorHandler,
    resource: &Resource,
) -> Option<Classification> {
    match bench.commands.save(resource, SaveOptions::new()).await {
        Ok(()) => None,
        Err(e) => Some(handler.on_save_error(resource, &e)),
    }
}

/// Actions of the most recent notification
pub fn last_actions(bench: &Bench) -> Vec<RecoveryAction> {
    let count = bench.notifier.shown_count();
    assert!(count > 0, "no notification shown");
    bench.notifier.notification(count - 1).actions
}
