//! Scripted scenarios
//!
//! Each scenario drives a [`SaveErrorHandler`] the way a user would: save,
//! read the notification, pick the first action, and so on.

use anyhow::{bail, Context, Result};
use saveguard_core::{HostServices, RecoveryAction, RecoveryConfig, RecoveryOutcome, SaveErrorHandler};
use saveguard_host::{CommandService, Resource, SaveOptions, TextFileModel};
use saveguard_test_utils::{Protection, Workbench};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Scenario names accepted on the command line
pub(crate) const NAMES: [&str; 5] = ["stale", "readonly", "permission", "accept", "revert"];

/// One observed step
#[derive(Debug, Serialize)]
pub(crate) struct Step {
    pub(crate) action: String,
    pub(crate) outcome: String,
    pub(crate) notifications: Vec<String>,
}

/// Result of one scenario
#[derive(Debug, Serialize)]
pub(crate) struct ScenarioReport {
    pub(crate) scenario: String,
    pub(crate) steps: Vec<Step>,
    pub(crate) document: String,
    pub(crate) disk: Option<String>,
    pub(crate) dirty: bool,
    pub(crate) unexpected_errors: Vec<String>,
    pub(crate) passed: bool,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario: {}", self.scenario)?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {}. {} -> {}", i + 1, step.action, step.outcome)?;
            for message in &step.notifications {
                writeln!(f, "       [notice] {message}")?;
            }
        }
        writeln!(f, "  Document: {:?} (dirty: {})", self.document, self.dirty)?;
        writeln!(f, "  Disk: {:?}", self.disk)?;
        for error in &self.unexpected_errors {
            writeln!(f, "  Unexpected error: {error}")?;
        }
        write!(f, "  Result: {}", if self.passed { "PASS" } else { "FAIL" })
    }
}

struct Session {
    bench: Workbench<RecoveryAction>,
    handler: Arc<SaveErrorHandler>,
    steps: Vec<Step>,
}

impl Session {
    fn new(config: &RecoveryConfig) -> Result<Self> {
        let bench = Workbench::new();
        let services = HostServices {
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
        };
        let handler = SaveErrorHandler::new(services, config.clone())
            .context("failed to create save error handler")?;
        Ok(Self {
            bench,
            handler: Arc::new(handler),
            steps: Vec::new(),
        })
    }

    fn record(&mut self, action: impl Into<String>, outcome: impl fmt::Debug) {
        self.steps.push(Step {
            action: action.into(),
            outcome: format!("{outcome:?}"),
            notifications: self.bench.notifier.active_messages(),
        });
    }

    async fn save(&mut self, resource: &Resource) {
        let outcome = match self.bench.commands.save(resource, SaveOptions::new()).await {
            Ok(()) => "saved".to_string(),
            Err(e) => format!("{:?}", self.handler.on_save_error(resource, &e).kind),
        };
        self.record("save", outcome);
    }

    /// Run the first action of the newest notification
    async fn pick_first(&mut self) -> Result<RecoveryOutcome> {
        let count = self.bench.notifier.shown_count();
        if count == 0 {
            bail!("no notification to act on");
        }
        let Some(action) = self.bench.notifier.notification(count - 1).actions.first().cloned() else {
            bail!("notification has no actions");
        };
        let label = action.label();
        let outcome = self.handler.run_action(action).await;
        self.record(label, outcome);
        Ok(outcome)
    }

    fn finish(self, scenario: &str, resource: &Resource, passed: impl FnOnce(&Self) -> bool) -> Result<ScenarioReport> {
        let model = self
            .bench
            .models
            .model(resource)
            .context("scenario document not open")?;
        let passed = passed(&self);
        Ok(ScenarioReport {
            scenario: scenario.to_string(),
            document: model.snapshot(),
            disk: self.bench.disk.read_now(resource),
            dirty: model.is_dirty(),
            unexpected_errors: self.bench.reporter.reports(),
            steps: self.steps,
            passed,
        })
    }
}

/// Run scenario `name`
pub(crate) async fn run(name: &str, config: &RecoveryConfig) -> Result<ScenarioReport> {
    tracing::info!(scenario = name, "Running scenario");
    match name {
        "stale" => stale(config).await,
        "readonly" => readonly(config).await,
        "permission" => permission(config).await,
        "accept" => resolve(config, true).await,
        "revert" => resolve(config, false).await,
        other => bail!("unknown scenario '{other}'"),
    }
}

async fn stale(config: &RecoveryConfig) -> Result<ScenarioReport> {
    let mut session = Session::new(config)?;
    let (resource, _) = session
        .bench
        .conflicted_document("/workspace/notes.md", "draft", "local edit", "remote edit");

    session.save(&resource).await;

    let handler = Arc::clone(&session.handler);
    session.finish("stale", &resource, |s| {
        handler.ledger().contains(&resource) && s.bench.notifier.shown_count() == 1
    })
}

async fn readonly(config: &RecoveryConfig) -> Result<ScenarioReport> {
    let mut session = Session::new(config)?;
    let (resource, model) = session.bench.open_document("/workspace/locked.cfg", "a = 1");
    session.bench.disk.set_protection(&resource, Protection::ReadOnly);
    model.apply_content("a = 2")?;

    session.save(&resource).await;
    let outcome = session.pick_first().await?;

    session.finish("readonly", &resource, |s| {
        outcome == RecoveryOutcome::Completed && s.bench.notifier.active().is_empty()
    })
}

async fn permission(config: &RecoveryConfig) -> Result<ScenarioReport> {
    let mut session = Session::new(config)?;
    let (resource, model) = session.bench.open_document("/etc/hosts", "127.0.0.1 localhost");
    session.bench.disk.set_protection(&resource, Protection::PermissionDenied);
    model.apply_content("127.0.0.1 localhost saveguard")?;

    session.save(&resource).await;
    let outcome = session.pick_first().await?;

    session.finish("permission", &resource, |s| {
        outcome == RecoveryOutcome::Completed && !s.bench.disk.read_now(&resource).unwrap_or_default().is_empty()
    })
}

async fn resolve(config: &RecoveryConfig, accept: bool) -> Result<ScenarioReport> {
    let mut session = Session::new(config)?;
    let (resource, _) = session
        .bench
        .conflicted_document("/workspace/notes.md", "draft", "local edit", "remote edit");

    session.save(&resource).await;
    session.pick_first().await?;

    let (label, outcome) = if accept {
        ("accept local changes", session.handler.accept_local_changes(&resource).await)
    } else {
        ("revert local changes", session.handler.revert_local_changes(&resource).await)
    };
    session.record(label, outcome);

    let expected = if accept { "local edit" } else { "remote edit" };
    let scenario = if accept { "accept" } else { "revert" };
    session.finish(scenario, &resource, |s| {
        outcome == RecoveryOutcome::Completed
            && s.bench.disk.read_now(&resource).as_deref() == Some(expected)
            && s.bench.models.ref_count(&resource) == 0
    })
}
