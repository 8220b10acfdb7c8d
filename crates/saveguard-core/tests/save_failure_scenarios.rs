//! Save failures as the user sees them: message, actions, and what each
//! action does to the document and the notification.

mod common;

use common::{host_save, last_actions, setup};
use pretty_assertions::assert_eq;
use saveguard_core::config::DEFAULT_LEARN_MORE_URL;
use saveguard_core::{FailureKind, RecoveryAction, RecoveryOutcome, SaveErrorHandler};
use saveguard_host::{
    CommandService, DocumentEvent, FileOperationResult, Resource, Severity, TextFileModel,
};
use saveguard_test_utils::Protection;
use std::time::Duration;

#[tokio::test]
async fn stale_write_offers_only_resolve_conflict() {
    let (bench, handler) = setup();
    let (resource, _model) = bench.conflicted_document("/work/notes.txt", "A", "B", "C");

    let classification = host_save(&bench, &handler, &resource).await.unwrap();

    assert_eq!(classification.kind, FailureKind::StaleWrite);
    let shown = bench.notifier.notification(0);
    assert_eq!(shown.severity, Severity::Error);
    assert_eq!(
        shown.message,
        "Failed to save 'notes.txt': The content on disk is newer. Please compare your version with the one on disk."
    );
    assert_eq!(
        shown.actions,
        vec![RecoveryAction::ResolveConflict {
            resource: resource.clone()
        }]
    );
    assert!(handler.ledger().contains(&resource));
}

#[tokio::test]
async fn readonly_offers_overwrite_then_save_as_then_discard() {
    let (bench, handler) = setup();
    let (resource, model) = bench.open_document("/work/locked.txt", "old");
    bench.disk.set_protection(&resource, Protection::ReadOnly);
    model.apply_content("new").unwrap();

    let classification = host_save(&bench, &handler, &resource).await.unwrap();

    assert_eq!(classification.kind, FailureKind::ReadOnly);
    let shown = bench.notifier.notification(0);
    assert!(shown.message.contains("write protected"));
    assert_eq!(
        shown.actions,
        vec![
            RecoveryAction::OverwriteReadonly {
                resource: resource.clone()
            },
            RecoveryAction::SaveAs {
                resource: resource.clone()
            },
            RecoveryAction::Discard {
                resource: resource.clone()
            },
        ]
    );
}

#[tokio::test]
async fn overwrite_readonly_saves_and_clears_notification() {
    let (bench, handler) = setup();
    let (resource, model) = bench.open_document("/work/locked.txt", "old");
    bench.disk.set_protection(&resource, Protection::ReadOnly);
    model.apply_content("new").unwrap();
    host_save(&bench, &handler, &resource).await.unwrap();

    let primary = last_actions(&bench).remove(0);
    let outcome = handler.run_action(primary).await;

    assert_eq!(outcome, RecoveryOutcome::Completed);
    assert_eq!(bench.disk.read_now(&resource).as_deref(), Some("new"));
    assert!(!model.is_dirty());
    assert!(!handler.ledger().contains(&resource));
    assert!(bench.notifier.is_disposed(0));
}

#[tokio::test]
async fn failed_overwrite_escalates_to_elevated_save() {
    let (bench, handler) = setup();
    let (resource, model) = bench.open_document("/work/system.conf", "old");
    bench.disk.set_protection(&resource, Protection::ReadOnlyLocked);
    model.apply_content("new").unwrap();
    host_save(&bench, &handler, &resource).await.unwrap();

    let outcome = handler.run_action(last_actions(&bench).remove(0)).await;
    assert_eq!(
        outcome,
        RecoveryOutcome::SaveFailed(FailureKind::ReadOnlyElevationAttempted)
    );

    // One live notification, replaced rather than stacked
    assert_eq!(bench.notifier.shown_count(), 2);
    assert!(bench.notifier.is_disposed(0));
    assert_eq!(bench.notifier.active().len(), 1);

    let elevated = last_actions(&bench).remove(0);
    assert_eq!(
        elevated,
        RecoveryAction::SaveElevated {
            resource: resource.clone(),
            overwrite_readonly: true
        }
    );

    let outcome = handler.run_action(elevated).await;
    assert_eq!(outcome, RecoveryOutcome::Completed);
    assert_eq!(bench.disk.read_now(&resource).as_deref(), Some("new"));
    assert!(handler.ledger().is_empty());
}

#[tokio::test]
async fn permission_denied_offers_elevated_save() {
    let (bench, handler) = setup();
    let (resource, model) = bench.open_document("/etc/hosts", "old");
    bench.disk.set_protection(&resource, Protection::PermissionDenied);
    model.apply_content("new").unwrap();

    let classification = host_save(&bench, &handler, &resource).await.unwrap();

    assert_eq!(classification.kind, FailureKind::PermissionDenied);
    let shown = bench.notifier.notification(0);
    assert!(shown.message.contains("Insufficient permissions"));
    assert_eq!(
        shown.actions[0],
        RecoveryAction::SaveElevated {
            resource: resource.clone(),
            overwrite_readonly: false
        }
    );
}

#[tokio::test]
async fn elevated_save_failure_goes_to_reporter() {
    let (bench, handler) = setup();
    let (resource, model) = bench.open_document("/etc/hosts", "old");
    model.apply_content("new").unwrap();
    model.fail_next_save(FileOperationResult::PermissionDenied);

    let outcome = handler
        .run_action(RecoveryAction::SaveElevated {
            resource: resource.clone(),
            overwrite_readonly: false,
        })
        .await;

    assert_eq!(outcome, RecoveryOutcome::Reported);
    assert_eq!(bench.reporter.reports().len(), 1);
    assert_eq!(bench.notifier.shown_count(), 0);
}

#[tokio::test]
async fn generic_failure_retry_reclassifies() {
    let (bench, handler) = setup();
    let (resource, model) = bench.open_document("/work/big.bin", "x");
    model.apply_content("y").unwrap();
    model.fail_next_save(FileOperationResult::TooLarge);

    let classification = host_save(&bench, &handler, &resource).await.unwrap();
    assert_eq!(classification.kind, FailureKind::Generic);
    assert!(bench.notifier.notification(0).message.starts_with("Failed to save 'big.bin': "));

    model.fail_next_save(FileOperationResult::Other);
    let outcome = handler.run_action(last_actions(&bench).remove(0)).await;
    assert_eq!(outcome, RecoveryOutcome::SaveFailed(FailureKind::Generic));

    let outcome = handler.run_action(last_actions(&bench).remove(0)).await;
    assert_eq!(outcome, RecoveryOutcome::Completed);
    assert!(handler.ledger().is_empty());
}

#[tokio::test]
async fn discard_twice_matches_once() {
    let (bench, handler) = setup();
    let (resource, model) = bench.conflicted_document("/work/notes.txt", "A", "B", "C");
    host_save(&bench, &handler, &resource).await.unwrap();

    let discard = RecoveryAction::Discard {
        resource: resource.clone(),
    };
    assert_eq!(handler.run_action(discard.clone()).await, RecoveryOutcome::Completed);
    let after_once = (model.snapshot(), model.is_dirty());

    assert_eq!(handler.run_action(discard).await, RecoveryOutcome::Completed);

    assert_eq!((model.snapshot(), model.is_dirty()), after_once);
    assert_eq!(after_once, ("C".to_string(), false));
    assert_eq!(model.revert_count(), 2);
    assert_eq!(model.undo_history(), vec!["A".to_string(), "B".to_string()]);
    assert!(handler.ledger().is_empty());
    assert_eq!(bench.notifier.dispose_count(0), 1);
}

#[tokio::test]
async fn save_as_delegates_and_reports_failures() {
    let (bench, handler) = setup();
    let (resource, _model) = bench.open_document("/work/a.txt", "x");
    let action = RecoveryAction::SaveAs {
        resource: resource.clone(),
    };

    assert_eq!(handler.run_action(action.clone()).await, RecoveryOutcome::Completed);
    assert_eq!(bench.commands.save_as_requests(), vec![resource.clone()]);

    bench.commands.fail_save_as(true);
    assert_eq!(handler.run_action(action).await, RecoveryOutcome::Reported);
    assert_eq!(bench.reporter.reports().len(), 1);
}

#[tokio::test]
async fn learn_more_opens_documentation() {
    let (bench, handler) = setup();

    let outcome = handler.run_action(RecoveryAction::LearnMore).await;

    assert_eq!(outcome, RecoveryOutcome::Completed);
    assert_eq!(bench.opener.opened(), vec![DEFAULT_LEARN_MORE_URL.to_string()]);
}

async fn wait_until_cleared(handler: &SaveErrorHandler, resource: &Resource) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while handler.ledger().contains(resource) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("ledger cleared by lifecycle event");
}

#[tokio::test]
async fn successful_save_elsewhere_clears_notification() {
    let (bench, handler) = setup();
    let (resource, model) = bench.open_document("/work/locked.txt", "old");
    bench.disk.set_protection(&resource, Protection::ReadOnly);
    model.apply_content("new").unwrap();
    host_save(&bench, &handler, &resource).await.unwrap();
    assert!(handler.ledger().contains(&resource));

    // Fixed outside the recovery actions
    bench.disk.set_protection(&resource, Protection::None);
    assert!(host_save(&bench, &handler, &resource).await.is_none());

    wait_until_cleared(&handler, &resource).await;
    assert!(bench.notifier.is_disposed(0));
    assert_eq!(bench.notifier.dispose_count(0), 1);
}

#[tokio::test]
async fn revert_elsewhere_clears_notification() {
    let (bench, handler) = setup();
    let (resource, model) = bench.conflicted_document("/work/notes.txt", "A", "B", "C");
    host_save(&bench, &handler, &resource).await.unwrap();

    bench.commands.revert(&resource).await.unwrap();

    wait_until_cleared(&handler, &resource).await;
    assert_eq!(model.revert_count(), 1);
    assert_eq!(model.snapshot(), "C");
}

#[tokio::test]
async fn events_for_other_documents_keep_notification() {
    let (bench, handler) = setup();
    let (failing, model) = bench.open_document("/work/locked.txt", "old");
    let (other, _) = bench.open_document("/work/other.txt", "x");
    bench.disk.set_protection(&failing, Protection::ReadOnly);
    model.apply_content("new").unwrap();
    host_save(&bench, &handler, &failing).await.unwrap();

    bench.commands.revert(&other).await.unwrap();
    bench.models.events().send(DocumentEvent::Saved(other)).unwrap();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }

    assert!(handler.ledger().contains(&failing));
}
