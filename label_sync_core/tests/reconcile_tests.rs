//! Reconciler behaviour against an in-memory tracker
//!
//! Covers outcome classification, idempotence, both failure policies,
//! cancellation, dry runs and explicit orphan deletion.

use label_sync_core::tracker::IssueTracker;
use label_sync_core::{
    Error, FailurePolicy, LabelOperation, LabelOutcome, ReconcileError, ReconcileOptions,
    Reconciler, TrackerError, load_remote_labels,
};
use label_sync_test_utils::{LabelSetBuilder, MockIssueTracker, TrackerCall, label_set};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn reconciler(tracker: &Arc<MockIssueTracker>, options: ReconcileOptions) -> Reconciler {
    Reconciler::new(tracker.clone() as Arc<dyn IssueTracker>, options)
}

fn fail_fast() -> ReconcileOptions {
    ReconcileOptions {
        failure_policy: FailurePolicy::FailFast,
        ..Default::default()
    }
}

fn dry_run() -> ReconcileOptions {
    ReconcileOptions {
        dry_run: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod classification_tests {
    use super::*;

    #[tokio::test]
    async fn test_verified_created_and_orphan() {
        let tracker = Arc::new(
            MockIssueTracker::new()
                .with_label("P0", "b60205")
                .with_label("stale", "ffffff"),
        );
        let desired = label_set(&[("P0", "b60205"), ("P1", "d93f0b")]);

        let report = reconciler(&tracker, ReconcileOptions::default())
            .run(&desired)
            .await
            .unwrap();

        assert_eq!(report.outcome("P0"), Some(&LabelOutcome::Verified));
        assert_eq!(report.outcome("P1"), Some(&LabelOutcome::Created));
        assert_eq!(report.orphans, vec!["stale".to_string()]);

        assert!(tracker.calls_for("P0").is_empty());
        assert_eq!(
            tracker.calls_for("P1"),
            vec![TrackerCall::Create {
                name: "P1".to_string(),
                color: "d93f0b".to_string()
            }]
        );
        assert!(tracker.calls_for("stale").is_empty());
    }

    #[tokio::test]
    async fn test_color_change_is_one_edit() {
        let tracker = Arc::new(MockIssueTracker::new().with_label("P0", "ffffff"));
        let desired = label_set(&[("P0", "b60205")]);

        let report = reconciler(&tracker, ReconcileOptions::default())
            .run(&desired)
            .await
            .unwrap();

        assert_eq!(
            report.outcome("P0"),
            Some(&LabelOutcome::Updated {
                previous: "ffffff".to_string()
            })
        );
        assert_eq!(
            tracker.mutation_calls(),
            vec![TrackerCall::Edit {
                name: "P0".to_string(),
                color: "b60205".to_string()
            }]
        );
        assert_eq!(tracker.labels().get("P0"), Some("b60205"));
    }

    #[tokio::test]
    async fn test_empty_remote_creates_everything() {
        let tracker = Arc::new(MockIssueTracker::new());
        let desired = label_set(&[("Task", "1d76db")]);

        let report = reconciler(&tracker, ReconcileOptions::default())
            .run(&desired)
            .await
            .unwrap();

        assert_eq!(report.outcome("Task"), Some(&LabelOutcome::Created));
        assert!(report.orphans.is_empty());
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_one_outcome_per_desired_label() {
        let tracker = Arc::new(
            MockIssueTracker::new()
                .with_label("P0", "b60205")
                .with_label("P2", "000000")
                .with_label("wontfix", "ffffff"),
        );
        let desired = LabelSetBuilder::builtin().build();

        let report = reconciler(&tracker, ReconcileOptions::default())
            .run(&desired)
            .await
            .unwrap();

        let names: Vec<&str> = report.results.iter().map(|r| r.name.as_str()).collect();
        let expected: Vec<&str> = desired.names().collect();
        assert_eq!(names, expected);

        let summary = report.summary();
        assert_eq!(summary.verified, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.created, desired.len() - 2);
        assert_eq!(summary.orphans, 1);
    }

    #[tokio::test]
    async fn test_duplicate_remote_names_last_seen_wins() {
        let tracker = Arc::new(
            MockIssueTracker::new()
                .with_label("bug", "ff0000")
                .with_label("bug", "00ff00"),
        );

        let remote = load_remote_labels(tracker.as_ref()).await.unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote.get("bug"), Some("00ff00"));
    }
}

#[cfg(test)]
mod idempotence_tests {
    use super::*;

    #[tokio::test]
    async fn test_second_run_verifies_everything_without_calls() {
        let tracker = Arc::new(
            MockIssueTracker::new()
                .with_label("P0", "ffffff")
                .with_label("stale", "ffffff"),
        );
        let desired = LabelSetBuilder::builtin().build();
        let reconciler = reconciler(&tracker, ReconcileOptions::default());

        let first = reconciler.run(&desired).await.unwrap();
        assert!(first.is_success());

        tracker.clear_calls();
        let second = reconciler.run(&desired).await.unwrap();

        assert!(
            second
                .results
                .iter()
                .all(|r| r.outcome == LabelOutcome::Verified)
        );
        assert!(tracker.mutation_calls().is_empty());
        assert_eq!(tracker.calls(), vec![TrackerCall::List]);
        assert_eq!(second.orphans, vec!["stale".to_string()]);
    }

    #[tokio::test]
    async fn test_lowercased_remote_color_is_verified() {
        // The built-in Epic color is declared in upper case
        let desired = LabelSetBuilder::builtin().build();
        assert_eq!(desired.get("Epic"), Some("3E4B9E"));

        let tracker = Arc::new(MockIssueTracker::new().with_label("Epic", "3e4b9e"));
        let report = reconciler(&tracker, ReconcileOptions::default())
            .run(&label_set(&[("Epic", "3E4B9E")]))
            .await
            .unwrap();

        assert_eq!(report.outcome("Epic"), Some(&LabelOutcome::Verified));
        assert!(tracker.mutation_calls().is_empty());
    }
}

#[cfg(test)]
mod failure_policy_tests {
    use super::*;

    fn failing_tracker() -> Arc<MockIssueTracker> {
        Arc::new(
            MockIssueTracker::new()
                .with_label("b", "ffffff")
                .with_failure("a", TrackerError::api(422, "Validation Failed")),
        )
    }

    fn desired() -> label_sync_core::LabelSet {
        label_set(&[("a", "111111"), ("b", "222222"), ("c", "333333")])
    }

    #[tokio::test]
    async fn test_continue_records_failure_and_proceeds() {
        let tracker = failing_tracker();

        let report = reconciler(&tracker, ReconcileOptions::default())
            .run(&desired())
            .await
            .unwrap();

        assert_eq!(
            report.outcome("a"),
            Some(&LabelOutcome::Failed {
                operation: LabelOperation::Create,
                error: TrackerError::api(422, "Validation Failed"),
            })
        );
        assert!(matches!(
            report.outcome("b"),
            Some(LabelOutcome::Updated { .. })
        ));
        assert_eq!(report.outcome("c"), Some(&LabelOutcome::Created));
        assert_eq!(tracker.mutation_calls().len(), 3);

        assert!(!report.is_success());
        assert_eq!(
            report.ensure_success(),
            Err(ReconcileError::Incomplete {
                failed: 1,
                skipped: 0
            })
        );
        let errors = report.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].label(), Some("a"));
    }

    #[tokio::test]
    async fn test_fail_fast_stops_issuing_calls() {
        let tracker = failing_tracker();

        let report = reconciler(&tracker, fail_fast())
            .run(&desired())
            .await
            .unwrap();

        assert!(report.outcome("a").unwrap().is_failed());
        assert_eq!(report.outcome("b"), Some(&LabelOutcome::Skipped));
        assert_eq!(report.outcome("c"), Some(&LabelOutcome::Skipped));
        assert_eq!(report.results.len(), 3);
        assert_eq!(tracker.mutation_calls().len(), 1);
        assert!(!report.cancelled);
        assert_eq!(
            report.ensure_success(),
            Err(ReconcileError::Incomplete {
                failed: 1,
                skipped: 2
            })
        );
    }

    #[tokio::test]
    async fn test_fail_fast_still_verifies_matching_labels() {
        let tracker = Arc::new(
            MockIssueTracker::new()
                .with_label("z", "000000")
                .with_failure("a", TrackerError::network("connection reset")),
        );
        let desired = label_set(&[("a", "111111"), ("z", "000000")]);

        let report = reconciler(&tracker, fail_fast()).run(&desired).await.unwrap();

        assert!(report.outcome("a").unwrap().is_failed());
        assert_eq!(report.outcome("z"), Some(&LabelOutcome::Verified));
    }

    #[tokio::test]
    async fn test_load_failure_aborts_before_decisions() {
        let tracker = Arc::new(
            MockIssueTracker::new().with_list_error(TrackerError::unauthorized("Bad credentials")),
        );

        let error = reconciler(&tracker, ReconcileOptions::default())
            .run(&label_set(&[("P0", "b60205")]))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            Error::Reconcile(ReconcileError::Load {
                source: TrackerError::Unauthorized { .. }
            })
        ));
        assert_eq!(tracker.calls(), vec![TrackerCall::List]);
    }
}

#[cfg(test)]
mod cancellation_tests {
    use super::*;

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let tracker = Arc::new(MockIssueTracker::new());
        let token = CancellationToken::new();
        token.cancel();

        let error = reconciler(&tracker, ReconcileOptions::default())
            .with_cancellation(token)
            .run(&label_set(&[("P0", "b60205")]))
            .await
            .unwrap_err();

        assert!(matches!(error, Error::Reconcile(ReconcileError::Cancelled)));
        assert!(tracker.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_run_skips_remaining_calls() {
        let token = CancellationToken::new();
        let hook_token = token.clone();
        let tracker = Arc::new(MockIssueTracker::new().on_first_mutation(move || hook_token.cancel()));
        let desired = label_set(&[("a", "111111"), ("b", "222222"), ("c", "333333")]);

        let report = reconciler(&tracker, ReconcileOptions::default())
            .with_cancellation(token)
            .run(&desired)
            .await
            .unwrap();

        assert_eq!(report.outcome("a"), Some(&LabelOutcome::Created));
        assert_eq!(report.outcome("b"), Some(&LabelOutcome::Skipped));
        assert_eq!(report.outcome("c"), Some(&LabelOutcome::Skipped));
        assert!(report.cancelled);
        assert_eq!(tracker.mutation_calls().len(), 1);
        // applied calls are kept
        assert_eq!(tracker.labels().get("a"), Some("111111"));
    }
}

#[cfg(test)]
mod dry_run_tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_issues_no_mutations() {
        let tracker = Arc::new(
            MockIssueTracker::new()
                .with_label("P0", "ffffff")
                .with_label("P1", "d93f0b")
                .with_label("stale", "ffffff"),
        );
        let desired = label_set(&[("P0", "b60205"), ("P1", "d93f0b"), ("P2", "e99695")]);
        let reconciler = reconciler(&tracker, dry_run());

        let report = reconciler.run(&desired).await.unwrap();

        assert!(report.dry_run);
        assert_eq!(
            report.outcome("P0"),
            Some(&LabelOutcome::WouldUpdate {
                previous: "ffffff".to_string()
            })
        );
        assert_eq!(report.outcome("P1"), Some(&LabelOutcome::Verified));
        assert_eq!(report.outcome("P2"), Some(&LabelOutcome::WouldCreate));

        let prune = reconciler.delete_orphans(&report).await;
        assert_eq!(prune.planned, vec!["stale".to_string()]);
        assert!(prune.deleted.is_empty());

        assert_eq!(tracker.calls(), vec![TrackerCall::List]);
    }
}

#[cfg(test)]
mod orphan_deletion_tests {
    use super::*;

    #[tokio::test]
    async fn test_reconcile_never_deletes() {
        let tracker = Arc::new(
            MockIssueTracker::new()
                .with_label("stale", "ffffff")
                .with_label("wontfix", "ffffff"),
        );

        let report = reconciler(&tracker, ReconcileOptions::default())
            .run(&LabelSetBuilder::builtin().build())
            .await
            .unwrap();

        assert_eq!(report.orphans.len(), 2);
        assert!(
            !tracker
                .calls()
                .iter()
                .any(|c| matches!(c, TrackerCall::Delete { .. }))
        );
        assert!(tracker.labels().contains("stale"));
    }

    #[tokio::test]
    async fn test_delete_orphans_removes_only_orphans() {
        let tracker = Arc::new(
            MockIssueTracker::new()
                .with_label("P0", "b60205")
                .with_label("stale", "ffffff")
                .with_label("wontfix", "ffffff"),
        );
        let reconciler = reconciler(&tracker, ReconcileOptions::default());

        let report = reconciler
            .run(&label_set(&[("P0", "b60205")]))
            .await
            .unwrap();
        let prune = reconciler.delete_orphans(&report).await;

        assert_eq!(
            prune.deleted,
            vec!["stale".to_string(), "wontfix".to_string()]
        );
        assert!(prune.is_success());
        assert_eq!(tracker.labels(), label_set(&[("P0", "b60205")]));
    }

    #[tokio::test]
    async fn test_delete_orphans_fail_fast() {
        let tracker = Arc::new(
            MockIssueTracker::new()
                .with_label("a-stale", "ffffff")
                .with_label("b-stale", "ffffff")
                .with_failure("a-stale", TrackerError::api(403, "Forbidden")),
        );
        let reconciler = reconciler(&tracker, fail_fast());

        let report = reconciler.run(&label_set(&[])).await.unwrap();
        let prune = reconciler.delete_orphans(&report).await;

        assert_eq!(prune.failed.len(), 1);
        assert_eq!(prune.skipped, vec!["b-stale".to_string()]);
        assert!(matches!(
            &prune.errors()[0],
            ReconcileError::Delete { label, .. } if label == "a-stale"
        ));
    }
}
