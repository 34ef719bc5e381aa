//! End-to-end reconciliation against an on-disk store.
//!
//! Drives the reconciler through every inbound channel with mock sources
//! and checks what a reopened database sees afterwards.

use std::sync::Arc;
use std::time::Duration;

use stepquest_core::{
    ExportFormat, Listing, MockHistoricalSource, MockLiveSource, PaceStatus, Reconciler,
    RetryConfig, SourceError, SyncOutcome,
};
use stepquest_store::{GoalPreferences, StepStore, Store};
use stepquest_types::{DailySteps, YearlyGoal};
use tempfile::TempDir;
use time::Date;
use time::macros::date;

const TODAY: Date = date!(2024 - 03 - 15);

fn open(dir: &TempDir) -> Arc<Store> {
    Arc::new(Store::open(dir.path().join("steps.db")).unwrap())
}

fn week_of(steps: u64) -> Vec<DailySteps> {
    (0..=7)
        .map(|i| DailySteps::new(TODAY - time::Duration::days(i), steps))
        .collect()
}

#[tokio::test]
async fn test_full_day_of_reconciliation() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);

    let historical = Arc::new(MockHistoricalSource::with_days(week_of(6_000)));
    let live = Arc::new(MockLiveSource::new(2_500));
    let reconciler = Reconciler::new(store.clone(), store.clone())
        .with_historical(historical.clone())
        .with_live(live.clone());

    // Older data arrives by import first
    let csv = "date,steps\n2024-01-10,12000\n2024-03-14,1\nnot-a-date,500\n";
    let report = reconciler.import_csv(csv.as_bytes()).unwrap();
    assert_eq!(report.parsed, 2);
    assert_eq!(report.imported, 2);
    assert_eq!(report.rejected.len(), 1);

    // History overwrites the window, including the imported 2024-03-14
    let refresh = reconciler.refresh(TODAY).await.unwrap();
    assert_eq!(refresh.historical, SyncOutcome::Synced(8));
    assert!(matches!(refresh.live, SyncOutcome::Synced(r) if r.steps == 2_500));
    assert_eq!(refresh.snapshot.today.steps, 2_500);
    assert_eq!(refresh.snapshot.last7.steps, 6 * 6_000 + 2_500);

    // Walking more moves today's total, history left alone
    live.walk(1_000);
    reconciler.sync_today(TODAY).await.unwrap();

    drop(reconciler);
    drop(store);

    let reopened = open(&dir);
    assert_eq!(reopened.get(TODAY).unwrap().unwrap().steps, 3_500);
    assert_eq!(
        reopened.get(date!(2024 - 03 - 14)).unwrap().unwrap().steps,
        6_000
    );
    assert_eq!(
        reopened.get(date!(2024 - 01 - 10)).unwrap().unwrap().steps,
        12_000
    );
    assert_eq!(reopened.count().unwrap(), 9);
}

#[tokio::test]
async fn test_import_never_overwrites_synced_days() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let reconciler = Reconciler::new(store.clone(), store.clone())
        .with_historical(Arc::new(MockHistoricalSource::with_days(vec![
            DailySteps::new(date!(2024 - 03 - 10), 500),
            DailySteps::new(date!(2024 - 03 - 11), 0),
        ])));

    reconciler.sync_historical(TODAY).await.unwrap();

    let csv = "2024-03-10,999\n2024-03-11,750\n";
    let report = reconciler.import_csv(csv.as_bytes()).unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped_existing, 1);

    assert_eq!(store.get(date!(2024 - 03 - 10)).unwrap().unwrap().steps, 500);
    assert_eq!(store.get(date!(2024 - 03 - 11)).unwrap().unwrap().steps, 750);
}

#[tokio::test]
async fn test_unavailable_sources_leave_store_untouched() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    store.upsert(DailySteps::new(TODAY, 4_000)).unwrap();

    let historical = Arc::new(MockHistoricalSource::with_days(week_of(100)));
    historical
        .set_access_denied(Some(SourceError::PermissionDenied("health".into())))
        .await;
    let live = Arc::new(MockLiveSource::new(9_999));
    live.set_failure(Some(SourceError::unreachable("watch", "offline")))
        .await;

    let reconciler = Reconciler::new(store.clone(), store.clone())
        .with_historical(historical.clone())
        .with_live(live)
        .retry(RetryConfig::none());

    let refresh = reconciler.refresh(TODAY).await.unwrap();
    assert!(matches!(
        refresh.historical,
        SyncOutcome::SourceUnavailable(SourceError::PermissionDenied(_))
    ));
    assert!(matches!(
        refresh.live,
        SyncOutcome::SourceUnavailable(SourceError::Unreachable { .. })
    ));
    assert_eq!(historical.fetch_count(), 0);
    assert_eq!(refresh.snapshot.today.steps, 4_000);
    assert_eq!(store.count().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transient_history_failure_is_retried() {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let historical = Arc::new(MockHistoricalSource::with_days(week_of(1_000)));
    historical
        .fail_next(2, SourceError::timeout("fetch_days", Duration::from_secs(5)))
        .await;

    let reconciler = Reconciler::new(store.clone(), store.clone())
        .with_historical(historical.clone())
        .retry(RetryConfig::new(3).jitter(false));

    let outcome = reconciler.sync_historical(TODAY).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Synced(8));
    assert_eq!(historical.fetch_count(), 3);
}

#[tokio::test]
async fn test_goal_change_moves_pace_and_export() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let reconciler = Reconciler::new(store.clone(), store.clone());

    let mut out = Vec::new();
    assert_eq!(
        reconciler.export(ExportFormat::Csv, &mut out).unwrap(),
        Listing::Empty
    );
    assert!(out.is_empty());

    store.upsert(DailySteps::new(date!(2024 - 01 - 05), 90_000)).unwrap();
    store
        .set_yearly_goal(YearlyGoal::new(3_650_000).unwrap())
        .unwrap();
    let snap = reconciler.metrics().snapshot(date!(2024 - 01 - 10)).unwrap();
    assert_eq!(snap.pace_steps, -10_000);
    assert_eq!(snap.pace().status, PaceStatus::Behind);

    store.set_yearly_goal(YearlyGoal::new(365_000).unwrap()).unwrap();
    let snap = reconciler.metrics().snapshot(date!(2024 - 01 - 10)).unwrap();
    assert_eq!(snap.pace_steps, 80_000);
    assert_eq!(snap.pace().status, PaceStatus::Ahead);

    let written = reconciler.export(ExportFormat::Csv, &mut out).unwrap();
    assert_eq!(written, Listing::Items(1));
    assert_eq!(String::from_utf8(out).unwrap(), "date,steps\n2024-01-05,90000\n");
}
