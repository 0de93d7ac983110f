use super::*;
use crate::rank::RankMatch;
use crate::types::{AiModeStatus, ScanStatus};

use std::collections::HashSet;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scanner whose outcomes are controlled by term: terms in `fail_terms`
/// error, everything else succeeds with a monotonically increasing organic
/// rank so successive scans of the same keyword are distinguishable.
#[derive(Default)]
struct FakeScanner {
    fail_terms: HashSet<String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    next_rank: AtomicI32,
    event_log: Mutex<Vec<String>>,
}

impl FakeScanner {
    fn failing(terms: &[&str]) -> Self {
        Self {
            fail_terms: terms.iter().map(|t| (*t).to_string()).collect(),
            next_rank: AtomicI32::new(1),
            ..Self::default()
        }
    }

    fn succeeding() -> Self {
        Self::failing(&[])
    }
}

impl KeywordScanner for FakeScanner {
    async fn scan_one(
        &self,
        keyword: &KeywordSpec,
        domain: &str,
    ) -> Result<KeywordSnapshot, ScanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.event_log
            .lock()
            .unwrap()
            .push(format!("start:{}", keyword.term));

        // Yield so every scan in the window registers before any finishes.
        tokio::time::sleep(Duration::from_millis(5)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.event_log
            .lock()
            .unwrap()
            .push(format!("end:{}", keyword.term));

        if self.fail_terms.contains(&keyword.term) {
            return Err(ScanError::AllSourcesFailed {
                keyword: keyword.term.clone(),
            });
        }

        let rank = self.next_rank.fetch_add(1, Ordering::SeqCst);
        Ok(KeywordSnapshot {
            keyword_id: keyword.id,
            term: keyword.term.clone(),
            domain: domain.to_string(),
            organic: RankMatch {
                cited: true,
                position: Some(rank),
                url: Some(format!("https://{domain}/{rank}")),
                title: None,
                snippet: None,
            },
            ai_overview: RankMatch::not_cited(),
            ai_mode: RankMatch::not_cited(),
            ai_mode_status: AiModeStatus::NotFound,
            ai_overview_text: None,
            screenshot_url: None,
            ai_mode_screenshot_url: None,
            status: ScanStatus::Scanned,
            scan_duration_ms: 5,
        })
    }
}

fn keywords(terms: &[&str]) -> Vec<KeywordSpec> {
    terms
        .iter()
        .enumerate()
        .map(|(i, term)| KeywordSpec {
            id: i64::try_from(i).unwrap() + 1,
            term: (*term).to_string(),
            location: "United States".to_string(),
        })
        .collect()
}

fn collect_progress(
    rx: &mut tokio::sync::mpsc::UnboundedReceiver<BatchProgress>,
) -> Vec<BatchProgress> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn publishes_one_progress_event_per_window() {
    let scanner = FakeScanner::succeeding();
    let scheduler = BatchScheduler::new(2, Duration::ZERO);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let input = keywords(&["a", "b", "c", "d", "e"]);
    let results = scheduler
        .run(&scanner, &input, "hypefresh.co", Some(&tx))
        .await;
    drop(tx);

    let events = collect_progress(&mut rx);
    // ceil(5 / 2) = 3 windows.
    assert_eq!(events.len(), 3);
    assert_eq!(
        events,
        vec![
            BatchProgress { completed: 2, total: 5 },
            BatchProgress { completed: 4, total: 5 },
            BatchProgress { completed: 5, total: 5 },
        ]
    );

    assert_eq!(results.len(), 5);
    let ids: HashSet<i64> = results.iter().map(|r| r.keyword_id).collect();
    assert_eq!(ids.len(), 5, "one entry per distinct keyword id");
}

#[tokio::test]
async fn windows_run_parallel_inside_sequential_outside() {
    let scanner = FakeScanner::succeeding();
    let scheduler = BatchScheduler::new(2, Duration::ZERO);

    let input = keywords(&["a", "b", "c"]);
    scheduler.run(&scanner, &input, "hypefresh.co", None).await;

    assert_eq!(scanner.max_in_flight.load(Ordering::SeqCst), 2);

    // The second window ("c") must not start until both "a" and "b" ended.
    let log = scanner.event_log.lock().unwrap();
    let start_c = log.iter().position(|e| e == "start:c").unwrap();
    let end_a = log.iter().position(|e| e == "end:a").unwrap();
    let end_b = log.iter().position(|e| e == "end:b").unwrap();
    assert!(start_c > end_a && start_c > end_b, "log was: {log:?}");
}

#[tokio::test]
async fn failed_keyword_becomes_placeholder_and_batch_continues() {
    let scanner = FakeScanner::failing(&["b"]);
    let scheduler = BatchScheduler::new(2, Duration::ZERO);

    let input = keywords(&["a", "b", "c"]);
    let results = scheduler.run(&scanner, &input, "hypefresh.co", None).await;

    assert_eq!(results.len(), 3);

    let failed = results.iter().find(|r| r.term == "b").unwrap();
    assert_eq!(failed.status, ScanStatus::Failed);
    assert!(!failed.organic.cited);
    assert!(failed.organic.position.is_none());
    assert!(!failed.ai_overview.cited);
    assert!(!failed.ai_mode.cited);
    assert_eq!(failed.scan_duration_ms, 0);
    assert_eq!(failed.keyword_id, 2, "keyword identity preserved");

    // Siblings and later windows were unaffected.
    assert!(results
        .iter()
        .filter(|r| r.term != "b")
        .all(|r| r.status == ScanStatus::Scanned));
}

#[tokio::test]
async fn rescanning_a_keyword_keeps_only_the_latest_result() {
    let scanner = FakeScanner::succeeding();
    let scheduler = BatchScheduler::new(1, Duration::ZERO);

    // Same keyword id appears twice in one run.
    let mut input = keywords(&["a"]);
    input.push(input[0].clone());

    let results = scheduler.run(&scanner, &input, "hypefresh.co", None).await;

    assert_eq!(results.len(), 1, "merge by keyword id leaves one entry");
    // The fake scanner hands out increasing ranks, so the surviving entry
    // must carry the second scan's rank.
    assert_eq!(results[0].organic.position, Some(2));
}

#[tokio::test]
async fn dropped_consumer_stops_scheduling_after_current_window() {
    let scanner = FakeScanner::succeeding();
    let scheduler = BatchScheduler::new(2, Duration::ZERO);
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    drop(rx);

    let input = keywords(&["a", "b", "c", "d", "e", "f"]);
    scheduler
        .run(&scanner, &input, "hypefresh.co", Some(&tx))
        .await;

    // Only the first window ran; nothing was scheduled afterwards.
    assert_eq!(scanner.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_batch_produces_no_events_and_no_results() {
    let scanner = FakeScanner::succeeding();
    let scheduler = BatchScheduler::new(3, Duration::ZERO);
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let results = scheduler.run(&scanner, &[], "hypefresh.co", Some(&tx)).await;
    drop(tx);

    assert!(results.is_empty());
    assert!(collect_progress(&mut rx).is_empty());
    assert_eq!(scanner.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn window_size_zero_is_clamped_to_one() {
    let scanner = FakeScanner::succeeding();
    let scheduler = BatchScheduler::new(0, Duration::ZERO);

    let input = keywords(&["a", "b"]);
    let results = scheduler.run(&scanner, &input, "hypefresh.co", None).await;

    assert_eq!(results.len(), 2);
    assert_eq!(scanner.max_in_flight.load(Ordering::SeqCst), 1);
}
