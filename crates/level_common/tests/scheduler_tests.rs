//! Debounce tests for the update scheduler, run on a paused tokio clock.

use async_trait::async_trait;
use level_common::{
    ChangeEvent, LevelError, LevelUp, ProgressState, Recompute, RecomputeOutcome, UpdateScheduler,
};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration, Instant};

const QUIET: Duration = Duration::from_millis(500);

/// Records when each recompute happened
#[derive(Default)]
struct Recorder {
    calls: Vec<Instant>,
    level_up_on: Option<usize>,
    fail_on: Option<usize>,
}

#[async_trait]
impl Recompute for Recorder {
    async fn recompute(&mut self) -> level_common::Result<RecomputeOutcome> {
        self.calls.push(Instant::now());
        let n = self.calls.len();
        if self.fail_on == Some(n) {
            return Err(LevelError::Source("scan failed".to_string()));
        }
        Ok(RecomputeOutcome {
            state: ProgressState::default(),
            level_up: (self.level_up_on == Some(n)).then_some(LevelUp { from: 1, to: 2 }),
            skipped: 0,
        })
    }
}

fn assert_near(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(10),
        "expected ~{:?}, got {:?}",
        expected,
        actual
    );
}

#[tokio::test(start_paused = true)]
async fn test_burst_collapses_into_one_recompute() {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = UpdateScheduler::new(QUIET, "md");
    let mut recorder = Recorder::default();
    let start = Instant::now();

    let feeder = async move {
        for i in 0..5 {
            tx.send(ChangeEvent::modified(format!("note-{i}.md"))).unwrap();
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_secs(2)).await;
        drop(tx);
    };

    let (fired, ()) = tokio::join!(scheduler.run(rx, &mut recorder, None), feeder);

    assert_eq!(fired, 1);
    assert_eq!(recorder.calls.len(), 1);
    // last event at 400ms, quiet period 500ms
    assert_near(recorder.calls[0] - start, Duration::from_millis(900));
}

#[tokio::test(start_paused = true)]
async fn test_separated_bursts_recompute_separately() {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = UpdateScheduler::new(QUIET, "md");
    let mut recorder = Recorder::default();
    let start = Instant::now();

    let feeder = async move {
        tx.send(ChangeEvent::created("a.md")).unwrap();
        tx.send(ChangeEvent::modified("a.md")).unwrap();
        sleep(Duration::from_secs(1)).await;
        tx.send(ChangeEvent::deleted("a.md")).unwrap();
        sleep(Duration::from_secs(1)).await;
        drop(tx);
    };

    let (fired, ()) = tokio::join!(scheduler.run(rx, &mut recorder, None), feeder);

    assert_eq!(fired, 2);
    assert_near(recorder.calls[0] - start, Duration::from_millis(500));
    assert_near(recorder.calls[1] - start, Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn test_untracked_files_are_ignored() {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = UpdateScheduler::new(QUIET, "md");
    let mut recorder = Recorder::default();

    let feeder = async move {
        tx.send(ChangeEvent::modified("image.png")).unwrap();
        tx.send(ChangeEvent::created("data.json")).unwrap();
        tx.send(ChangeEvent::renamed("a.txt", "b.txt")).unwrap();
        sleep(Duration::from_secs(2)).await;
        drop(tx);
    };

    let (fired, ()) = tokio::join!(scheduler.run(rx, &mut recorder, None), feeder);
    assert_eq!(fired, 0);
    assert!(recorder.calls.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_untracked_event_does_not_extend_window() {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = UpdateScheduler::new(QUIET, "md");
    let mut recorder = Recorder::default();
    let start = Instant::now();

    let feeder = async move {
        tx.send(ChangeEvent::modified("a.md")).unwrap();
        sleep(Duration::from_millis(300)).await;
        tx.send(ChangeEvent::modified("cover.png")).unwrap();
        sleep(Duration::from_secs(2)).await;
        drop(tx);
    };

    tokio::join!(scheduler.run(rx, &mut recorder, None), feeder);
    assert_eq!(recorder.calls.len(), 1);
    assert_near(recorder.calls[0] - start, Duration::from_millis(500));
}

#[tokio::test(start_paused = true)]
async fn test_pending_update_runs_when_feed_closes() {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = UpdateScheduler::new(QUIET, "md");
    let mut recorder = Recorder::default();

    tx.send(ChangeEvent::modified("a.md")).unwrap();
    drop(tx);

    let fired = scheduler.run(rx, &mut recorder, None).await;
    assert_eq!(fired, 1);
    assert_eq!(recorder.calls.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_level_ups_are_forwarded() {
    let (tx, rx) = mpsc::unbounded_channel();
    let (up_tx, mut up_rx) = mpsc::unbounded_channel();
    let scheduler = UpdateScheduler::new(QUIET, "md");
    let mut recorder = Recorder {
        level_up_on: Some(2),
        ..Default::default()
    };

    let feeder = async move {
        for _ in 0..3 {
            tx.send(ChangeEvent::modified("a.md")).unwrap();
            sleep(Duration::from_secs(1)).await;
        }
        drop(tx);
    };

    let (fired, ()) = tokio::join!(scheduler.run(rx, &mut recorder, Some(&up_tx)), feeder);
    drop(up_tx);

    assert_eq!(fired, 3);
    assert_eq!(up_rx.recv().await, Some(LevelUp { from: 1, to: 2 }));
    assert_eq!(up_rx.recv().await, None);
}

#[tokio::test(start_paused = true)]
async fn test_failed_recompute_does_not_stop_scheduler() {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = UpdateScheduler::new(QUIET, "md");
    let mut recorder = Recorder {
        fail_on: Some(1),
        ..Default::default()
    };

    let feeder = async move {
        tx.send(ChangeEvent::modified("a.md")).unwrap();
        sleep(Duration::from_secs(1)).await;
        tx.send(ChangeEvent::modified("a.md")).unwrap();
        sleep(Duration::from_secs(1)).await;
        drop(tx);
    };

    let (fired, ()) = tokio::join!(scheduler.run(rx, &mut recorder, None), feeder);
    assert_eq!(fired, 2);
    assert_eq!(recorder.calls.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_folder_removal_triggers_recompute() {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = UpdateScheduler::new(QUIET, "md");
    let mut recorder = Recorder::default();
    let start = Instant::now();

    let feeder = async move {
        tx.send(ChangeEvent::deleted("/vault/projects")).unwrap();
        sleep(Duration::from_secs(1)).await;
        tx.send(ChangeEvent::renamed("/vault/drafts", "/vault/archive")).unwrap();
        sleep(Duration::from_secs(1)).await;
        drop(tx);
    };

    let (fired, ()) = tokio::join!(scheduler.run(rx, &mut recorder, None), feeder);
    assert_eq!(fired, 2);
    assert_near(recorder.calls[0] - start, Duration::from_millis(500));
    assert_near(recorder.calls[1] - start, Duration::from_millis(1500));
}
