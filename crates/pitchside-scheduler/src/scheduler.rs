//! The refresh loop.

use crate::jobs::{CycleReport, RefreshTask, TaskOutcome};
use chrono::Utc;
use futures::future::join_all;
use pitchside_core::{MatchId, MatchStatus, SchedulerConfig};
use pitchside_scraper::{Orchestrator, ScrapeError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// What the scheduler refreshes. Every call must scrape and store,
/// ignoring record age.
#[async_trait::async_trait]
pub trait RefreshTarget: Send + Sync {
    /// Refresh one fixture tab; returns the ids it listed.
    async fn refresh_fixtures(&self, status: MatchStatus) -> Result<Vec<MatchId>, ScrapeError>;

    /// Refresh the live score page of one match.
    async fn refresh_live_detail(&self, match_id: &MatchId) -> Result<(), ScrapeError>;

    /// Refresh the contest list of one match.
    async fn refresh_contests(&self, match_id: &MatchId) -> Result<(), ScrapeError>;
}

#[async_trait::async_trait]
impl RefreshTarget for Orchestrator {
    async fn refresh_fixtures(&self, status: MatchStatus) -> Result<Vec<MatchId>, ScrapeError> {
        let fixtures = Orchestrator::refresh_fixtures(self, status).await?;
        Ok(fixtures.into_iter().map(|m| m.match_id).collect())
    }

    async fn refresh_live_detail(&self, match_id: &MatchId) -> Result<(), ScrapeError> {
        Orchestrator::refresh_live_detail(self, match_id)
            .await
            .map(|_| ())
    }

    async fn refresh_contests(&self, match_id: &MatchId) -> Result<(), ScrapeError> {
        Orchestrator::refresh_contests(self, match_id).await.map(|_| ())
    }
}

/// Runs refresh cycles until stopped, sleeping a fixed interval between them.
pub struct Scheduler {
    target: Arc<dyn RefreshTarget>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    last_report: Arc<Mutex<Option<CycleReport>>>,
}

impl Scheduler {
    /// Create a stopped scheduler; call [`Scheduler::start`] to spawn the loop.
    pub fn new(target: Arc<dyn RefreshTarget>, config: &SchedulerConfig) -> Self {
        Self {
            target,
            interval: Duration::from_secs(config.interval_secs),
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
            last_report: Arc::new(Mutex::new(None)),
        }
    }

    /// True between a successful `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Report of the most recently finished cycle.
    pub fn last_report(&self) -> Option<CycleReport> {
        self.last_report.lock().ok().and_then(|guard| guard.clone())
    }

    /// Spawn the loop. Returns `None` if it is already running.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Scheduler already running");
            return None;
        }

        info!("Scheduler starting (interval {:?})", self.interval);
        let worker = Worker {
            target: Arc::clone(&self.target),
            interval: self.interval,
            running: Arc::clone(&self.running),
            shutdown: Arc::clone(&self.shutdown),
            last_report: Arc::clone(&self.last_report),
        };
        Some(tokio::spawn(worker.run()))
    }

    /// Ask the loop to exit. A cycle in flight finishes first; a pending
    /// sleep is cut short.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Scheduler stopping");
            self.shutdown.notify_one();
        }
    }

    /// Run a single cycle now, outside the loop.
    pub async fn run_cycle(&self) -> CycleReport {
        run_cycle(self.target.as_ref()).await
    }
}

struct Worker {
    target: Arc<dyn RefreshTarget>,
    interval: Duration,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    last_report: Arc<Mutex<Option<CycleReport>>>,
}

impl Worker {
    async fn run(self) {
        while self.running.load(Ordering::SeqCst) {
            let report = run_cycle(self.target.as_ref()).await;
            info!(
                cycle = %report.cycle_id,
                succeeded = report.succeeded(),
                failed = report.failed(),
                duration_ms = report.duration_ms,
                "Refresh cycle finished"
            );
            if let Ok(mut slot) = self.last_report.lock() {
                *slot = Some(report);
            }

            tokio::select! {
                () = self.shutdown.notified() => {}
                () = tokio::time::sleep(self.interval) => {}
            }
        }
        info!("Scheduler stopped");
    }
}

async fn run_cycle(target: &dyn RefreshTarget) -> CycleReport {
    let cycle_id = Uuid::new_v4();
    let started_at = Utc::now();
    let clock = Instant::now();
    debug!(cycle = %cycle_id, "Refresh cycle starting");

    let tabs = join_all(MatchStatus::ALL.into_iter().map(|status| async move {
        let task = RefreshTask::Fixtures(status);
        match target.refresh_fixtures(status).await {
            Ok(ids) => (TaskOutcome::ok(task), status, ids),
            Err(e) => {
                warn!("Refreshing {} failed: {}", task, e);
                (TaskOutcome::failed(task, e), status, Vec::new())
            }
        }
    }))
    .await;

    let mut outcomes = Vec::new();
    let mut live = Vec::new();
    for (outcome, status, ids) in tabs {
        outcomes.push(outcome);
        if status == MatchStatus::Live {
            live = ids;
        }
    }

    let details = join_all(live.iter().map(|match_id| async move {
        let (detail, contests) = tokio::join!(
            target.refresh_live_detail(match_id),
            target.refresh_contests(match_id),
        );
        [
            outcome(RefreshTask::LiveDetail(match_id.clone()), detail),
            outcome(RefreshTask::Contests(match_id.clone()), contests),
        ]
    }))
    .await;
    outcomes.extend(details.into_iter().flatten());

    CycleReport {
        cycle_id,
        started_at,
        duration_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
        outcomes,
    }
}

fn outcome(task: RefreshTask, result: Result<(), ScrapeError>) -> TaskOutcome {
    match result {
        Ok(()) => TaskOutcome::ok(task),
        Err(e) => {
            warn!("Refreshing {} failed: {}", task, e);
            TaskOutcome::failed(task, e)
        }
    }
}
