//! Refresh task and cycle report definitions.

use chrono::{DateTime, Utc};
use pitchside_core::{MatchId, MatchStatus};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// One unit of work in a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "task", content = "target", rename_all = "camelCase")]
pub enum RefreshTask {
    /// A lobby tab
    Fixtures(MatchStatus),
    /// Live score page of a live match
    LiveDetail(MatchId),
    /// Contest list of a live match
    Contests(MatchId),
}

impl fmt::Display for RefreshTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixtures(status) => write!(f, "{status} fixtures"),
            Self::LiveDetail(id) => write!(f, "live detail {id}"),
            Self::Contests(id) => write!(f, "contests {id}"),
        }
    }
}

/// How one task of a cycle ended.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutcome {
    /// The task
    pub task: RefreshTask,
    /// Error message when the refresh failed
    pub error: Option<String>,
}

impl TaskOutcome {
    /// The task refreshed its record.
    pub fn ok(task: RefreshTask) -> Self {
        Self { task, error: None }
    }

    /// The task failed with `error`.
    pub fn failed(task: RefreshTask, error: impl fmt::Display) -> Self {
        Self {
            task,
            error: Some(error.to_string()),
        }
    }

    /// True if no error was recorded.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one refresh cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    /// Correlates the cycle's log lines
    pub cycle_id: Uuid,
    /// Wall-clock start of the cycle
    pub started_at: DateTime<Utc>,
    /// Time from start until the last task finished
    pub duration_ms: u64,
    /// Fixture tasks first, then per-match tasks
    pub outcomes: Vec<TaskOutcome>,
}

impl CycleReport {
    /// Tasks that refreshed their record.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// Tasks that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}
