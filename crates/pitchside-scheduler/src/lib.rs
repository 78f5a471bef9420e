//! Pitchside Scheduler - the background refresh loop.
//!
//! One perpetual task re-scrapes the three fixture tabs and, for every live
//! match, its live detail and contest list. Refreshes always write through
//! to the store regardless of record age.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod jobs;
pub mod scheduler;

pub use jobs::{CycleReport, RefreshTask, TaskOutcome};
pub use scheduler::{RefreshTarget, Scheduler};
