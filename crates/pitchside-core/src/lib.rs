//! Pitchside Core - Foundation crate for the Pitchside scraping service.
//!
//! This crate provides shared types, scraped record shapes, error handling,
//! configuration management, the per-entity TTL policy and the retry policy
//! that every other Pitchside crate depends on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Identifier newtypes, match status and cache keys
//! - [`records`] - Scraped records (`Match`, `Contest`, `Scoreboard`, ...)
//! - [`ttl`] - Freshness policy per entity kind
//! - [`retry`] - Bounded, linearly backed-off retry policy
//!
//! # Example
//!
//! ```rust
//! use pitchside_core::{CacheKey, MatchStatus, TtlPolicy};
//!
//! let policy = TtlPolicy::default();
//! let key = CacheKey::Fixtures(MatchStatus::Live);
//! assert_eq!(key.path(), "fixtures/live");
//! assert_eq!(policy.ttl_for(&key).as_secs(), 60);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod records;
pub mod retry;
pub mod ttl;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, BrowserConfig, CacheConfig, ScrapingConfig, SchedulerConfig, SelectorConfig,
    ServerConfig, StoreConfig,
};
pub use error::{ConfigError, ConfigResult, PitchsideError, Result};
pub use records::{
    BatsmanLine, BowlerLine, CacheRecord, Contest, ContestList, ContestType, Innings,
    LiveMatchDetail, LiveSummary, Match, PlayerRole, PlayerRosterEntry, Roster,
    RosterBuckets, Scoreboard, ScorecardBatsman, ScorecardBowler, Team, TeamPair, TeamsJoined,
};
pub use retry::{RetryPolicy, Retryable};
pub use ttl::TtlPolicy;
pub use types::{CacheKey, ContestId, EntityKind, MatchId, MatchStatus};
