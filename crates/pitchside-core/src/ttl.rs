//! Freshness policy per entity kind.
//!
//! The store itself knows nothing about freshness; readers consult this
//! policy to decide between serving a cached record and re-scraping.

use crate::config::CacheConfig;
use crate::types::{CacheKey, MatchStatus};
use std::time::Duration;

/// Maximum age per entity kind before a cached record must be refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    /// `fixtures/upcoming`
    pub fixtures_upcoming: Duration,
    /// `fixtures/live`
    pub fixtures_live: Duration,
    /// `fixtures/completed`
    pub fixtures_completed: Duration,
    /// `live_matches/<matchId>`
    pub live_match: Duration,
    /// `contests/<matchId>`
    pub contests: Duration,
    /// `scoreboards/<matchId>`
    pub scoreboard: Duration,
    /// `player_data/<matchId>/<contestId>`
    pub roster: Duration,
}

impl TtlPolicy {
    /// Build the policy from the `[cache]` config section.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            fixtures_upcoming: Duration::from_secs(config.fixtures_upcoming_secs),
            fixtures_live: Duration::from_secs(config.fixtures_live_secs),
            fixtures_completed: Duration::from_secs(config.fixtures_completed_secs),
            live_match: Duration::from_secs(config.live_match_secs),
            contests: Duration::from_secs(config.contests_secs),
            scoreboard: Duration::from_secs(config.scoreboard_secs),
            roster: Duration::from_secs(config.roster_secs),
        }
    }

    /// TTL that applies to `key`.
    #[must_use]
    pub fn ttl_for(&self, key: &CacheKey) -> Duration {
        match key {
            CacheKey::Fixtures(MatchStatus::Upcoming) => self.fixtures_upcoming,
            CacheKey::Fixtures(MatchStatus::Live) => self.fixtures_live,
            CacheKey::Fixtures(MatchStatus::Completed) => self.fixtures_completed,
            CacheKey::LiveMatch(_) => self.live_match,
            CacheKey::Contests(_) => self.contests,
            CacheKey::Scoreboard(_) => self.scoreboard,
            CacheKey::Roster(..) => self.roster,
        }
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
