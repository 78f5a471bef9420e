//! Shared types used across the Pitchside service.
//!
//! Identifier newtypes are validated on construction so they can be embedded
//! in store paths and target-site URLs without escaping.

use crate::error::PitchsideError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn identifier_regex() -> &'static Regex {
    static ID_REGEX: OnceLock<Regex> = OnceLock::new();
    ID_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("valid regex"))
}

fn validate_identifier(kind: &str, id: &str) -> Result<(), PitchsideError> {
    if identifier_regex().is_match(id) {
        Ok(())
    } else {
        Err(PitchsideError::Validation(format!(
            "invalid {kind}: must be 1-64 characters of [A-Za-z0-9_-], got '{id}'"
        )))
    }
}

/// Identifier of a match on the target site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Create a new `MatchId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID contains characters outside `[A-Za-z0-9_-]`
    /// or is not 1-64 characters long.
    pub fn new(id: impl Into<String>) -> Result<Self, PitchsideError> {
        let id = id.into();
        validate_identifier("match ID", &id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a contest within a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContestId(String);

impl ContestId {
    /// Create a new `ContestId` from a string.
    ///
    /// # Errors
    /// Returns error under the same rules as [`MatchId::new`].
    pub fn new(id: impl Into<String>) -> Result<Self, PitchsideError> {
        let id = id.into();
        validate_identifier("contest ID", &id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixture list category, one per lobby tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Scheduled, not started
    Upcoming,
    /// In progress
    Live,
    /// Finished
    Completed,
}

impl MatchStatus {
    /// All categories, in lobby tab order.
    pub const ALL: [MatchStatus; 3] = [Self::Upcoming, Self::Live, Self::Completed];

    /// Lowercase name used in store paths and payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live",
            Self::Completed => "completed",
        }
    }

    /// `testid` attribute of the lobby tab for this category.
    #[must_use]
    pub fn tab_test_id(&self) -> &'static str {
        match self {
            Self::Upcoming => "ft_Tabs_Upcoming",
            Self::Live => "ft_Tabs_Live",
            Self::Completed => "ft_Tabs_Completed",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = PitchsideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upcoming" => Ok(Self::Upcoming),
            "live" => Ok(Self::Live),
            "completed" => Ok(Self::Completed),
            other => Err(PitchsideError::Validation(format!(
                "unknown match status '{other}'"
            ))),
        }
    }
}

/// Scraped data categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Fixture list for one status tab
    Fixtures,
    /// Live score detail for one match
    LiveMatch,
    /// Contest list for one match
    Contests,
    /// Full scoreboard for one match
    Scoreboard,
    /// Player roster for one match and contest
    Roster,
}

impl EntityKind {
    /// Stable snake_case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixtures => "fixtures",
            Self::LiveMatch => "live_match",
            Self::Contests => "contests",
            Self::Scoreboard => "scoreboard",
            Self::Roster => "roster",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hierarchical store key: entity kind plus identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// `fixtures/<status>`
    Fixtures(MatchStatus),
    /// `live_matches/<matchId>`
    LiveMatch(MatchId),
    /// `contests/<matchId>`
    Contests(MatchId),
    /// `scoreboards/<matchId>`
    Scoreboard(MatchId),
    /// `player_data/<matchId>/<contestId>`
    Roster(MatchId, ContestId),
}

impl CacheKey {
    /// Store path for this key.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Fixtures(status) => format!("fixtures/{status}"),
            Self::LiveMatch(id) => format!("live_matches/{id}"),
            Self::Contests(id) => format!("contests/{id}"),
            Self::Scoreboard(id) => format!("scoreboards/{id}"),
            Self::Roster(match_id, contest_id) => format!("player_data/{match_id}/{contest_id}"),
        }
    }

    /// Entity kind addressed by this key.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Fixtures(_) => EntityKind::Fixtures,
            Self::LiveMatch(_) => EntityKind::LiveMatch,
            Self::Contests(_) => EntityKind::Contests,
            Self::Scoreboard(_) => EntityKind::Scoreboard,
            Self::Roster(..) => EntityKind::Roster,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
