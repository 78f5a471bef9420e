//! Scraped record shapes.
//!
//! Every record is replaced wholesale on each successful scrape; nothing here
//! is ever merged with a previous value. Field names serialize as camelCase,
//! which is also the shape published to consumers.

use crate::types::{ContestId, MatchId, MatchStatus};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A pair of values keyed by team side, serialized as `{"A": .., "B": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamPair<T> {
    /// Home / first listed side
    #[serde(rename = "A")]
    pub a: T,
    /// Away / second listed side
    #[serde(rename = "B")]
    pub b: T,
}

/// Team shown on a fixture card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    /// Display name
    pub name: String,
    /// Badge image URL, when the card rendered one
    pub logo: Option<String>,
}

/// One fixture card from a lobby tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    /// Target-site match identifier
    pub match_id: MatchId,
    /// Series / tournament label
    pub series_name: String,
    /// Both sides
    pub teams: TeamPair<Team>,
    /// Scheduled start or elapsed-time text, verbatim
    pub match_time: String,
    /// Tab the card was read under
    pub status: MatchStatus,
}

/// Batsman at the crease on the live page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatsmanLine {
    /// Player name
    pub name: String,
    /// Runs scored
    pub runs: String,
    /// Balls faced
    pub balls: String,
    /// Boundaries
    pub fours: String,
    /// Sixes
    pub sixes: String,
    /// On strike
    pub strike: bool,
}

/// Bowler line on the live page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlerLine {
    /// Player name
    pub name: String,
    /// Overs bowled
    pub overs: String,
    /// Maiden overs
    pub maidens: String,
    /// Runs conceded
    pub runs: String,
    /// Wickets taken
    pub wickets: String,
}

/// Score summary strip on the live page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSummary {
    /// Batting side score, e.g. `142/3`
    pub score: String,
    /// Overs completed
    pub overs: String,
    /// Current run rate
    pub run_rate: String,
}

/// Live score state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMatchDetail {
    /// Match the page belongs to
    pub match_id: MatchId,
    /// Page title text
    pub title: String,
    /// Team names from the score header
    pub teams: TeamPair<String>,
    /// Batsmen at the crease
    pub batsmen: Vec<BatsmanLine>,
    /// Bowler lines shown on the page
    pub bowlers: Vec<BowlerLine>,
    /// Delivery tokens of the current over, in bowling order
    pub this_over: Vec<String>,
    /// Score strip
    pub summary: LiveSummary,
}

/// Paid or free contest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContestType {
    /// Paid entry
    Cash,
    /// Free entry
    Practice,
}

/// Fill counters of a contest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamsJoined {
    /// Teams joined so far, digits only
    pub current: String,
    /// Contest capacity, digits only
    pub max: String,
}

/// One contest card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    /// Site contest id, or `<matchId>-<index>` when the card has none
    pub contest_id: String,
    /// Match the contest belongs to
    pub match_id: MatchId,
    /// Card title, `"Unnamed Contest"` when absent
    pub name: String,
    /// Prize text, or `"Practice Contest"` for free contests
    pub total_prize: String,
    /// Entry fee text, `"0"` for free contests
    pub entry_fee: String,
    /// Winner count text
    pub winners: String,
    /// Fill counters
    pub teams_joined: TeamsJoined,
    /// Fill percentage as rendered in the progress bar
    pub progress: String,
    /// Paid or free
    #[serde(rename = "type")]
    pub contest_type: ContestType,
}

impl Contest {
    /// Sentinel prize text for free contests.
    pub const PRACTICE_PRIZE: &'static str = "Practice Contest";
}

/// All contests of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestList {
    /// Match the contests belong to
    pub match_id: MatchId,
    /// Cards in page order
    pub contests: Vec<Contest>,
}

/// Batting row of a scoreboard innings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardBatsman {
    /// Player name
    pub name: String,
    /// Dismissal text, `"Not out"` when absent
    pub status: String,
    /// Runs scored
    pub runs: String,
    /// Balls faced
    pub balls: String,
    /// Boundaries
    pub fours: String,
    /// Sixes
    pub sixes: String,
    /// Strike rate
    pub strike_rate: String,
}

/// Bowling row of a scoreboard innings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardBowler {
    /// Player name
    pub name: String,
    /// Overs bowled
    pub overs: String,
    /// Maiden overs
    pub maidens: String,
    /// Runs conceded
    pub runs: String,
    /// Wickets taken
    pub wickets: String,
    /// Economy rate
    pub economy: String,
}

/// One innings on the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Innings {
    /// Batting side
    pub team_name: String,
    /// Innings score
    pub score: String,
    /// Run rate
    pub run_rate: String,
    /// Extras text
    pub extras: String,
    /// Total line text
    pub total: String,
    /// Batting card
    pub batsmen: Vec<ScorecardBatsman>,
    /// Bowling card
    pub bowlers: Vec<ScorecardBowler>,
}

/// Full scoreboard of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
    /// Match the scoreboard belongs to
    pub match_id: MatchId,
    /// Team names from the header
    pub teams: TeamPair<String>,
    /// Headline score text
    pub current_score: String,
    /// Innings in play order
    pub innings: Vec<Innings>,
}

/// Fantasy player role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlayerRole {
    /// Wicket keeper
    Wk,
    /// Batter
    Bat,
    /// All-rounder
    All,
    /// Bowler
    Bowl,
}

impl PlayerRole {
    /// Normalize a raw category token (`"ft_allr"`, `"ALL-R"`, `"bat"`, ...).
    ///
    /// Returns `None` for tokens outside the four roles.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        let token = token
            .strip_prefix("ft_")
            .or_else(|| token.strip_prefix("FT_"))
            .unwrap_or(token)
            .to_ascii_uppercase();

        match token.as_str() {
            "WK" => Some(Self::Wk),
            "BAT" => Some(Self::Bat),
            "ALL" | "ALLR" | "ALL-R" => Some(Self::All),
            "BOWL" => Some(Self::Bowl),
            _ => None,
        }
    }
}

/// One player on the team-builder page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRosterEntry {
    /// Numeric id taken from the player image path
    pub player_id: String,
    /// Player name
    pub name: String,
    /// Team name with the `Team:` label stripped
    pub team: String,
    /// Category tab the player was listed under
    pub role: PlayerRole,
    /// Credit cost, 0 when unreadable
    pub credits: f64,
    /// Fantasy points, 0 when unreadable
    pub points: f64,
    /// Selection percentage text, verbatim
    pub selected_by: String,
    /// Recent match scores as listed
    pub recent_performance: Vec<String>,
    /// Already picked in the team being built
    pub is_selected: bool,
}

/// Players grouped by role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterBuckets {
    /// Wicket keepers
    #[serde(rename = "WK")]
    pub wk: Vec<PlayerRosterEntry>,
    /// Batters
    #[serde(rename = "BAT")]
    pub bat: Vec<PlayerRosterEntry>,
    /// All-rounders
    #[serde(rename = "ALL")]
    pub all: Vec<PlayerRosterEntry>,
    /// Bowlers
    #[serde(rename = "BOWL")]
    pub bowl: Vec<PlayerRosterEntry>,
}

impl RosterBuckets {
    /// Group players by role, keeping page order within each bucket.
    #[must_use]
    pub fn from_players(players: impl IntoIterator<Item = PlayerRosterEntry>) -> Self {
        let mut buckets = Self::default();
        for player in players {
            match player.role {
                PlayerRole::Wk => buckets.wk.push(player),
                PlayerRole::Bat => buckets.bat.push(player),
                PlayerRole::All => buckets.all.push(player),
                PlayerRole::Bowl => buckets.bowl.push(player),
            }
        }
        buckets
    }

    /// Total number of players across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.wk.len() + self.bat.len() + self.all.len() + self.bowl.len()
    }

    /// True when no bucket holds a player.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Player roster for one match and contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    /// Match the roster belongs to
    pub match_id: MatchId,
    /// Contest the team is built for
    pub contest_id: ContestId,
    /// Players grouped by role
    pub players: RosterBuckets,
    /// Players across all buckets
    pub total_players: usize,
}

/// A stored value together with its write timestamp.
///
/// The timestamp belongs to the whole value, including list values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord<T> {
    /// When the value was written to the store
    pub last_updated: DateTime<Utc>,
    /// The stored value
    pub data: T,
}

impl<T> CacheRecord<T> {
    /// Wrap a value with an explicit timestamp.
    pub fn new(data: T, last_updated: DateTime<Utc>) -> Self {
        Self { last_updated, data }
    }

    /// Wrap a value stamped with the current time.
    ///
    /// The stamp is truncated to microseconds so it survives an RFC 3339
    /// round trip through the store unchanged.
    pub fn stamped_now(data: T) -> Self {
        Self::new(data, Utc::now().trunc_subsecs(6))
    }

    /// Age of the record at `now`. Timestamps in the future count as age zero.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_updated).to_std().unwrap_or(Duration::ZERO)
    }

    /// True if `now - last_updated < ttl`.
    #[must_use]
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age(now) < ttl
    }
}
