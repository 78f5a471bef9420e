//! Page URLs on the target site.

use crate::error::{Result, ScrapeError};
use pitchside_core::{ContestId, MatchId};
use url::Url;

/// Builds page URLs relative to the lobby.
#[derive(Debug, Clone)]
pub struct PageUrls {
    base: Url,
}

impl PageUrls {
    /// `base_url` is the lobby URL; sub-pages are resolved against it.
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| ScrapeError::Parse(format!("base url '{base_url}': {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base })
    }

    fn join(&self, relative: &str) -> Result<String> {
        self.base
            .join(relative)
            .map(String::from)
            .map_err(|e| ScrapeError::Parse(format!("page url '{relative}': {e}")))
    }

    /// The lobby itself.
    #[must_use]
    pub fn lobby(&self) -> String {
        self.base.to_string()
    }

    /// Live score page of a match.
    pub fn live_contests(&self, match_id: &MatchId) -> Result<String> {
        self.join(&format!("live-contests/{match_id}"))
    }

    /// Contest list of a match.
    pub fn contests(&self, match_id: &MatchId) -> Result<String> {
        self.join(&format!("contests/{match_id}"))
    }

    /// Full scoreboard of a match.
    pub fn scoreboard(&self, match_id: &MatchId) -> Result<String> {
        self.join(&format!("scoreboard/{match_id}"))
    }

    /// Team builder for a contest, where the roster is listed.
    pub fn create_team(&self, match_id: &MatchId, contest_id: &ContestId) -> Result<String> {
        self.join(&format!("create-team-new/{match_id}/{contest_id}"))
    }
}
