//! Extractors: one per page family.
//!
//! List-level extraction (fixture tabs) runs on the shared primary page.
//! Detail-level extraction opens an ephemeral page per attempt and closes it
//! before the attempt returns, so a retry always starts on a fresh page.

use crate::error::{Result, ScrapeError};
use crate::parser::{
    self, has_marker, parse_categories, parse_contests, parse_fixtures, parse_live_detail,
    parse_players, parse_scoreboard,
};
use crate::readiness::{dismiss_popups, wait_for_any, wait_for_text};
use crate::url_builder::PageUrls;
use pitchside_browser::{BrowserError, BrowserSession, EphemeralPage, PageActions};
use pitchside_core::{
    ContestId, ContestList, LiveMatchDetail, Match, MatchId, MatchStatus, PlayerRole,
    PlayerRosterEntry, RetryPolicy, Roster, RosterBuckets, Scoreboard, ScrapingConfig,
    SelectorConfig,
};
use std::path::PathBuf;
use std::slice;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const TAB_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TabState {
    Missing,
    Inactive,
    Active,
}

/// Drives a [`BrowserSession`] through the target site's pages.
pub struct Extractor {
    session: Arc<dyn BrowserSession>,
    urls: PageUrls,
    selectors: SelectorConfig,
    readiness_timeout: Duration,
    popup_timeout: Duration,
    settle: Duration,
    diagnostics_dir: Option<PathBuf>,
    fixtures_policy: RetryPolicy,
    detail_policy: RetryPolicy,
    roster_policy: RetryPolicy,
}

impl Extractor {
    /// Create an extractor over `session`.
    pub fn new(
        session: Arc<dyn BrowserSession>,
        scraping: &ScrapingConfig,
        selectors: &SelectorConfig,
    ) -> Result<Self> {
        let policy = |secs| RetryPolicy::new(scraping.max_attempts, Duration::from_secs(secs));
        Ok(Self {
            session,
            urls: PageUrls::new(&scraping.base_url)?,
            selectors: selectors.clone(),
            readiness_timeout: Duration::from_secs(scraping.readiness_timeout_secs),
            popup_timeout: Duration::from_secs(scraping.popup_timeout_secs),
            settle: Duration::from_millis(scraping.settle_ms),
            diagnostics_dir: scraping.diagnostics_dir.clone(),
            fixtures_policy: policy(scraping.fixtures_retry_delay_secs),
            detail_policy: policy(scraping.retry_delay_secs),
            roster_policy: policy(scraping.roster_retry_delay_secs),
        })
    }

    /// The session this extractor drives.
    #[must_use]
    pub fn session(&self) -> &Arc<dyn BrowserSession> {
        &self.session
    }

    /// Page URLs in use.
    #[must_use]
    pub fn urls(&self) -> &PageUrls {
        &self.urls
    }

    // ---- fixtures ----

    /// Fixture cards listed under the `status` tab of the lobby.
    pub async fn fixtures(&self, status: MatchStatus) -> Result<Vec<Match>> {
        self.fixtures_policy
            .run(&format!("Fixtures ({status})"), |attempt| {
                self.fixtures_attempt(status, attempt)
            })
            .await
    }

    async fn fixtures_attempt(&self, status: MatchStatus, attempt: u32) -> Result<Vec<Match>> {
        let page = self.session.primary_page().await?;
        if attempt > 1 {
            debug!("Reloading primary page before attempt {}", attempt);
            page.reload().await?;
        }

        let tab = format!("div[testid='{}']", status.tab_test_id());
        let label = format!("{status} fixtures");

        let mut state = self.tab_state(&*page, &tab).await?;
        if state == TabState::Missing {
            debug!("Tab {} not on page, returning to the lobby", tab);
            page.goto(&self.urls.lobby()).await?;
            wait_for_any(&*page, slice::from_ref(&tab), self.readiness_timeout, "lobby").await?;
            state = self.tab_state(&*page, &tab).await?;
        }

        if state == TabState::Active {
            wait_for_any(
                &*page,
                &self.selectors.fixture_cards,
                self.readiness_timeout,
                &label,
            )
            .await?;
        } else {
            debug!("Switching to tab {}", tab);
            page.click(&tab).await?;
            tokio::try_join!(
                self.wait_tab_active(&*page, &tab),
                wait_for_any(
                    &*page,
                    &self.selectors.fixture_cards,
                    self.readiness_timeout,
                    &label,
                ),
            )?;
        }

        let html = page.content().await?;
        let fixtures = parse_fixtures(&html, status)?;
        info!("Extracted {} {} fixtures", fixtures.len(), status);
        Ok(fixtures)
    }

    async fn tab_state(&self, page: &dyn PageActions, tab: &str) -> Result<TabState> {
        let quoted = |value: &str| {
            serde_json::to_string(value).map_err(|e| ScrapeError::Parse(e.to_string()))
        };
        let script = format!(
            "(() => {{ const el = document.querySelector({}); \
             if (!el) return 'missing'; \
             return el.classList.contains({}) ? 'inactive' : 'active'; }})()",
            quoted(tab)?,
            quoted(&self.selectors.tab_inactive_class)?,
        );

        match page.evaluate(&script).await?.as_str() {
            Some("missing") => Ok(TabState::Missing),
            Some("inactive") => Ok(TabState::Inactive),
            Some("active") => Ok(TabState::Active),
            other => Err(ScrapeError::Browser(BrowserError::EvaluationError(format!(
                "unexpected tab state {other:?} for {tab}"
            )))),
        }
    }

    async fn wait_tab_active(&self, page: &dyn PageActions, tab: &str) -> Result<()> {
        let deadline = Instant::now() + self.readiness_timeout;
        loop {
            if self.tab_state(page, tab).await? == TabState::Active {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ScrapeError::ReadinessTimeout {
                    page: format!("tab {tab}"),
                    selectors: vec![tab.to_string()],
                });
            }
            tokio::time::sleep(TAB_POLL_INTERVAL).await;
        }
    }

    // ---- detail pages ----

    /// Live score detail of one match.
    pub async fn live_detail(&self, match_id: &MatchId) -> Result<LiveMatchDetail> {
        self.detail_policy
            .run(&format!("Live match {match_id}"), |_| async move {
                let page = self.session.open_page().await?;
                let result = self.live_detail_on(&page, match_id).await;
                close_page(page).await;
                result
            })
            .await
    }

    async fn live_detail_on(&self, page: &EphemeralPage, match_id: &MatchId) -> Result<LiveMatchDetail> {
        page.goto(&self.urls.live_contests(match_id)?).await?;
        dismiss_popups(&**page, &self.selectors.popup_close, self.popup_timeout).await;
        wait_for_any(
            &**page,
            &self.selectors.live_scorebook,
            self.readiness_timeout,
            &format!("live match {match_id}"),
        )
        .await?;
        parse_live_detail(&page.content().await?, match_id)
    }

    /// Contest list of one match.
    pub async fn contests(&self, match_id: &MatchId) -> Result<ContestList> {
        self.detail_policy
            .run(&format!("Contests {match_id}"), |_| async move {
                let page = self.session.open_page().await?;
                let result = self.contests_on(&page, match_id).await;
                close_page(page).await;
                result
            })
            .await
    }

    async fn contests_on(&self, page: &EphemeralPage, match_id: &MatchId) -> Result<ContestList> {
        let label = format!("contests of match {match_id}");
        page.goto(&self.urls.contests(match_id)?).await?;
        dismiss_popups(&**page, &self.selectors.popup_close, self.popup_timeout).await;
        wait_for_text(
            &**page,
            &self.selectors.contests_page_marker,
            self.readiness_timeout,
            &label,
        )
        .await?;
        wait_for_any(
            &**page,
            &self.selectors.contest_cards,
            self.readiness_timeout,
            &label,
        )
        .await?;

        let contests = parse_contests(&page.content().await?, match_id)?;
        info!("Extracted {} contests for match {}", contests.contests.len(), match_id);
        Ok(contests)
    }

    /// Full scoreboard of one match.
    pub async fn scoreboard(&self, match_id: &MatchId) -> Result<Scoreboard> {
        self.detail_policy
            .run(&format!("Scoreboard {match_id}"), |_| async move {
                let page = self.session.open_page().await?;
                let result = self.scoreboard_on(&page, match_id).await;
                close_page(page).await;
                result
            })
            .await
    }

    async fn scoreboard_on(&self, page: &EphemeralPage, match_id: &MatchId) -> Result<Scoreboard> {
        page.goto(&self.urls.scoreboard(match_id)?).await?;
        dismiss_popups(&**page, &self.selectors.popup_close, self.popup_timeout).await;
        wait_for_any(
            &**page,
            &self.selectors.scoreboard,
            self.readiness_timeout,
            &format!("scoreboard of match {match_id}"),
        )
        .await?;
        parse_scoreboard(&page.content().await?, match_id)
    }

    // ---- roster ----

    /// Player roster on the team-builder page of a match and contest.
    pub async fn roster(&self, match_id: &MatchId, contest_id: &ContestId) -> Result<Roster> {
        self.roster_policy
            .run(&format!("Roster {match_id}/{contest_id}"), |_| async move {
                let page = self.session.open_page().await?;
                let result = self.roster_on(&page, match_id, contest_id).await;
                if let Err(e) = &result {
                    self.write_diagnostics(&*page, e).await;
                }
                close_page(page).await;
                result
            })
            .await
    }

    async fn roster_on(
        &self,
        page: &EphemeralPage,
        match_id: &MatchId,
        contest_id: &ContestId,
    ) -> Result<Roster> {
        page.goto(&self.urls.create_team(match_id, contest_id)?)
            .await?;

        if has_marker(&page.content().await?, &self.selectors.login_required)? {
            return Err(ScrapeError::AuthenticationRequired(format!(
                "team builder for {match_id}/{contest_id} redirected to login"
            )));
        }

        let bar = &self.selectors.roster_categories;
        wait_for_any(
            &**page,
            slice::from_ref(bar),
            self.readiness_timeout,
            "roster categories",
        )
        .await?;
        wait_for_any(
            &**page,
            &self.selectors.roster,
            self.readiness_timeout,
            "roster players",
        )
        .await?;

        let categories = parse_categories(&page.content().await?, bar)?;
        let mut players = Vec::new();
        for category in &categories {
            let Some(role) = PlayerRole::from_token(category) else {
                debug!("Skipping unknown roster category '{}'", category);
                continue;
            };
            match self.read_category(page, category, role).await {
                Ok(mut found) => {
                    debug!("Category {} lists {} players", category, found.len());
                    players.append(&mut found);
                }
                Err(e) => warn!("Roster category {} failed: {}", category, e),
            }
        }

        if players.is_empty() {
            return Err(ScrapeError::NoDataFound(format!(
                "no players for match {match_id} contest {contest_id}"
            )));
        }

        let total_players = players.len();
        info!(
            "Extracted {} players for match {} contest {}",
            total_players, match_id, contest_id
        );
        Ok(Roster {
            match_id: match_id.clone(),
            contest_id: contest_id.clone(),
            players: RosterBuckets::from_players(players),
            total_players,
        })
    }

    async fn read_category(
        &self,
        page: &EphemeralPage,
        category: &str,
        role: PlayerRole,
    ) -> Result<Vec<PlayerRosterEntry>> {
        let tab = parser::roster::category_tab_selector(&self.selectors.roster_categories, category);
        page.click(&tab).await?;
        tokio::time::sleep(self.settle).await;
        page.scroll_to_bottom().await?;
        parse_players(&page.content().await?, role)
    }

    async fn write_diagnostics(&self, page: &dyn PageActions, cause: &ScrapeError) {
        let Some(dir) = &self.diagnostics_dir else {
            return;
        };
        let shot = match page.screenshot().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Diagnostic screenshot failed: {}", e);
                return;
            }
        };

        let path = dir.join(format!(
            "error_{}.png",
            chrono::Utc::now().timestamp_millis()
        ));
        let written = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, shot).await
        };
        match written.await {
            Ok(()) => info!("Saved diagnostic screenshot {} ({})", path.display(), cause),
            Err(e) => warn!("Could not write {}: {}", path.display(), e),
        }
    }
}

async fn close_page(page: EphemeralPage) {
    if let Err(e) = page.close().await {
        warn!("Failed to close page: {}", e);
    }
}
