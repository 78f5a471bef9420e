//! Scripted browser used by the scraper integration tests.

#![allow(dead_code)]

use pitchside_browser::{
    BrowserError, BrowserSession, EphemeralPage, PageActions, PrimaryPage, Result,
};
use pitchside_core::{ScrapingConfig, SelectorConfig};
use scraper::{Html, Selector};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

pub const BASE_URL: &str = "http://pitchside.test/lobby";
pub const LOBBY_URL: &str = "http://pitchside.test/lobby/";

/// Pages by URL plus counters shared by every page of a session.
#[derive(Default)]
pub struct FakeSite {
    pages: Mutex<HashMap<String, String>>,
    click_results: Mutex<HashMap<String, String>>,
    evaluations: Mutex<VecDeque<String>>,
    pub clicks: Mutex<Vec<String>>,
    pub gotos: AtomicU32,
    pub reloads: AtomicU32,
    pub contents: AtomicU32,
    pub opened: AtomicU32,
    pub closes: AtomicU32,
}

impl FakeSite {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Serve `html` at `url`.
    pub fn page(&self, url: &str, html: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), html.to_string());
    }

    /// Replace the current document with `html` when `selector` is clicked.
    pub fn on_click(&self, selector: &str, html: &str) {
        self.click_results
            .lock()
            .unwrap()
            .insert(selector.to_string(), html.to_string());
    }

    /// Queue results for the next `evaluate` calls; the default is `"active"`.
    pub fn queue_evaluations(&self, results: &[&str]) {
        self.evaluations
            .lock()
            .unwrap()
            .extend(results.iter().map(ToString::to_string));
    }

    pub fn count(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }

    pub fn clicked(&self) -> Vec<String> {
        self.clicks.lock().unwrap().clone()
    }

    fn lookup(&self, url: &str) -> String {
        self.pages.lock().unwrap().get(url).cloned().unwrap_or_default()
    }
}

pub struct FakePage {
    site: Arc<FakeSite>,
    url: Mutex<Option<String>>,
    html: Mutex<String>,
}

impl FakePage {
    fn new(site: Arc<FakeSite>) -> Self {
        Self {
            site,
            url: Mutex::new(None),
            html: Mutex::new(String::new()),
        }
    }

    fn showing(site: Arc<FakeSite>, url: &str) -> Self {
        let page = Self::new(site);
        *page.html.lock().unwrap() = page.site.lookup(url);
        *page.url.lock().unwrap() = Some(url.to_string());
        page
    }
}

#[async_trait::async_trait]
impl PageActions for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.site.gotos.fetch_add(1, Ordering::SeqCst);
        *self.html.lock().unwrap() = self.site.lookup(url);
        *self.url.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.site.reloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn url(&self) -> Result<Option<String>> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<()> {
        let parsed = Selector::parse(selector)
            .map_err(|e| BrowserError::SelectorNotFound(format!("{selector}: {e}")))?;
        let html = self.html.lock().unwrap().clone();
        if Html::parse_document(&html).select(&parsed).next().is_some() {
            Ok(())
        } else {
            Err(BrowserError::Timeout(format!("waiting for '{selector}'")))
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.site.clicks.lock().unwrap().push(selector.to_string());
        if let Some(next) = self.site.click_results.lock().unwrap().get(selector) {
            *self.html.lock().unwrap() = next.clone();
        }
        Ok(())
    }

    async fn evaluate(&self, _expression: &str) -> Result<serde_json::Value> {
        let next = self
            .site
            .evaluations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "active".to_string());
        Ok(serde_json::Value::String(next))
    }

    async fn content(&self) -> Result<String> {
        self.site.contents.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.lock().unwrap().clone())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(b"\x89PNG".to_vec())
    }

    async fn close(&self) -> Result<()> {
        self.site.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Session whose primary page starts on the lobby.
pub struct FakeSession {
    site: Arc<FakeSite>,
    primary: Arc<FakePage>,
    slot: Arc<Semaphore>,
}

impl FakeSession {
    pub fn new(site: Arc<FakeSite>) -> Arc<Self> {
        Arc::new(Self {
            primary: Arc::new(FakePage::showing(site.clone(), LOBBY_URL)),
            site,
            slot: Arc::new(Semaphore::new(1)),
        })
    }
}

#[async_trait::async_trait]
impl BrowserSession for FakeSession {
    async fn primary_page(&self) -> Result<PrimaryPage> {
        let permit = self
            .slot
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| BrowserError::SessionUnavailable(e.to_string()))?;
        Ok(PrimaryPage::new(self.primary.clone(), permit))
    }

    async fn open_page(&self) -> Result<EphemeralPage> {
        self.site.opened.fetch_add(1, Ordering::SeqCst);
        Ok(EphemeralPage::new(Arc::new(FakePage::new(self.site.clone()))))
    }

    async fn is_healthy(&self) -> bool {
        true
    }

    async fn reset(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) {}
}

/// Scraping settings with short waits.
pub fn scraping_config() -> ScrapingConfig {
    ScrapingConfig {
        base_url: BASE_URL.to_string(),
        readiness_timeout_secs: 1,
        popup_timeout_secs: 0,
        settle_ms: 0,
        ..ScrapingConfig::default()
    }
}

pub fn selectors() -> SelectorConfig {
    SelectorConfig::default()
}

pub const LOBBY: &str = r#"
    <div testid="ft_Tabs_Upcoming">Upcoming</div>
    <div testid="ft_Tabs_Live" class="ft-tab-inactive">Live</div>
    <div id="ft-fixture-card-new-1" matchid="1001">
        <div class="fixture-card-header">Indian T20 League</div>
        <div id="ft-team-badge">
            <div class="flag-containerNew"><img src="https://cdn.test/mi.png"></div>
            <div class="flag-containerNew"><img src="https://cdn.test/csk.png"></div>
        </div>
        <span testid="team-a-name">MI</span>
        <span testid="team-b-name">CSK</span>
        <div testid="match-status-1">Today, 7:30 PM</div>
    </div>
    <div id="ft-fixture-card-new-2" matchid="1002">
        <div class="fixture-card-header">Indian T20 League</div>
        <span testid="team-a-name">RCB</span>
        <span testid="team-b-name">KKR</span>
        <div testid="match-status-2">Tomorrow, 3:30 PM</div>
    </div>
"#;

pub const LIVE_PAGE: &str = r#"
    <div class="sc-headTeamInfo">
        <div class="sc-match-title">Qualifier 1</div>
        <span class="sc-teamInfoName">MI</span>
        <span class="sc-teamInfoName">CSK</span>
    </div>
    <div class="score-book"><span class="delivery">4</span></div>
    <div class="match-summary"><span class="score">88/2</span><span class="overs">9.4</span></div>
"#;

pub const CONTESTS_PAGE: &str = r#"
    <h1>Contests</h1>
    <div id="ft-contest-card-9001">
        <div class="contestRewampLeftHeader">Head to Head</div>
        <span testid="newContestCardPrizeAmount-1">₹90</span>
        <span testid="entry-fee-1">₹50</span>
    </div>
"#;

pub const EMPTY_SCOREBOARD: &str = r#"<div class="page_coninner_autoheight"></div>"#;

pub const LOGIN_PAGE: &str = r#"<form><input name="mobile"></form>"#;

pub const TEAM_BUILDER: &str = r#"
    <ul class="player-category-tabs">
        <li class="nav-item" data-filter="ft_wk">WK</li>
        <li class="nav-item" data-filter="ft_bat">BAT</li>
        <li class="nav-item" data-filter="ft_coach">COACH</li>
    </ul>
    <div class="player-box"><div class="player-name">Placeholder</div></div>
"#;

pub const WK_TAB: &str = r#"
    <div class="player-box">
        <div class="player-img"><img src="/players/11/head.png"></div>
        <div class="player-name">Keeper One</div>
        <div class="team-name">Team: MI</div>
        <div class="player-credits">9</div>
    </div>
"#;

pub const BAT_TAB: &str = r#"
    <div class="player-box">
        <div class="player-img"><img src="/players/21/head.png"></div>
        <div class="player-name">Opener One</div>
        <div class="team-name">Team: CSK</div>
    </div>
    <div class="player-box">
        <div class="player-img"><img src="/players/22/head.png"></div>
        <div class="player-name">Opener Two</div>
        <div class="team-name">Team: MI</div>
    </div>
"#;
