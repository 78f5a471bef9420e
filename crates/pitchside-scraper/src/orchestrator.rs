//! Cache-aside read path.
//!
//! Reads consult the store first and serve the record while it is younger
//! than its TTL. Anything else (stale, missing, or a store read that failed
//! after its retries) triggers one extraction whose result is written back.
//! A failed write is logged and the locally stamped record is still served.

use crate::error::Result;
use crate::extractor::Extractor;
use chrono::Utc;
use pitchside_browser::BrowserSession;
use pitchside_core::{
    CacheKey, CacheRecord, ContestId, ContestList, LiveMatchDetail, Match, MatchId, MatchStatus,
    Roster, Scoreboard, TtlPolicy,
};
use pitchside_db::{CacheStore, StoreUpdate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// TTL-gated access to every record kind.
pub struct Orchestrator {
    extractor: Extractor,
    store: CacheStore,
    ttl: TtlPolicy,
}

impl Orchestrator {
    /// Create the read path.
    #[must_use]
    pub fn new(extractor: Extractor, store: CacheStore, ttl: TtlPolicy) -> Self {
        Self {
            extractor,
            store,
            ttl,
        }
    }

    /// The browser session behind the extractors.
    #[must_use]
    pub fn session(&self) -> &Arc<dyn BrowserSession> {
        self.extractor.session()
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Receive a [`StoreUpdate`] for every write.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreUpdate> {
        self.store.subscribe()
    }

    async fn read_through<T, F, Fut>(&self, key: CacheKey, scrape: F) -> Result<CacheRecord<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let ttl = self.ttl.ttl_for(&key);
        match self.store.get::<T>(&key).await {
            Ok(Some(record)) if record.is_fresh(ttl, Utc::now()) => {
                debug!("Serving {} from store", key);
                return Ok(record);
            }
            Ok(Some(record)) => debug!(
                "{} is stale ({:?} old, ttl {:?})",
                key,
                record.age(Utc::now()),
                ttl
            ),
            Ok(None) => debug!("{} not in store", key),
            Err(e) => warn!("Store read of {} failed, scraping instead: {}", key, e),
        }

        let data = scrape().await?;
        Ok(self.write_back(&key, data).await)
    }

    async fn write_back<T: Serialize>(&self, key: &CacheKey, data: T) -> CacheRecord<T> {
        let record = CacheRecord::stamped_now(data);
        if let Err(e) = self.store.put_record(key, &record).await {
            warn!("Store write of {} failed, serving unsaved record: {}", key, e);
        }
        record
    }

    /// Fixture list of one lobby tab.
    pub async fn fixtures(&self, status: MatchStatus) -> Result<CacheRecord<Vec<Match>>> {
        self.read_through(CacheKey::Fixtures(status), || self.extractor.fixtures(status))
            .await
    }

    /// Live score detail of one match.
    pub async fn live_detail(&self, match_id: &MatchId) -> Result<CacheRecord<LiveMatchDetail>> {
        self.read_through(CacheKey::LiveMatch(match_id.clone()), || {
            self.extractor.live_detail(match_id)
        })
        .await
    }

    /// Contest list of one match.
    pub async fn contests(&self, match_id: &MatchId) -> Result<CacheRecord<ContestList>> {
        self.read_through(CacheKey::Contests(match_id.clone()), || {
            self.extractor.contests(match_id)
        })
        .await
    }

    /// Full scoreboard of one match.
    pub async fn scoreboard(&self, match_id: &MatchId) -> Result<CacheRecord<Scoreboard>> {
        self.read_through(CacheKey::Scoreboard(match_id.clone()), || {
            self.extractor.scoreboard(match_id)
        })
        .await
    }

    /// Player roster of one match and contest.
    pub async fn roster(
        &self,
        match_id: &MatchId,
        contest_id: &ContestId,
    ) -> Result<CacheRecord<Roster>> {
        self.read_through(
            CacheKey::Roster(match_id.clone(), contest_id.clone()),
            || self.extractor.roster(match_id, contest_id),
        )
        .await
    }

    // ---- unconditional refresh ----

    /// Scrape and store a fixture list regardless of its age.
    pub async fn refresh_fixtures(&self, status: MatchStatus) -> Result<Vec<Match>> {
        let data = self.extractor.fixtures(status).await?;
        Ok(self.write_back(&CacheKey::Fixtures(status), data).await.data)
    }

    /// Scrape and store a live detail regardless of its age.
    pub async fn refresh_live_detail(&self, match_id: &MatchId) -> Result<LiveMatchDetail> {
        let data = self.extractor.live_detail(match_id).await?;
        let key = CacheKey::LiveMatch(match_id.clone());
        Ok(self.write_back(&key, data).await.data)
    }

    /// Scrape and store a contest list regardless of its age.
    pub async fn refresh_contests(&self, match_id: &MatchId) -> Result<ContestList> {
        let data = self.extractor.contests(match_id).await?;
        let key = CacheKey::Contests(match_id.clone());
        Ok(self.write_back(&key, data).await.data)
    }

    /// Drop every stored record. Returns how many were removed.
    pub async fn clear_cache(&self) -> Result<u64> {
        let removed = self.store.clear().await?;
        info!("Cleared {} stored records", removed);
        Ok(removed)
    }
}
