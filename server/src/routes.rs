//! HTTP routes.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream};
use pitchside_core::{
    CacheRecord, ContestId, ContestList, LiveMatchDetail, Match, MatchId, MatchStatus, Roster,
    Scoreboard,
};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upcoming-matches", get(upcoming_matches))
        .route("/live-matches", get(live_matches))
        .route("/completed-matches", get(completed_matches))
        .route("/live-matches/:match_id", get(live_match_detail))
        .route("/contests/:match_id", get(contests))
        .route("/scoreboard/:match_id", get(scoreboard))
        .route("/api/match/:match_id/:contest_id", get(roster))
        .route("/health", get(health))
        .route("/events", get(events))
        .route("/reset-session", post(reset_session))
        .route("/cache", delete(clear_cache))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub browser_healthy: bool,
    pub scheduler_running: bool,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: u64,
}

// ---------------------------------------------------------------------------
// Read paths
// ---------------------------------------------------------------------------

type Fixtures = Json<CacheRecord<Vec<Match>>>;

pub async fn upcoming_matches(State(state): State<AppState>) -> ApiResult<Fixtures> {
    fixtures(&state, MatchStatus::Upcoming).await
}

pub async fn live_matches(State(state): State<AppState>) -> ApiResult<Fixtures> {
    fixtures(&state, MatchStatus::Live).await
}

pub async fn completed_matches(State(state): State<AppState>) -> ApiResult<Fixtures> {
    fixtures(&state, MatchStatus::Completed).await
}

async fn fixtures(state: &AppState, status: MatchStatus) -> ApiResult<Fixtures> {
    Ok(Json(state.orchestrator.fixtures(status).await?))
}

pub async fn live_match_detail(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> ApiResult<Json<CacheRecord<LiveMatchDetail>>> {
    let match_id = MatchId::new(match_id)?;
    Ok(Json(state.orchestrator.live_detail(&match_id).await?))
}

pub async fn contests(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> ApiResult<Json<CacheRecord<ContestList>>> {
    let match_id = MatchId::new(match_id)?;
    Ok(Json(state.orchestrator.contests(&match_id).await?))
}

pub async fn scoreboard(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> ApiResult<Json<CacheRecord<Scoreboard>>> {
    let match_id = MatchId::new(match_id)?;
    Ok(Json(state.orchestrator.scoreboard(&match_id).await?))
}

pub async fn roster(
    State(state): State<AppState>,
    Path((match_id, contest_id)): Path<(String, String)>,
) -> ApiResult<Json<CacheRecord<Roster>>> {
    let match_id = MatchId::new(match_id)?;
    let contest_id = ContestId::new(contest_id)?;
    Ok(Json(state.orchestrator.roster(&match_id, &contest_id).await?))
}

// ---------------------------------------------------------------------------
// Operator endpoints
// ---------------------------------------------------------------------------

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let browser_healthy = state.orchestrator.session().is_healthy().await;
    Json(HealthResponse {
        status: if browser_healthy { "ok" } else { "degraded" },
        browser_healthy,
        scheduler_running: state.scheduler.is_running(),
    })
}

/// Store writes as server-sent events, one `update` event per write.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let updates = state.orchestrator.subscribe();
    let stream = stream::unfold(updates, |mut updates| async move {
        loop {
            match updates.recv().await {
                Ok(update) => {
                    let event = Event::default().event("update").json_data(&update);
                    return Some((event, updates));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub async fn reset_session(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    info!("Session reset requested");
    state.orchestrator.session().reset().await?;
    Ok(Json(StatusResponse { status: "reset" }))
}

pub async fn clear_cache(State(state): State<AppState>) -> ApiResult<Json<ClearResponse>> {
    let removed = state.orchestrator.clear_cache().await?;
    Ok(Json(ClearResponse { removed }))
}
