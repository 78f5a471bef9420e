//! Pitchside service entry point.
//!
//! Wires configuration, the store, the browser session, the read path and
//! the refresh loop together, then serves the HTTP API until Ctrl-C.

pub mod error;
pub mod routes;
pub mod state;

use anyhow::Context;
use pitchside_browser::{BrowserProcess, BrowserSession, SessionManager};
use pitchside_core::{AppConfig, TtlPolicy};
use pitchside_db::Database;
use pitchside_scheduler::Scheduler;
use pitchside_scraper::{Extractor, Orchestrator};
use std::sync::Arc;
use tracing::{info, warn};

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pitchside=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting Pitchside v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("failed to load configuration")?;

    let db = Database::new(&config.store.database_path)
        .await
        .with_context(|| format!("failed to open {}", config.store.database_path.display()))?;
    db.run_migrations().await.context("failed to migrate store")?;
    let store = db.cache_store(&config.store);

    let session = Arc::new(SessionManager::new(
        config.browser.clone(),
        config.scraping.base_url.clone(),
        config.selectors.login_signal.clone(),
    ));

    let logged_in = match session.is_logged_in().await {
        Ok(logged_in) => logged_in,
        Err(e) => {
            warn!("Login check failed: {}", e);
            false
        }
    };
    if !logged_in {
        warn!("Session is not signed in; opening a visible browser for manual login");
        let login_browser = session
            .open_for_login()
            .await
            .context("failed to open login browser")?;
        shutdown_signal().await;
        login_browser.shutdown().await;
        db.close().await;
        info!("Login browser closed; restart to serve with the saved session");
        return Ok(());
    }

    let extractor = Extractor::new(session.clone(), &config.scraping, &config.selectors)
        .context("invalid scraping configuration")?;
    let orchestrator = Arc::new(Orchestrator::new(
        extractor,
        store,
        TtlPolicy::from_config(&config.cache),
    ));

    let scheduler = Arc::new(Scheduler::new(orchestrator.clone(), &config.scheduler));
    let refresh_loop = if config.scheduler.enabled {
        scheduler.start()
    } else {
        info!("Background refresh disabled");
        None
    };

    let app = routes::router(state::AppState::new(orchestrator, scheduler.clone()));
    let bind_addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop();
    if let Some(handle) = refresh_loop {
        if let Err(e) = handle.await {
            warn!("Refresh loop ended abnormally: {}", e);
        }
    }
    session.close().await;
    db.close().await;
    info!("Pitchside stopped");
    Ok(())
}
