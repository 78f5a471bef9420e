//! Lifecycle of the single long-lived browser session.

use crate::actions::PageActions;
use crate::error::{BrowserError, Result};
use crate::launcher::{BrowserProcess, ChromeLauncher, Launcher};
use crate::page::{EphemeralPage, PrimaryPage};
use pitchside_core::{BrowserConfig, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Browser handle passed to extractors.
#[async_trait::async_trait]
pub trait BrowserSession: Send + Sync {
    /// Exclusive access to the primary page, relaunching the browser first
    /// if it is missing or unhealthy.
    async fn primary_page(&self) -> Result<PrimaryPage>;

    /// A new blank page with the session's identity.
    async fn open_page(&self) -> Result<EphemeralPage>;

    /// True if the browser process and the primary page both respond.
    async fn is_healthy(&self) -> bool;

    /// Close the browser and discard the persisted identity.
    async fn reset(&self) -> Result<()>;

    /// Close the browser, keeping the persisted identity.
    async fn close(&self);
}

struct LiveSession {
    process: Box<dyn BrowserProcess>,
    primary: Arc<dyn PageActions>,
}

impl LiveSession {
    async fn is_healthy(&self) -> bool {
        self.process.is_alive().await && self.primary.url().await.is_ok()
    }
}

/// Owns the browser process and the primary page.
///
/// The `session` slot is only locked for quick health checks and swaps. A relaunch
/// runs under the separate `relaunch` lock with the slot empty, so health
/// checks report unhealthy and page requests fail fast until it finishes.
pub struct SessionManager {
    config: BrowserConfig,
    landing_url: String,
    login_signal: String,
    launcher: Arc<dyn Launcher>,
    session: Mutex<Option<LiveSession>>,
    relaunch: Mutex<()>,
    primary_slot: Arc<Semaphore>,
    relaunch_policy: RetryPolicy,
    login_check_policy: RetryPolicy,
    login_check_timeout: Duration,
    last_used: std::sync::Mutex<Option<Instant>>,
}

impl SessionManager {
    /// Create a manager driving Chromium; the browser is launched lazily on
    /// first use.
    pub fn new(
        config: BrowserConfig,
        landing_url: impl Into<String>,
        login_signal: impl Into<String>,
    ) -> Self {
        Self::with_launcher(config, landing_url, login_signal, Arc::new(ChromeLauncher))
    }

    /// Create a manager that starts its browser through `launcher`.
    pub fn with_launcher(
        config: BrowserConfig,
        landing_url: impl Into<String>,
        login_signal: impl Into<String>,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        let relaunch_policy = RetryPolicy::new(
            config.launch_attempts,
            Duration::from_secs(config.launch_retry_delay_secs),
        );
        let login_check_policy = RetryPolicy::new(
            config.login_check_attempts,
            Duration::from_secs(config.login_check_retry_delay_secs),
        );
        let login_check_timeout = Duration::from_secs(config.login_check_timeout_secs);
        Self {
            config,
            landing_url: landing_url.into(),
            login_signal: login_signal.into(),
            launcher,
            session: Mutex::new(None),
            relaunch: Mutex::new(()),
            primary_slot: Arc::new(Semaphore::new(1)),
            relaunch_policy,
            login_check_policy,
            login_check_timeout,
            last_used: std::sync::Mutex::new(None),
        }
    }

    /// When the primary page was last handed out.
    pub fn last_used(&self) -> Option<Instant> {
        self.last_used.lock().ok().and_then(|guard| *guard)
    }

    /// Make sure a healthy session exists, relaunching under the retry
    /// policy if not. Returns the primary page.
    ///
    /// Fails with [`BrowserError::SessionUnavailable`] without waiting when
    /// another caller is already relaunching.
    pub async fn ensure_session(&self) -> Result<Arc<dyn PageActions>> {
        if let Some(primary) = self.healthy_primary().await {
            return Ok(primary);
        }

        let Ok(_relaunching) = self.relaunch.try_lock() else {
            return Err(BrowserError::SessionUnavailable(
                "browser relaunch in progress".to_string(),
            ));
        };
        // Another caller may have finished a relaunch since the health check
        if let Some(primary) = self.healthy_primary().await {
            return Ok(primary);
        }

        let live = self
            .relaunch_policy
            .run("Browser launch", |attempt| self.launch_once(attempt))
            .await
            .map_err(|e| BrowserError::SessionUnavailable(e.to_string()))?;

        let primary = Arc::clone(&live.primary);
        let replaced = self.session.lock().await.replace(live);
        if let Some(stale) = replaced {
            stale.process.shutdown().await;
        }
        info!("Browser session ready");
        Ok(primary)
    }

    /// The primary page of the current session if it is healthy. An
    /// unhealthy session is taken out of the slot and shut down.
    async fn healthy_primary(&self) -> Option<Arc<dyn PageActions>> {
        let mut slot = self.session.lock().await;
        let healthy = match slot.as_ref() {
            Some(live) => live.is_healthy().await,
            None => return None,
        };
        if healthy {
            return slot.as_ref().map(|live| Arc::clone(&live.primary));
        }

        warn!("Browser session unhealthy, relaunching");
        let stale = slot.take();
        drop(slot);
        if let Some(stale) = stale {
            stale.process.shutdown().await;
        }
        None
    }

    async fn launch_once(&self, attempt: u32) -> Result<LiveSession> {
        debug!("Launching browser (attempt {})", attempt);
        let process = self
            .launcher
            .launch(&self.config, self.config.headless)
            .await?;
        match process.open_page(&self.landing_url).await {
            Ok(primary) => Ok(LiveSession { process, primary }),
            Err(e) => {
                process.shutdown().await;
                Err(e)
            }
        }
    }

    /// Navigate the primary page to the landing page and wait for an element
    /// that only renders for an authenticated session.
    ///
    /// The check runs under its own retry policy. Running out of attempts on
    /// a timeout or navigation failure means signed out; other errors, such
    /// as a browser that cannot launch, are returned.
    pub async fn is_logged_in(&self) -> Result<bool> {
        let timeout = self.login_check_timeout;
        let outcome = self
            .login_check_policy
            .run("Login check", |_| async move {
                let page = self.primary_page().await?;
                page.goto(&self.landing_url).await?;
                page.wait_for_selector(&self.login_signal, timeout).await?;
                Ok(())
            })
            .await;

        match outcome {
            Ok(()) => Ok(true),
            Err(BrowserError::Timeout(reason) | BrowserError::NavigationError(reason)) => {
                warn!("Login marker never appeared: {}", reason);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Close the headless session and open a visible browser on the same
    /// profile so an operator can sign in. The caller shuts the returned
    /// process down once the operator is done.
    pub async fn open_for_login(&self) -> Result<Box<dyn BrowserProcess>> {
        self.close().await;

        let process = self.launcher.launch(&self.config, false).await?;
        match process.open_page(&self.landing_url).await {
            // The operator drives this tab; it closes with the process
            Ok(_page) => {}
            Err(e) => {
                process.shutdown().await;
                return Err(e);
            }
        }
        info!(
            "Login browser opened on {}; sign in, then stop the process",
            self.landing_url
        );
        Ok(process)
    }

    fn touch(&self) {
        if let Ok(mut guard) = self.last_used.lock() {
            *guard = Some(Instant::now());
        }
    }
}

#[async_trait::async_trait]
impl BrowserSession for SessionManager {
    async fn primary_page(&self) -> Result<PrimaryPage> {
        let permit = Arc::clone(&self.primary_slot)
            .acquire_owned()
            .await
            .map_err(|_| BrowserError::SessionUnavailable("primary page closed".to_string()))?;
        let page = self.ensure_session().await?;
        self.touch();
        Ok(PrimaryPage::new(page, permit))
    }

    async fn open_page(&self) -> Result<EphemeralPage> {
        self.ensure_session().await?;
        let slot = self.session.lock().await;
        let live = slot.as_ref().ok_or_else(|| {
            BrowserError::SessionUnavailable("session closed while opening page".to_string())
        })?;
        let page = live.process.open_page("about:blank").await?;
        Ok(EphemeralPage::new(page))
    }

    async fn is_healthy(&self) -> bool {
        match self.session.lock().await.as_ref() {
            Some(live) => live.is_healthy().await,
            None => false,
        }
    }

    async fn reset(&self) -> Result<()> {
        self.close().await;
        match tokio::fs::remove_dir_all(&self.config.session_dir).await {
            Ok(()) => {
                info!(
                    "Session identity at {} deleted",
                    self.config.session_dir.display()
                );
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn close(&self) {
        // Waits out a relaunch so its browser is not left running
        let _relaunching = self.relaunch.lock().await;
        let live = self.session.lock().await.take();
        if let Some(live) = live {
            live.process.shutdown().await;
            info!("Browser session closed");
        }
    }
}
