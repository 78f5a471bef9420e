//! The seam between [`crate::SessionManager`] and the browser process it
//! keeps alive.

use crate::actions::PageActions;
use crate::engine::BrowserEngine;
use crate::error::Result;
use pitchside_core::BrowserConfig;
use std::sync::Arc;

/// A running browser the session manager can health-check, open pages in and
/// shut down.
#[async_trait::async_trait]
pub trait BrowserProcess: Send + Sync {
    /// True while the process answers commands.
    async fn is_alive(&self) -> bool;

    /// Open a page with the launch's identity and navigate it to `url`.
    async fn open_page(&self, url: &str) -> Result<Arc<dyn PageActions>>;

    /// Shut the process down and wait for it to exit.
    async fn shutdown(self: Box<Self>);
}

/// Starts browser processes for the session manager.
#[async_trait::async_trait]
pub trait Launcher: Send + Sync {
    /// Start one process against the profile in `config.session_dir`.
    async fn launch(&self, config: &BrowserConfig, headless: bool)
        -> Result<Box<dyn BrowserProcess>>;
}

/// Launches Chromium through [`BrowserEngine`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeLauncher;

#[async_trait::async_trait]
impl Launcher for ChromeLauncher {
    async fn launch(
        &self,
        config: &BrowserConfig,
        headless: bool,
    ) -> Result<Box<dyn BrowserProcess>> {
        tokio::fs::create_dir_all(&config.session_dir).await?;
        let engine = BrowserEngine::launch(config, headless).await?;
        Ok(Box::new(engine))
    }
}

#[async_trait::async_trait]
impl BrowserProcess for BrowserEngine {
    async fn is_alive(&self) -> bool {
        self.version().await.is_ok()
    }

    async fn open_page(&self, url: &str) -> Result<Arc<dyn PageActions>> {
        let page = self.new_page(url).await?;
        Ok(Arc::new(page))
    }

    async fn shutdown(self: Box<Self>) {
        (*self).close().await;
    }
}
