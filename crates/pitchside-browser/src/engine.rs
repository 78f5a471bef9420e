use crate::actions::PageActions;
use crate::error::{BrowserError, Result};
use crate::fingerprint::{FingerprintConfig, ANTI_DETECTION_ARGS};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    EnableParams, EventRequestPaused, FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, Headers, ResourceType, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use pitchside_core::BrowserConfig;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

fn resource_type(name: &str) -> Option<ResourceType> {
    match name.to_ascii_lowercase().as_str() {
        "image" => Some(ResourceType::Image),
        "stylesheet" => Some(ResourceType::Stylesheet),
        "font" => Some(ResourceType::Font),
        "media" => Some(ResourceType::Media),
        "script" => Some(ResourceType::Script),
        _ => None,
    }
}

/// One running Chromium process and the identity its pages present.
pub struct BrowserEngine {
    browser: Browser,
    handler: JoinHandle<()>,
    fingerprint: FingerprintConfig,
    blocked: Vec<ResourceType>,
    navigation_timeout: Duration,
}

impl BrowserEngine {
    /// Launch Chromium against the persisted profile in `config.session_dir`.
    ///
    /// `headless` is passed separately so the interactive login flow can
    /// reuse the same profile with a visible window.
    pub async fn launch(config: &BrowserConfig, headless: bool) -> Result<Self> {
        let fingerprint = FingerprintConfig::randomized();
        let navigation_timeout = Duration::from_secs(config.navigation_timeout_secs);

        let mut builder = ChromeConfig::builder()
            .user_data_dir(&config.session_dir)
            .window_size(fingerprint.viewport_width, fingerprint.viewport_height)
            .viewport(None)
            .request_timeout(navigation_timeout)
            .args(ANTI_DETECTION_ARGS);
        if !headless {
            builder = builder.with_head();
        }
        if config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }
        let chrome_config = builder.build().map_err(BrowserError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("Browser handler event error: {}", e);
                }
            }
        });

        let blocked = config
            .blocked_resources
            .iter()
            .filter_map(|name| {
                let parsed = resource_type(name);
                if parsed.is_none() {
                    warn!("Ignoring unknown blocked resource type '{}'", name);
                }
                parsed
            })
            .collect();

        debug!(
            "Browser launched (headless: {}, user agent: {})",
            headless, fingerprint.user_agent
        );

        Ok(Self {
            browser,
            handler,
            fingerprint,
            blocked,
            navigation_timeout,
        })
    }

    /// Identity used by pages of this launch.
    pub fn fingerprint(&self) -> &FingerprintConfig {
        &self.fingerprint
    }

    /// Open a page with this launch's identity and resource blocking, then
    /// navigate it to `url`.
    pub async fn new_page(&self, url: &str) -> Result<ChromePage> {
        let page = self.browser.new_page("about:blank").await?;

        page.set_user_agent(SetUserAgentOverrideParams::new(
            self.fingerprint.user_agent.clone(),
        ))
        .await?;
        page.execute(SetExtraHttpHeadersParams::new(Headers::new(
            self.fingerprint.extra_headers(),
        )))
        .await?;

        let blocker = self.block_resources(&page).await?;
        let page = ChromePage {
            page,
            blocker,
            navigation_timeout: self.navigation_timeout,
        };

        if url != "about:blank" {
            if let Err(e) = page.goto(url).await {
                let _ = page.close().await;
                return Err(e);
            }
        }
        Ok(page)
    }

    /// Pause matching requests in the Fetch domain and fail each one.
    async fn block_resources(&self, page: &Page) -> Result<Option<JoinHandle<()>>> {
        if self.blocked.is_empty() {
            return Ok(None);
        }

        let mut paused = page.event_listener::<EventRequestPaused>().await?;
        let patterns: Vec<RequestPattern> = self
            .blocked
            .iter()
            .map(|resource| {
                RequestPattern::builder()
                    .url_pattern("*")
                    .resource_type(resource.clone())
                    .request_stage(RequestStage::Request)
                    .build()
            })
            .collect();
        page.execute(EnableParams::builder().patterns(patterns).build())
            .await?;

        let interceptor = page.clone();
        Ok(Some(tokio::spawn(async move {
            while let Some(event) = paused.next().await {
                let fail =
                    FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
                if let Err(e) = interceptor.execute(fail).await {
                    trace!("Failed to abort blocked request: {}", e);
                }
            }
        })))
    }

    /// Succeeds while the browser process answers CDP commands.
    pub async fn version(&self) -> Result<String> {
        let version = self.browser.version().await?;
        Ok(version.product)
    }

    /// Shut the browser down and wait for the process to exit.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();
        debug!("Browser closed");
    }
}

/// A Chromium tab driven over CDP.
pub struct ChromePage {
    page: Page,
    blocker: Option<JoinHandle<()>>,
    navigation_timeout: Duration,
}

#[async_trait::async_trait]
impl PageActions for ChromePage {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| BrowserError::Timeout(format!("navigation to {url}")))?
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        tokio::time::timeout(self.navigation_timeout, self.page.reload())
            .await
            .map_err(|_| BrowserError::Timeout("page reload".to_string()))?
            .map_err(|e| BrowserError::NavigationError(format!("reload: {e}")))?;
        Ok(())
    }

    async fn url(&self) -> Result<Option<String>> {
        Ok(self.page.url().await?)
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!(
                    "selector '{selector}' after {timeout:?}"
                )));
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
        }
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound(selector.to_string()))?;
        element.click().await?;
        Ok(())
    }

    async fn evaluate(&self, expression: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|e| BrowserError::EvaluationError(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn content(&self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder().full_page(true).build();
        Ok(self.page.screenshot(params).await?)
    }

    async fn close(&self) -> Result<()> {
        if let Some(blocker) = &self.blocker {
            blocker.abort();
        }
        self.page.clone().close().await?;
        Ok(())
    }
}
