//! Readiness waits shared by the extractors.

use crate::error::{Result, ScrapeError};
use pitchside_browser::{BrowserError, PageActions};
use scraper::Html;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

const TEXT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Wait for the first of `selectors` to appear, trying them in order.
///
/// Each candidate gets the full `timeout`. Returns the selector that
/// matched, or [`ScrapeError::ReadinessTimeout`] naming every candidate.
pub async fn wait_for_any(
    page: &dyn PageActions,
    selectors: &[String],
    timeout: Duration,
    page_label: &str,
) -> Result<String> {
    for candidate in selectors {
        match page.wait_for_selector(candidate, timeout).await {
            Ok(()) => {
                debug!("{} ready on '{}'", page_label, candidate);
                return Ok(candidate.clone());
            }
            Err(BrowserError::Timeout(_) | BrowserError::SelectorNotFound(_)) => {
                debug!("'{}' did not appear on {}", candidate, page_label);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ScrapeError::ReadinessTimeout {
        page: page_label.to_string(),
        selectors: selectors.to_vec(),
    })
}

/// Close an overlay if one shows up within `timeout`. Never fails.
pub async fn dismiss_popups(page: &dyn PageActions, close_selector: &str, timeout: Duration) {
    if page.wait_for_selector(close_selector, timeout).await.is_ok() {
        match page.click(close_selector).await {
            Ok(()) => debug!("Dismissed popup"),
            Err(e) => debug!("Popup close click failed: {}", e),
        }
    }
}

fn document_contains(html: &str, text: &str) -> bool {
    Html::parse_document(html)
        .root_element()
        .text()
        .collect::<String>()
        .contains(text)
}

/// Poll the rendered text until it contains `text`.
pub async fn wait_for_text(
    page: &dyn PageActions,
    text: &str,
    timeout: Duration,
    page_label: &str,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if document_contains(&page.content().await?, text) {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ScrapeError::ReadinessTimeout {
                page: page_label.to_string(),
                selectors: vec![format!("text:{text}")],
            });
        }
        tokio::time::sleep(TEXT_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchside_browser::Result as BrowserResult;
    use std::sync::Mutex;

    /// Page whose DOM holds a fixed set of selectors and a fixed body.
    struct StaticPage {
        present: Vec<&'static str>,
        body: &'static str,
        waited: Mutex<Vec<String>>,
    }

    impl StaticPage {
        fn new(present: Vec<&'static str>, body: &'static str) -> Self {
            Self {
                present,
                body,
                waited: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl PageActions for StaticPage {
        async fn goto(&self, _url: &str) -> BrowserResult<()> {
            Ok(())
        }
        async fn reload(&self) -> BrowserResult<()> {
            Ok(())
        }
        async fn url(&self) -> BrowserResult<Option<String>> {
            Ok(None)
        }
        async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> BrowserResult<()> {
            self.waited.lock().unwrap().push(selector.to_string());
            if self.present.iter().any(|p| *p == selector) {
                Ok(())
            } else {
                Err(BrowserError::Timeout(selector.to_string()))
            }
        }
        async fn click(&self, _selector: &str) -> BrowserResult<()> {
            Ok(())
        }
        async fn evaluate(&self, _expression: &str) -> BrowserResult<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
        async fn content(&self) -> BrowserResult<String> {
            Ok(self.body.to_string())
        }
        async fn screenshot(&self) -> BrowserResult<Vec<u8>> {
            Ok(Vec::new())
        }
        async fn close(&self) -> BrowserResult<()> {
            Ok(())
        }
    }

    fn selectors(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_first_present_fallback_wins() {
        let page = StaticPage::new(vec![".score-container"], "");
        let matched = wait_for_any(
            &page,
            &selectors(&[".score-book", ".score-container", ".match-score"]),
            Duration::from_millis(10),
            "live match",
        )
        .await
        .unwrap();

        assert_eq!(matched, ".score-container");
        assert_eq!(
            *page.waited.lock().unwrap(),
            vec![".score-book", ".score-container"]
        );
    }

    #[tokio::test]
    async fn test_no_candidate_is_readiness_timeout() {
        let page = StaticPage::new(vec![], "");
        let err = wait_for_any(
            &page,
            &selectors(&[".a", ".b"]),
            Duration::from_millis(10),
            "contests",
        )
        .await
        .unwrap_err();

        match err {
            ScrapeError::ReadinessTimeout { page, selectors } => {
                assert_eq!(page, "contests");
                assert_eq!(selectors, vec![".a", ".b"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_text() {
        let page = StaticPage::new(vec![], "<html><body><h2>Contests</h2></body></html>");
        wait_for_text(&page, "Contests", Duration::from_secs(1), "contests")
            .await
            .unwrap();

        let err = wait_for_text(&page, "Scoreboard", Duration::from_secs(1), "scoreboard")
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::ReadinessTimeout { .. }));
    }
}
