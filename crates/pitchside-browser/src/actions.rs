use crate::error::Result;
use std::time::Duration;

/// Operations extractors perform on a page.
///
/// Implemented by [`crate::ChromePage`] for real sessions; kept object safe
/// so extractors can be driven by scripted pages in tests.
#[async_trait::async_trait]
pub trait PageActions: Send + Sync {
    /// Navigate to a URL and wait for the load to settle
    async fn goto(&self, url: &str) -> Result<()>;

    /// Reload the current document
    async fn reload(&self) -> Result<()>;

    /// Current URL, if the page has one
    async fn url(&self) -> Result<Option<String>>;

    /// Wait until `selector` matches at least one element
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> Result<()>;

    /// Evaluate a JavaScript expression; `undefined` becomes `null`
    async fn evaluate(&self, expression: &str) -> Result<serde_json::Value>;

    /// Serialized DOM of the current document
    async fn content(&self) -> Result<String>;

    /// Scroll to the bottom of the document to trigger lazy loading
    async fn scroll_to_bottom(&self) -> Result<()> {
        self.evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map(|_| ())
    }

    /// Full-page PNG screenshot
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Close the page. Further calls fail.
    async fn close(&self) -> Result<()>;
}
