//! Page guards handed to extractors.
//!
//! [`PrimaryPage`] holds the single permit of the primary page; the permit
//! returns when the guard drops. [`EphemeralPage`] owns a freshly opened
//! tab; callers should [`EphemeralPage::close`] it, and a guard dropped
//! without closing schedules the close on the current runtime.

use crate::actions::PageActions;
use crate::error::Result;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, warn};

/// Exclusive access to the session's primary page.
pub struct PrimaryPage {
    page: Arc<dyn PageActions>,
    _permit: OwnedSemaphorePermit,
}

impl PrimaryPage {
    pub fn new(page: Arc<dyn PageActions>, permit: OwnedSemaphorePermit) -> Self {
        Self {
            page,
            _permit: permit,
        }
    }
}

impl Deref for PrimaryPage {
    type Target = dyn PageActions;

    fn deref(&self) -> &Self::Target {
        self.page.as_ref()
    }
}

/// A per-task page that is closed when the task is done with it.
pub struct EphemeralPage {
    page: Arc<dyn PageActions>,
    closed: bool,
}

impl EphemeralPage {
    pub fn new(page: Arc<dyn PageActions>) -> Self {
        Self {
            page,
            closed: false,
        }
    }

    /// Close the page now.
    pub async fn close(mut self) -> Result<()> {
        self.closed = true;
        self.page.close().await
    }
}

impl Deref for EphemeralPage {
    type Target = dyn PageActions;

    fn deref(&self) -> &Self::Target {
        self.page.as_ref()
    }
}

impl Drop for EphemeralPage {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let page = Arc::clone(&self.page);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("Ephemeral page dropped unclosed, closing in background");
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        warn!("Background page close failed: {}", e);
                    }
                });
            }
            Err(_) => warn!("Ephemeral page dropped outside a runtime, leaking tab"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrowserError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use tokio::sync::Semaphore;

    #[derive(Default)]
    struct CountingPage {
        closes: AtomicU32,
    }

    #[async_trait::async_trait]
    impl PageActions for CountingPage {
        async fn goto(&self, _url: &str) -> Result<()> {
            Ok(())
        }
        async fn reload(&self) -> Result<()> {
            Ok(())
        }
        async fn url(&self) -> Result<Option<String>> {
            Ok(None)
        }
        async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<()> {
            Err(BrowserError::Timeout(selector.to_string()))
        }
        async fn click(&self, _selector: &str) -> Result<()> {
            Ok(())
        }
        async fn evaluate(&self, _expression: &str) -> Result<serde_json::Value> {
            Ok(serde_json::Value::Null)
        }
        async fn content(&self) -> Result<String> {
            Ok(String::new())
        }
        async fn screenshot(&self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
        async fn close(&self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_explicit_close_closes_once() {
        let page = Arc::new(CountingPage::default());
        let guard = EphemeralPage::new(page.clone());
        guard.close().await.unwrap();
        tokio::task::yield_now().await;
        assert_eq!(page.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_page_is_closed_in_background() {
        let page = Arc::new(CountingPage::default());
        {
            let _guard = EphemeralPage::new(page.clone());
        }
        for _ in 0..10 {
            if page.closes.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(page.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_primary_page_releases_permit_on_drop() {
        let slot = Arc::new(Semaphore::new(1));
        let page: Arc<dyn PageActions> = Arc::new(CountingPage::default());

        let permit = slot.clone().acquire_owned().await.unwrap();
        let guard = PrimaryPage::new(page.clone(), permit);
        assert_eq!(slot.available_permits(), 0);
        assert!(guard.url().await.unwrap().is_none());

        drop(guard);
        assert_eq!(slot.available_permits(), 1);
    }
}
