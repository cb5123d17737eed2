use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Result of waiting for the marker element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerWait {
    Ready,
    TimedOut,
}

/// DOM snapshot of the current page
#[derive(Debug, Clone)]
pub struct CapturedPage {
    pub html: String,
    /// Final page URL, used to resolve relative links
    pub url: Option<String>,
}

/// A session that can load results pages and hand back their DOM.
///
/// Errors returned from any method are session failures and end the run.
/// A marker that never shows up is not an error; it comes back as
/// `MarkerWait::TimedOut`.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Name of the backend, for logs
    fn name(&self) -> &'static str;

    /// Load `url` in the session
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until at least one element matches `selector`, or `timeout` passes
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<MarkerWait>;

    /// Snapshot the current DOM
    async fn capture(&self) -> Result<CapturedPage>;

    /// Dump whatever helps debug a page into `dir`, files named after `stem`
    async fn save_debug(&self, _dir: &Path, _stem: &str) -> Result<()> {
        Ok(())
    }

    /// Release the session. Called once, at the end of the run.
    async fn close(&self) -> Result<()>;
}
