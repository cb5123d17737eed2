use crate::scrapers::traits::{CapturedPage, MarkerWait, PageSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Launch settings for the Chrome session
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub user_agent: String,
    pub window_size: (u32, u32),
    /// How long Chrome may stay silent before the session is considered dead
    pub idle_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: false,
            user_agent: crate::config::DEFAULT_USER_AGENT.to_string(),
            window_size: (1920, 1080),
            idle_timeout: Duration::from_secs(120),
        }
    }
}

/// Page source backed by a single Chrome tab
pub struct ChromePageSource {
    // Dropping the browser kills the Chrome process
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromePageSource {
    /// Launch Chrome and open the tab every category will reuse
    pub fn launch(options: &BrowserOptions) -> Result<Self> {
        info!(
            "Launching {} Chrome...",
            if options.headless { "headless" } else { "visible" }
        );

        let launch = LaunchOptions::default_builder()
            .headless(options.headless)
            .sandbox(false)
            .window_size(Some(options.window_size))
            .idle_browser_timeout(options.idle_timeout)
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
            ])
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(launch).context("Failed to launch Chrome browser")?;
        let tab = browser.new_tab().context("Failed to open browser tab")?;
        tab.set_user_agent(&options.user_agent, None, None)
            .context("Failed to set user agent")?;

        Ok(Self { _browser: browser, tab })
    }

    fn page_html(&self) -> Result<String> {
        let result = self
            .tab
            .evaluate("document.documentElement.outerHTML", false)
            .context("Failed to read page HTML")?;

        match result.value {
            Some(value) => Ok(value.as_str().unwrap_or_default().to_string()),
            None => {
                warn!("Could not get HTML from page");
                Ok(String::new())
            }
        }
    }
}

#[async_trait]
impl PageSource for ChromePageSource {
    fn name(&self) -> &'static str {
        "chrome"
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Failed to navigate to {}", url))?;
        self.tab
            .wait_until_navigated()
            .with_context(|| format!("Navigation to {} never finished", url))?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<MarkerWait> {
        match self.tab.wait_for_element_with_custom_timeout(selector, timeout) {
            Ok(_) => Ok(MarkerWait::Ready),
            Err(err) if err.downcast_ref::<headless_chrome::util::Timeout>().is_some() => {
                debug!("No {} after {:?}", selector, timeout);
                Ok(MarkerWait::TimedOut)
            }
            Err(err) => Err(err.context(format!("Failed while waiting for {}", selector))),
        }
    }

    async fn capture(&self) -> Result<CapturedPage> {
        let html = self.page_html()?;
        let url = Some(self.tab.get_url()).filter(|u| !u.is_empty());
        Ok(CapturedPage { html, url })
    }

    async fn save_debug(&self, dir: &Path, stem: &str) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let html = self.page_html()?;
        let html_path = dir.join(format!("{}.html", stem));
        std::fs::write(&html_path, &html)?;
        info!("Saved page HTML to {} ({} bytes)", html_path.display(), html.len());

        let screenshot = self.tab.capture_screenshot(
            Page::CaptureScreenshotFormatOption::Png,
            None,
            None,
            true,
        )?;
        let png_path = dir.join(format!("{}.png", stem));
        std::fs::write(&png_path, screenshot)?;
        info!("Saved screenshot to {}", png_path.display());

        Ok(())
    }

    async fn close(&self) -> Result<()> {
        info!("Closing browser tab");
        self.tab.close(true).context("Failed to close browser tab")?;
        Ok(())
    }
}
