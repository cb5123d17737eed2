use crate::scrapers::traits::{CapturedPage, MarkerWait, PageSource};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Page source that fetches results pages over plain HTTP.
///
/// Works for sites that render cards server-side. There is nothing to wait
/// for once the body has arrived, so the marker check is a single lookup.
/// A response that misses the request timeout counts as a page that never
/// became ready, not as a session failure.
pub struct HttpPageSource {
    client: Client,
    current: Mutex<Option<LoadState>>,
}

/// What the last `navigate` left behind
#[derive(Debug, Clone)]
enum LoadState {
    Loaded(CapturedPage),
    /// The response did not arrive within the request timeout
    TimedOut { url: String },
}

impl HttpPageSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            current: Mutex::new(None),
        })
    }

    fn state(&self) -> Result<LoadState> {
        self.current
            .lock()
            .map_err(|_| anyhow!("HTTP page state poisoned"))?
            .clone()
            .ok_or_else(|| anyhow!("No page loaded"))
    }

    fn set_state(&self, state: LoadState) -> Result<()> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| anyhow!("HTTP page state poisoned"))?;
        *current = Some(state);
        Ok(())
    }

    fn current(&self) -> Result<CapturedPage> {
        match self.state()? {
            LoadState::Loaded(page) => Ok(page),
            LoadState::TimedOut { url } => Err(anyhow!("{} never finished loading", url)),
        }
    }

    async fn fetch(&self, url: &str) -> reqwest::Result<CapturedPage> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        let final_url = response.url().to_string();
        if !status.is_success() {
            // Error pages still get a marker check; a miss counts as no results
            warn!("{} returned status: {}", url, status);
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(CapturedPage {
            html,
            url: Some(final_url),
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Fetching URL: {}", url);

        match self.fetch(url).await {
            Ok(page) => self.set_state(LoadState::Loaded(page)),
            Err(err) if err.is_timeout() => {
                warn!("{} did not respond in time: {}", url, err);
                self.set_state(LoadState::TimedOut {
                    url: url.to_string(),
                })
            }
            Err(err) => Err(anyhow::Error::new(err).context(format!("Failed to fetch {}", url))),
        }
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<MarkerWait> {
        let page = match self.state()? {
            LoadState::Loaded(page) => page,
            LoadState::TimedOut { .. } => return Ok(MarkerWait::TimedOut),
        };
        let marker = Selector::parse(selector)
            .map_err(|e| anyhow!("Invalid marker selector {:?}: {:?}", selector, e))?;

        let found = Html::parse_document(&page.html).select(&marker).next().is_some();
        Ok(if found { MarkerWait::Ready } else { MarkerWait::TimedOut })
    }

    async fn capture(&self) -> Result<CapturedPage> {
        self.current()
    }

    async fn save_debug(&self, dir: &Path, stem: &str) -> Result<()> {
        let page = match self.state()? {
            LoadState::Loaded(page) => page,
            LoadState::TimedOut { .. } => return Ok(()),
        };
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(format!("{}.html", stem));
        tokio::fs::write(&path, &page.html).await?;
        info!("Saved page HTML to {} ({} bytes)", path.display(), page.html.len());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if let Ok(mut current) = self.current.lock() {
            current.take();
        }
        Ok(())
    }
}
