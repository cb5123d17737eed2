use crate::models::{Category, CategoryOutcome, ListingRecord};
use crate::scrapers::extract::CardExtractor;
use crate::scrapers::traits::{MarkerWait, PageSource};
use crate::scrapers::types::ScrapeSettings;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Everything a finished run produced
#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub records: Vec<ListingRecord>,
    pub outcomes: Vec<(String, CategoryOutcome)>,
}

/// Drives one page source through every category, one at a time
pub struct ListingScraper<'a> {
    source: &'a dyn PageSource,
    extractor: CardExtractor,
    settings: ScrapeSettings,
}

impl<'a> ListingScraper<'a> {
    pub fn new(
        source: &'a dyn PageSource,
        extractor: CardExtractor,
        settings: ScrapeSettings,
    ) -> Self {
        Self {
            source,
            extractor,
            settings,
        }
    }

    /// Scrape every category in order, then release the page source.
    ///
    /// The source is closed even when a category fails; the first session
    /// error is returned after that.
    pub async fn run(&self, categories: &[Category]) -> Result<ScrapeReport> {
        let result = self.scrape_all(categories).await;

        if let Err(err) = self.source.close().await {
            warn!("Failed to release {} session: {:#}", self.source.name(), err);
        }

        result
    }

    async fn scrape_all(&self, categories: &[Category]) -> Result<ScrapeReport> {
        let mut report = ScrapeReport::default();

        for category in categories {
            info!("Scraping {}...", category.label);

            let (records, outcome) = self
                .scrape_category(category)
                .await
                .with_context(|| format!("Scraping {} failed", category.label))?;
            report.records.extend(records);
            report.outcomes.push((category.label.clone(), outcome));
        }

        Ok(report)
    }

    /// Extract one category's cards
    async fn scrape_category(
        &self,
        category: &Category,
    ) -> Result<(Vec<ListingRecord>, CategoryOutcome)> {
        self.source.navigate(&category.url).await?;
        tokio::time::sleep(self.settings.settle_delay).await;

        let wait = self
            .source
            .wait_for(self.extractor.marker(), self.settings.wait_timeout)
            .await?;

        if let Some(dir) = &self.settings.debug_dir {
            if let Err(err) = self.source.save_debug(dir, &file_stem(&category.label)).await {
                warn!("Could not save debug capture for {}: {:#}", category.label, err);
            }
        }

        if wait == MarkerWait::TimedOut {
            warn!(
                "No products found for {}: marker {:?} missing after {:?}",
                category.label,
                self.extractor.marker(),
                self.settings.wait_timeout
            );
            return Ok((Vec::new(), CategoryOutcome::MarkerTimeout));
        }

        let page = self.source.capture().await?;
        let records = self
            .extractor
            .extract(&page, &category.label, self.settings.max_records);

        let outcome = if records.is_empty() {
            warn!("Page for {} rendered but no cards matched", category.label);
            CategoryOutcome::NoCards
        } else {
            info!("Extracted {} listings for {}", records.len(), category.label);
            CategoryOutcome::Extracted(records.len())
        };

        Ok((records, outcome))
    }
}

/// Filesystem-friendly name for a category label
fn file_stem(label: &str) -> String {
    let stem: String = label
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if stem.is_empty() {
        "category".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::traits::CapturedPage;
    use crate::scrapers::types::SelectorSet;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves canned HTML per URL; URLs mapped to `None` never show the marker
    #[derive(Default)]
    struct StaticPages {
        pages: HashMap<String, Option<String>>,
        current: Mutex<Option<String>>,
        closed: Mutex<usize>,
        fail_on: Option<String>,
    }

    impl StaticPages {
        fn with(mut self, url: &str, html: Option<String>) -> Self {
            self.pages.insert(url.to_string(), html);
            self
        }
    }

    #[async_trait]
    impl PageSource for StaticPages {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn navigate(&self, url: &str) -> Result<()> {
            if self.fail_on.as_deref() == Some(url) {
                anyhow::bail!("browser crashed");
            }
            *self.current.lock().unwrap() = Some(url.to_string());
            Ok(())
        }

        async fn wait_for(&self, _selector: &str, _timeout: Duration) -> Result<MarkerWait> {
            let url = self.current.lock().unwrap().clone().unwrap();
            Ok(match self.pages.get(&url) {
                Some(Some(_)) => MarkerWait::Ready,
                _ => MarkerWait::TimedOut,
            })
        }

        async fn capture(&self) -> Result<CapturedPage> {
            let url = self.current.lock().unwrap().clone().unwrap();
            let html = self.pages.get(&url).cloned().flatten().unwrap_or_default();
            Ok(CapturedPage { html, url: Some(url) })
        }

        async fn close(&self) -> Result<()> {
            *self.closed.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn cards(n: usize) -> Option<String> {
        let body = (0..n)
            .map(|i| {
                format!(
                    "<div class=\"product-tuple-listing\"><p class=\"product-title\">Item {}</p>\
                     <div class=\"filled-stars\" style=\"width:60%\"></div></div>",
                    i
                )
            })
            .collect::<String>();
        Some(format!("<html><body>{}</body></html>", body))
    }

    fn category(label: &str, url: &str) -> Category {
        Category {
            label: label.to_string(),
            url: url.to_string(),
        }
    }

    fn settings(max_records: usize) -> ScrapeSettings {
        ScrapeSettings {
            max_records,
            wait_timeout: Duration::from_millis(10),
            settle_delay: Duration::ZERO,
            debug_dir: None,
        }
    }

    fn scraper<'a>(source: &'a StaticPages, max_records: usize) -> ListingScraper<'a> {
        let extractor = CardExtractor::new(&SelectorSet::default()).unwrap();
        ListingScraper::new(source, extractor, settings(max_records))
    }

    #[tokio::test]
    async fn caps_records_per_category_and_sums_rows() {
        let source = StaticPages::default()
            .with("https://a.test/", cards(25))
            .with("https://b.test/", cards(4));
        let categories = vec![
            category("Accessories", "https://a.test/"),
            category("Footwear", "https://b.test/"),
        ];

        let report = scraper(&source, 10).run(&categories).await.unwrap();

        assert_eq!(report.records.len(), 14);
        assert_eq!(
            report.outcomes,
            vec![
                ("Accessories".to_string(), CategoryOutcome::Extracted(10)),
                ("Footwear".to_string(), CategoryOutcome::Extracted(4)),
            ]
        );
        let total: usize = report.outcomes.iter().map(|(_, o)| o.record_count()).sum();
        assert_eq!(total, report.records.len());
        assert!(report.records[..10].iter().all(|r| r.category == "Accessories"));
        assert_eq!(report.records[0].title, "Item 0");
        assert_eq!(report.records[0].rating, Some(3.0));
    }

    #[tokio::test]
    async fn marker_timeout_contributes_zero_and_run_continues() {
        let source = StaticPages::default()
            .with("https://slow.test/", None)
            .with("https://b.test/", cards(2));
        let categories = vec![
            category("Men Clothing", "https://slow.test/"),
            category("Footwear", "https://b.test/"),
        ];

        let report = scraper(&source, 10).run(&categories).await.unwrap();

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.outcomes[0].1, CategoryOutcome::MarkerTimeout);
        assert_eq!(report.outcomes[1].1, CategoryOutcome::Extracted(2));
    }

    #[tokio::test]
    async fn rendered_page_without_cards_is_reported_separately() {
        let source = StaticPages::default()
            .with("https://empty.test/", Some("<html></html>".to_string()));
        let categories = vec![category("Accessories", "https://empty.test/")];

        let report = scraper(&source, 10).run(&categories).await.unwrap();

        assert!(report.records.is_empty());
        assert_eq!(report.outcomes[0].1, CategoryOutcome::NoCards);
    }

    #[tokio::test]
    async fn session_failure_propagates_and_still_closes() {
        let source = StaticPages {
            fail_on: Some("https://broken.test/".to_string()),
            ..StaticPages::default()
        }
        .with("https://a.test/", cards(1));
        let categories = vec![
            category("Accessories", "https://a.test/"),
            category("Footwear", "https://broken.test/"),
        ];

        let err = scraper(&source, 10).run(&categories).await.unwrap_err();

        assert!(format!("{:#}", err).contains("browser crashed"));
        assert_eq!(*source.closed.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn closes_once_after_success() {
        let source = StaticPages::default().with("https://a.test/", cards(1));
        scraper(&source, 10)
            .run(&[category("Accessories", "https://a.test/")])
            .await
            .unwrap();
        assert_eq!(*source.closed.lock().unwrap(), 1);
    }

    #[test]
    fn file_stem_is_filesystem_safe() {
        assert_eq!(file_stem("Men Clothing"), "men_clothing");
        assert_eq!(file_stem(""), "category");
    }
}
