use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// CSS selectors locating cards and the fields inside them
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SelectorSet {
    /// Element whose presence means the page has rendered
    pub marker: String,
    /// One product card
    pub card: String,
    /// Title text, relative to the card
    pub title: String,
    /// Price text, relative to the card
    pub price: String,
    /// Star fill element; its `style` attribute holds the percentage
    pub rating: String,
    /// Image; its `src` attribute is taken
    pub image: String,
    /// Link; its `href` attribute is taken
    pub link: String,
}

impl Default for SelectorSet {
    fn default() -> Self {
        Self {
            marker: "div.product-tuple-listing".to_string(),
            card: "div.product-tuple-listing".to_string(),
            title: "p.product-title".to_string(),
            price: "span.product-price".to_string(),
            rating: ".filled-stars".to_string(),
            image: "img".to_string(),
            link: "a".to_string(),
        }
    }
}

/// Per-run knobs for the category loop
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Cards kept per category, in document order
    pub max_records: usize,
    /// Upper bound on the marker wait
    pub wait_timeout: Duration,
    /// Fixed pause after navigation
    pub settle_delay: Duration,
    /// Where to drop page HTML and screenshots, if anywhere
    pub debug_dir: Option<PathBuf>,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            max_records: 10,
            wait_timeout: Duration::from_secs(15),
            settle_delay: Duration::from_secs(3),
            debug_dir: None,
        }
    }
}
