use crate::models::ListingRecord;
use crate::scrapers::traits::CapturedPage;
use crate::scrapers::types::SelectorSet;
use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

static FILL_PERCENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)%").expect("fill percentage pattern is valid")
});

#[derive(Debug, thiserror::Error)]
#[error("invalid {role} selector {css:?}: {reason}")]
pub struct InvalidSelector {
    pub role: &'static str,
    pub css: String,
    pub reason: String,
}

fn compile(role: &'static str, css: &str) -> Result<Selector, InvalidSelector> {
    Selector::parse(css).map_err(|e| InvalidSelector {
        role,
        css: css.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Pulls listing records out of a captured results page
#[derive(Debug)]
pub struct CardExtractor {
    marker_css: String,
    card: Selector,
    title: Selector,
    price: Selector,
    rating: Selector,
    image: Selector,
    link: Selector,
}

impl CardExtractor {
    /// Compile every selector up front so a typo fails before the browser starts
    pub fn new(selectors: &SelectorSet) -> Result<Self, InvalidSelector> {
        compile("marker", &selectors.marker)?;

        Ok(Self {
            marker_css: selectors.marker.clone(),
            card: compile("card", &selectors.card)?,
            title: compile("title", &selectors.title)?,
            price: compile("price", &selectors.price)?,
            rating: compile("rating", &selectors.rating)?,
            image: compile("image", &selectors.image)?,
            link: compile("link", &selectors.link)?,
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker_css
    }

    /// Extract at most `max_records` cards, in document order.
    ///
    /// Every field is looked up on its own; a missing element empties that
    /// field and nothing else.
    pub fn extract(
        &self,
        page: &CapturedPage,
        category: &str,
        max_records: usize,
    ) -> Vec<ListingRecord> {
        let document = Html::parse_document(&page.html);
        let base = page.url.as_deref().and_then(|u| Url::parse(u).ok());

        let cards: Vec<ElementRef> = document.select(&self.card).collect();
        debug!("Found {} cards for {}, keeping up to {}", cards.len(), category, max_records);

        cards
            .into_iter()
            .take(max_records)
            .map(|card| ListingRecord {
                captured_at: Local::now(),
                category: category.to_string(),
                title: text_of(card, &self.title).unwrap_or_default(),
                price: text_of(card, &self.price).unwrap_or_default(),
                rating: attr_of(card, &self.rating, "style").and_then(|style| parse_rating(&style)),
                image_url: attr_of(card, &self.image, "src")
                    .map(|src| resolve(base.as_ref(), &src))
                    .unwrap_or_default(),
                listing_url: attr_of(card, &self.link, "href")
                    .map(|href| resolve(base.as_ref(), &href))
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// Map a fill style such as `width: 80%` onto a 0-5 star value.
///
/// `pct / 20` rounded to one decimal, halves away from zero. `None` when no
/// percentage is present.
pub fn parse_rating(style: &str) -> Option<f64> {
    let caps = FILL_PERCENT.captures(style)?;
    let pct: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some((pct / 2.0).round() / 10.0)
}

fn text_of(card: ElementRef, selector: &Selector) -> Option<String> {
    let el = card.select(selector).next()?;
    let raw = el.text().collect::<String>();
    Some(raw.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn attr_of(card: ElementRef, selector: &Selector, attr: &str) -> Option<String> {
    card.select(selector)
        .next()?
        .value()
        .attr(attr)
        .map(|v| v.trim().to_string())
}

fn resolve(base: Option<&Url>, raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match base.and_then(|b| b.join(raw).ok()) {
        Some(url) => url.to_string(),
        None => raw.to_string(),
    }
}
