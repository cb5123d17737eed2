use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A search bucket and the results page that lists it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    pub url: String,
}

/// One product card scraped from a results page.
///
/// Text fields are empty when the card had no matching element; the record
/// itself is still emitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    pub captured_at: DateTime<Local>,
    pub category: String,
    pub title: String,
    pub price: String,
    /// Star value on a 0-5 scale, `None` when the card carried no usable fill style
    pub rating: Option<f64>,
    pub image_url: String,
    pub listing_url: String,
}

/// How a single category pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOutcome {
    /// Marker appeared and this many records were extracted
    Extracted(usize),
    /// Marker appeared but no card matched
    NoCards,
    /// Marker never appeared within the wait timeout
    MarkerTimeout,
}

impl CategoryOutcome {
    pub fn record_count(&self) -> usize {
        match self {
            CategoryOutcome::Extracted(n) => *n,
            CategoryOutcome::NoCards | CategoryOutcome::MarkerTimeout => 0,
        }
    }
}
