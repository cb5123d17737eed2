use crate::models::Category;
use crate::scrapers::extract::{CardExtractor, InvalidSelector};
use crate::scrapers::types::{ScrapeSettings, SelectorSet};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

const DEFAULT_CONFIG: &str = include_str!("../config/default.yml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("no categories configured")]
    NoCategories,
    #[error("category {label:?} has invalid url {url:?}: {source}")]
    InvalidUrl {
        label: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("category must look like LABEL=URL, got {0:?}")]
    MalformedCategory(String),
    #[error("max_records must be at least 1")]
    ZeroMaxRecords,
    #[error(transparent)]
    Selector(#[from] InvalidSelector),
}

/// Full run configuration as read from YAML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: PathBuf,
    pub headless: bool,
    pub wait_timeout_secs: u64,
    pub settle_delay_secs: u64,
    pub max_records: usize,
    pub user_agent: String,
    pub selectors: SelectorSet,
    pub categories: Vec<Category>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from("snapdeal_products.csv"),
            headless: false,
            wait_timeout_secs: 15,
            settle_delay_secs: 3,
            max_records: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            selectors: SelectorSet::default(),
            categories: Vec::new(),
        }
    }
}

impl Config {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn scrape_settings(&self, debug_dir: Option<PathBuf>) -> ScrapeSettings {
        ScrapeSettings {
            max_records: self.max_records,
            wait_timeout: self.wait_timeout(),
            settle_delay: Duration::from_secs(self.settle_delay_secs),
            debug_dir,
        }
    }

    /// Check everything that would otherwise only fail mid-run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        if self.max_records == 0 {
            return Err(ConfigError::ZeroMaxRecords);
        }
        for category in &self.categories {
            Url::parse(&category.url).map_err(|source| ConfigError::InvalidUrl {
                label: category.label.clone(),
                url: category.url.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Compile the configured selectors
    pub fn build_extractor(&self) -> Result<CardExtractor, ConfigError> {
        Ok(CardExtractor::new(&self.selectors)?)
    }
}

/// Load config from `path`, or the built-in default when none is given
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let text = match path {
        Some(p) => std::fs::read_to_string(p).map_err(|source| ConfigError::Read {
            path: p.to_path_buf(),
            source,
        })?,
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    Ok(serde_yaml::from_str(text)?)
}

/// Parse a `LABEL=URL` command-line category
pub fn parse_category(raw: &str) -> Result<Category, ConfigError> {
    let (label, url) = raw
        .split_once('=')
        .ok_or_else(|| ConfigError::MalformedCategory(raw.to_string()))?;
    let label = label.trim();
    let url = url.trim();
    if label.is_empty() {
        return Err(ConfigError::MalformedCategory(raw.to_string()));
    }

    Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
        label: label.to_string(),
        url: url.to_string(),
        source,
    })?;

    Ok(Category {
        label: label.to_string(),
        url: url.to_string(),
    })
}
