use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetcher {
    /// Drive a real Chrome session
    Chrome,
    /// Plain HTTP GET, no JavaScript
    Http,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape product listings from search-results pages into CSV")]
pub struct CliOptions {
    /// Optional path to config file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// CSV output path (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write the records as pretty JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Run Chrome without a window
    #[arg(long, conflicts_with = "visible")]
    pub headless: bool,

    /// Run Chrome with a window
    #[arg(long)]
    pub visible: bool,

    /// Cards kept per category
    #[arg(long)]
    pub max_records: Option<usize>,

    /// Seconds to wait for the first card
    #[arg(long)]
    pub wait_timeout_secs: Option<u64>,

    /// Seconds to pause after each navigation
    #[arg(long)]
    pub settle_delay_secs: Option<u64>,

    /// Page source
    #[arg(long, value_enum, default_value_t = Fetcher::Chrome)]
    pub fetcher: Fetcher,

    /// Save page HTML (and screenshots with Chrome) per category
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// Category as LABEL=URL; repeat to scrape several. Replaces configured categories
    #[arg(short = 'C', long = "category")]
    pub categories: Vec<String>,
}

impl CliOptions {
    /// Visibility override, if either flag was given
    pub fn headless_override(&self) -> Option<bool> {
        match (self.headless, self.visible) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

pub fn parse() -> CliOptions {
    CliOptions::parse()
}
