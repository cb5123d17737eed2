mod cli;
mod config;
mod logging;
mod models;
mod output;
mod scrapers;

use anyhow::Context;
use cli::Fetcher;
use scrapers::{BrowserOptions, ChromePageSource, HttpPageSource, ListingScraper, PageSource};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let opts = cli::parse();
    let mut config = config::load_config(opts.config.as_deref())?;

    if let Some(output) = &opts.output {
        config.output = output.clone();
    }
    if let Some(headless) = opts.headless_override() {
        config.headless = headless;
    }
    if let Some(max_records) = opts.max_records {
        config.max_records = max_records;
    }
    if let Some(secs) = opts.wait_timeout_secs {
        config.wait_timeout_secs = secs;
    }
    if let Some(secs) = opts.settle_delay_secs {
        config.settle_delay_secs = secs;
    }
    if !opts.categories.is_empty() {
        config.categories = opts
            .categories
            .iter()
            .map(|raw| config::parse_category(raw))
            .collect::<Result<_, _>>()?;
    }
    config.validate()?;

    let extractor = config.build_extractor()?;

    info!("🛒 Listing Scout");
    info!(
        "{} categories, up to {} listings each, marker wait {}s",
        config.categories.len(),
        config.max_records,
        config.wait_timeout_secs
    );

    let source: Box<dyn PageSource> = match opts.fetcher {
        Fetcher::Chrome => Box::new(ChromePageSource::launch(&BrowserOptions {
            headless: config.headless,
            user_agent: config.user_agent.clone(),
            ..BrowserOptions::default()
        })?),
        Fetcher::Http => Box::new(HttpPageSource::new(&config.user_agent, config.wait_timeout())?),
    };

    let scraper = ListingScraper::new(
        source.as_ref(),
        extractor,
        config.scrape_settings(opts.debug_dir.clone()),
    );
    let report = scraper.run(&config.categories).await?;

    for (label, outcome) in &report.outcomes {
        info!("  {}: {} listings ({:?})", label, outcome.record_count(), outcome);
    }
    info!("✅ Scraped {} listings in total", report.records.len());

    output::write_csv(&config.output, &report.records)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;
    info!("💾 Saved listings to {}", config.output.display());

    if let Some(json_path) = &opts.json {
        output::write_json(json_path, &report.records)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        info!("💾 Saved listings to {}", json_path.display());
    }

    Ok(())
}
