use crypto_datahub::config::Config;
use crypto_datahub::data_provider::ReportProvider;
use crypto_datahub::models::market::MarketRecord;
use crypto_datahub::scrapers::coingecko::CoinGeckoScraper;
use crypto_datahub::services::data_service::DataService;
use crypto_datahub::services::scheduler::Scheduler;

use anyhow::Context;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let default_file = Config::new().output_path.display().to_string();

    let app = App::new("CryptoDataHub")
        .version("1.0.0")
        .author("DataHub Team")
        .about("Periodic crypto market snapshot to Excel")
        .subcommand(
            SubCommand::with_name("watch")
                .about("Fetch, analyze and write the report now and every 5 minutes (default)"),
        )
        .subcommand(
            SubCommand::with_name("explore")
                .about("Explore the last written report")
                .arg(
                    Arg::with_name("file")
                        .long("file")
                        .value_name("FILE")
                        .help("Report file to read")
                        .takes_value(true)
                        .default_value(&default_file),
                )
                .arg(
                    Arg::with_name("symbol")
                        .short('s')
                        .long("symbol")
                        .value_name("SYMBOL")
                        .help("Only show symbols containing this text")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("limit")
                        .short('l')
                        .long("limit")
                        .value_name("LIMIT")
                        .help("Limit the number of records to display")
                        .takes_value(true)
                        .default_value("10"),
                ),
        );

    let matches = app.get_matches();

    match matches.subcommand() {
        Some(("explore", sub)) => explore(sub),
        _ => watch().await,
    }
}

async fn watch() -> anyhow::Result<()> {
    let config = Config::new();
    let scheduler = Scheduler::from_config(&config);
    let scraper = CoinGeckoScraper::new(&config).context("failed to build HTTP client")?;

    info!("Writing report to {}", config.output_path.display());
    let data_service = DataService::new(config, Arc::new(scraper));

    scheduler.run(&data_service).await;
    Ok(())
}

fn parse_limit(raw: &str) -> anyhow::Result<usize> {
    raw.parse::<usize>()
        .with_context(|| format!("invalid --limit value '{}'", raw))
}

fn explore(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = PathBuf::from(matches.value_of("file").unwrap_or_default());
    let symbol_filter = matches.value_of("symbol").map(str::to_uppercase);
    let limit = parse_limit(matches.value_of("limit").unwrap_or("10"))?;

    let provider = ReportProvider::load_from_file(&path)
        .with_context(|| format!("failed to open report {}", path.display()))?;

    if let Some(updated) = provider.get_last_updated() {
        info!("Report last updated: {}", updated.format("%Y-%m-%d %H:%M:%S"));
    }

    // 过滤数据
    let filtered: Vec<&MarketRecord> = provider.get_all_records().iter()
        .filter(|r| symbol_filter.as_ref().map_or(true, |s| r.symbol.contains(s.as_str())))
        .collect();

    info!("Showing {} of {} records", filtered.len().min(limit), filtered.len());
    info!("{:-<96}", "");
    info!("{:<20} {:<8} {:>14} {:>20} {:>20} {:>10}",
             "Name", "Symbol", "Price", "Market Cap", "24h Volume", "24h %");
    info!("{:-<96}", "");

    for record in filtered.iter().take(limit) {
        let change = record.change_24h
            .map(|c| format!("{:.2}", c))
            .unwrap_or_else(|| "n/a".to_string());
        info!("{:<20} {:<8} {:>14.4} {:>20.0} {:>20.0} {:>10}",
                 record.name, record.symbol, record.price, record.market_cap,
                 record.volume_24h, change);
    }

    match provider.get_analysis() {
        Some(analysis) => {
            info!("Top {} by market cap:", analysis.top_by_market_cap.len());
            for (i, entry) in analysis.top_by_market_cap.iter().enumerate() {
                info!("  {}. {} ({:.0})", i + 1, entry.name, entry.market_cap);
            }
            if let Some(avg) = analysis.average_price {
                info!("Average Price: {:.4}", avg);
            }
            if let Some(high) = &analysis.highest_change {
                info!("Highest 24h Change: {}", high);
            }
            if let Some(low) = &analysis.lowest_change {
                info!("Lowest 24h Change: {}", low);
            }
        }
        None => info!("No analysis sheet in report"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_must_be_a_number() {
        assert_eq!(parse_limit("25").unwrap(), 25);
        let err = parse_limit("abc").unwrap_err();
        assert!(err.to_string().contains("invalid --limit value 'abc'"));
    }
}
