use crate::models::market::MarketRecord;
use crate::errors::Result;
use async_trait::async_trait;

/// Base trait for market data scrapers
#[async_trait]
pub trait MarketScraper {
    /// Name of the upstream data source, used in log lines
    fn source_name(&self) -> &'static str;

    /// Fetch one page of market listings, in provider order
    async fn fetch_markets(&self) -> Result<Vec<MarketRecord>>;
}
