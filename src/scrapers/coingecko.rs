use crate::models::market::MarketRecord;
use crate::scrapers::base::MarketScraper;
use crate::config::{Config, MarketQuery};
use crate::errors::{Result, DataHubError};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::Client;
use serde::Deserialize;

/// `/coins/markets` 接口返回数组中的单个元素。
/// 数值字段必须存在，但可以为 null。
#[derive(Debug, Deserialize)]
struct CoinMarket {
    name: String,
    symbol: String,
    #[serde(deserialize_with = "Option::deserialize")]
    current_price: Option<f64>,
    #[serde(deserialize_with = "Option::deserialize")]
    market_cap: Option<f64>,
    #[serde(deserialize_with = "Option::deserialize")]
    total_volume: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
}

impl CoinMarket {
    /// `None` when price, market cap or volume is null.
    fn into_record(self) -> Option<MarketRecord> {
        Some(MarketRecord {
            price: self.current_price?,
            market_cap: self.market_cap?,
            volume_24h: self.total_volume?,
            symbol: self.symbol.to_uppercase(),
            name: self.name,
            change_24h: self.price_change_percentage_24h,
        })
    }
}

/// Parse a `/coins/markets` response body.
///
/// A missing required field fails the whole body. Rows carrying a null
/// price, market cap or volume are dropped on their own.
pub fn parse_markets(body: &str) -> Result<Vec<MarketRecord>> {
    let coins: Vec<CoinMarket> = serde_json::from_str(body)?;
    let mut records = Vec::with_capacity(coins.len());
    for coin in coins {
        let name = coin.name.clone();
        match coin.into_record() {
            Some(record) => records.push(record),
            None => warn!("Skipping {}: null price, market cap or volume", name),
        }
    }
    Ok(records)
}

/// CoinGecko 行情抓取器
pub struct CoinGeckoScraper {
    client: Client,
    endpoint: String,
    query: MarketQuery,
}

impl CoinGeckoScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(DataHubError::RequestError)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            query: config.query.clone(),
        })
    }
}

#[async_trait]
impl MarketScraper for CoinGeckoScraper {
    fn source_name(&self) -> &'static str {
        "CoinGecko"
    }

    async fn fetch_markets(&self) -> Result<Vec<MarketRecord>> {
        debug!("请求 {} 行情列表: {}", self.source_name(), self.endpoint);

        let response = self.client
            .get(&self.endpoint)
            .query(&self.query.to_pairs())
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        let records = parse_markets(&text)?;

        info!("成功获取 {} 个币种行情", records.len());
        Ok(records)
    }
}
