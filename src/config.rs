use std::path::PathBuf;
use std::time::Duration;

pub const COINGECKO_MARKETS_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";
pub const DEFAULT_OUTPUT_FILE: &str = "crypto_data.xlsx";

/// 行情列表接口的查询参数
#[derive(Debug, Clone, PartialEq)]
pub struct MarketQuery {
    pub vs_currency: String,
    pub order: String,
    pub per_page: usize,
    pub page: u32,
    pub sparkline: bool,
}

impl MarketQuery {
    pub fn new() -> Self {
        Self {
            vs_currency: "usd".to_string(),
            order: "market_cap_desc".to_string(),
            per_page: 50,
            page: 1,
            sparkline: false,
        }
    }

    /// Render as `(key, value)` pairs for `RequestBuilder::query`.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("vs_currency", self.vs_currency.clone()),
            ("order", self.order.clone()),
            ("per_page", self.per_page.to_string()),
            ("page", self.page.to_string()),
            ("sparkline", self.sparkline.to_string()),
        ]
    }
}

impl Default for MarketQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub query: MarketQuery,
    pub output_path: PathBuf,
    pub poll_interval: Duration,
    pub tick: Duration,
    pub request_timeout: Duration,
}

impl Config {
    pub fn new() -> Self {
        Self {
            endpoint: COINGECKO_MARKETS_URL.to_string(),
            query: MarketQuery::new(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            poll_interval: Duration::from_secs(5 * 60),
            tick: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_query(mut self, query: MarketQuery) -> Self {
        self.query = query;
        self
    }

    pub fn with_output_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
