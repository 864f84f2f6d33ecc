use serde::Serialize;

/// 单个币种的行情记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketRecord {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    /// 24小时涨跌幅(%)，数据源可能缺失
    pub change_24h: Option<f64>,
}

/// 一次抓取得到的行情快照，保持数据源返回的顺序
pub type MarketSnapshot = Vec<MarketRecord>;

/// Top-5 表中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopEntry {
    pub name: String,
    pub market_cap: f64,
}

/// Derived view over a non-empty snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub top_by_market_cap: Vec<TopEntry>,
    pub average_price: f64,
    /// `None` when no record carries a 24h change.
    pub highest_change: Option<MarketRecord>,
    pub lowest_change: Option<MarketRecord>,
}

/// 单次周期的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Written { records: usize },
    Skipped,
}
