// 公开导出的模块，供外部使用
pub mod models;
pub mod data_provider;
pub mod errors;
pub mod config;
pub mod scrapers;
pub mod services;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::market::{MarketRecord, MarketSnapshot, SummaryReport, TopEntry, CycleOutcome};
pub use data_provider::ReportProvider;
pub use config::{Config, MarketQuery};
pub use errors::{Result, DataHubError};
