use crate::models::market::{CycleOutcome, MarketSnapshot};
use crate::scrapers::base::MarketScraper;
use crate::services::analysis::analyze;
use crate::services::scheduler::CycleRunner;
use crate::errors::Result;
use crate::config::Config;
use crate::util::{self, excel_utils};
use async_trait::async_trait;
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;

/// 数据服务，串联抓取、分析和报表写入
pub struct DataService {
    config: Config,
    scraper: Arc<dyn MarketScraper + Send + Sync>,
}

impl DataService {
    /// 创建新的数据服务实例
    pub fn new(config: Config, scraper: Arc<dyn MarketScraper + Send + Sync>) -> Self {
        Self { config, scraper }
    }

    /// 获取报表文件路径
    pub fn output_path(&self) -> &Path {
        &self.config.output_path
    }

    /// 抓取一次行情快照。任何网络或解析错误都只记录日志，返回空快照。
    pub async fn fetch_snapshot(&self) -> MarketSnapshot {
        match self.scraper.fetch_markets().await {
            Ok(mut records) => {
                util::limit_records(&mut records, self.config.query.per_page);
                records
            }
            Err(e) => {
                error!("Error fetching data from {}: {}", self.scraper.source_name(), e);
                Vec::new()
            }
        }
    }

    /// 执行一个完整周期：抓取 → 分析 → 写入
    pub async fn process_cycle(&self) -> Result<CycleOutcome> {
        let snapshot = self.fetch_snapshot().await;
        if snapshot.is_empty() {
            warn!("No market data this cycle, keeping previous report");
            return Ok(CycleOutcome::Skipped);
        }

        let summary = analyze(&snapshot);
        excel_utils::write_report(&self.config.output_path, &snapshot, summary.as_ref())?;
        info!("Excel updated successfully.");

        Ok(CycleOutcome::Written { records: snapshot.len() })
    }
}

#[async_trait]
impl CycleRunner for DataService {
    async fn run_cycle(&self) -> Result<CycleOutcome> {
        self.process_cycle().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DataHubError;
    use crate::models::market::MarketRecord;

    struct FixedScraper(Vec<MarketRecord>);

    #[async_trait]
    impl MarketScraper for FixedScraper {
        fn source_name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_markets(&self) -> Result<Vec<MarketRecord>> {
            Ok(self.0.clone())
        }
    }

    struct FailingScraper;

    #[async_trait]
    impl MarketScraper for FailingScraper {
        fn source_name(&self) -> &'static str {
            "failing"
        }

        async fn fetch_markets(&self) -> Result<Vec<MarketRecord>> {
            Err(DataHubError::DataError("connection reset".to_string()))
        }
    }

    fn coins(n: usize) -> Vec<MarketRecord> {
        (0..n)
            .map(|i| MarketRecord {
                name: format!("Coin {}", i),
                symbol: format!("C{}", i),
                price: i as f64,
                market_cap: (n - i) as f64,
                volume_24h: 1.0,
                change_24h: Some(i as f64),
            })
            .collect()
    }

    fn service(dir: &tempfile::TempDir, scraper: Arc<dyn MarketScraper + Send + Sync>) -> DataService {
        let config = Config::new().with_output_path(dir.path().join("crypto_data.xlsx"));
        DataService::new(config, scraper)
    }

    #[tokio::test]
    async fn failed_fetch_yields_empty_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir, Arc::new(FailingScraper));
        assert!(service.fetch_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_skips_write() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir, Arc::new(FailingScraper));
        assert_eq!(service.process_cycle().await.unwrap(), CycleOutcome::Skipped);
        assert!(!service.output_path().exists());
    }

    #[tokio::test]
    async fn oversized_page_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir, Arc::new(FixedScraper(coins(60))));
        let snapshot = service.fetch_snapshot().await;
        assert_eq!(snapshot.len(), 50);
        assert_eq!(snapshot[0].name, "Coin 0");
    }

    #[tokio::test]
    async fn successful_cycle_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir, Arc::new(FixedScraper(coins(3))));
        let outcome = service.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Written { records: 3 });
        assert!(service.output_path().exists());
    }

    #[tokio::test]
    async fn write_failure_surfaces_as_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new().with_output_path(dir.path().join("missing").join("crypto_data.xlsx"));
        let service = DataService::new(config, Arc::new(FixedScraper(coins(2))));
        assert!(service.process_cycle().await.is_err());
    }
}
