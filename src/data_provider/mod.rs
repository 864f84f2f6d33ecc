use chrono::{DateTime, Local};
use log::info;

use crate::models::market::{MarketRecord, TopEntry};
use crate::errors::{Result, DataHubError};
use crate::util::excel_utils::{self, ANALYSIS_SHEET, LIVE_DATA_SHEET, METRICS_START_ROW};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 从磁盘上读取的 Analysis 工作表内容
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSheet {
    pub top_by_market_cap: Vec<TopEntry>,
    pub average_price: Option<f64>,
    pub highest_change: Option<String>,
    pub lowest_change: Option<String>,
}

/// 报表数据提供者，用于读取最近一次写入的 Excel 报表
pub struct ReportProvider {
    path: PathBuf,
    data: Vec<MarketRecord>,
    analysis: Option<AnalysisSheet>,
    symbol_index: HashMap<String, usize>,
}

impl ReportProvider {
    /// 从文件加载报表
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DataHubError::DataError(format!("Report file {} not found", path.display())));
        }

        let data = Self::read_live_data(path)?;
        let analysis = Self::read_analysis(path)?;
        info!("Loaded {} records from {}", data.len(), path.display());

        let mut provider = Self {
            path: path.to_path_buf(),
            data,
            analysis,
            symbol_index: HashMap::new(),
        };

        provider.rebuild_indices();

        Ok(provider)
    }

    /// 获取所有行情记录，保持报表中的顺序
    pub fn get_all_records(&self) -> &[MarketRecord] {
        &self.data
    }

    /// 按代码查找，大小写不敏感
    pub fn get_record_by_symbol(&self, symbol: &str) -> Option<&MarketRecord> {
        self.symbol_index.get(&symbol.to_uppercase()).map(|&idx| &self.data[idx])
    }

    pub fn get_analysis(&self) -> Option<&AnalysisSheet> {
        self.analysis.as_ref()
    }

    /// 报表文件的最后修改时间
    pub fn get_last_updated(&self) -> Option<DateTime<Local>> {
        fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
            .map(DateTime::<Local>::from)
    }

    fn rebuild_indices(&mut self) {
        self.symbol_index.clear();
        for (i, record) in self.data.iter().enumerate() {
            self.symbol_index.entry(record.symbol.to_uppercase()).or_insert(i);
        }
    }

    fn read_live_data(path: &Path) -> Result<Vec<MarketRecord>> {
        let range = excel_utils::read_sheet(path, LIVE_DATA_SHEET)?
            .ok_or_else(|| DataHubError::DataError(format!("Sheet '{}' missing from {}", LIVE_DATA_SHEET, path.display())))?;

        let mut records = Vec::new();
        let height = range.end().map(|(row, _)| row + 1).unwrap_or(0);

        // 第 0 行是表头
        for row in 1..height {
            if excel_utils::cell_string(&range, row, 0).is_none() {
                continue;
            }
            records.push(MarketRecord {
                name: excel_utils::required_string(&range, row, 0)?,
                symbol: excel_utils::required_string(&range, row, 1)?,
                price: excel_utils::required_f64(&range, row, 2)?,
                market_cap: excel_utils::required_f64(&range, row, 3)?,
                volume_24h: excel_utils::required_f64(&range, row, 4)?,
                change_24h: excel_utils::cell_f64(&range, row, 5),
            });
        }

        Ok(records)
    }

    fn read_analysis(path: &Path) -> Result<Option<AnalysisSheet>> {
        let range = match excel_utils::read_sheet(path, ANALYSIS_SHEET)? {
            Some(range) => range,
            None => return Ok(None),
        };

        let mut top_by_market_cap = Vec::new();
        for row in 1..METRICS_START_ROW {
            let name = match excel_utils::cell_string(&range, row, 0) {
                Some(name) => name,
                None => break,
            };
            top_by_market_cap.push(TopEntry {
                name,
                market_cap: excel_utils::required_f64(&range, row, 1)?,
            });
        }

        let mut sheet = AnalysisSheet {
            top_by_market_cap,
            average_price: None,
            highest_change: None,
            lowest_change: None,
        };

        for row in METRICS_START_ROW + 1..=METRICS_START_ROW + 3 {
            match excel_utils::cell_string(&range, row, 0).as_deref() {
                Some(excel_utils::AVERAGE_PRICE_LABEL) => {
                    sheet.average_price = excel_utils::cell_f64(&range, row, 1);
                }
                Some(excel_utils::HIGHEST_CHANGE_LABEL) => {
                    sheet.highest_change = excel_utils::cell_string(&range, row, 1);
                }
                Some(excel_utils::LOWEST_CHANGE_LABEL) => {
                    sheet.lowest_change = excel_utils::cell_string(&range, row, 1);
                }
                _ => {}
            }
        }

        Ok(Some(sheet))
    }
}
