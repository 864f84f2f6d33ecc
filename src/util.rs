use log::info;
use crate::models::market::MarketRecord;

/// "Bitcoin (2.50%)" 形式的涨跌幅描述
pub fn format_change_label(name: &str, change: f64) -> String {
    format!("{} ({:.2}%)", name, change)
}

// 没有涨跌幅数据时写入 MISSING_VALUE
fn change_cell(record: Option<&MarketRecord>) -> String {
    record
        .and_then(|r| r.change_24h.map(|change| format_change_label(&r.name, change)))
        .unwrap_or_else(|| excel_utils::MISSING_VALUE.to_string())
}

// 限制快照记录数量
pub fn limit_records(records: &mut Vec<MarketRecord>, max_records: usize) {
    if records.len() > max_records {
        info!("Limiting {} market records to {}", records.len(), max_records);
        records.truncate(max_records);
    }
}

// Excel 读写工具
pub mod excel_utils {
    use super::change_cell;
    use crate::models::market::{MarketRecord, SummaryReport};
    use crate::errors::{Result, DataHubError};
    use calamine::{open_workbook_auto, DataType, Range, Reader};
    use log::info;
    use rust_xlsxwriter::{Format, Workbook, Worksheet};
    use std::path::Path;

    pub const LIVE_DATA_SHEET: &str = "Live Data";
    pub const ANALYSIS_SHEET: &str = "Analysis";

    pub const LIVE_DATA_HEADERS: [&str; 6] = [
        "Name",
        "Symbol",
        "Price (USD)",
        "Market Cap (USD)",
        "24h Volume (USD)",
        "24h Change (%)",
    ];
    pub const TOP_HEADERS: [&str; 2] = ["Name", "Market Cap (USD)"];
    pub const METRIC_HEADERS: [&str; 2] = ["Metric", "Value"];

    /// 指标表在 Analysis 工作表中的起始行（表头所在行）
    pub const METRICS_START_ROW: u32 = 10;

    pub const AVERAGE_PRICE_LABEL: &str = "Average Price";
    pub const HIGHEST_CHANGE_LABEL: &str = "Highest 24h Change";
    pub const LOWEST_CHANGE_LABEL: &str = "Lowest 24h Change";
    pub const MISSING_VALUE: &str = "n/a";

    /// 将行情快照和分析结果写入 Excel 文件，覆盖已有文件。
    /// 快照为空时不触碰文件。
    pub fn write_report(path: &Path, snapshot: &[MarketRecord], summary: Option<&SummaryReport>) -> Result<()> {
        if snapshot.is_empty() {
            info!("Empty snapshot, leaving {} untouched", path.display());
            return Ok(());
        }

        let header = Format::new().set_bold();
        let mut workbook = Workbook::new();

        let mut live = Worksheet::new();
        live.set_name(LIVE_DATA_SHEET)?;
        write_header_row(&mut live, 0, &LIVE_DATA_HEADERS, &header)?;
        for (i, record) in snapshot.iter().enumerate() {
            let row = i as u32 + 1;
            live.write_string(row, 0, &record.name)?;
            live.write_string(row, 1, &record.symbol)?;
            live.write_number(row, 2, record.price)?;
            live.write_number(row, 3, record.market_cap)?;
            live.write_number(row, 4, record.volume_24h)?;
            // 缺失的涨跌幅保持空单元格
            if let Some(change) = record.change_24h {
                live.write_number(row, 5, change)?;
            }
        }
        workbook.push_worksheet(live);

        if let Some(summary) = summary {
            let mut analysis = Worksheet::new();
            analysis.set_name(ANALYSIS_SHEET)?;

            write_header_row(&mut analysis, 0, &TOP_HEADERS, &header)?;
            for (i, entry) in summary.top_by_market_cap.iter().enumerate() {
                let row = i as u32 + 1;
                analysis.write_string(row, 0, &entry.name)?;
                analysis.write_number(row, 1, entry.market_cap)?;
            }

            write_header_row(&mut analysis, METRICS_START_ROW, &METRIC_HEADERS, &header)?;
            let highest = change_cell(summary.highest_change.as_ref());
            let lowest = change_cell(summary.lowest_change.as_ref());

            analysis.write_string(METRICS_START_ROW + 1, 0, AVERAGE_PRICE_LABEL)?;
            analysis.write_number(METRICS_START_ROW + 1, 1, summary.average_price)?;
            analysis.write_string(METRICS_START_ROW + 2, 0, HIGHEST_CHANGE_LABEL)?;
            analysis.write_string(METRICS_START_ROW + 2, 1, highest)?;
            analysis.write_string(METRICS_START_ROW + 3, 0, LOWEST_CHANGE_LABEL)?;
            analysis.write_string(METRICS_START_ROW + 3, 1, lowest)?;

            workbook.push_worksheet(analysis);
        }

        workbook.save(path)?;
        info!("Saved {} records to {}", snapshot.len(), path.display());
        Ok(())
    }

    fn write_header_row(sheet: &mut Worksheet, row: u32, titles: &[&str], format: &Format) -> Result<()> {
        for (col, title) in titles.iter().enumerate() {
            sheet.write_string_with_format(row, col as u16, *title, format)?;
        }
        Ok(())
    }

    /// 读取指定工作表；不存在时返回 `None`
    pub fn read_sheet(path: &Path, sheet: &str) -> Result<Option<Range<DataType>>> {
        let mut workbook = open_workbook_auto(path)?;
        if !workbook.sheet_names().iter().any(|name| name == sheet) {
            return Ok(None);
        }
        Ok(Some(workbook.worksheet_range(sheet)?))
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
        let workbook = open_workbook_auto(path)?;
        Ok(workbook.sheet_names().to_vec())
    }

    pub fn cell_string(range: &Range<DataType>, row: u32, col: u32) -> Option<String> {
        match range.get_value((row, col)) {
            Some(DataType::String(s)) => Some(s.clone()),
            _ => None,
        }
    }

    pub fn cell_f64(range: &Range<DataType>, row: u32, col: u32) -> Option<f64> {
        match range.get_value((row, col)) {
            Some(DataType::Float(f)) => Some(*f),
            Some(DataType::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn required_string(range: &Range<DataType>, row: u32, col: u32) -> Result<String> {
        cell_string(range, row, col)
            .ok_or_else(|| DataHubError::DataError(format!("Expected text at row {}, column {}", row, col)))
    }

    pub fn required_f64(range: &Range<DataType>, row: u32, col: u32) -> Result<f64> {
        cell_f64(range, row, col)
            .ok_or_else(|| DataHubError::DataError(format!("Expected number at row {}, column {}", row, col)))
    }
}
