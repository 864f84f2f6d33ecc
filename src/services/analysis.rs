use crate::models::market::{MarketRecord, SummaryReport, TopEntry};

pub const TOP_N: usize = 5;

/// 对行情快照做汇总分析；快照为空时返回 `None`
pub fn analyze(snapshot: &[MarketRecord]) -> Option<SummaryReport> {
    if snapshot.is_empty() {
        return None;
    }

    // 稳定排序，市值相同时保持原有顺序
    let mut ranked: Vec<&MarketRecord> = snapshot.iter().collect();
    ranked.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
    let top_by_market_cap = ranked
        .into_iter()
        .take(TOP_N)
        .map(|r| TopEntry {
            name: r.name.clone(),
            market_cap: r.market_cap,
        })
        .collect();

    let average_price = snapshot.iter().map(|r| r.price).sum::<f64>() / snapshot.len() as f64;

    Some(SummaryReport {
        top_by_market_cap,
        average_price,
        highest_change: extreme_change(snapshot, |candidate, best| candidate > best).cloned(),
        lowest_change: extreme_change(snapshot, |candidate, best| candidate < best).cloned(),
    })
}

/// First record whose change beats every earlier one under `better`.
/// Records without a 24h change never take part.
fn extreme_change<F>(snapshot: &[MarketRecord], better: F) -> Option<&MarketRecord>
where
    F: Fn(f64, f64) -> bool,
{
    let mut best: Option<(&MarketRecord, f64)> = None;
    for record in snapshot {
        let change = match record.change_24h {
            Some(c) if !c.is_nan() => c,
            _ => continue,
        };
        match best {
            Some((_, current)) if !better(change, current) => {}
            _ => best = Some((record, change)),
        }
    }
    best.map(|(record, _)| record)
}
