use tracing::{info, warn};

use crate::config::Config;
use crate::fetcher;
use crate::scorer;
use crate::types::{AlertLevel, Commodity, CommodityResult, PriceStats};

/// Outcome of one full scan over the configured commodity list.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Ranked descending by score; ties keep their configured order.
    pub results: Vec<CommodityResult>,
    pub max_score: u32,
    pub level: AlertLevel,
}

/// Fetch, score, and rank every configured commodity. A provider failure never
/// aborts the scan: the affected commodity is recorded as a zero-score
/// placeholder and the loop moves on.
pub async fn run_scan(cfg: &Config, client: &reqwest::Client) -> ScanOutcome {
    // The shipping proxy feeds every commodity's S6, so it is resolved once
    // before any scoring happens.
    let shipping_change = fetcher::fetch_shipping_change(cfg, client).await;
    info!("shipping-cost proxy: {shipping_change:+.1}%");

    let mut results = Vec::with_capacity(cfg.commodities.len());
    for commodity in &cfg.commodities {
        info!(symbol = %commodity.symbol, "scanning {}", commodity.name);

        let stats = match fetcher::fetch_price_stats(cfg, client, &commodity.symbol).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(
                    symbol = %commodity.symbol,
                    error = %e,
                    "price fetch failed; recording zero-score placeholder"
                );
                results.push(CommodityResult::unavailable(commodity));
                continue;
            }
        };

        let spike = fetcher::fetch_search_spike(cfg, client, &commodity.keyword).await;
        let result = score_commodity(commodity, &stats, shipping_change, spike);
        info!(
            symbol = %commodity.symbol,
            score = result.score,
            "  {}: {}/100 ({:+.1}%)",
            commodity.name,
            result.score,
            stats.change_1m,
        );
        results.push(result);
    }

    finish_scan(results)
}

/// Score one commodity from its fetched statistics.
pub fn score_commodity(
    commodity: &Commodity,
    stats: &PriceStats,
    shipping_change: f64,
    spike: f64,
) -> CommodityResult {
    let (signals, score) = scorer::score(stats, shipping_change, spike);
    CommodityResult::scored(commodity, stats, spike, signals, score)
}

/// Rank the results and derive the run-level severity label from the top score.
pub fn finish_scan(mut results: Vec<CommodityResult>) -> ScanOutcome {
    rank_results(&mut results);
    let max_score = results.first().map(|r| r.score).unwrap_or(0);
    ScanOutcome {
        max_score,
        level: AlertLevel::from_score(max_score),
        results,
    }
}

/// Stable descending sort by score; ties keep their configured order.
pub fn rank_results(results: &mut [CommodityResult]) {
    results.sort_by(|a, b| b.score.cmp(&a.score));
}
