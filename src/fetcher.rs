use tracing::warn;

use crate::config::{
    Config, MONTH_TRADING_DAYS, PRICE_RANGE, SHIPPING_PROXY_SYMBOL, TRADING_DAYS_PER_YEAR,
    TRENDS_WINDOW_DAYS,
};
use crate::error::{AppError, Result};
use crate::types::PriceStats;

/// Fetch ~3 months of daily closes for a symbol and derive the per-run price
/// statistics. Anything short of a usable series (transport error, unexpected
/// response shape, fewer than 22 closes) comes back as an error the caller
/// recovers from with a zero-score placeholder.
pub async fn fetch_price_stats(
    cfg: &Config,
    client: &reqwest::Client,
    symbol: &str,
) -> Result<PriceStats> {
    let url = format!(
        "{}/v8/finance/chart/{}?range={}&interval=1d",
        cfg.chart_api_url, symbol, PRICE_RANGE
    );

    let resp: serde_json::Value = client.get(&url).send().await?.json().await?;
    let closes = extract_closes(&resp);

    price_stats_from_closes(&closes).ok_or_else(|| {
        AppError::Provider(format!(
            "{symbol}: {} daily closes, need at least {MONTH_TRADING_DAYS}",
            closes.len()
        ))
    })
}

/// Daily closes from a chart response, null entries dropped.
fn extract_closes(v: &serde_json::Value) -> Vec<f64> {
    v.get("chart")
        .and_then(|c| c.get("result"))
        .and_then(|r| r.as_array())
        .and_then(|a| a.first())
        .and_then(|r| r.get("indicators"))
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.as_array())
        .and_then(|a| a.first())
        .and_then(|q| q.get("close"))
        .and_then(|c| c.as_array())
        .map(|a| a.iter().filter_map(|x| x.as_f64()).collect())
        .unwrap_or_default()
}

/// Derive price statistics from a close series: latest price, percent change
/// versus 22 trading days prior, z-score against the full window (0 when the
/// window has no variance), and annualized day-over-day return volatility.
/// None when the series is too short for the 1-month comparison.
pub fn price_stats_from_closes(closes: &[f64]) -> Option<PriceStats> {
    if closes.len() < MONTH_TRADING_DAYS {
        return None;
    }

    let price = *closes.last()?;
    let month_ago = closes[closes.len() - MONTH_TRADING_DAYS];
    let change_1m = (price - month_ago) / month_ago * 100.0;

    let m = mean(closes);
    let sd = std_dev(closes, m);
    let zscore = if sd > 0.0 { (price - m) / sd } else { 0.0 };

    let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
    let volatility = std_dev(&returns, mean(&returns)) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;

    Some(PriceStats {
        price,
        change_1m,
        zscore,
        volatility,
    })
}

/// Search-interest spike ratio for a keyword: most recent daily value over the
/// mean of the prior values in the trailing window. Any failure degrades to the
/// neutral ratio 1.0 so a trends outage cannot sink the scan.
pub async fn fetch_search_spike(cfg: &Config, client: &reqwest::Client, keyword: &str) -> f64 {
    match fetch_interest_values(cfg, client, keyword).await {
        Ok(values) => spike_ratio(&values),
        Err(e) => {
            warn!(keyword, error = %e, "search-interest fetch failed; using neutral ratio");
            1.0
        }
    }
}

async fn fetch_interest_values(
    cfg: &Config,
    client: &reqwest::Client,
    keyword: &str,
) -> Result<Vec<f64>> {
    let days = TRENDS_WINDOW_DAYS.to_string();
    let resp: serde_json::Value = client
        .get(&cfg.trends_api_url)
        .query(&[("keyword", keyword), ("days", days.as_str())])
        .send()
        .await?
        .json()
        .await?;

    let values: Vec<f64> = resp
        .get("values")
        .and_then(|v| v.as_array())
        .map(|a| a.iter().filter_map(|x| x.as_f64()).collect())
        .unwrap_or_default();

    if values.is_empty() {
        return Err(AppError::Provider(format!("{keyword}: empty interest series")));
    }
    Ok(values)
}

/// Last value over the mean of the prior ones, denominator floored at 1 to
/// avoid blow-up on near-zero baselines. A single-point series compares the
/// value against itself.
pub fn spike_ratio(values: &[f64]) -> f64 {
    let Some((&current, prior)) = values.split_last() else {
        return 1.0;
    };
    let avg = if prior.is_empty() { current } else { mean(prior) };
    current / avg.max(1.0)
}

/// Shared shipping-cost signal: the proxy ticker's 1-month percent change.
/// 0.0 when the proxy is unavailable, which zeroes S6 for the whole run.
pub async fn fetch_shipping_change(cfg: &Config, client: &reqwest::Client) -> f64 {
    match fetch_price_stats(cfg, client, SHIPPING_PROXY_SYMBOL).await {
        Ok(stats) => stats.change_1m,
        Err(e) => {
            warn!(
                symbol = SHIPPING_PROXY_SYMBOL,
                error = %e,
                "shipping proxy fetch failed; S6 contributes nothing this run"
            );
            0.0
        }
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation.
fn std_dev(xs: &[f64], mean: f64) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / xs.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_series_is_unavailable() {
        let closes: Vec<f64> = (0..MONTH_TRADING_DAYS - 1).map(|i| 100.0 + i as f64).collect();
        assert!(price_stats_from_closes(&closes).is_none());
        assert!(price_stats_from_closes(&[]).is_none());
    }

    #[test]
    fn change_1m_compares_against_22_days_prior() {
        // 30 closes: flat at 100, then the last 22 ramp so closes[len-22] = 100.
        let mut closes = vec![100.0; 9];
        closes.extend((0..22).map(|i| 100.0 + i as f64));
        let stats = price_stats_from_closes(&closes).unwrap();
        assert_eq!(stats.price, 121.0);
        assert!((stats.change_1m - 21.0).abs() < 1e-9);
    }

    #[test]
    fn flat_series_has_zero_zscore_and_volatility() {
        let closes = vec![50.0; 40];
        let stats = price_stats_from_closes(&closes).unwrap();
        assert_eq!(stats.zscore, 0.0);
        assert_eq!(stats.volatility, 0.0);
        assert_eq!(stats.change_1m, 0.0);
    }

    #[test]
    fn zscore_uses_population_std_of_window() {
        // Half the window at 90, half at 110: mean 100, population std 10.
        let mut closes = vec![90.0; 20];
        closes.extend(vec![110.0; 20]);
        let stats = price_stats_from_closes(&closes).unwrap();
        assert!((stats.zscore - 1.0).abs() < 1e-9);
    }

    #[test]
    fn volatility_annualizes_daily_returns() {
        // Alternating +10%/-10%-ish returns produce a known daily std.
        let mut closes = Vec::with_capacity(40);
        let mut price = 100.0;
        for i in 0..40 {
            closes.push(price);
            price *= if i % 2 == 0 { 1.1 } else { 1.0 / 1.1 };
        }
        let stats = price_stats_from_closes(&closes).unwrap();
        let returns: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
        let m = returns.iter().sum::<f64>() / returns.len() as f64;
        let daily =
            (returns.iter().map(|r| (r - m).powi(2)).sum::<f64>() / returns.len() as f64).sqrt();
        let expected = daily * 252f64.sqrt() * 100.0;
        assert!((stats.volatility - expected).abs() < 1e-9);
        assert!(stats.volatility > 0.0);
    }

    #[test]
    fn extract_closes_drops_nulls_and_handles_bad_shapes() {
        let v: serde_json::Value = serde_json::json!({
            "chart": {
                "result": [{
                    "indicators": {
                        "quote": [{ "close": [100.0, null, 101.5, 99.0] }]
                    }
                }]
            }
        });
        assert_eq!(extract_closes(&v), vec![100.0, 101.5, 99.0]);

        assert!(extract_closes(&serde_json::json!({})).is_empty());
        assert!(extract_closes(&serde_json::json!({"chart": {"result": []}})).is_empty());
        assert!(extract_closes(&serde_json::json!("not an object")).is_empty());
    }

    #[test]
    fn spike_ratio_follows_trailing_mean() {
        // Prior mean 10, current 40 -> ratio 4.
        assert!((spike_ratio(&[10.0, 10.0, 10.0, 40.0]) - 4.0).abs() < 1e-9);
        // Near-zero baseline is floored at 1.
        assert!((spike_ratio(&[0.0, 0.0, 5.0]) - 5.0).abs() < 1e-9);
        // Single point compares against itself.
        assert!((spike_ratio(&[80.0]) - 1.0).abs() < 1e-9);
        // Empty series is neutral.
        assert!((spike_ratio(&[]) - 1.0).abs() < 1e-9);
    }
}
