use crate::types::{PriceStats, ScoreBreakdown, Signal};

/// Step buckets per signal: (minimum input, points), highest threshold first.
/// These are calibration constants; changing them breaks comparability with
/// stored history.
const PRICE_MOMENTUM_BUCKETS: &[(f64, u32)] = &[(25.0, 20), (15.0, 12), (10.0, 6)];
const DEVIATION_BUCKETS: &[(f64, u32)] = &[(3.0, 20), (2.0, 12), (1.5, 6)];
const VOLATILITY_BUCKETS: &[(f64, u32)] = &[(80.0, 10), (50.0, 5)];
const SEARCH_SPIKE_BUCKETS: &[(f64, u32)] = &[(5.0, 25), (3.0, 15), (2.0, 8)];
const SHIPPING_BUCKETS: &[(f64, u32)] = &[(30.0, 15), (20.0, 10), (10.0, 5)];

/// Points for the first bucket whose minimum the value reaches, scanning from
/// the highest threshold down. 0 when no bucket matches.
pub fn bucket_points(value: f64, buckets: &[(f64, u32)]) -> u32 {
    buckets
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

/// Composite supply-shock score for one commodity: six bucketed signals summed
/// into a total bounded at 90 by the bucket maxima (the reserved S5 slot never
/// contributes). Pure function of its inputs; missing data is handled upstream
/// by short-circuiting to a zero-score result.
pub fn score(stats: &PriceStats, shipping_change: f64, search_spike: f64) -> (ScoreBreakdown, u32) {
    let mut signals = ScoreBreakdown::new();
    signals.insert(
        Signal::PriceMomentum,
        bucket_points(stats.change_1m, PRICE_MOMENTUM_BUCKETS),
    );
    signals.insert(Signal::Deviation, bucket_points(stats.zscore, DEVIATION_BUCKETS));
    signals.insert(
        Signal::Volatility,
        bucket_points(stats.volatility, VOLATILITY_BUCKETS),
    );
    signals.insert(
        Signal::SearchSpike,
        bucket_points(search_spike, SEARCH_SPIKE_BUCKETS),
    );
    signals.insert(Signal::Reserved, 0);
    signals.insert(
        Signal::ShippingCost,
        bucket_points(shipping_change, SHIPPING_BUCKETS),
    );

    let total = signals.values().sum();
    (signals, total)
}
