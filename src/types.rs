use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Commodity
// ---------------------------------------------------------------------------

/// Static descriptor for one tracked commodity. Defined at configuration time,
/// never mutated during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commodity {
    pub symbol: String,
    pub name: String,
    /// Search term whose interest spike proxies public supply anxiety.
    pub keyword: String,
}

// ---------------------------------------------------------------------------
// Raw per-run price statistics
// ---------------------------------------------------------------------------

/// Snapshot of one commodity's price series, produced fresh each run by the
/// fetcher. Not persisted on its own.
#[derive(Debug, Clone, Copy)]
pub struct PriceStats {
    pub price: f64,
    /// Percent change versus the close ~22 trading days prior.
    pub change_1m: f64,
    /// Standard deviations from the 3-month mean.
    pub zscore: f64,
    /// Annualized day-over-day return volatility, in percent.
    pub volatility: f64,
}

// ---------------------------------------------------------------------------
// Score breakdown
// ---------------------------------------------------------------------------

/// Signal slots of the composite score. S5 is reserved: it appears in every
/// breakdown but is never computed and always carries 0 points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "S1")]
    PriceMomentum,
    #[serde(rename = "S2")]
    Deviation,
    #[serde(rename = "S3")]
    Volatility,
    #[serde(rename = "S4")]
    SearchSpike,
    #[serde(rename = "S5")]
    Reserved,
    #[serde(rename = "S6")]
    ShippingCost,
}

/// Points awarded per signal. Serializes as `{"S1": 20, ...}` with stable key
/// order; bucket maxima bound the sum at 90.
pub type ScoreBreakdown = BTreeMap<Signal, u32>;

// ---------------------------------------------------------------------------
// Per-commodity run result
// ---------------------------------------------------------------------------

/// One commodity's outcome for one run. Immutable after creation; ranking is
/// applied to the surrounding list, not stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommodityResult {
    pub symbol: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_1m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zscore: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spike: Option<f64>,
    #[serde(default)]
    pub signals: ScoreBreakdown,
    pub score: u32,
}

impl CommodityResult {
    /// Placeholder recorded when the price fetch failed. Keeps the commodity in
    /// the run output with a zero score and an empty signal map.
    pub fn unavailable(commodity: &Commodity) -> Self {
        Self {
            symbol: commodity.symbol.clone(),
            name: commodity.name.clone(),
            price: None,
            change_1m: None,
            zscore: None,
            volatility: None,
            spike: None,
            signals: ScoreBreakdown::new(),
            score: 0,
        }
    }

    pub fn scored(
        commodity: &Commodity,
        stats: &PriceStats,
        spike: f64,
        signals: ScoreBreakdown,
        score: u32,
    ) -> Self {
        Self {
            symbol: commodity.symbol.clone(),
            name: commodity.name.clone(),
            price: Some(stats.price),
            change_1m: Some(stats.change_1m),
            zscore: Some(stats.zscore),
            volatility: Some(stats.volatility),
            spike: Some(spike),
            signals,
            score,
        }
    }

    /// True when this run produced actual market data for the commodity.
    pub fn has_data(&self) -> bool {
        self.price.is_some()
    }
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One run's ranked results, as persisted in the rolling history file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub results: Vec<CommodityResult>,
}

// ---------------------------------------------------------------------------
// Alert level
// ---------------------------------------------------------------------------

/// Coarse severity label derived from the run's maximum score. Informational
/// only; whether an alert actually fires is gated by the configured numeric
/// threshold instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    /// 0-25
    Normal,
    /// 26-50
    Attention,
    /// 51-75
    Alert,
    /// 76+
    Critical,
}

impl AlertLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= 76 {
            AlertLevel::Critical
        } else if score >= 51 {
            AlertLevel::Alert
        } else if score >= 26 {
            AlertLevel::Attention
        } else {
            AlertLevel::Normal
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertLevel::Normal => "NORMAL",
            AlertLevel::Attention => "ATTENTION",
            AlertLevel::Alert => "ALERT",
            AlertLevel::Critical => "CRITICAL",
        };
        write!(f, "{s}")
    }
}
