use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::types::Commodity;

pub const CHART_API_URL: &str = "https://query1.finance.yahoo.com";
pub const TRENDS_API_URL: &str = "https://trends.duendes.app/api/interest";
pub const EMAIL_SERVICE_URL: &str = "https://email.duendes.app/api/send";
pub const ALERT_EMAIL: &str = "pvrolomx@yahoo.com.mx";

/// Daily-close lookback requested from the chart provider.
pub const PRICE_RANGE: &str = "3mo";

/// Trading days in one month of daily closes; also the minimum series length
/// required to compute a 1-month comparison.
pub const MONTH_TRADING_DAYS: usize = 22;

/// Trading days per year, used to annualize return volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Ticker whose 1-month change stands in for shipping costs. Resolved once per
/// run and shared across every commodity's score.
pub const SHIPPING_PROXY_SYMBOL: &str = "ZIM";

/// Trailing window for the search-interest spike ratio.
pub const TRENDS_WINDOW_DAYS: u32 = 7;

/// History entries older than this are dropped on every save.
pub const HISTORY_RETENTION_DAYS: i64 = 30;

/// Per-request timeouts so a dead provider cannot hang the run.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    pub chart_api_url: String,
    pub trends_api_url: String,
    pub email_service_url: String,
    pub alert_email: String,
    /// Minimum top score that triggers an outbound alert (ALERT_THRESHOLD).
    /// Coarser than the informational alert level, which is labeling only.
    pub alert_threshold: u32,
    pub history_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: String,
    /// Tracked commodities, scanned in this order. Ties in the ranking keep it.
    pub commodities: Vec<Commodity>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = match std::env::var("MONITOR_DATA_DIR") {
            Ok(d) => PathBuf::from(d),
            Err(_) => dirs::home_dir()
                .ok_or_else(|| {
                    AppError::Config(
                        "home directory not found; set MONITOR_DATA_DIR".to_string(),
                    )
                })?
                .join("colmena"),
        };

        Ok(Self {
            chart_api_url: env_or("CHART_API_URL", CHART_API_URL),
            trends_api_url: env_or("TRENDS_API_URL", TRENDS_API_URL),
            email_service_url: env_or("EMAIL_SERVICE_URL", EMAIL_SERVICE_URL),
            alert_email: env_or("ALERT_EMAIL", ALERT_EMAIL),
            alert_threshold: std::env::var("ALERT_THRESHOLD")
                .unwrap_or_else(|_| "50".to_string())
                .parse::<u32>()
                .map_err(|_| {
                    AppError::Config("ALERT_THRESHOLD must be a non-negative integer".to_string())
                })?,
            history_path: data_dir.join("supply_shock_history.json"),
            log_path: data_dir.join("supply_shock.log"),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            commodities: default_commodities(),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// The tracked universe: futures tickers paired with the search keyword that
/// proxies public supply anxiety for each.
pub fn default_commodities() -> Vec<Commodity> {
    [
        ("CL=F", "Crude Oil", "oil shortage"),
        ("NG=F", "Natural Gas", "gas shortage"),
        ("GC=F", "Gold", "gold price"),
        ("HG=F", "Copper", "copper shortage"),
        ("ZW=F", "Wheat", "wheat shortage"),
        ("ZC=F", "Corn", "corn shortage"),
    ]
    .into_iter()
    .map(|(symbol, name, keyword)| Commodity {
        symbol: symbol.to_string(),
        name: name.to_string(),
        keyword: keyword.to_string(),
    })
    .collect()
}
