use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::types::{AlertLevel, CommodityResult};

/// Commodity lines shown in the alert body.
const TOP_COMMODITIES: usize = 3;

/// Label the email service shows as the sending application.
const SENDER_NAME: &str = "Supply Shock Monitor";
const SEND_FROM: &str = "duendes.app";

/// Whether the run's top score warrants dispatching a notification at all.
/// Separate from the alert level, which only labels severity.
pub fn should_dispatch(max_score: u32, threshold: u32) -> bool {
    max_score >= threshold
}

/// Push the run summary through the outbound email webhook. The caller logs
/// and swallows any error; delivery never gates run completion.
pub async fn send_alert(
    cfg: &Config,
    client: &reqwest::Client,
    results: &[CommodityResult],
    max_score: u32,
    level: AlertLevel,
) -> Result<()> {
    let payload = json!({
        "to": cfg.alert_email,
        "subject": format!("SUPPLY SHOCK - {level} - Score {max_score}/100"),
        "message": format_message(results, max_score, level, Utc::now()),
        "name": SENDER_NAME,
        "sendFrom": SEND_FROM,
    });

    let resp: serde_json::Value = client
        .post(&cfg.email_service_url)
        .json(&payload)
        .send()
        .await?
        .json()
        .await?;

    let delivered = resp.get("success").and_then(|s| s.as_bool()).unwrap_or(false);
    info!(delivered, "alert dispatched");
    Ok(())
}

/// Human-readable summary: severity label, max score (the historical "/100"
/// framing is kept even though bucket maxima cap the total at 90), and the top
/// commodities that actually produced data this run. Fetch-failed placeholders
/// never appear here regardless of where they sorted.
pub fn format_message(
    results: &[CommodityResult],
    max_score: u32,
    level: AlertLevel,
    now: DateTime<Utc>,
) -> String {
    let top = results
        .iter()
        .filter(|r| r.has_data())
        .take(TOP_COMMODITIES)
        .map(|r| {
            format!(
                "  {}: {}/100 ({:+.1}%)",
                r.name,
                r.score,
                r.change_1m.unwrap_or(0.0)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "SUPPLY SHOCK - {level}\n\
         Max score: {max_score}/100\n\
         Timestamp: {}\n\
         \n\
         TOP COMMODITIES:\n\
         {top}\n\
         \n\
         Supply Shock Monitor",
        now.to_rfc3339(),
    )
}
