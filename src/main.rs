mod alert;
mod config;
mod error;
mod fetcher;
mod history;
mod logging;
mod scan;
mod scorer;
mod types;

use chrono::Utc;
use tracing::{error, info};

use crate::config::{Config, CONNECT_TIMEOUT, REQUEST_TIMEOUT};
use crate::error::Result;
use crate::history::HistoryStore;
use crate::types::HistoryEntry;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&cfg);

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

/// One scan-score-persist-alert cycle. Per-provider failures are recovered
/// inside the scan; history and alert failures are logged and swallowed, so
/// the run completes whenever the HTTP client itself can be built.
async fn run(cfg: Config) -> Result<()> {
    info!("supply shock scan starting ({} commodities)", cfg.commodities.len());

    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let outcome = scan::run_scan(&cfg, &client).await;
    info!(
        max_score = outcome.max_score,
        level = %outcome.level,
        "scan result: {} ({}/100)",
        outcome.level,
        outcome.max_score,
    );

    let store = HistoryStore::new(cfg.history_path.clone());
    if let Err(e) = store.append(HistoryEntry {
        timestamp: Utc::now(),
        results: outcome.results.clone(),
    }) {
        error!("history save failed: {e}");
    }

    if alert::should_dispatch(outcome.max_score, cfg.alert_threshold) {
        info!(
            threshold = cfg.alert_threshold,
            "score at or above threshold; dispatching alert"
        );
        if let Err(e) = alert::send_alert(
            &cfg,
            &client,
            &outcome.results,
            outcome.max_score,
            outcome.level,
        )
        .await
        {
            error!("alert dispatch failed: {e}");
        }
    } else {
        info!(threshold = cfg.alert_threshold, "score below threshold; no alert");
    }

    info!("scan complete");
    Ok(())
}
