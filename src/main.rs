//! Bridge Transfer Core - pending transfer maintenance
//!
//! Loads the persisted pending set and reconciles it:
//!
//! - default: one offline sweep (staleness eviction only), then prints the
//!   resulting activity list as JSON
//! - `--watch`: polls the indexer configured under `history.feed_url`
//!   until killed

use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Utc;
use tracing::info;

use bridge_transfer_core::config::AppConfig;
use bridge_transfer_core::history::{
    BridgeStore, HistoryPoller, HttpHistoryFeed, JsonFilePendingStore, reconcile,
};

fn get_config_path() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "config/dev.yaml".to_string()
}

fn use_watch_mode() -> bool {
    std::env::args().any(|a| a == "--watch")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = get_config_path();
    let config = AppConfig::from_file(&config_path)
        .with_context(|| format!("loading {}", config_path))?;
    let _log_guard = bridge_transfer_core::logging::init_logging(&config.log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        config = %config_path,
        "Starting bridge transfer core"
    );

    let persistence = Arc::new(JsonFilePendingStore::new(&config.history.pending_store_path));
    let store = Arc::new(
        BridgeStore::load(persistence)
            .await
            .context("loading pending transfers")?,
    );

    if use_watch_mode() {
        let Some(url) = config.history.feed_url.as_deref() else {
            bail!("--watch requires history.feed_url");
        };
        let feed = Arc::new(HttpHistoryFeed::new(url)?);
        let poller = HistoryPoller::new(feed, store, config.history.poller_config());
        poller.run().await;
    }

    let now = Utc::now();
    let stale_after = chrono::Duration::from_std(config.history.stale_after())
        .context("staleness window out of range")?;
    let reconciliation = reconcile(&store.pending(), &[], now, stale_after);
    let evicted = reconciliation.to_remove.len();
    store
        .apply(reconciliation, now, None)
        .await
        .context("saving pending transfers")?;

    info!(
        evicted = evicted,
        remaining = store.pending().len(),
        "Offline sweep done"
    );

    println!("{}", serde_json::to_string_pretty(&store.history().records)?);
    Ok(())
}
