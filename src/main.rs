//! Discovery Pipeline Runner — Binary Entrypoint
//! Runs one cache-aware ingestion cycle, ranks emoji/acronym candidates,
//! and optionally runs a watchlist promotion pass.
//!
//! All behavior lives in the library; this binary is wiring only.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use trend_reservoir::novelty::NoveltyStore;
use trend_reservoir::providers::trends::{TrendsLocale, TrendsProvider};
use trend_reservoir::providers::build_client;
use trend_reservoir::watchlist::TrendWatchlist;
use trend_reservoir::{
    build_reservoir, extract_acronym_candidates, extract_emoji_candidates,
    top_emojis_from_reservoir, DiscoveryConfig,
};

/// Compact tracing output; `RUST_LOG` wins when set.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("discover=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn parse_flag_num(argv: &[String], key: &str, fallback: usize) -> usize {
    argv.iter()
        .find_map(|a| a.strip_prefix(&format!("--{key}=")))
        .and_then(|v| v.parse().ok())
        .map(|v: usize| v.max(1))
        .unwrap_or(fallback)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let rows_limit = parse_flag_num(&argv, "rows", 300);
    let top_limit = parse_flag_num(&argv, "top", 20);
    let run_watchlist = argv.iter().any(|a| a == "--watchlist");

    let mut cfg = DiscoveryConfig::from_env();
    if argv.iter().any(|a| a == "--nocache") {
        cfg.nocache = true;
    }

    let rows = build_reservoir(&cfg, rows_limit).await?;

    let mut novelty = NoveltyStore::load(&cfg.state_dir);
    let now_ms = chrono::Utc::now().timestamp_millis();
    let ranked = top_emojis_from_reservoir(&rows, &mut novelty, now_ms, &cfg.emoji_denylist)?;
    for e in ranked.iter().take(top_limit) {
        tracing::info!(target: "discover", emoji = %e.emoji, freq = e.freq, score = e.score, "ranked emoji");
    }

    let emoji_cands = extract_emoji_candidates(&rows, top_limit, &cfg.emoji_denylist);
    let acronym_cands = extract_acronym_candidates(&rows, top_limit);
    tracing::info!(
        target: "discover",
        rows = rows.len(),
        emoji_candidates = emoji_cands.len(),
        acronym_candidates = acronym_cands.len(),
        "extraction done"
    );

    if run_watchlist {
        let trends = TrendsProvider::from_http(
            build_client(&cfg),
            TrendsLocale {
                geo: cfg.trends_geo.clone(),
                hl: cfg.trends_hl.clone(),
                tz: cfg.trends_tz.clone(),
            },
        );
        let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
        let mut watchlist = TrendWatchlist::load(&cfg.state_dir);
        let report = watchlist.run_cycle(&trends, &cfg, &today).await?;
        tracing::info!(
            target: "discover",
            promoted = report.promoted.len(),
            size = watchlist.state().watchlist.len(),
            "watchlist updated"
        );
    }

    Ok(())
}
