use futures_util::future::join_all;

use crate::config::FALLBACK_MARKETS;
use crate::utils::{BinanceClient, Logger};

/// Scores the first `scan_limit` markets concurrently and returns the `keep`
/// most volatile ones. Falls back to a fixed list of majors when there is
/// nothing to scan.
pub async fn identify_volatile_markets(
    client: &BinanceClient,
    markets: &[String],
    scan_limit: usize,
    keep: usize,
) -> Vec<String> {
    if markets.is_empty() {
        return FALLBACK_MARKETS.iter().map(|m| m.to_string()).collect();
    }

    let candidates = &markets[..markets.len().min(scan_limit)];
    let scores = join_all(candidates.iter().map(|market| async move {
        (market.clone(), client.calculate_volatility(market).await)
    }))
    .await;

    let volatile = rank_by_volatility(scores, keep);
    Logger::info(&format!("Identified volatile markets: {}", volatile.join(", ")));
    volatile
}

/// Highest score first; NaN scores sort last.
pub fn rank_by_volatility(mut scores: Vec<(String, f64)>, keep: usize) -> Vec<String> {
    scores.sort_by(|a, b| {
        let a = if a.1.is_nan() { f64::NEG_INFINITY } else { a.1 };
        let b = if b.1.is_nan() { f64::NEG_INFINITY } else { b.1 };
        b.total_cmp(&a)
    });
    scores.into_iter().take(keep).map(|(market, _)| market).collect()
}
