//! Ranking by cumulative return.
//!
//! The rank order drives every downstream view: statistics columns,
//! correlation axes, chart traces and descriptions.

use crate::metrics::StatisticsRecord;
use assetlens_core::domain::Ticker;
use serde::{Deserialize, Serialize};

/// One ranked ticker with its statistics. `rank` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStatistics {
    pub rank: usize,
    pub ticker: Ticker,
    pub statistics: StatisticsRecord,
}

/// Sort by cumulative return, highest first.
///
/// `records` must be in input order: the sort is stable, so equal returns
/// keep that order.
pub fn rank_by_cumulative_return(records: Vec<(Ticker, StatisticsRecord)>) -> Vec<RankedStatistics> {
    let mut records = records;
    records.sort_by(|a, b| {
        b.1.cumulative_return_pct
            .partial_cmp(&a.1.cumulative_return_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    records
        .into_iter()
        .enumerate()
        .map(|(i, (ticker, statistics))| RankedStatistics {
            rank: i + 1,
            ticker,
            statistics,
        })
        .collect()
}

/// Tickers in rank order.
pub fn ranked_tickers(ranked: &[RankedStatistics]) -> Vec<Ticker> {
    ranked.iter().map(|r| r.ticker.clone()).collect()
}
