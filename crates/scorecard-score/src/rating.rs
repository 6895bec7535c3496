//! Composite rating.

use scorecard_core::{CanonicalRecord, SectionKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{fscore::FScore, peers, trend::trend_score};

/// Weight of the peer comparison in the rating.
pub const PEER_WEIGHT: f64 = 0.5;
/// Weight of the trend in the rating.
pub const TREND_WEIGHT: f64 = 0.4;

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// All scores for one record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Unweighted peer comparison score.
    pub peer: f64,
    /// Unweighted trend score over quarterly results.
    pub trend: f64,
    /// `round2(0.5 * peer + 0.4 * trend)`.
    pub rating: f64,
    /// Fundamentals checklist.
    pub f_score: FScore,
}

impl ScoreCard {
    /// Scores a record.
    #[must_use]
    pub fn compute(record: &CanonicalRecord) -> Self {
        let peer = peers::score_record(record);
        let trend = trend_score([record.section(SectionKind::QuarterlyResults)]);
        let f_score = FScore::compute(record);
        let rating = round2(PEER_WEIGHT * peer + TREND_WEIGHT * trend);

        debug!(instrument = %record.name, peer, trend, rating, f_score = f_score.total(), "Scored record");
        Self { peer, trend, rating, f_score }
    }
}
