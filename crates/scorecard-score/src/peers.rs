//! Peer comparison scoring.
//!
//! Each peer earns the target points on six comparisons, then one more round
//! is scored against the median row with smaller weights. The accumulated
//! total, median points included, is divided by the number of peers.

use scorecard_core::{CanonicalRecord, PeerRecord, PeerSet, SectionKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Quarterly-results line holding sales.
pub const SALES_LINE: &str = "Sales +";
/// Quarterly-results line holding net profit.
pub const NET_PROFIT_LINE: &str = "Net Profit +";

/// Parsed metrics compared between an instrument and its peers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeerMetrics {
    /// Price to earnings. Lower is better.
    pub pe: f64,
    /// Market capitalisation.
    pub market_cap: f64,
    /// Dividend yield.
    pub dividend_yield: f64,
    /// Return on capital employed.
    pub roce: f64,
    /// Sales of the latest quarter.
    pub quarterly_sales: f64,
    /// Net profit of the latest quarter.
    pub quarterly_profit: f64,
}

impl PeerMetrics {
    /// Metrics of the instrument being scored. Quarterly figures come from
    /// the latest quarterly-results entry, or 0 when absent.
    #[must_use]
    pub fn from_record(record: &CanonicalRecord) -> Self {
        let quarters = record.section(SectionKind::QuarterlyResults);
        Self {
            pe: record.pe(),
            market_cap: record.market_cap_value(),
            dividend_yield: record.dividend_yield(),
            roce: record.roce(),
            quarterly_sales: quarters.latest(SALES_LINE).unwrap_or_default(),
            quarterly_profit: quarters.latest(NET_PROFIT_LINE).unwrap_or_default(),
        }
    }

    /// Metrics of one peer-table row. Unparsable text reads as 0.
    #[must_use]
    pub fn from_peer(peer: &PeerRecord) -> Self {
        Self {
            pe: peer.pe(),
            market_cap: peer.market_cap(),
            dividend_yield: peer.dividend_yield(),
            roce: peer.roce(),
            quarterly_sales: peer.quarterly_sales(),
            quarterly_profit: peer.quarterly_profit(),
        }
    }
}

/// Points available per comparison.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeerWeights {
    /// Full credit for a strictly lower PE; partial credit decays by one
    /// point per unit of PE above the other side.
    pub pe: f64,
    /// Awarded for a strictly higher market cap.
    pub market_cap: f64,
    /// Awarded for a strictly higher dividend yield.
    pub dividend_yield: f64,
    /// Awarded for a strictly higher ROCE.
    pub roce: f64,
    /// Awarded for strictly higher quarterly sales.
    pub quarterly_sales: f64,
    /// Awarded for strictly higher quarterly profit.
    pub quarterly_profit: f64,
}

impl PeerWeights {
    /// Weights applied against each peer.
    pub const PEER: Self = Self {
        pe: 10.0,
        market_cap: 5.0,
        dividend_yield: 5.0,
        roce: 10.0,
        quarterly_sales: 5.0,
        quarterly_profit: 10.0,
    };

    /// Weights applied once against the median row.
    pub const MEDIAN: Self = Self {
        pe: 5.0,
        market_cap: 3.0,
        dividend_yield: 3.0,
        roce: 5.0,
        quarterly_sales: 2.0,
        quarterly_profit: 5.0,
    };

    /// Points `target` earns against `other`.
    #[must_use]
    pub fn points(&self, target: &PeerMetrics, other: &PeerMetrics) -> f64 {
        let higher = |mine: f64, theirs: f64, weight: f64| if mine > theirs { weight } else { 0.0 };

        let pe = if target.pe < other.pe {
            self.pe
        } else {
            (self.pe - (target.pe - other.pe)).max(0.0)
        };

        pe + higher(target.market_cap, other.market_cap, self.market_cap)
            + higher(target.dividend_yield, other.dividend_yield, self.dividend_yield)
            + higher(target.roce, other.roce, self.roce)
            + higher(target.quarterly_sales, other.quarterly_sales, self.quarterly_sales)
            + higher(target.quarterly_profit, other.quarterly_profit, self.quarterly_profit)
    }
}

/// Scores `target` against a peer set whose last record is the median.
///
/// Returns 0 when the set has fewer than two records.
#[must_use]
pub fn peer_score(target: &PeerMetrics, peers: &PeerSet) -> f64 {
    let Some((rows, median)) = peers.split() else {
        debug!(records = peers.len(), "Not enough peers to compare");
        return 0.0;
    };

    let peer_points: f64 = rows
        .iter()
        .map(|peer| PeerWeights::PEER.points(target, &PeerMetrics::from_peer(peer)))
        .sum();
    let median_points = PeerWeights::MEDIAN.points(target, &PeerMetrics::from_peer(median));

    (peer_points + median_points) / rows.len() as f64
}

/// Scores a record against its own peer table.
#[must_use]
pub fn score_record(record: &CanonicalRecord) -> f64 {
    peer_score(&PeerMetrics::from_record(record), &record.peers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(pe: &str) -> PeerRecord {
        PeerRecord {
            pe: pe.to_string(),
            ..Default::default()
        }
    }

    fn target(pe: f64) -> PeerMetrics {
        PeerMetrics {
            pe,
            ..Default::default()
        }
    }

    #[test]
    fn test_fewer_than_two_records() {
        assert_eq!(peer_score(&target(12.0), &PeerSet::default()), 0.0);
        assert_eq!(peer_score(&target(12.0), &PeerSet::new(vec![peer("15")])), 0.0);
    }

    #[test]
    fn test_hand_computed_pe_example() {
        // Against PE 10: 10 - (12 - 10) = 8. Against PE 20: strictly lower, 10.
        // Against median PE 15: strictly lower, 5. (8 + 10 + 5) / 2 peers.
        let peers = PeerSet::new(vec![peer("10"), peer("20"), peer("15")]);
        assert_eq!(peer_score(&target(12.0), &peers), 11.5);
    }

    #[test]
    fn test_pe_credit_never_negative() {
        let peers = PeerSet::new(vec![peer("5"), peer("5")]);
        assert_eq!(peer_score(&target(40.0), &peers), 0.0);
    }

    #[test]
    fn test_all_comparisons_won() {
        let winner = PeerMetrics {
            pe: 1.0,
            market_cap: 100.0,
            dividend_yield: 5.0,
            roce: 30.0,
            quarterly_sales: 1000.0,
            quarterly_profit: 100.0,
        };
        let peers = PeerSet::new(vec![peer("10"), peer("10")]);
        // 45 per peer plus 23 from the median, over one peer.
        assert_eq!(peer_score(&winner, &peers), 68.0);
    }

    #[test]
    fn test_peer_text_parsing() {
        let row = PeerRecord {
            pe: "1,234.5".to_string(),
            div_yield: "1.5%".to_string(),
            market_cap: "n/a".to_string(),
            ..Default::default()
        };
        let metrics = PeerMetrics::from_peer(&row);
        assert_eq!(metrics.pe, 1234.5);
        assert!((metrics.dividend_yield - 0.015).abs() < 1e-12);
        assert_eq!(metrics.market_cap, 0.0);
    }

    #[test]
    fn test_target_quarterly_figures() {
        let mut record = CanonicalRecord::new("Infosys");
        record.stock_pe = "24.5".to_string();
        record
            .quarterly_results
            .insert("Sales +", vec!["37,923".into(), "39,315".into()]);
        let metrics = PeerMetrics::from_record(&record);
        assert_eq!(metrics.pe, 24.5);
        assert_eq!(metrics.quarterly_sales, 39315.0);
        assert_eq!(metrics.quarterly_profit, 0.0);
    }
}
