#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/scorecard/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Fundamentals checklist.
pub mod fscore;
/// Peer comparison scoring.
pub mod peers;
/// Composite rating.
pub mod rating;
/// Trend scoring.
pub mod trend;

pub use fscore::{FScore, f_score};
pub use peers::{PeerMetrics, PeerWeights, peer_score};
pub use rating::{ScoreCard, round2};
pub use trend::{TrendTally, trend_score};
