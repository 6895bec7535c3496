#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/scorecard/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and traits for instrument scoring.
//!
//! This crate provides the foundations shared by every scorecard crate:
//!
//! - [`CanonicalRecord`](types::CanonicalRecord) - normalized per-instrument record
//! - [`DocValue`](value::DocValue) - open-ended stored document values
//! - [`DocumentStore`](store::DocumentStore) - cache of records with ranked text search
//! - [`LiveSource`](provider::LiveSource) - external directory used to refresh records
//! - lenient numeric parsing and market-cap bucketing

/// DataFrame views of statement sections.
pub mod frame;
/// Error types for resolution and storage.
pub mod error;
/// Lenient parsing of scraped values.
pub mod parse;
/// Live source trait.
pub mod provider;
/// Instrument name queries.
pub mod query;
/// Relevance scoring for name search.
pub mod relevance;
/// Document store trait.
pub mod store;
/// Core record types.
pub mod types;
/// Open-ended document values.
pub mod value;

// Re-export commonly used items at crate root
pub use error::{Result, ScoreError};
pub use parse::{MarketCapCategory, canonical_label, parse_number, to_float};
pub use provider::{CompanyHit, LiveSource};
pub use query::InstrumentQuery;
pub use store::{DocumentStore, StoreMatch};
pub use types::{
    CanonicalRecord, CompanyDocument, PeerRecord, PeerSet, SectionKind, ShareholdingPattern,
    ShareholdingRow, TimeSeriesSection,
};
pub use value::DocValue;
