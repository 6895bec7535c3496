#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/scorecard/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Holdings resolution and scoring.
//!
//! This crate ties the workspace together. It re-exports the core record
//! types, the sheet and page extractors, the scorers, the document stores
//! and the live source, and adds the [`Resolver`] and the batch
//! [`Pipeline`].
//!
//! # Features
//!
//! - `live` - HTTP live source for re-extracting instruments
//! - `store-sqlite` - SQLite-backed document store
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scorecard::{Pipeline, Resolver, ScreenerSource, Sheet, SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> scorecard::Result<()> {
//!     let resolver = Resolver::new(
//!         Arc::new(SqliteStore::new("scorecard.db")?),
//!         Arc::new(ScreenerSource::new("https://www.screener.in")),
//!     );
//!     let sheets: Vec<Sheet> = load_sheets();
//!
//!     let mut stdout = tokio::io::stdout();
//!     let summary = Pipeline::new(resolver).run(&sheets, &mut stdout).await?;
//!     eprintln!("{summary:?}");
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use scorecard_core::*;

// Extraction
pub use scorecard_extract::{
    ColumnMap, Grid, HoldingField, HoldingRow, HoldingSheet, SectionExtractor, parse_company_page,
    parse_peers_page,
};

// Scoring
pub use scorecard_score::{FScore, ScoreCard, f_score, peer_score, trend_score};

// Stores
#[cfg(feature = "store-sqlite")]
pub use scorecard_store::SqliteStore;
pub use scorecard_store::InMemoryStore;

// Live source
#[cfg(feature = "live")]
pub use scorecard_live::ScreenerSource;

/// Batch processing of holdings sheets.
pub mod pipeline;
/// Instrument resolution with live fallback.
pub mod resolver;

pub use pipeline::{AugmentedRow, COMPLETION_MARKER, NameAliases, Pipeline, PipelineSummary, Sheet};
pub use resolver::{DEFAULT_THRESHOLD, Origin, Resolution, Resolver};

#[cfg(test)]
mod testing;
