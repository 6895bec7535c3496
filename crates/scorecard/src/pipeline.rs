//! Batch orchestration: holdings sheets in, NDJSON rows out.
//!
//! Rows are processed one at a time. Each resolved row is serialized,
//! written as one line and flushed before the next row starts. Rows whose
//! instrument cannot be resolved are logged and left out of the output.

use std::collections::HashMap;

use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use scorecard_core::{MarketCapCategory, Result, ScoreError};
use scorecard_extract::{Grid, HoldingField, HoldingRow, HoldingSheet, SectionExtractor};
use scorecard_score::ScoreCard;

use crate::resolver::{Origin, Resolver};

/// Written after the last row.
pub const COMPLETION_MARKER: &str = "\nStream complete.\n";

/// Sheet names mapped to the live source's abbreviations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameAliases {
    aliases: HashMap<String, String>,
}

impl Default for NameAliases {
    fn default() -> Self {
        [
            ("Sun Pharmaceutical Industries Limited", "Sun Pharma.Inds."),
            ("KEC International Limited", "K E C Intl."),
            ("Sandhar Technologies Limited", "Sandhar Tech"),
            ("Samvardhana Motherson International Limited", "Samvardh. Mothe."),
            ("Coromandel International Limited", "Coromandel Inter"),
        ]
        .into_iter()
        .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NameAliases {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            aliases: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl NameAliases {
    /// An empty alias table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Adds or replaces an alias.
    pub fn insert(&mut self, name: impl Into<String>, alias: impl Into<String>) {
        self.aliases.insert(name.into(), alias.into());
    }

    /// Returns the alias of an exact name, or the name itself.
    #[must_use]
    pub fn apply<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Returns the number of aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns true if there are no aliases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// One named input sheet.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Sheet or file name, for logs.
    pub name: String,
    /// Sheet cells.
    pub grid: Grid,
}

impl Sheet {
    /// Creates a sheet.
    #[must_use]
    pub fn new(name: impl Into<String>, grid: Grid) -> Self {
        Self {
            name: name.into(),
            grid,
        }
    }
}

/// A holdings row with its resolution and scores.
#[derive(Clone, Debug, Serialize)]
pub struct AugmentedRow {
    /// Mapped sheet fields, keyed by display name.
    #[serde(flatten)]
    pub holding: HoldingRow,
    /// Raw market cap of the resolved record.
    #[serde(rename = "marketCapValue")]
    pub market_cap_value: String,
    /// Source page of the resolved record.
    pub url: String,
    /// Market-cap bucket.
    #[serde(rename = "marketCap")]
    pub market_cap: MarketCapCategory,
    /// Composite rating.
    #[serde(rename = "stockRate")]
    pub stock_rate: f64,
    /// F-score total.
    pub f_score: u8,
    /// Relevance of the best store match.
    pub relevance: f64,
    /// Where the record came from.
    pub source: Origin,
}

/// Counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    /// Holdings rows with an instrument name.
    pub rows_seen: usize,
    /// Rows written to the output.
    pub rows_emitted: usize,
    /// Rows dropped because resolution failed.
    pub rows_skipped: usize,
}

/// Resolves and scores every holdings row of a batch of sheets.
#[derive(Debug)]
pub struct Pipeline {
    resolver: Resolver,
    aliases: NameAliases,
    extractor: SectionExtractor,
}

impl Pipeline {
    /// Create a pipeline with the default aliases and stop markers.
    #[must_use]
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            aliases: NameAliases::default(),
            extractor: SectionExtractor::new(),
        }
    }

    /// Replace the alias table.
    #[must_use]
    pub fn with_aliases(mut self, aliases: NameAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// Replace the sheet extractor (stop markers).
    #[must_use]
    pub fn with_extractor(mut self, extractor: SectionExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Returns the resolver.
    #[must_use]
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Resolves and scores one holdings row. The aliased name replaces the
    /// row's instrument name.
    ///
    /// # Errors
    /// Returns the resolution error for the row's instrument.
    pub async fn process_row(&self, mut holding: HoldingRow) -> Result<AugmentedRow> {
        let name = self.aliases.apply(holding.instrument_name()).to_string();
        holding.set(HoldingField::InstrumentName, name.as_str());

        let resolution = self.resolver.resolve(&name).await?;
        let scores = ScoreCard::compute(&resolution.record);

        Ok(AugmentedRow {
            holding,
            market_cap_value: resolution.record.market_cap.clone(),
            url: resolution.record.url.clone().unwrap_or_default(),
            market_cap: resolution.category,
            stock_rate: scores.rating,
            f_score: scores.f_score.total(),
            relevance: resolution.relevance,
            source: resolution.origin,
        })
    }

    /// Processes every sheet and streams one JSON line per resolved row,
    /// then the completion marker.
    ///
    /// # Errors
    /// Fails only when writing to `writer` fails; the run stops there.
    pub async fn run<W>(&self, sheets: &[Sheet], writer: &mut W) -> Result<PipelineSummary>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut summary = PipelineSummary::default();

        for sheet in sheets {
            let holdings = HoldingSheet::extract_with(&self.extractor, &sheet.grid);
            info!(sheet = %sheet.name, rows = holdings.len(), "Processing sheet");

            for holding in holdings.rows {
                summary.rows_seen += 1;
                let instrument = holding.instrument_name().to_string();

                let row = match self.process_row(holding).await {
                    Ok(row) => row,
                    Err(e) => {
                        warn!(sheet = %sheet.name, instrument = %instrument, error = %e, "Skipping row");
                        summary.rows_skipped += 1;
                        continue;
                    }
                };

                let mut line = match serde_json::to_vec(&row) {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(instrument = %instrument, error = %e, "Failed to serialize row");
                        summary.rows_skipped += 1;
                        continue;
                    }
                };
                line.push(b'\n');
                write_flush(writer, &line).await?;
                summary.rows_emitted += 1;
                debug!(instrument = %instrument, rating = row.stock_rate, "Emitted row");
            }
        }

        write_flush(writer, COMPLETION_MARKER.as_bytes()).await?;
        info!(
            seen = summary.rows_seen,
            emitted = summary.rows_emitted,
            skipped = summary.rows_skipped,
            "Batch complete"
        );
        Ok(summary)
    }
}

async fn write_flush<W: AsyncWrite + Unpin>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    writer
        .write_all(bytes)
        .await
        .map_err(|e| ScoreError::Output(e.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|e| ScoreError::Output(e.to_string()))
}
