//! Section extraction from cell grids.
//!
//! A [`SectionExtractor`] walks a [`Grid`] in three phases: optional header
//! detection (rows before the first row with a cell matching the header
//! patterns are skipped), data rows (blank rows are skipped), and the stop
//! condition (the first row whose text contains a stop marker ends the
//! section, and neither it nor anything after it is read).

use scorecard_core::{TimeSeriesSection, canonical_label};
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::{
    grid::{Grid, cell, is_blank_row},
    header::{PatternSet, match_header},
};

/// Stop markers applied to holdings sheets.
pub const DEFAULT_STOP_MARKERS: [&str; 2] = ["subtotal", "total"];

/// Header row and data rows of a scanned grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scan<'a> {
    /// The detected or explicit header row.
    pub header: Option<&'a [String]>,
    /// Non-blank data rows before any stop marker, in grid order.
    pub rows: Vec<&'a [String]>,
    /// Whether a stop marker ended the scan early.
    pub stopped: bool,
}

/// Configurable grid walker.
#[derive(Clone, Debug)]
pub struct SectionExtractor {
    stop_markers: Vec<String>,
    header_patterns: Option<PatternSet>,
}

impl Default for SectionExtractor {
    fn default() -> Self {
        Self {
            stop_markers: DEFAULT_STOP_MARKERS.iter().map(|m| (*m).to_string()).collect(),
            header_patterns: None,
        }
    }
}

impl SectionExtractor {
    /// Creates an extractor with the default stop markers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor for statement tables, which carry rows such as
    /// "Total Assets" and therefore use no stop markers.
    #[must_use]
    pub fn statement() -> Self {
        Self::default().with_stop_markers(Vec::<String>::new())
    }

    /// Replaces the stop markers. Matching is a case-insensitive substring test.
    #[must_use]
    pub fn with_stop_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_markers = markers.into_iter().map(|m| m.into().to_lowercase()).collect();
        self
    }

    /// Detects the header row as the first row with a cell matching `patterns`.
    #[must_use]
    pub fn with_header_patterns(mut self, patterns: PatternSet) -> Self {
        self.header_patterns = Some(patterns);
        self
    }

    /// Returns the stop markers.
    #[must_use]
    pub fn stop_markers(&self) -> &[String] {
        &self.stop_markers
    }

    fn is_stop_row(&self, row: &[String]) -> bool {
        if self.stop_markers.is_empty() {
            return false;
        }
        let joined = row.concat().to_lowercase();
        self.stop_markers.iter().any(|marker| joined.contains(marker.as_str()))
    }

    fn is_header_row(patterns: &PatternSet, row: &[String]) -> bool {
        row.iter().any(|c| match_header(c, patterns))
    }

    /// Splits a grid into its header row and data rows.
    ///
    /// With header patterns configured and no matching row, the scan yields
    /// no header and no rows.
    #[must_use]
    pub fn scan<'a>(&self, grid: &'a Grid) -> Scan<'a> {
        let mut scan = Scan {
            header: (!grid.header().is_empty()).then_some(grid.header()),
            ..Scan::default()
        };

        let mut rows = grid.rows().iter().map(Vec::as_slice);

        if let Some(patterns) = &self.header_patterns {
            scan.header = None;
            for row in rows.by_ref() {
                if is_blank_row(row) {
                    continue;
                }
                if Self::is_header_row(patterns, row) {
                    scan.header = Some(row);
                    break;
                }
            }
            if scan.header.is_none() {
                debug!(rows = grid.len(), "No header row found");
                return scan;
            }
        }

        for row in rows {
            if is_blank_row(row) {
                continue;
            }
            if self.is_stop_row(row) {
                trace!(row = ?row, "Stop marker reached");
                scan.stopped = true;
                break;
            }
            scan.rows.push(row);
        }
        scan
    }

    /// Extracts a time-series section keyed by the first column.
    ///
    /// Each data row contributes its remaining cells as one value per period. Labels are canonicalized so that "Sales +" is stored under
    /// the non-breaking-space key used by scraped pages. Header cells after
    /// the first become the period names. A repeated label keeps the
    /// last row.
    #[must_use]
    pub fn extract_series(&self, grid: &Grid) -> TimeSeriesSection {
        let scan = self.scan(grid);
        let periods = scan
            .header
            .map(|header| {
                header
                    .iter()
                    .skip(1)
                    .map(|p| p.trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut section = TimeSeriesSection::with_periods(periods);
        for row in scan.rows {
            let label = cell(row, 0);
            if label.is_empty() {
                continue;
            }
            let values = row
                .iter()
                .skip(1)
                .map(|v| v.trim().to_string())
                .collect();
            section.insert(label, values);
        }
        section
    }

    /// Extracts row records keyed by header text.
    ///
    /// Blank header cells are not keyed; cells missing from short rows read as
    /// `""`. Without a header row nothing is extracted.
    #[must_use]
    pub fn extract_records(&self, grid: &Grid) -> Vec<BTreeMap<String, String>> {
        let scan = self.scan(grid);
        let Some(header) = scan.header else {
            return Vec::new();
        };
        let keys: Vec<(usize, String)> = header
            .iter()
            .enumerate()
            .map(|(i, h)| (i, canonical_label(h)))
            .filter(|(_, h)| !h.is_empty())
            .collect();

        scan.rows
            .into_iter()
            .map(|row| {
                keys.iter()
                    .map(|(i, key)| (key.clone(), cell(row, *i).to_string()))
                    .collect()
            })
            .collect()
    }
}
