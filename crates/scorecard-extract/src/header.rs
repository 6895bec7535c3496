//! Pattern-based header matching.
//!
//! Header cells are normalized (trimmed and lowercased) and tested against
//! regular expressions, so wording variants such as "Name of Instrument" and
//! "Name of the Instrument" map to the same field.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::grid::cell;

/// An ordered set of header patterns.
#[derive(Clone, Debug, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compiles a pattern set.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns })
    }

    /// Compiles patterns that are known to be valid, dropping any that are not.
    fn fixed(patterns: &[&str]) -> Self {
        Self { patterns: patterns.iter().filter_map(|p| Regex::new(p).ok()).collect() }
    }

    /// Returns true if any pattern matches the already-normalized text.
    #[must_use]
    pub fn is_match(&self, normalized: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(normalized))
    }

    /// Returns the number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if the set has no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Trims and lowercases header text.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Tests a header cell against a pattern set after normalizing it.
#[must_use]
pub fn match_header(cell_text: &str, patterns: &PatternSet) -> bool {
    patterns.is_match(&normalize(cell_text))
}

/// Semantic columns of a holdings sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HoldingField {
    /// Instrument name; also the header-row anchor.
    InstrumentName,
    /// ISIN code.
    Isin,
    /// Industry or credit rating.
    IndustryRating,
    /// Quantity held.
    Quantity,
    /// Market or fair value.
    MarketValue,
    /// Share of net assets.
    PercentageOfAum,
}

static INSTRUMENT_NAME: LazyLock<PatternSet> =
    LazyLock::new(|| PatternSet::fixed(&[r"name\s*of\s*(the)?\s*instrument"]));
static ISIN: LazyLock<PatternSet> = LazyLock::new(|| PatternSet::fixed(&[r"isin"]));
static INDUSTRY_RATING: LazyLock<PatternSet> = LazyLock::new(|| {
    PatternSet::fixed(&[r"rating\s*/\s*industry", r"industry\s*/\s*rating"])
});
static QUANTITY: LazyLock<PatternSet> = LazyLock::new(|| PatternSet::fixed(&[r"quantity"]));
static MARKET_VALUE: LazyLock<PatternSet> = LazyLock::new(|| {
    PatternSet::fixed(&[r"market\s*/\s*fair\s*value.*", r"market\s*value.*"])
});
static PERCENTAGE_OF_AUM: LazyLock<PatternSet> =
    LazyLock::new(|| PatternSet::fixed(&[r"%.*nav", r"%.*net\s*assets"]));

impl HoldingField {
    /// All fields in classification order.
    pub const ALL: [Self; 6] = [
        Self::InstrumentName,
        Self::Isin,
        Self::IndustryRating,
        Self::Quantity,
        Self::MarketValue,
        Self::PercentageOfAum,
    ];

    /// Returns the field name used in output rows.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::InstrumentName => "Name of the Instrument",
            Self::Isin => "ISIN",
            Self::IndustryRating => "Industry/Rating",
            Self::Quantity => "Quantity",
            Self::MarketValue => "Market/Fair Value",
            Self::PercentageOfAum => "Percentage of AUM",
        }
    }

    /// Returns the header patterns recognizing this field.
    #[must_use]
    pub fn patterns(&self) -> &'static PatternSet {
        match self {
            Self::InstrumentName => &INSTRUMENT_NAME,
            Self::Isin => &ISIN,
            Self::IndustryRating => &INDUSTRY_RATING,
            Self::Quantity => &QUANTITY,
            Self::MarketValue => &MARKET_VALUE,
            Self::PercentageOfAum => &PERCENTAGE_OF_AUM,
        }
    }
}

impl fmt::Display for HoldingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Classifies one header cell. The first field in [`HoldingField::ALL`]
/// order whose patterns match wins.
#[must_use]
pub fn classify_header(cell_text: &str) -> Option<HoldingField> {
    let normalized = normalize(cell_text);
    HoldingField::ALL
        .into_iter()
        .find(|field| field.patterns().is_match(&normalized))
}

/// Field-to-column assignment for one sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: BTreeMap<HoldingField, usize>,
}

impl ColumnMap {
    /// Returns the column index of a field.
    #[must_use]
    pub fn get(&self, field: HoldingField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// Returns the trimmed cell for a field, or `""` when the field is
    /// unmapped or the row is short.
    #[must_use]
    pub fn cell<'a>(&self, row: &'a [String], field: HoldingField) -> &'a str {
        self.get(field).map_or("", |index| cell(row, index))
    }

    /// Iterates mapped fields in field order.
    pub fn iter(&self) -> impl Iterator<Item = (HoldingField, usize)> + '_ {
        self.columns.iter().map(|(field, index)| (*field, *index))
    }

    /// Returns the number of mapped fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no field was mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Maps header cells to semantic fields, scanning left to right.
///
/// Unmatched columns are ignored. When several columns match the same field,
/// the rightmost one wins.
#[must_use]
pub fn map_columns(header: &[String]) -> ColumnMap {
    let columns = header
        .iter()
        .enumerate()
        .filter_map(|(index, text)| classify_header(text).map(|field| (field, index)))
        .collect();
    ColumnMap { columns }
}

/// Patterns that identify a holdings header row.
#[must_use]
pub fn instrument_header_patterns() -> &'static PatternSet {
    HoldingField::InstrumentName.patterns()
}
