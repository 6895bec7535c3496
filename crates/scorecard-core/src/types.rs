//! Core record types.
//!
//! This module defines the normalized per-instrument data:
//!
//! - [`TimeSeriesSection`] - one financial statement across reporting periods
//! - [`ShareholdingPattern`] - quarterly and yearly shareholding tables
//! - [`PeerRecord`] / [`PeerSet`] - the peer comparison table
//! - [`CanonicalRecord`] - everything known about one instrument
//! - [`CompanyDocument`] - a freshly extracted record plus page metadata
//!
//! Values stay raw strings until a consumer parses them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::parse::{MarketCapCategory, canonical_label, parse_number, to_float};
use crate::value::DocValue;

/// Document keys used for stored instrument records.
pub mod fields {
    /// Instrument name, the store's primary key.
    pub const NAME: &str = "name";
    /// Source locator of the instrument page.
    pub const URL: &str = "url";
    /// Market capitalisation.
    pub const MARKET_CAP: &str = "marketCap";
    /// Current price.
    pub const CURRENT_PRICE: &str = "currentPrice";
    /// 52-week high / low.
    pub const HIGH_LOW: &str = "highLow";
    /// Price to earnings.
    pub const STOCK_PE: &str = "stockPE";
    /// Book value.
    pub const BOOK_VALUE: &str = "bookValue";
    /// Dividend yield.
    pub const DIVIDEND_YIELD: &str = "dividendYield";
    /// Return on capital employed.
    pub const ROCE: &str = "roce";
    /// Return on equity.
    pub const ROE: &str = "roe";
    /// Face value.
    pub const FACE_VALUE: &str = "faceValue";
    /// Strengths listed by the source.
    pub const PROS: &str = "pros";
    /// Weaknesses listed by the source.
    pub const CONS: &str = "cons";
    /// Shareholding tables.
    pub const SHAREHOLDING: &str = "shareholdingPattern";
    /// Peer comparison table.
    pub const PEERS: &str = "peers";
}

/// Statement sections carried by a [`CanonicalRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionKind {
    /// Quarterly results.
    QuarterlyResults,
    /// Annual profit and loss.
    ProfitLoss,
    /// Annual balance sheet.
    BalanceSheet,
    /// Annual cash flows.
    CashFlows,
    /// Efficiency ratios.
    Ratios,
}

impl SectionKind {
    /// All sections in page order.
    pub const ALL: [Self; 5] = [
        Self::QuarterlyResults,
        Self::ProfitLoss,
        Self::BalanceSheet,
        Self::CashFlows,
        Self::Ratios,
    ];

    /// Returns the document key of this section.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::QuarterlyResults => "quarterlyResults",
            Self::ProfitLoss => "profitLoss",
            Self::BalanceSheet => "balanceSheet",
            Self::CashFlows => "cashFlows",
            Self::Ratios => "ratios",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One statement section: line-item label to per-period raw values,
/// oldest period first.
///
/// Labels are stored canonicalized (see [`canonical_label`]).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "DocValue", into = "DocValue")]
pub struct TimeSeriesSection {
    periods: Vec<String>,
    lines: BTreeMap<String, Vec<String>>,
}

impl TimeSeriesSection {
    /// Reserved document key holding the period headers.
    pub const PERIODS_KEY: &'static str = "_periods";

    /// Creates an empty section.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            periods: Vec::new(),
            lines: BTreeMap::new(),
        }
    }

    /// Creates an empty section with period headers.
    #[must_use]
    pub fn with_periods(periods: Vec<String>) -> Self {
        Self {
            periods,
            lines: BTreeMap::new(),
        }
    }

    /// Returns the period headers, oldest first. May be empty.
    #[must_use]
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Inserts a line under its canonical label, replacing any previous one.
    pub fn insert(&mut self, label: &str, values: Vec<String>) {
        self.lines.insert(canonical_label(label), values);
    }

    /// Exact lookup by stored key. Missing labels yield an empty slice.
    #[must_use]
    pub fn get(&self, key: &str) -> &[String] {
        self.lines.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Lookup by a human label: canonicalized first, then matched
    /// case-insensitively.
    #[must_use]
    pub fn line(&self, label: &str) -> &[String] {
        let key = canonical_label(label);
        if let Some(values) = self.lines.get(&key) {
            return values;
        }
        let lowered = key.to_lowercase();
        self.lines
            .iter()
            .find(|(k, _)| k.to_lowercase() == lowered)
            .map(|(_, v)| v.as_slice())
            .unwrap_or_default()
    }

    /// Parsed value of the most recent period of a line, if any.
    #[must_use]
    pub fn latest(&self, label: &str) -> Option<f64> {
        self.line(label).last().and_then(|raw| parse_number(raw))
    }

    /// Iterates over `(label, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.lines.iter()
    }

    /// Returns the stored labels.
    pub fn labels(&self) -> impl Iterator<Item = &String> {
        self.lines.keys()
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if there are no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Reads a section from a stored document.
    ///
    /// Array elements may be plain scalars or single-entry `{period: value}`
    /// maps; the latter contribute their value.
    #[must_use]
    pub fn from_document(doc: &DocValue) -> Self {
        let mut section = Self::new();
        for (key, value) in doc.entries() {
            if key == Self::PERIODS_KEY {
                section.periods = value.to_string_array();
                continue;
            }
            let values = value
                .items()
                .iter()
                .map(|item| match item {
                    DocValue::Map(_) => item
                        .entries()
                        .next()
                        .map(|(_, v)| v.to_text())
                        .unwrap_or_default(),
                    other => other.to_text(),
                })
                .collect();
            section.insert(key, values);
        }
        section
    }

    /// Writes the section as a stored document.
    #[must_use]
    pub fn to_document(&self) -> DocValue {
        let mut doc: DocValue = self
            .lines
            .iter()
            .map(|(k, v)| (k.clone(), DocValue::from(v.clone())))
            .collect();
        if !self.periods.is_empty() {
            doc.insert(Self::PERIODS_KEY, self.periods.clone());
        }
        doc
    }
}

impl From<DocValue> for TimeSeriesSection {
    fn from(doc: DocValue) -> Self {
        Self::from_document(&doc)
    }
}

impl From<TimeSeriesSection> for DocValue {
    fn from(section: TimeSeriesSection) -> Self {
        section.to_document()
    }
}

impl FromIterator<(String, Vec<String>)> for TimeSeriesSection {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut section = Self::new();
        for (label, values) in iter {
            section.insert(&label, values);
        }
        section
    }
}

/// One shareholder category across periods.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareholdingRow {
    /// Holder category (e.g. "Promoters", "FIIs").
    pub category: String,
    /// Period header to raw percentage.
    pub values: BTreeMap<String, String>,
}

/// Quarterly and yearly shareholding tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareholdingPattern {
    /// Rows of the quarterly table.
    pub quarterly: Vec<ShareholdingRow>,
    /// Rows of the yearly table.
    pub yearly: Vec<ShareholdingRow>,
}

impl ShareholdingPattern {
    /// Returns true if neither table has rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quarterly.is_empty() && self.yearly.is_empty()
    }

    fn rows_from(doc: Option<&DocValue>) -> Vec<ShareholdingRow> {
        doc.map(DocValue::items)
            .unwrap_or_default()
            .iter()
            .map(|row| ShareholdingRow {
                category: row.get("category").map(DocValue::to_text).unwrap_or_default(),
                values: row
                    .get("values")
                    .map(|v| v.entries().map(|(k, v)| (k.clone(), v.to_text())).collect())
                    .unwrap_or_default(),
            })
            .collect()
    }

    fn rows_to(rows: &[ShareholdingRow]) -> DocValue {
        DocValue::Array(
            rows.iter()
                .map(|row| {
                    let mut doc = DocValue::map();
                    doc.insert("category", row.category.clone());
                    doc.insert("values", row.values.clone());
                    doc
                })
                .collect(),
        )
    }

    /// Reads the pattern from a stored document.
    #[must_use]
    pub fn from_document(doc: &DocValue) -> Self {
        Self {
            quarterly: Self::rows_from(doc.get("quarterly")),
            yearly: Self::rows_from(doc.get("yearly")),
        }
    }

    /// Writes the pattern as a stored document. Empty tables are omitted.
    #[must_use]
    pub fn to_document(&self) -> DocValue {
        let mut doc = DocValue::map();
        if !self.quarterly.is_empty() {
            doc.insert("quarterly", Self::rows_to(&self.quarterly));
        }
        if !self.yearly.is_empty() {
            doc.insert("yearly", Self::rows_to(&self.yearly));
        }
        doc
    }
}

/// One row of the peer comparison table. All values are raw text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerRecord {
    /// Company name (empty for the median row).
    pub name: String,
    /// Current market price.
    pub current_price: String,
    /// Price to earnings.
    pub pe: String,
    /// Market capitalisation.
    pub market_cap: String,
    /// Dividend yield.
    pub div_yield: String,
    /// Net profit of the latest quarter.
    pub np_qtr: String,
    /// Quarterly profit variation.
    pub qtr_profit_var: String,
    /// Sales of the latest quarter.
    pub sales_qtr: String,
    /// Quarterly sales variation.
    pub qtr_sales_var: String,
    /// Return on capital employed.
    pub roce: String,
    /// Number of companies summarized (median row only).
    pub company_count: Option<String>,
}

impl PeerRecord {
    /// Parsed price to earnings.
    #[must_use]
    pub fn pe(&self) -> f64 {
        to_float(&self.pe)
    }

    /// Parsed market cap.
    #[must_use]
    pub fn market_cap(&self) -> f64 {
        to_float(&self.market_cap)
    }

    /// Parsed dividend yield.
    #[must_use]
    pub fn dividend_yield(&self) -> f64 {
        to_float(&self.div_yield)
    }

    /// Parsed return on capital employed.
    #[must_use]
    pub fn roce(&self) -> f64 {
        to_float(&self.roce)
    }

    /// Parsed quarterly sales.
    #[must_use]
    pub fn quarterly_sales(&self) -> f64 {
        to_float(&self.sales_qtr)
    }

    /// Parsed quarterly profit.
    #[must_use]
    pub fn quarterly_profit(&self) -> f64 {
        to_float(&self.np_qtr)
    }

    /// Reads a peer row from a stored document.
    #[must_use]
    pub fn from_document(doc: &DocValue) -> Self {
        let text = |key: &str| doc.get(key).map(DocValue::to_text).unwrap_or_default();
        Self {
            name: text("name"),
            current_price: text("current_price"),
            pe: text("pe"),
            market_cap: text("market_cap"),
            div_yield: text("div_yield"),
            np_qtr: text("np_qtr"),
            qtr_profit_var: text("qtr_profit_var"),
            sales_qtr: text("sales_qtr"),
            qtr_sales_var: text("qtr_sales_var"),
            roce: text("roce"),
            company_count: doc.get("company_count").map(DocValue::to_text),
        }
    }

    /// Writes the peer row as a stored document.
    #[must_use]
    pub fn to_document(&self) -> DocValue {
        let mut doc = DocValue::map();
        if !self.name.is_empty() {
            doc.insert("name", self.name.clone());
        }
        doc.insert("current_price", self.current_price.clone());
        doc.insert("pe", self.pe.clone());
        doc.insert("market_cap", self.market_cap.clone());
        doc.insert("div_yield", self.div_yield.clone());
        doc.insert("np_qtr", self.np_qtr.clone());
        doc.insert("qtr_profit_var", self.qtr_profit_var.clone());
        doc.insert("sales_qtr", self.sales_qtr.clone());
        doc.insert("qtr_sales_var", self.qtr_sales_var.clone());
        doc.insert("roce", self.roce.clone());
        if let Some(count) = &self.company_count {
            doc.insert("company_count", count.clone());
        }
        doc
    }
}

/// Peer comparison table. The last record is the aggregate (median) row,
/// not a peer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSet {
    records: Vec<PeerRecord>,
}

impl PeerSet {
    /// Creates a peer set from records whose last element is the median.
    #[must_use]
    pub const fn new(records: Vec<PeerRecord>) -> Self {
        Self { records }
    }

    /// Creates a peer set from peers followed by the median row.
    #[must_use]
    pub fn from_parts(mut peers: Vec<PeerRecord>, median: PeerRecord) -> Self {
        peers.push(median);
        Self { records: peers }
    }

    /// Splits into `(peers, median)`. `None` when there are fewer than two
    /// records, since then there is no peer to compare with.
    #[must_use]
    pub fn split(&self) -> Option<(&[PeerRecord], &PeerRecord)> {
        match self.records.split_last() {
            Some((median, peers)) if !peers.is_empty() => Some((peers, median)),
            _ => None,
        }
    }

    /// Returns all records including the median.
    #[must_use]
    pub fn records(&self) -> &[PeerRecord] {
        &self.records
    }

    /// Returns the number of records including the median.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reads a peer set from a stored array.
    #[must_use]
    pub fn from_document(doc: &DocValue) -> Self {
        Self::new(doc.items().iter().map(PeerRecord::from_document).collect())
    }

    /// Writes the peer set as a stored array.
    #[must_use]
    pub fn to_document(&self) -> DocValue {
        DocValue::Array(self.records.iter().map(PeerRecord::to_document).collect())
    }
}

/// Everything known about one instrument.
///
/// Stored as a document bag; see [`CanonicalRecord::from_document`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "DocValue", into = "DocValue")]
pub struct CanonicalRecord {
    /// Instrument name; primary key in the document store.
    pub name: String,
    /// Locator of the source page.
    pub url: Option<String>,
    /// Market capitalisation (raw).
    pub market_cap: String,
    /// Current price (raw).
    pub current_price: String,
    /// 52-week high / low (raw).
    pub high_low: String,
    /// Price to earnings (raw).
    pub stock_pe: String,
    /// Book value (raw).
    pub book_value: String,
    /// Dividend yield (raw).
    pub dividend_yield: String,
    /// Return on capital employed (raw).
    pub roce: String,
    /// Return on equity (raw).
    pub roe: String,
    /// Face value (raw).
    pub face_value: String,
    /// Strengths listed by the source.
    pub pros: Vec<String>,
    /// Weaknesses listed by the source.
    pub cons: Vec<String>,
    /// Quarterly results section.
    pub quarterly_results: TimeSeriesSection,
    /// Profit and loss section.
    pub profit_loss: TimeSeriesSection,
    /// Balance sheet section.
    pub balance_sheet: TimeSeriesSection,
    /// Cash flow section.
    pub cash_flows: TimeSeriesSection,
    /// Ratios section.
    pub ratios: TimeSeriesSection,
    /// Shareholding tables.
    pub shareholding: ShareholdingPattern,
    /// Peer comparison table, median last.
    pub peers: PeerSet,
}

impl CanonicalRecord {
    /// Creates an empty record with a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns one of the statement sections.
    #[must_use]
    pub const fn section(&self, kind: SectionKind) -> &TimeSeriesSection {
        match kind {
            SectionKind::QuarterlyResults => &self.quarterly_results,
            SectionKind::ProfitLoss => &self.profit_loss,
            SectionKind::BalanceSheet => &self.balance_sheet,
            SectionKind::CashFlows => &self.cash_flows,
            SectionKind::Ratios => &self.ratios,
        }
    }

    /// Returns one of the statement sections mutably.
    pub fn section_mut(&mut self, kind: SectionKind) -> &mut TimeSeriesSection {
        match kind {
            SectionKind::QuarterlyResults => &mut self.quarterly_results,
            SectionKind::ProfitLoss => &mut self.profit_loss,
            SectionKind::BalanceSheet => &mut self.balance_sheet,
            SectionKind::CashFlows => &mut self.cash_flows,
            SectionKind::Ratios => &mut self.ratios,
        }
    }

    /// Parsed price to earnings.
    #[must_use]
    pub fn pe(&self) -> f64 {
        to_float(&self.stock_pe)
    }

    /// Parsed market cap.
    #[must_use]
    pub fn market_cap_value(&self) -> f64 {
        to_float(&self.market_cap)
    }

    /// Parsed dividend yield.
    #[must_use]
    pub fn dividend_yield(&self) -> f64 {
        to_float(&self.dividend_yield)
    }

    /// Parsed return on capital employed.
    #[must_use]
    pub fn roce(&self) -> f64 {
        to_float(&self.roce)
    }

    /// Market cap bucket of the stored market cap.
    #[must_use]
    pub fn market_cap_category(&self) -> MarketCapCategory {
        MarketCapCategory::from_raw(&self.market_cap)
    }

    /// Reads a record from a stored document bag. Missing or mistyped
    /// fields take their empty defaults.
    #[must_use]
    pub fn from_document(doc: &DocValue) -> Self {
        let text = |key: &str| doc.get(key).map(DocValue::to_text).unwrap_or_default();
        let strings = |key: &str| doc.get(key).map(DocValue::to_string_array).unwrap_or_default();
        let section = |kind: SectionKind| {
            doc.get(kind.key())
                .map(TimeSeriesSection::from_document)
                .unwrap_or_default()
        };

        Self {
            name: text(fields::NAME),
            url: doc
                .get(fields::URL)
                .and_then(DocValue::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            market_cap: text(fields::MARKET_CAP),
            current_price: text(fields::CURRENT_PRICE),
            high_low: text(fields::HIGH_LOW),
            stock_pe: text(fields::STOCK_PE),
            book_value: text(fields::BOOK_VALUE),
            dividend_yield: text(fields::DIVIDEND_YIELD),
            roce: text(fields::ROCE),
            roe: text(fields::ROE),
            face_value: text(fields::FACE_VALUE),
            pros: strings(fields::PROS),
            cons: strings(fields::CONS),
            quarterly_results: section(SectionKind::QuarterlyResults),
            profit_loss: section(SectionKind::ProfitLoss),
            balance_sheet: section(SectionKind::BalanceSheet),
            cash_flows: section(SectionKind::CashFlows),
            ratios: section(SectionKind::Ratios),
            shareholding: doc
                .get(fields::SHAREHOLDING)
                .map(ShareholdingPattern::from_document)
                .unwrap_or_default(),
            peers: doc
                .get(fields::PEERS)
                .map(PeerSet::from_document)
                .unwrap_or_default(),
        }
    }

    /// Writes the record as a document bag.
    #[must_use]
    pub fn to_document(&self) -> DocValue {
        let mut doc = DocValue::map();
        doc.insert(fields::NAME, self.name.clone());
        if let Some(url) = &self.url {
            doc.insert(fields::URL, url.clone());
        }
        doc.insert(fields::MARKET_CAP, self.market_cap.clone());
        doc.insert(fields::CURRENT_PRICE, self.current_price.clone());
        doc.insert(fields::HIGH_LOW, self.high_low.clone());
        doc.insert(fields::STOCK_PE, self.stock_pe.clone());
        doc.insert(fields::BOOK_VALUE, self.book_value.clone());
        doc.insert(fields::DIVIDEND_YIELD, self.dividend_yield.clone());
        doc.insert(fields::ROCE, self.roce.clone());
        doc.insert(fields::ROE, self.roe.clone());
        doc.insert(fields::FACE_VALUE, self.face_value.clone());
        doc.insert(fields::PROS, self.pros.clone());
        doc.insert(fields::CONS, self.cons.clone());
        for kind in SectionKind::ALL {
            doc.insert(kind.key(), self.section(kind).to_document());
        }
        doc.insert(fields::SHAREHOLDING, self.shareholding.to_document());
        doc.insert(fields::PEERS, self.peers.to_document());
        doc
    }
}

impl From<DocValue> for CanonicalRecord {
    fn from(doc: DocValue) -> Self {
        Self::from_document(&doc)
    }
}

impl From<CanonicalRecord> for DocValue {
    fn from(record: CanonicalRecord) -> Self {
        record.to_document()
    }
}

/// A record freshly extracted from a live page, with the token used to
/// fetch its peer table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompanyDocument {
    /// Extracted record (peers not yet attached).
    pub record: CanonicalRecord,
    /// Identifier of the page's peer table, when the page carries one.
    pub warehouse_id: Option<String>,
}
