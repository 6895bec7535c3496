//! Lenient parsing of scraped text values.
//!
//! Scraped values stay raw until a consumer needs a number. These helpers
//! are total: they never fail, they return `None` or a documented default.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Non-breaking space used by upstream pages in front of the `+` of
/// expandable line items ("Sales\u{a0}+").
pub const NBSP: char = '\u{a0}';

/// Parses a scraped numeric value.
///
/// Thousands separators, whitespace, the rupee sign and a trailing `Cr.` unit
/// are stripped. A `%` anywhere in the text marks a percentage and the value
/// is divided by 100. Returns `None` for blank, `-` or non-numeric text.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '₹')
        .collect();
    if let Some(stripped) = cleaned.strip_suffix("Cr.") {
        cleaned = stripped.to_string();
    }

    let percent = cleaned.contains('%');
    if percent {
        cleaned.retain(|c| c != '%');
    }

    if cleaned.is_empty() {
        return None;
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(if percent { value / 100.0 } else { value }),
        _ => {
            trace!(raw, "Unparsable numeric text");
            None
        }
    }
}

/// Parses a scraped numeric value, defaulting to `0.0`.
#[must_use]
pub fn to_float(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}

/// Normalizes a line-item label into its lookup key.
///
/// Whitespace runs collapse to one space, the ends are trimmed, and every
/// `" +"` becomes `"\u{a0}+"` to match how upstream pages encode
/// expandable rows.
#[must_use]
pub fn canonical_label(label: &str) -> String {
    let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace(" +", &format!("{NBSP}+"))
}

/// Market capitalisation bucket derived from a stored market-cap value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCapCategory {
    /// Market cap of 20000 or more.
    #[serde(rename = "Large Cap")]
    LargeCap,
    /// Market cap in `[5000, 20000)`.
    #[serde(rename = "Mid Cap")]
    MidCap,
    /// Market cap below 5000.
    #[serde(rename = "Small Cap")]
    SmallCap,
    /// Market cap missing or unparsable.
    #[serde(rename = "Unknown Category")]
    Unknown,
}

impl MarketCapCategory {
    /// Lower bound of the large cap bucket.
    pub const LARGE_CAP_FLOOR: f64 = 20_000.0;
    /// Lower bound of the mid cap bucket.
    pub const MID_CAP_FLOOR: f64 = 5_000.0;

    /// Buckets a numeric market cap.
    #[must_use]
    pub fn from_value(market_cap: f64) -> Self {
        if market_cap.is_nan() {
            Self::Unknown
        } else if market_cap >= Self::LARGE_CAP_FLOOR {
            Self::LargeCap
        } else if market_cap >= Self::MID_CAP_FLOOR {
            Self::MidCap
        } else {
            Self::SmallCap
        }
    }

    /// Buckets a raw market-cap text such as `"1,23,456"`.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        parse_number(raw).map_or(Self::Unknown, Self::from_value)
    }

    /// Returns the display label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LargeCap => "Large Cap",
            Self::MidCap => "Mid Cap",
            Self::SmallCap => "Small Cap",
            Self::Unknown => "Unknown Category",
        }
    }
}

impl fmt::Display for MarketCapCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
