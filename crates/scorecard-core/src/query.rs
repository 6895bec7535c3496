//! Instrument name queries.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Corporate-suffix and connector substitutions applied to query text.
static SUBSTITUTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)\bcorporation\b", "Corpn"),
        (r"(?i)\blimited\b", "Ltd"),
        (r"(?i)\band\b", "&"),
    ]
    .into_iter()
    .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
    .collect()
});

/// A free-text instrument name and its cleaned search variant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentQuery {
    raw: String,
    cleaned: String,
}

impl InstrumentQuery {
    /// Creates a query, deriving the cleaned variant.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let cleaned = clean_name(&raw);
        Self { raw, cleaned }
    }

    /// Returns the name as supplied.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the cleaned name used for text search.
    #[must_use]
    pub fn cleaned(&self) -> &str {
        &self.cleaned
    }
}

impl fmt::Display for InstrumentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for InstrumentQuery {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Applies the corporate-suffix substitutions ("Corporation" to "Corpn",
/// "Limited" to "Ltd", "and" to "&"), case-insensitively on whole words,
/// and collapses whitespace.
#[must_use]
pub fn clean_name(name: &str) -> String {
    let replaced = SUBSTITUTIONS
        .iter()
        .fold(name.to_string(), |acc, (re, replacement)| {
            re.replace_all(&acc, *replacement).into_owned()
        });
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name_suffixes() {
        assert_eq!(clean_name("Tata Motors Limited"), "Tata Motors Ltd");
        assert_eq!(
            clean_name("Oil and Natural Gas Corporation Limited"),
            "Oil & Natural Gas Corpn Ltd"
        );
        assert_eq!(clean_name("LARSEN AND TOUBRO LIMITED"), "LARSEN & TOUBRO Ltd");
    }

    #[test]
    fn test_clean_name_keeps_word_fragments() {
        assert_eq!(clean_name("Brandon Holdings"), "Brandon Holdings");
        assert_eq!(clean_name("Unlimited Corp"), "Unlimited Corp");
    }

    #[test]
    fn test_query_keeps_raw() {
        let query = InstrumentQuery::new("  Bajaj Finance   Limited ");
        assert_eq!(query.raw(), "  Bajaj Finance   Limited ");
        assert_eq!(query.cleaned(), "Bajaj Finance Ltd");
    }
}
