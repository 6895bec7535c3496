//! Holdings sheet extraction.

use serde::{Serialize, Serializer, ser::SerializeMap};
use std::collections::BTreeMap;
use tracing::debug;

use crate::{
    grid::Grid,
    header::{ColumnMap, HoldingField, instrument_header_patterns, map_columns},
    section::SectionExtractor,
};

/// One holdings row, restricted to the fields the sheet's header mapped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HoldingRow {
    fields: BTreeMap<HoldingField, String>,
}

impl HoldingRow {
    /// Returns the value of a field, or `""` when unmapped.
    #[must_use]
    pub fn get(&self, field: HoldingField) -> &str {
        self.fields.get(&field).map_or("", String::as_str)
    }

    /// Returns the instrument name.
    #[must_use]
    pub fn instrument_name(&self) -> &str {
        self.get(HoldingField::InstrumentName)
    }

    /// Replaces the value of a field.
    pub fn set(&mut self, field: HoldingField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// Iterates mapped fields in field order.
    pub fn iter(&self) -> impl Iterator<Item = (HoldingField, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

impl FromIterator<(HoldingField, String)> for HoldingRow {
    fn from_iter<I: IntoIterator<Item = (HoldingField, String)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

impl Serialize for HoldingRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.display_name(), value)?;
        }
        map.end()
    }
}

/// Rows extracted from one holdings sheet.
#[derive(Clone, Debug, Default)]
pub struct HoldingSheet {
    /// Field-to-column assignment derived from the header row.
    pub columns: ColumnMap,
    /// Rows with a non-empty instrument name, in sheet order.
    pub rows: Vec<HoldingRow>,
}

impl HoldingSheet {
    /// Extracts holdings with the default stop markers.
    #[must_use]
    pub fn extract(grid: &Grid) -> Self {
        Self::extract_with(&SectionExtractor::new(), grid)
    }

    /// Extracts holdings using `extractor`'s stop markers. The header row is
    /// always detected by the instrument-name patterns.
    #[must_use]
    pub fn extract_with(extractor: &SectionExtractor, grid: &Grid) -> Self {
        let extractor = extractor.clone().with_header_patterns(instrument_header_patterns().clone());
        let scan = extractor.scan(grid);
        let Some(header) = scan.header else {
            return Self::default();
        };

        let columns = map_columns(header);
        let rows: Vec<HoldingRow> = scan
            .rows
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|(field, _)| (field, columns.cell(row, field).to_string()))
                    .collect::<HoldingRow>()
            })
            .filter(|row| !row.instrument_name().is_empty())
            .collect();

        debug!(columns = columns.len(), rows = rows.len(), stopped = scan.stopped, "Extracted holdings");
        Self { columns, rows }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows were extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
