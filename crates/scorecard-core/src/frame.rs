//! DataFrame views of statement sections.

use polars::prelude::*;
use std::collections::HashSet;

use crate::{
    error::{Result, ScoreError},
    parse::parse_number,
    types::TimeSeriesSection,
};

impl TimeSeriesSection {
    /// Builds a DataFrame with a `label` column and one `Float64` column per
    /// period, oldest first. Unparsable cells become nulls.
    ///
    /// Period columns take the section's period headers; unnamed or repeated
    /// headers fall back to `p{index}`.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let width = self.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        let labels: Vec<&str> = self.labels().map(String::as_str).collect();

        let mut seen = HashSet::from(["label".to_string()]);
        let mut columns = vec![Column::new("label".into(), labels)];

        for index in 0..width {
            let header = self
                .periods()
                .get(index)
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty() && !seen.contains(p))
                .unwrap_or_else(|| format!("p{index}"));
            seen.insert(header.clone());

            let values: Vec<Option<f64>> = self
                .iter()
                .map(|(_, v)| v.get(index).and_then(|raw| parse_number(raw)))
                .collect();
            columns.push(Column::new(header.as_str().into(), values));
        }

        DataFrame::new(columns).map_err(|e| ScoreError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_frame_shape() {
        let mut section = TimeSeriesSection::with_periods(vec![
            "Mar 2023".to_string(),
            "Mar 2024".to_string(),
            "TTM".to_string(),
        ]);
        section.insert("Sales +", vec!["1,000".into(), "1,200".into(), "1,300".into()]);
        section.insert("OPM %", vec!["20%".into(), "-".into()]);

        let df = section.to_frame().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 4);

        let mar_2024 = df.column("Mar 2024").unwrap().f64().unwrap();
        assert_eq!(mar_2024.null_count(), 1);
        let ttm = df.column("TTM").unwrap().f64().unwrap();
        assert_eq!(ttm.get(1), Some(1300.0));
    }

    #[test]
    fn test_to_frame_unnamed_periods() {
        let mut section = TimeSeriesSection::new();
        section.insert("Equity Capital", vec!["10".into(), "10".into()]);
        let df = section.to_frame().unwrap();
        assert!(df.column("p0").is_ok());
        assert!(df.column("p1").is_ok());
    }

    #[test]
    fn test_to_frame_empty() {
        let df = TimeSeriesSection::new().to_frame().unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 1);
    }
}
