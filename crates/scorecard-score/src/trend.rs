//! Trend scoring over a record's own history.
//!
//! Every label's values are compared period over period: a rise scores +5 and
//! a fall scores -5. Equal pairs, and pairs where either side does not parse,
//! are not counted. The result is the total divided by the number of counted
//! comparisons.

use scorecard_core::{TimeSeriesSection, parse_number};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::iter::Sum;
use std::ops::Add;

/// Points for one rising or falling pair.
pub const STEP_POINTS: f64 = 5.0;

/// Running total of trend points and counted comparisons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendTally {
    /// Sum of points.
    pub points: f64,
    /// Number of rising or falling pairs.
    pub comparisons: usize,
}

impl TrendTally {
    /// Tallies one label's values, oldest first.
    #[must_use]
    pub fn of_line(values: &[String]) -> Self {
        let parsed: Vec<Option<f64>> = values.iter().map(|raw| parse_number(raw)).collect();
        parsed
            .windows(2)
            .filter_map(|pair| match (pair[0], pair[1]) {
                (Some(previous), Some(current)) => current.partial_cmp(&previous),
                _ => None,
            })
            .map(|ordering| match ordering {
                Ordering::Greater => Self { points: STEP_POINTS, comparisons: 1 },
                Ordering::Less => Self { points: -STEP_POINTS, comparisons: 1 },
                Ordering::Equal => Self::default(),
            })
            .sum()
    }

    /// Tallies every line of a section.
    #[must_use]
    pub fn of_section(section: &TimeSeriesSection) -> Self {
        section.iter().map(|(_, values)| Self::of_line(values)).sum()
    }

    /// Average points per comparison, or 0 without comparisons.
    #[must_use]
    pub fn score(&self) -> f64 {
        if self.comparisons == 0 {
            0.0
        } else {
            self.points / self.comparisons as f64
        }
    }
}

impl Add for TrendTally {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            points: self.points + rhs.points,
            comparisons: self.comparisons + rhs.comparisons,
        }
    }
}

impl Sum for TrendTally {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Scores a group of sections. Enumeration order does not affect the result.
#[must_use]
pub fn trend_score<'a>(sections: impl IntoIterator<Item = &'a TimeSeriesSection>) -> f64 {
    sections.into_iter().map(TrendTally::of_section).sum::<TrendTally>().score()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn section(lines: &[(&str, &[&str])]) -> TimeSeriesSection {
        lines.iter().map(|(label, values)| ((*label).to_string(), line(values))).collect()
    }

    #[test]
    fn test_no_adjacent_values() {
        assert_eq!(trend_score([&TimeSeriesSection::new()]), 0.0);
        let single = section(&[("Sales +", &["100"]), ("Net Profit +", &["10"])]);
        assert_eq!(trend_score([&single]), 0.0);
        assert_eq!(trend_score(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_rising_and_falling() {
        // +5, +5, -5 over three comparisons.
        let s = section(&[("Sales +", &["100", "110", "120"]), ("Net Profit +", &["10", "8"])]);
        assert!((trend_score([&s]) - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_equal_and_missing_not_counted() {
        let s = section(&[("Sales +", &["100", "100", "", "90", "-", "95"])]);
        let tally = TrendTally::of_section(&s);
        assert_eq!(tally.comparisons, 0);
        assert_eq!(tally.score(), 0.0);

        let s = section(&[("OPM %", &["20%", "20%", "25%"])]);
        assert_eq!(trend_score([&s]), 5.0);
    }

    #[test]
    fn test_order_independent() {
        let a = section(&[("Sales +", &["1", "2", "3"]), ("Expenses +", &["5", "4"])]);
        let b = section(&[("Net Profit +", &["3", "1"]), ("EPS in Rs", &["1", "1", "2"])]);
        let forward = trend_score([&a, &b]);
        let backward = trend_score([&b, &a]);
        assert_eq!(forward, backward);

        let merged = section(&[
            ("EPS in Rs", &["1", "1", "2"]),
            ("Sales +", &["1", "2", "3"]),
            ("Net Profit +", &["3", "1"]),
            ("Expenses +", &["5", "4"]),
        ]);
        assert_eq!(trend_score([&merged]), forward);
        // +5 +5 -5 -5 +5 over five comparisons.
        assert_eq!(forward, 1.0);
    }

    #[test]
    fn test_mismatched_lengths() {
        let s = section(&[("Sales +", &["1", "2", "3", "4"]), ("Net Profit +", &["2"])]);
        assert_eq!(trend_score([&s]), 5.0);
    }
}
