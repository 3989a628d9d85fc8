//! FILENAME: core/catalogue/src/period.rs
//! PURPOSE: Reads `time_range` queries and tests date-range overlap.
//! CONTEXT: Periods are parsed by `cube::Period`. Two periods overlap when
//! each starts on or before the other ends.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cube::Period;

/// The span a `time_range` query asks about: one period, or `(start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: Period,
    pub end: Period,
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let unreadable = |part: &str| format!("unrecognised period '{}'", part.trim());

        if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            let parts: Vec<&str> = inner.split(',').collect();
            let [start, end] = parts.as_slice() else {
                return Err(format!("expected '(start, end)', found '{}'", text));
            };
            let start_period = Period::parse(start).ok_or_else(|| unreadable(start))?;
            let end_period = Period::parse(end).ok_or_else(|| unreadable(end))?;
            if start_period.start > end_period.end() {
                return Err(format!("range '{}' ends before it starts", text));
            }
            return Ok(TimeRange {
                start: start_period,
                end: end_period,
            });
        }

        let period = Period::parse(text).ok_or_else(|| unreadable(text))?;
        Ok(TimeRange {
            start: period,
            end: period,
        })
    }
}

impl TimeRange {
    /// Whether this range overlaps an entry's date range (`"A - B"` or `"A"`).
    /// Date ranges that cannot be read never overlap.
    pub fn overlaps(&self, date_range: &str) -> bool {
        let Some((first, last)) = parse_date_range(date_range) else {
            return false;
        };
        self.start.start <= last.end() && first.start <= self.end.end()
    }
}

/// Splits and parses an entry's `"A - B"` (or single `"A"`) date range.
pub fn parse_date_range(date_range: &str) -> Option<(Period, Period)> {
    let parts: Vec<&str> = date_range.split(" - ").collect();
    match parts.as_slice() {
        [single] => {
            let period = Period::parse(single)?;
            Some((period, period))
        }
        [first, last] => Some((Period::parse(first)?, Period::parse(last)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_period_overlap() {
        let query: TimeRange = "2020".parse().unwrap();
        assert!(query.overlaps("2015 - 2024"));
        assert!(query.overlaps("2020Q4"));
        assert!(!query.overlaps("2021 January - 2023 December"));
        assert!(!query.overlaps("not a range"));
    }

    #[test]
    fn tuple_range_overlap() {
        let query: TimeRange = "(2020, 2023)".parse().unwrap();
        assert!(query.overlaps("2023 March"));
        assert!(query.overlaps("2010 - 2020"));
        assert!(!query.overlaps("2024 - 2025"));
        assert!("(2023, 2020)".parse::<TimeRange>().is_err());
        assert!("(2020, 2021, 2022)".parse::<TimeRange>().is_err());
        assert!("sometime".parse::<TimeRange>().is_err());
    }
}
