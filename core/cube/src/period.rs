//! FILENAME: core/cube/src/period.rs
//! PURPOSE: Parses reference periods from time category labels.
//! CONTEXT: Time labels come in many shapes ("2023", "2023Q1",
//! "2023 January", "2023M01", "2023W05", "15/01/2023").
//! A period is a start date plus a granularity; its end is the last day of
//! that year, quarter, month or ISO week.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})$").unwrap());
static QUARTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:(\d{4})\s*Q([1-4])|Q([1-4])\s*(\d{4}))$").unwrap());
static MONTH_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d{4})M(\d{2})$").unwrap());
static WEEK_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(\d{4})\s*W(\d{1,2})$").unwrap());
static NAME_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z]+)\.?\s+(\d{4})$").unwrap());
static YEAR_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})\s+([A-Za-z]+)$").unwrap());
static MONTH_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(\d{4})[-/](\d{1,2})|(\d{1,2})[-/](\d{4}))$").unwrap());
static DAY_FIRST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());

/// Time dimensions whose labels are left as text rather than typed.
pub const UNTYPED_TIME_DIMENSIONS: &[&str] = &["influenza season", "academic year", "halfyear"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Granularity {
    Year,
    Quarter,
    Month,
    Week,
    Day,
}

/// A reference period: the first day it covers and how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub granularity: Granularity,
}

impl Period {
    /// Parses years, quarters, months (by name, number or `YYYYMmm` code),
    /// ISO weeks (`YYYYWww`) and full dates (ISO, day-first `dd/mm/yyyy`,
    /// or spelled out).
    pub fn parse(text: &str) -> Option<Period> {
        let text = text.trim();

        if let Some(caps) = YEAR.captures(text) {
            return Period::month(caps[1].parse().ok()?, 1, Granularity::Year);
        }
        if let Some(caps) = QUARTER.captures(text) {
            let (year, quarter) = match (caps.get(1), caps.get(2)) {
                (Some(y), Some(q)) => (y.as_str(), q.as_str()),
                _ => (caps.get(4)?.as_str(), caps.get(3)?.as_str()),
            };
            let quarter: u32 = quarter.parse().ok()?;
            return Period::month(year.parse().ok()?, (quarter - 1) * 3 + 1, Granularity::Quarter);
        }
        if let Some(caps) = MONTH_CODE.captures(text) {
            return Period::month(caps[1].parse().ok()?, caps[2].parse().ok()?, Granularity::Month);
        }
        if let Some(caps) = WEEK_CODE.captures(text) {
            let start =
                NaiveDate::from_isoywd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, Weekday::Mon)?;
            return Some(Period {
                start,
                granularity: Granularity::Week,
            });
        }
        if let Some(caps) = NAME_YEAR.captures(text) {
            if let Some(month) = month_number(&caps[1]) {
                return Period::month(caps[2].parse().ok()?, month, Granularity::Month);
            }
        }
        if let Some(caps) = YEAR_NAME.captures(text) {
            if let Some(month) = month_number(&caps[2]) {
                return Period::month(caps[1].parse().ok()?, month, Granularity::Month);
            }
        }
        if let Some(caps) = MONTH_NUMBER.captures(text) {
            let (year, month) = match (caps.get(1), caps.get(2)) {
                (Some(y), Some(m)) => (y.as_str(), m.as_str()),
                _ => (caps.get(4)?.as_str(), caps.get(3)?.as_str()),
            };
            return Period::month(year.parse().ok()?, month.parse().ok()?, Granularity::Month);
        }
        if let Some(caps) = DAY_FIRST.captures(text) {
            let day = NaiveDate::from_ymd_opt(
                caps[3].parse().ok()?,
                caps[2].parse().ok()?,
                caps[1].parse().ok()?,
            )?;
            return Some(Period::day(day));
        }
        ["%Y-%m-%d", "%B %d, %Y", "%d %B %Y"]
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            .map(Period::day)
    }

    /// Types one category label of a time dimension.
    ///
    /// The dimension label decides the granularity when it names one
    /// ("Month", "Quarter", "Week"): a finer period is widened to it.
    /// Dimensions listed in [`UNTYPED_TIME_DIMENSIONS`] and unreadable labels
    /// give `None`.
    pub fn parse_time_label(dimension_label: &str, label: &str) -> Option<Period> {
        let dimension = dimension_label.to_lowercase();
        if UNTYPED_TIME_DIMENSIONS.iter().any(|p| dimension.contains(p)) {
            return None;
        }
        let period = Period::parse(label)?;
        let named = [
            ("month", Granularity::Month),
            ("quarter", Granularity::Quarter),
            ("week", Granularity::Week),
        ]
        .into_iter()
        .find(|(word, _)| dimension.contains(word))
        .map(|(_, granularity)| granularity);
        match named {
            Some(granularity) if period.granularity > granularity => {
                Some(period.truncate(granularity))
            }
            _ => Some(period),
        }
    }

    fn month(year: i32, month: u32, granularity: Granularity) -> Option<Period> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|start| Period { start, granularity })
    }

    fn day(start: NaiveDate) -> Period {
        Period {
            start,
            granularity: Granularity::Day,
        }
    }

    /// Calendar year of the first day.
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// The enclosing period of a coarser granularity.
    pub fn truncate(&self, granularity: Granularity) -> Period {
        let (year, month) = (self.start.year(), self.start.month());
        let start = match granularity {
            Granularity::Year => NaiveDate::from_ymd_opt(year, 1, 1),
            Granularity::Quarter => NaiveDate::from_ymd_opt(year, (month - 1) / 3 * 3 + 1, 1),
            Granularity::Month => NaiveDate::from_ymd_opt(year, month, 1),
            Granularity::Week => {
                let week = self.start.iso_week();
                NaiveDate::from_isoywd_opt(week.year(), week.week(), Weekday::Mon)
            }
            Granularity::Day => Some(self.start),
        };
        Period {
            start: start.unwrap_or(self.start),
            granularity,
        }
    }

    /// Last day covered by the period.
    pub fn end(&self) -> NaiveDate {
        let last_month = match self.granularity {
            Granularity::Day => return self.start,
            Granularity::Week => return self.start + Duration::days(6),
            Granularity::Month => self.start.month(),
            Granularity::Quarter => self.start.month() + 2,
            Granularity::Year => 12,
        };
        last_day_of_month(self.start.year(), last_month).unwrap_or(self.start)
    }
}

impl fmt::Display for Period {
    /// `2023`, `2023Q3`, `2023-02`, or the start date for weeks and days.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let start = self.start;
        match self.granularity {
            Granularity::Year => write!(f, "{}", start.year()),
            Granularity::Quarter => write!(f, "{}Q{}", start.year(), (start.month() - 1) / 3 + 1),
            Granularity::Month => write!(f, "{}-{:02}", start.year(), start.month()),
            Granularity::Week | Granularity::Day => write!(f, "{}", start.format("%Y-%m-%d")),
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    if month == 12 {
        return NaiveDate::from_ymd_opt(year, 12, 31);
    }
    NaiveDate::from_ymd_opt(year, month + 1, 1)?.pred_opt()
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}
