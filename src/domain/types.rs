//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - held in memory for the lifetime of the dashboard
//! - returned from the JSON API
//! - written to CSV/JSON exports

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// First year covered by the year-range control.
pub const YEAR_MIN: i32 = 2008;
/// Last year covered by the year-range control.
pub const YEAR_MAX: i32 = 2017;

/// Bounds of the removal-percentage control (inclusive).
pub const PERCENT_MIN: u8 = 1;
pub const PERCENT_MAX: u8 = 80;

/// The six conditions kept after filtering.
///
/// Ordering follows the listing order in the dataset filter and is used as
/// the stable tie-break wherever categories are sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Depression,
    Pain,
    Anxiety,
    Insomnia,
    #[serde(rename = "High Blood Pressure")]
    HighBloodPressure,
    Migraine,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Depression,
        Category::Pain,
        Category::Anxiety,
        Category::Insomnia,
        Category::HighBloodPressure,
        Category::Migraine,
    ];

    /// Label exactly as it appears in the `condition` column.
    pub fn label(self) -> &'static str {
        match self {
            Category::Depression => "Depression",
            Category::Pain => "Pain",
            Category::Anxiety => "Anxiety",
            Category::Insomnia => "Insomnia",
            Category::HighBloodPressure => "High Blood Pressure",
            Category::Migraine => "Migraine",
        }
    }

    /// Match a raw `condition` value. Anything else is filtered out.
    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|c| c.label() == raw)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One drug review after filtering and parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub condition: Category,
    pub drug_name: String,
    pub date: NaiveDate,
    pub rating: f64,
    pub useful_count: u32,
}

/// Inclusive range of review years (Binding A input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::usage(format!(
                "Invalid year range: start {start} is after end {end}."
            )));
        }
        Ok(Self { start, end })
    }

    /// The full span offered by the slider.
    pub fn full() -> Self {
        Self {
            start: YEAR_MIN,
            end: YEAR_MAX,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Validated removal percentage (Binding B input).
///
/// `None` at the call site means "no removal"; a `Percentage` is always within
/// the control bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentage(u8);

impl Percentage {
    pub fn new(value: u32) -> Result<Self, AppError> {
        if !(u32::from(PERCENT_MIN)..=u32::from(PERCENT_MAX)).contains(&value) {
            return Err(AppError::usage(format!(
                "Removal percentage must be within {PERCENT_MIN}-{PERCENT_MAX}, got {value}."
            )));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Fraction handed to the missing-value simulator.
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

/// Where the review table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// UCI repository API lookup by catalog id.
    Uci { api_url: String, dataset_id: u32 },
    /// A local CSV copy of the dataset.
    Csv(PathBuf),
}

/// Resolved run configuration shared by every front-end.
#[derive(Debug, Clone)]
pub struct DashConfig {
    pub source: DataSource,
    /// Seed for the missing-value simulation. `None` draws from the OS.
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_label(c.label()), Some(c));
        }
        assert_eq!(Category::from_label(" High Blood Pressure "), Some(Category::HighBloodPressure));
        assert_eq!(Category::from_label("Acne"), None);
        assert_eq!(Category::from_label("pain"), None);
    }

    #[test]
    fn year_range_rejects_inverted_bounds() {
        assert!(YearRange::new(2012, 2010).is_err());
        let r = YearRange::new(2010, 2010).unwrap();
        assert!(r.contains(2010));
        assert!(!r.contains(2011));
    }

    #[test]
    fn percentage_bounds() {
        assert!(Percentage::new(0).is_err());
        assert!(Percentage::new(81).is_err());
        let p = Percentage::new(25).unwrap();
        assert_eq!(p.value(), 25);
        assert!((p.fraction() - 0.25).abs() < 1e-12);
        assert!(Percentage::new(80).unwrap().fraction() <= 0.8);
    }
}
