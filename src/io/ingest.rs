//! CSV ingest and normalization.
//!
//! Turns the raw drug-review CSV into `ReviewRecord`s:
//!
//! - **Strict schema** for required columns (clear errors + exit code 3)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Category filter**: rows outside the six tracked conditions are dropped
//!   silently, they are not errors

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{Category, ReviewRecord};
use crate::error::AppError;

/// Accepted `date` formats: the catalog export (`20-May-12`) and the
/// original Drugs.com dump (`May 20, 2012`).
const DATE_FORMATS: [&str; 3] = ["%d-%b-%y", "%B %d, %Y", "%Y-%m-%d"];

const COL_DRUG: &str = "drugname";
const COL_CONDITION: &str = "condition";
const COL_RATING: &str = "rating";
const COL_DATE: &str = "date";
const COL_USEFUL: &str = "usefulcount";

const REQUIRED_COLUMNS: [(&str, &str); 5] = [
    (COL_DRUG, "drugName"),
    (COL_CONDITION, "condition"),
    (COL_RATING, "rating"),
    (COL_DATE, "date"),
    (COL_USEFUL, "usefulCount"),
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: kept records + bookkeeping about what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<ReviewRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Rows dropped because their condition is not one of the tracked categories.
    pub rows_other_condition: usize,
}

impl IngestedData {
    pub fn rows_used(&self) -> usize {
        self.records.len()
    }
}

/// Load and filter a CSV file from disk.
pub fn load_reviews_csv(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::usage(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    parse_reviews(file)
}

/// Parse and filter review CSV content from any reader.
pub fn parse_reviews<R: Read>(input: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::data(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_other_condition = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(Some(review)) => records.push(review),
            Ok(None) => rows_other_condition += 1,
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if records.is_empty() {
        return Err(AppError::data(format!(
            "No usable reviews for the tracked conditions ({rows_read} rows read, {} rejected).",
            row_errors.len()
        )));
    }

    tracing::debug!(
        rows_read,
        rows_used = records.len(),
        rows_other_condition,
        row_errors = row_errors.len(),
        "ingested review CSV"
    );

    Ok(IngestedData {
        records,
        row_errors,
        rows_read,
        rows_other_condition,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

/// Lowercase and drop separators so `usefulCount`, `useful_count` and a
/// BOM-prefixed first header all resolve to the same key.
fn normalize_header_name(name: &str) -> String {
    name.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|(key, _)| !header_map.contains_key(*key))
        .map(|(_, display)| *display)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::data(format!(
            "Missing required column(s): {}",
            missing.join(", ")
        )))
    }
}

/// `Ok(None)` means the row is valid CSV but belongs to an untracked condition.
fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<Option<ReviewRecord>, String> {
    let Some(condition) = get_field(record, header_map, COL_CONDITION).and_then(Category::from_label)
    else {
        return Ok(None);
    };

    let drug_name = get_field(record, header_map, COL_DRUG)
        .ok_or_else(|| "Missing `drugName` value.".to_string())?
        .to_string();

    let date_raw =
        get_field(record, header_map, COL_DATE).ok_or_else(|| "Missing `date` value.".to_string())?;
    let date = parse_date(date_raw)?;

    let rating = get_field(record, header_map, COL_RATING)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| "Missing/invalid `rating` value.".to_string())?;

    let useful_count = get_field(record, header_map, COL_USEFUL)
        .and_then(parse_count)
        .ok_or_else(|| "Missing/invalid `usefulCount` value.".to_string())?;

    Ok(Some(ReviewRecord {
        condition,
        drug_name,
        date,
        rating,
        useful_count,
    }))
}

fn get_field<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    key: &str,
) -> Option<&'a str> {
    header_map
        .get(key)
        .and_then(|&idx| record.get(idx))
        .filter(|s| !s.is_empty())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("Invalid date '{raw}'."))
}

/// Counts are integers, but some exports write them as `12.0`.
fn parse_count(raw: &str) -> Option<u32> {
    if let Ok(v) = raw.parse::<u32>() {
        return Some(v);
    }
    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Some(v as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    const SAMPLE: &str = "\u{feff}drugName,condition,review,rating,date,usefulCount
Sertraline,Depression,\"Helped a lot, slowly\",9,20-May-12,27
Ibuprofen,Pain,ok,5,\"March 3, 2015\",4
Tretinoin,Acne,great,10,01-Jan-16,3
Zolpidem,Insomnia,meh,7,not-a-date,1
Lisinopril,High Blood Pressure,fine,oops,05-Jun-10,2
Sumatriptan,Migraine,,8,2017-02-11,12.0
";

    #[test]
    fn filters_categories_and_collects_row_errors() {
        let data = parse_reviews(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 6);
        assert_eq!(data.rows_used(), 3);
        assert_eq!(data.rows_other_condition, 1);
        assert_eq!(data.row_errors.len(), 2);
        assert_eq!(data.row_errors[0].line, 5);
        assert!(data.row_errors[1].message.contains("rating"));

        let first = &data.records[0];
        assert_eq!(first.condition, Category::Depression);
        assert_eq!(first.drug_name, "Sertraline");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2012, 5, 20).unwrap());
        assert_eq!(first.useful_count, 27);

        assert_eq!(data.records[1].date.year(), 2015);
        assert_eq!(data.records[2].useful_count, 12);
        assert!(data.records.iter().all(|r| Category::ALL.contains(&r.condition)));
    }

    #[test]
    fn missing_columns_are_reported_by_name() {
        let err = parse_reviews("drugName,condition,date\nA,Pain,01-Jan-10\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
        assert!(err.to_string().contains("rating"));
        assert!(err.to_string().contains("usefulCount"));
    }

    #[test]
    fn no_tracked_rows_is_a_data_error() {
        let csv = "drugName,condition,rating,date,usefulCount\nX,Acne,3,01-Jan-10,1\n";
        assert!(parse_reviews(csv.as_bytes()).is_err());
    }

    #[test]
    fn header_normalization() {
        assert_eq!(normalize_header_name("\u{feff} useful_Count "), "usefulcount");
        assert_eq!(normalize_header_name("drugName"), "drugname");
    }

    #[test]
    fn two_digit_years_land_in_this_century() {
        let d = parse_date("28-Feb-08").unwrap();
        assert_eq!(d.year(), 2008);
    }
}
