//! Aggregations behind the dashboard charts.
//!
//! Everything here is a pure function over borrowed records so the bindings
//! can recompute on every input change without touching the base table.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Datelike;
use serde::Serialize;

use crate::domain::{Category, ReviewRecord, YearRange};
use crate::error::AppError;
use crate::missing::{Column, Table};

pub mod quartiles;

pub use quartiles::BoxStats;

/// Column names of the rating aggregate table.
pub const COL_RATING: &str = "rating";
pub const COL_USEFUL: &str = "useful_count";

/// Number of drugs kept per category in the usage chart.
pub const TOP_DRUGS_PER_CATEGORY: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub condition: Category,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrugUsage {
    pub condition: Category,
    pub drug_name: String,
    pub count: usize,
}

/// Ratings of one condition restricted to the top drugs, plus box statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionRatings {
    pub condition: Category,
    pub ratings: Vec<f64>,
    pub stats: Option<BoxStats>,
}

/// Records whose review year falls inside `range` (inclusive).
pub fn filter_years(records: &[ReviewRecord], range: YearRange) -> Vec<&ReviewRecord> {
    records
        .iter()
        .filter(|r| range.contains(r.date.year()))
        .collect()
}

/// Row counts per condition, largest first. Conditions with no rows are omitted.
pub fn category_counts(records: &[&ReviewRecord]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for r in records {
        *counts.entry(r.condition).or_default() += 1;
    }
    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(condition, count)| CategoryCount { condition, count })
        .collect();
    // Stable sort keeps the category order for equal counts.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// The `k` most reviewed drugs of each condition.
///
/// Conditions are listed alphabetically by label; inside a condition drugs are
/// ordered by count (descending), ties broken by drug name.
pub fn top_drugs_per_category(records: &[&ReviewRecord], k: usize) -> Vec<DrugUsage> {
    let mut by_condition: HashMap<Category, HashMap<&str, usize>> = HashMap::new();
    for r in records {
        *by_condition
            .entry(r.condition)
            .or_default()
            .entry(r.drug_name.as_str())
            .or_default() += 1;
    }

    let mut conditions: Vec<Category> = by_condition.keys().copied().collect();
    conditions.sort_by_key(|c| c.label());

    let mut out = Vec::new();
    for condition in conditions {
        let Some(drugs) = by_condition.get(&condition) else {
            continue;
        };
        let mut ranked: Vec<(&str, usize)> = drugs.iter().map(|(d, c)| (*d, *c)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        out.extend(ranked.into_iter().take(k).map(|(drug, count)| DrugUsage {
            condition,
            drug_name: drug.to_string(),
            count,
        }));
    }
    out
}

/// Ratings per condition for rows whose drug appears anywhere in `top`.
///
/// A drug that made the top list for one condition also contributes its
/// ratings under other conditions.
pub fn ratings_for_top_drugs(records: &[&ReviewRecord], top: &[DrugUsage]) -> Vec<ConditionRatings> {
    let names: HashSet<&str> = top.iter().map(|d| d.drug_name.as_str()).collect();

    let mut grouped: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
    for r in records.iter().filter(|r| names.contains(r.drug_name.as_str())) {
        grouped.entry(r.condition).or_default().push(r.rating);
    }

    grouped
        .into_iter()
        .map(|(condition, ratings)| ConditionRatings {
            condition,
            stats: BoxStats::from_values(&ratings),
            ratings,
        })
        .collect()
}

/// Mean `useful_count` per distinct rating, ascending by rating.
pub fn mean_useful_by_rating(records: &[ReviewRecord]) -> Result<Table, AppError> {
    let mut pairs: Vec<(f64, f64)> = records
        .iter()
        .map(|r| (r.rating, f64::from(r.useful_count)))
        .collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let mut ratings = Vec::new();
    let mut means = Vec::new();
    let mut i = 0;
    while i < pairs.len() {
        let rating = pairs[i].0;
        let mut sum = 0.0;
        let mut n = 0usize;
        while i < pairs.len() && pairs[i].0 == rating {
            sum += pairs[i].1;
            n += 1;
            i += 1;
        }
        ratings.push(rating);
        means.push(sum / n as f64);
    }

    Table::new(vec![Column::dense(COL_RATING, ratings), Column::dense(COL_USEFUL, means)])
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use super::*;

    pub(crate) fn review(condition: Category, drug: &str, year: i32, rating: f64, useful: u32) -> ReviewRecord {
        ReviewRecord {
            condition,
            drug_name: drug.to_string(),
            date: NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            rating,
            useful_count: useful,
        }
    }

    pub(crate) fn fixture() -> Vec<ReviewRecord> {
        use Category::*;
        vec![
            review(Depression, "Sertraline", 2009, 9.0, 10),
            review(Depression, "Sertraline", 2012, 8.0, 20),
            review(Depression, "Bupropion", 2012, 3.0, 5),
            review(Depression, "Citalopram", 2016, 7.0, 1),
            review(Depression, "Zoloft", 2016, 10.0, 2),
            review(Anxiety, "Sertraline", 2013, 6.0, 8),
            review(Anxiety, "Buspirone", 2013, 1.0, 4),
            review(Pain, "Ibuprofen", 2008, 5.0, 3),
            review(Pain, "Ibuprofen", 2017, 9.0, 7),
            review(Migraine, "Sumatriptan", 2015, 10.0, 30),
        ]
    }

    #[test]
    fn year_filter_is_inclusive() {
        let data = fixture();
        let rows = filter_years(&data, YearRange::new(2012, 2013).unwrap());
        assert_eq!(rows.len(), 4);
        assert_eq!(filter_years(&data, YearRange::full()).len(), data.len());
    }

    #[test]
    fn category_counts_sum_to_rows_and_sort_descending() {
        let data = fixture();
        let rows = filter_years(&data, YearRange::full());
        let counts = category_counts(&rows);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), rows.len());
        assert_eq!(counts[0].condition, Category::Depression);
        assert_eq!(counts[0].count, 5);
        assert!(counts.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn top_drugs_rank_by_count_then_name() {
        let data = fixture();
        let rows = filter_years(&data, YearRange::full());
        let top = top_drugs_per_category(&rows, TOP_DRUGS_PER_CATEGORY);

        let depression: Vec<&str> = top
            .iter()
            .filter(|d| d.condition == Category::Depression)
            .map(|d| d.drug_name.as_str())
            .collect();
        assert_eq!(depression, ["Sertraline", "Bupropion", "Citalopram"]);

        // Alphabetical condition order: Anxiety, Depression, Migraine, Pain.
        assert_eq!(top[0].condition, Category::Anxiety);
        assert_eq!(top.last().unwrap().condition, Category::Pain);
        assert_eq!(top.last().unwrap().count, 2);
    }

    #[test]
    fn ratings_cover_top_drugs_across_conditions() {
        let data = fixture();
        let rows = filter_years(&data, YearRange::full());
        let top = top_drugs_per_category(&rows, 1);
        let ratings = ratings_for_top_drugs(&rows, &top);

        let depression = ratings
            .iter()
            .find(|r| r.condition == Category::Depression)
            .unwrap();
        assert_eq!(depression.ratings, vec![9.0, 8.0]);
        // Zoloft is not a top drug anywhere.
        assert!(ratings.iter().all(|r| !r.ratings.contains(&10.0) || r.condition == Category::Migraine));
    }

    #[test]
    fn mean_useful_groups_by_rating_ascending() {
        let data = fixture();
        let t = mean_useful_by_rating(&data).unwrap();
        let ratings: Vec<f64> = t.column(COL_RATING).unwrap().values.iter().flatten().copied().collect();
        assert_eq!(ratings, vec![1.0, 3.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let useful = &t.column(COL_USEFUL).unwrap().values;
        // rating 9: (10 + 7) / 2; rating 10: (2 + 30) / 2
        assert_eq!(useful[6], Some(8.5));
        assert_eq!(useful[7], Some(16.0));
        assert!(t.is_complete());
    }
}
