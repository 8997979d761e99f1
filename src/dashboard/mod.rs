//! The two dashboard bindings.
//!
//! `Dashboard` owns the read-only review table built at startup. Each binding
//! takes one control value and recomputes its outputs from scratch; nothing is
//! cached between calls, and the bindings are independent of each other.
//!
//! The CLI summary, the web server and the TUI all render these views.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::analysis::{
    self, CategoryCount, ConditionRatings, DrugUsage, TOP_DRUGS_PER_CATEGORY,
};
use crate::charts::{self, Figure};
use crate::domain::{Percentage, ReviewRecord, YearRange};
use crate::error::AppError;
use crate::missing::{ImputationStats, Table, impute, imputation_stats, simulate_missing};

/// Outputs of the year-range binding.
#[derive(Debug, Clone, Serialize)]
pub struct YearRangeView {
    pub range: YearRange,
    pub rows: usize,
    pub category_counts: Vec<CategoryCount>,
    pub top_drugs: Vec<DrugUsage>,
    pub ratings: Vec<ConditionRatings>,
    pub category_figure: Figure,
    pub top_drugs_figure: Figure,
    pub ratings_figure: Figure,
}

/// Outputs of the missing-data binding.
#[derive(Debug, Clone, Serialize)]
pub struct ImputationView {
    /// Removed percentage; 0 when no percentage was set.
    pub percent: u8,
    pub label: String,
    pub original: Table,
    pub simulated: Table,
    pub imputed: Table,
    pub stats: ImputationStats,
    pub figure: Figure,
}

pub fn removed_label(percent: u8) -> String {
    format!("Percentage of data removed: {percent}%")
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    records: Arc<[ReviewRecord]>,
    seed: Option<u64>,
}

impl Dashboard {
    pub fn new(records: Vec<ReviewRecord>, seed: Option<u64>) -> Self {
        Self {
            records: records.into(),
            seed,
        }
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Binding A: category distribution, top drugs and their ratings for the
    /// reviews written within `range`.
    pub fn year_range_view(&self, range: YearRange) -> YearRangeView {
        let rows = analysis::filter_years(&self.records, range);
        let category_counts = analysis::category_counts(&rows);
        let top_drugs = analysis::top_drugs_per_category(&rows, TOP_DRUGS_PER_CATEGORY);
        let ratings = analysis::ratings_for_top_drugs(&rows, &top_drugs);

        tracing::debug!(%range, rows = rows.len(), "recomputed year-range view");

        YearRangeView {
            range,
            rows: rows.len(),
            category_figure: charts::category_pie(&category_counts),
            top_drugs_figure: charts::top_drugs_bar(&top_drugs),
            ratings_figure: charts::rating_box(&ratings),
            category_counts,
            top_drugs,
            ratings,
        }
    }

    /// Binding B using the configured seed, or OS entropy when unseeded.
    pub fn imputation_view(&self, percent: Option<Percentage>) -> Result<ImputationView, AppError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.imputation_view_with_rng(percent, &mut rng)
    }

    /// Binding B: blank `percent` of the rating → mean-usefulness table, impute
    /// it back, and compare. `None` removes nothing.
    pub fn imputation_view_with_rng<R: Rng + ?Sized>(
        &self,
        percent: Option<Percentage>,
        rng: &mut R,
    ) -> Result<ImputationView, AppError> {
        let original = analysis::mean_useful_by_rating(&self.records)?;
        let fraction = percent.map(Percentage::fraction).unwrap_or(0.0);
        let simulated = simulate_missing(&original, fraction, rng)?;
        let imputed = impute(&simulated);
        let stats = imputation_stats(&original, &simulated, &imputed);
        let percent = percent.map(Percentage::value).unwrap_or(0);

        tracing::debug!(
            percent,
            removed_cells = stats.removed_cells,
            still_absent = imputed.absent_count(),
            "recomputed imputation view"
        );

        Ok(ImputationView {
            percent,
            label: removed_label(percent),
            figure: charts::imputation_lines(&original, &imputed),
            original,
            simulated,
            imputed,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::fixture;
    use crate::charts::Trace;

    #[test]
    fn full_span_distribution_sums_to_row_count() {
        let dash = Dashboard::new(fixture(), Some(1));
        let view = dash.year_range_view(YearRange::full());
        assert_eq!(view.rows, dash.records().len());
        let total: usize = view.category_counts.iter().map(|c| c.count).sum();
        assert_eq!(total, view.rows);

        let Trace::Pie { values, .. } = &view.category_figure.data[0] else {
            panic!("expected pie");
        };
        assert_eq!(values.iter().sum::<f64>() as usize, view.rows);
    }

    #[test]
    fn narrow_range_filters_rows() {
        let dash = Dashboard::new(fixture(), None);
        let view = dash.year_range_view(YearRange::new(2016, 2016).unwrap());
        assert_eq!(view.rows, 2);
        assert_eq!(view.top_drugs.len(), 2);
        assert_eq!(view.ratings_figure.data.len(), 1);
    }

    #[test]
    fn empty_range_yields_empty_charts() {
        let dash = Dashboard::new(fixture(), None);
        let view = dash.year_range_view(YearRange::new(2030, 2031).unwrap());
        assert_eq!(view.rows, 0);
        assert!(view.category_counts.is_empty());
        assert!(view.top_drugs_figure.data.is_empty());
    }

    #[test]
    fn no_percentage_means_nothing_removed() {
        let dash = Dashboard::new(fixture(), None);
        let view = dash.imputation_view(None).unwrap();
        assert_eq!(view.percent, 0);
        assert_eq!(view.label, "Percentage of data removed: 0%");
        assert_eq!(view.stats.removed_cells, 0);
        assert_eq!(view.imputed, view.original);
    }

    #[test]
    fn percentage_blanks_and_fills_each_column() {
        let dash = Dashboard::new(fixture(), Some(17));
        let pct = Percentage::new(40).unwrap();
        let view = dash.imputation_view(Some(pct)).unwrap();

        // 8 distinct ratings -> floor(8 * 0.4) = 3 per column.
        assert_eq!(view.original.n_rows(), 8);
        for col in view.simulated.columns() {
            assert_eq!(col.absent_count(), 3);
        }
        assert_eq!(view.stats.removed_cells, 6);
        assert!(view.imputed.is_complete());
        assert_eq!(view.label, "Percentage of data removed: 40%");
        assert_eq!(view.figure.data.len(), 2);
    }

    #[test]
    fn seeded_dashboard_is_reproducible() {
        let dash = Dashboard::new(fixture(), Some(99));
        let pct = Some(Percentage::new(50).unwrap());
        let a = dash.imputation_view(pct).unwrap();
        let b = dash.imputation_view(pct).unwrap();
        assert_eq!(a.simulated, b.simulated);
    }
}
