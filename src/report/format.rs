//! Formatted terminal output for the `summary` command.
//!
//! We keep formatting code in one place so:
//! - the binding logic stays clean and testable
//! - output changes are localized

use crate::dashboard::{ImputationView, YearRangeView};
use crate::io::ingest::IngestedData;
use crate::missing::Table;

/// Dataset header: what was read, kept and rejected.
pub fn format_dataset_summary(ingest: &IngestedData) -> String {
    let mut out = String::new();
    out.push_str("=== drugdash - Drug Review dashboard ===\n");
    out.push_str(&format!(
        "Rows: read={} | kept={} | other conditions={} | rejected={}\n",
        ingest.rows_read,
        ingest.rows_used(),
        ingest.rows_other_condition,
        ingest.row_errors.len(),
    ));
    if let (Some(first), Some(last)) = (
        ingest.records.iter().map(|r| r.date).min(),
        ingest.records.iter().map(|r| r.date).max(),
    ) {
        out.push_str(&format!("Dates: {first} .. {last}\n"));
    }
    for err in ingest.row_errors.iter().take(5) {
        out.push_str(&format!("  line {}: {}\n", err.line, err.message));
    }
    if ingest.row_errors.len() > 5 {
        out.push_str(&format!("  ... and {} more\n", ingest.row_errors.len() - 5));
    }
    out
}

/// Year-range binding as text tables.
pub fn format_year_range(view: &YearRangeView) -> String {
    let mut out = String::new();
    out.push_str(&format!("\nYears {} ({} reviews)\n", view.range, view.rows));

    out.push_str("\nAvailable data by category:\n");
    for c in &view.category_counts {
        let share = if view.rows == 0 {
            0.0
        } else {
            100.0 * c.count as f64 / view.rows as f64
        };
        out.push_str(&format!("  {:<20} {:>7} {:>6.1}%\n", c.condition.label(), c.count, share));
    }

    out.push_str("\nTop 3 drugs per category:\n");
    out.push_str(
        format!("  {:<20} {:<28} {:>7}\n", "condition", "drug", "count").trim_end(),
    );
    out.push('\n');
    for d in &view.top_drugs {
        out.push_str(&format!(
            "  {:<20} {:<28} {:>7}\n",
            d.condition.label(),
            truncate(&d.drug_name, 28),
            d.count
        ));
    }

    out.push_str("\nRating per condition (top drugs):\n");
    out.push_str(
        format!(
            "  {:<20} {:>5} {:>6} {:>6} {:>6} {:>6} {:>6}\n",
            "condition", "n", "min", "q1", "median", "q3", "max"
        )
        .trim_end(),
    );
    out.push('\n');
    for g in &view.ratings {
        let Some(s) = &g.stats else { continue };
        out.push_str(&format!(
            "  {:<20} {:>5} {:>6.1} {:>6.2} {:>6.2} {:>6.2} {:>6.1}\n",
            g.condition.label(),
            s.n,
            s.min,
            s.q1,
            s.median,
            s.q3,
            s.max
        ));
    }
    out
}

/// Missing-data binding: label, side-by-side table and error stats.
pub fn format_imputation(view: &ImputationView) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", view.label));
    out.push_str(&format_side_by_side(&view.original, &view.simulated, &view.imputed));

    out.push_str(&format!("Removed cells: {}\n", view.stats.removed_cells));
    for c in &view.stats.columns {
        out.push_str(&format!(
            "  {:<14} removed={:<3} mae={} rmse={}\n",
            c.name,
            c.removed,
            fmt_opt(c.mae),
            fmt_opt(c.rmse)
        ));
    }
    out
}

fn format_side_by_side(original: &Table, simulated: &Table, imputed: &Table) -> String {
    let mut out = String::new();
    let mut header = String::from("  ");
    for c in original.columns() {
        header.push_str(&format!("{:>14} {:>10} {:>10}  ", c.name, "masked", "imputed"));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for i in 0..original.n_rows() {
        let mut line = String::from("  ");
        for ((o, s), m) in original
            .columns()
            .iter()
            .zip(simulated.columns())
            .zip(imputed.columns())
        {
            line.push_str(&format!(
                "{:>14} {:>10} {:>10}  ",
                fmt_opt(o.values[i]),
                fmt_opt(s.values[i]),
                fmt_opt(m.values[i])
            ));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::fixture;
    use crate::dashboard::Dashboard;
    use crate::domain::{Percentage, YearRange};

    #[test]
    fn year_range_lists_every_category_row() {
        let dash = Dashboard::new(fixture(), Some(3));
        let text = format_year_range(&dash.year_range_view(YearRange::full()));
        assert!(text.contains("Years 2008-2017 (10 reviews)"));
        assert!(text.contains("Depression"));
        assert!(text.contains("Sumatriptan"));
        assert!(text.contains("median"));
    }

    #[test]
    fn imputation_shows_label_and_masks() {
        let dash = Dashboard::new(fixture(), Some(3));
        let view = dash.imputation_view(Some(Percentage::new(50).unwrap())).unwrap();
        let text = format_imputation(&view);
        assert!(text.contains("Percentage of data removed: 50%"));
        assert!(text.contains("Removed cells: 8"));
        assert!(text.contains(" - "));
    }

    #[test]
    fn truncate_marks_cut_names() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
