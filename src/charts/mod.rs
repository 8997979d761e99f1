//! Figure builders for the four dashboard charts.

use crate::analysis::{COL_RATING, COL_USEFUL, CategoryCount, ConditionRatings, DrugUsage};
use crate::missing::Table;

pub mod figure;

pub use figure::*;

pub const TITLE_CATEGORIES: &str = "Available data by category";
pub const TITLE_TOP_DRUGS: &str = "Top 3 most used drugs per category";
pub const TITLE_RATINGS: &str = "Rating per condition for the top 3 drugs";
pub const TITLE_IMPUTATION: &str = "Mean review usefulness by rating";

pub const TRACE_ORIGINAL: &str = "Original";
pub const TRACE_IMPUTED: &str = "Imputed";

/// Pie of row counts per category.
pub fn category_pie(counts: &[CategoryCount]) -> Figure {
    Figure::new(TITLE_CATEGORIES).with_trace(Trace::Pie {
        labels: counts.iter().map(|c| c.condition.label().to_string()).collect(),
        values: counts.iter().map(|c| c.count as f64).collect(),
    })
}

/// Stacked bars per category, one trace per drug (a drug that tops several
/// categories shares one trace).
pub fn top_drugs_bar(top: &[DrugUsage]) -> Figure {
    let mut traces: Vec<(String, Vec<String>, Vec<f64>)> = Vec::new();
    for usage in top {
        let idx = match traces.iter().position(|(name, _, _)| *name == usage.drug_name) {
            Some(idx) => idx,
            None => {
                traces.push((usage.drug_name.clone(), Vec::new(), Vec::new()));
                traces.len() - 1
            }
        };
        let (_, x, y) = &mut traces[idx];
        x.push(usage.condition.label().to_string());
        y.push(usage.count as f64);
    }

    let mut fig = Figure::new(TITLE_TOP_DRUGS).with_axes("Drugs per category", "Usage count");
    fig.layout.showlegend = false;
    fig.layout.barmode = Some(BarMode::Stack);
    for (name, x, y) in traces {
        let text = vec![name.clone(); x.len()];
        fig.data.push(Trace::Bar { name, x, y, text });
    }
    fig
}

/// One box per condition with every rating drawn as a point.
pub fn rating_box(groups: &[ConditionRatings]) -> Figure {
    let mut fig = Figure::new(TITLE_RATINGS).with_axes("condition", "rating");
    for g in groups {
        fig.data.push(Trace::Box {
            name: g.condition.label().to_string(),
            y: g.ratings.clone(),
            boxpoints: BoxPoints::All,
        });
    }
    fig
}

/// Original vs imputed rating → mean usefulness lines.
pub fn imputation_lines(original: &Table, imputed: &Table) -> Figure {
    Figure::new(TITLE_IMPUTATION)
        .with_trace(line_trace(TRACE_ORIGINAL, original))
        .with_trace(line_trace(TRACE_IMPUTED, imputed))
        .with_axes("Rating", "UsefulCount")
}

/// Points where both coordinates are present; absent cells break nothing.
pub fn line_points(table: &Table) -> Vec<(f64, f64)> {
    let (Some(xs), Some(ys)) = (table.column(COL_RATING), table.column(COL_USEFUL)) else {
        return Vec::new();
    };
    xs.values
        .iter()
        .zip(&ys.values)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect()
}

fn line_trace(name: &str, table: &Table) -> Trace {
    let (x, y) = line_points(table).into_iter().unzip();
    Trace::Scatter {
        name: name.to_string(),
        x,
        y,
        mode: ScatterMode::Lines,
    }
}
