//! Export binding outputs to disk.
//!
//! - `years.json` / `imputation.json`: the views as served by the JSON API
//! - `imputation.csv`: original, simulated and imputed cells side by side,
//!   easy to consume in spreadsheets

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::dashboard::{ImputationView, YearRangeView};
use crate::error::AppError;
use crate::missing::Table;

/// Paths written by [`write_bundle`].
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub years_json: PathBuf,
    pub imputation_json: PathBuf,
    pub imputation_csv: PathBuf,
}

pub fn write_bundle(
    dir: &Path,
    years: &YearRangeView,
    imputation: &ImputationView,
) -> Result<ExportPaths, AppError> {
    create_dir_all(dir).map_err(|e| {
        AppError::runtime(format!("Failed to create export dir '{}': {e}", dir.display()))
    })?;

    let paths = ExportPaths {
        years_json: dir.join("years.json"),
        imputation_json: dir.join("imputation.json"),
        imputation_csv: dir.join("imputation.csv"),
    };

    write_json(&paths.years_json, years)?;
    write_json(&paths.imputation_json, imputation)?;
    write_imputation_csv(&paths.imputation_csv, imputation)?;

    Ok(paths)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::runtime(format!("Failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::runtime(format!("Failed to write '{}': {e}", path.display())))
}

/// One row per table row; for every column `c` the header carries
/// `c_original`, `c_simulated`, `c_imputed`. Absent cells are empty fields.
pub fn write_imputation_csv(path: &Path, view: &ImputationView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::runtime(format!("Failed to create '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    for row in imputation_rows(&view.original, &view.simulated, &view.imputed) {
        writer
            .write_record(&row)
            .map_err(|e| AppError::runtime(format!("Failed to write imputation CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::runtime(format!("Failed to flush imputation CSV: {e}")))
}

fn imputation_rows(original: &Table, simulated: &Table, imputed: &Table) -> Vec<Vec<String>> {
    let mut header = vec!["row".to_string()];
    for c in original.columns() {
        header.push(format!("{}_original", c.name));
        header.push(format!("{}_simulated", c.name));
        header.push(format!("{}_imputed", c.name));
    }

    let mut rows = vec![header];
    for i in 0..original.n_rows() {
        let mut row = vec![i.to_string()];
        for ((o, s), m) in original
            .columns()
            .iter()
            .zip(simulated.columns())
            .zip(imputed.columns())
        {
            row.push(fmt_cell(o.values[i]));
            row.push(fmt_cell(s.values[i]));
            row.push(fmt_cell(m.values[i]));
        }
        rows.push(row);
    }
    rows
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.6}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::missing::Column;

    #[test]
    fn rows_interleave_original_simulated_imputed() {
        let original = Table::new(vec![Column::dense("y", [1.0, 2.0])]).unwrap();
        let simulated = Table::new(vec![Column::new("y", vec![Some(1.0), None])]).unwrap();
        let imputed = Table::new(vec![Column::dense("y", [1.0, 1.0])]).unwrap();

        let rows = imputation_rows(&original, &simulated, &imputed);
        assert_eq!(rows[0], ["row", "y_original", "y_simulated", "y_imputed"]);
        assert_eq!(rows[2], ["1", "2.000000", "", "1.000000"]);
        assert_eq!(rows.len(), 3);
    }
}
