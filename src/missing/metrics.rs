//! Error of an imputed table against the table it was simulated from.

use serde::Serialize;

use crate::missing::table::Table;

/// Per-column error over the cells that the simulation blanked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnError {
    pub name: String,
    pub removed: usize,
    /// Mean absolute error; `None` when nothing was removed or filled.
    pub mae: Option<f64>,
    pub rmse: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputationStats {
    pub removed_cells: usize,
    pub columns: Vec<ColumnError>,
}

/// Compare `imputed` against `original` at every cell `simulated` left absent.
///
/// All three tables must share the same shape; cells still absent after
/// imputation are counted as removed but excluded from the error terms.
pub fn imputation_stats(original: &Table, simulated: &Table, imputed: &Table) -> ImputationStats {
    let mut columns = Vec::with_capacity(original.n_cols());
    for ((orig, sim), imp) in original
        .columns()
        .iter()
        .zip(simulated.columns())
        .zip(imputed.columns())
    {
        let mut removed = 0usize;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        let mut n = 0usize;

        for ((o, s), i) in orig.values.iter().zip(&sim.values).zip(&imp.values) {
            if o.is_none() || s.is_some() {
                continue;
            }
            removed += 1;
            if let (Some(o), Some(i)) = (o, i) {
                let d = i - o;
                abs_sum += d.abs();
                sq_sum += d * d;
                n += 1;
            }
        }

        let (mae, rmse) = if n == 0 {
            (None, None)
        } else {
            let n = n as f64;
            (Some(abs_sum / n), Some((sq_sum / n).sqrt()))
        };

        columns.push(ColumnError {
            name: orig.name.clone(),
            removed,
            mae,
            rmse,
        });
    }

    ImputationStats {
        removed_cells: columns.iter().map(|c| c.removed).sum(),
        columns,
    }
}
