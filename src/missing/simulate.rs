//! Random data-loss simulation.
//!
//! Each column is blanked independently: shuffle the row indices with a uniform
//! permutation and mark the first `floor(n * fraction)` of them absent. Rows can
//! therefore lose some columns and keep others.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::AppError;
use crate::missing::table::Table;

/// Number of cells blanked per column for `n` rows.
///
/// The product is floored in `f64`, so a fraction that is not exactly
/// representable can land one cell low: `100 * 0.29` drops 28 cells, not 29.
pub fn cells_to_drop(n: usize, fraction: f64) -> usize {
    ((n as f64 * fraction).floor() as usize).min(n)
}

/// Return a copy of `table` with a `fraction` of every column set absent.
///
/// `fraction` must lie in `[0, 1]`. The input is left untouched.
pub fn simulate_missing<R: Rng + ?Sized>(
    table: &Table,
    fraction: f64,
    rng: &mut R,
) -> Result<Table, AppError> {
    if !(fraction.is_finite() && (0.0..=1.0).contains(&fraction)) {
        return Err(AppError::usage(format!(
            "Missing-data fraction must be within [0, 1], got {fraction}."
        )));
    }

    let n = table.n_rows();
    let n_drop = cells_to_drop(n, fraction);
    let mut indices: Vec<usize> = (0..n).collect();

    Ok(table.map_columns(|column| {
        let mut values = column.values.clone();
        if n_drop > 0 {
            indices.shuffle(&mut *rng);
            for &i in &indices[..n_drop] {
                values[i] = None;
            }
        }
        values
    }))
}
