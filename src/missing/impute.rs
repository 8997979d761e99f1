//! Imputation: linear interpolation, then forward-fill, then back-fill.
//!
//! Interpolation only fills gaps bounded by present values on both sides, so
//! the trailing run is closed by forward-fill and the leading run by back-fill.

use crate::missing::table::Table;

/// Fill every absent cell that can be estimated from its column.
///
/// Columns without any present value stay fully absent.
pub fn impute(table: &Table) -> Table {
    table.map_columns(|column| impute_column(&column.values))
}

pub fn impute_column(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = values.to_vec();
    interpolate_linear(&mut out);
    forward_fill(&mut out);
    back_fill(&mut out);
    out
}

/// Degree-1 spline through the present values, evaluated at interior gaps.
fn interpolate_linear(values: &mut [Option<f64>]) {
    let mut prev: Option<(usize, f64)> = None;
    for i in 0..values.len() {
        let Some(v) = values[i] else { continue };
        if let Some((j, pv)) = prev {
            let span = (i - j) as f64;
            for (k, slot) in values.iter_mut().enumerate().take(i).skip(j + 1) {
                let t = (k - j) as f64 / span;
                *slot = Some(pv + t * (v - pv));
            }
        }
        prev = Some((i, v));
    }
}

fn forward_fill(values: &mut [Option<f64>]) {
    let mut last = None;
    for slot in values.iter_mut() {
        match slot {
            Some(v) => last = Some(*v),
            None => *slot = last,
        }
    }
}

fn back_fill(values: &mut [Option<f64>]) {
    let mut next = None;
    for slot in values.iter_mut().rev() {
        match slot {
            Some(v) => next = Some(*v),
            None => *slot = next,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::missing::simulate::simulate_missing;
    use crate::missing::table::Column;

    fn approx(a: &[Option<f64>], b: &[f64]) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b)
                .all(|(x, y)| x.is_some_and(|x| (x - y).abs() < 1e-9))
    }

    #[test]
    fn interior_gaps_are_linear() {
        let out = impute_column(&[Some(1.0), None, None, Some(4.0), None, Some(8.0)]);
        assert!(approx(&out, &[1.0, 2.0, 3.0, 4.0, 6.0, 8.0]), "{out:?}");
    }

    #[test]
    fn edges_use_nearest_valid_value() {
        let out = impute_column(&[None, None, Some(5.0), Some(7.0), None]);
        assert!(approx(&out, &[5.0, 5.0, 5.0, 7.0, 7.0]), "{out:?}");
    }

    #[test]
    fn single_present_value_fills_everything() {
        let out = impute_column(&[None, Some(3.0), None]);
        assert!(approx(&out, &[3.0, 3.0, 3.0]));
    }

    #[test]
    fn all_absent_column_stays_absent() {
        let out = impute_column(&[None, None]);
        assert_eq!(out, vec![None, None]);
        assert!(impute_column(&[]).is_empty());
    }

    #[test]
    fn linear_data_is_recovered_exactly_inside() {
        let truth: Vec<f64> = (0..50).map(|i| 2.0 * i as f64 + 1.0).collect();
        let t = Table::new(vec![Column::dense("y", truth.iter().copied())]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let sim = simulate_missing(&t, 0.5, &mut rng).unwrap();
        let imputed = impute(&sim);
        let col = &imputed.columns()[0].values;

        let first = sim.columns()[0].values.iter().position(Option::is_some).unwrap();
        let last = sim.columns()[0].values.iter().rposition(Option::is_some).unwrap();
        for i in first..=last {
            assert!((col[i].unwrap() - truth[i]).abs() < 1e-9, "row {i}");
        }
    }

    #[test]
    fn zero_fraction_round_trip_is_identity() {
        let t = Table::new(vec![
            Column::dense("rating", [1.0, 2.0, 3.0]),
            Column::dense("useful", [10.5, 3.25, 8.0]),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let out = impute(&simulate_missing(&t, 0.0, &mut rng).unwrap());
        assert_eq!(out, t);
    }

    #[test]
    fn output_is_complete_when_each_column_has_a_value() {
        let t = Table::new(vec![
            Column::dense("a", (0..10).map(f64::from)),
            Column::dense("b", (0..10).map(|i| f64::from(i).sin())),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for &p in &[0.1, 0.5, 0.8, 0.9] {
            let sim = simulate_missing(&t, p, &mut rng).unwrap();
            assert!(sim.columns().iter().all(Column::has_present));
            let out = impute(&sim);
            assert!(out.is_complete(), "p={p}");
            assert_eq!(out.n_rows(), t.n_rows());
        }
    }
}
