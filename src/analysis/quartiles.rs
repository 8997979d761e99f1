//! Box-plot statistics.
//!
//! Quartiles use linear interpolation between order statistics (position
//! `(n - 1) * q`). Whiskers reach the most extreme samples within 1.5 IQR of
//! the box; samples beyond them are outliers.

use std::cmp::Ordering;

use serde::Serialize;

const WHISKER_IQR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: usize,
}

impl BoxStats {
    /// `None` for empty input or when any value is non-finite.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() || values.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let lo_fence = q1 - WHISKER_IQR * iqr;
        let hi_fence = q3 + WHISKER_IQR * iqr;

        let lower_whisker = sorted.iter().copied().find(|&v| v >= lo_fence).unwrap_or(q1);
        let upper_whisker = sorted.iter().rev().copied().find(|&v| v <= hi_fence).unwrap_or(q3);
        let outliers = sorted.iter().filter(|&&v| v < lo_fence || v > hi_fence).count();

        Some(Self {
            n: sorted.len(),
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Linearly interpolated quantile of an ascending, non-empty slice.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
