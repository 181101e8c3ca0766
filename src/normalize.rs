//! Z-score standardization of feature columns.
//!
//! Mean and population standard deviation (ddof = 0) are learned per column;
//! `transform` maps each value to `(value - mean) / std`.

use crate::FEATURE_DIM;

/// Standard deviations below this are treated as a constant column.
const MIN_STD: f64 = 1e-10;

/// Per-column mean and standard deviation fitted on a set of feature rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Scaler {
    pub means: [f64; FEATURE_DIM],
    pub stds: [f64; FEATURE_DIM],
}

impl Scaler {
    /// Learn column statistics. An empty input yields all-zero statistics.
    pub fn fit(rows: &[[f64; FEATURE_DIM]]) -> Self {
        let mut means = [0.0_f64; FEATURE_DIM];
        let mut stds = [0.0_f64; FEATURE_DIM];
        if rows.is_empty() {
            return Self { means, stds };
        }
        let n = rows.len() as f64;

        for row in rows {
            for (d, &val) in row.iter().enumerate() {
                means[d] += val;
            }
        }
        for m in &mut means {
            *m /= n;
        }

        for row in rows {
            for (d, &val) in row.iter().enumerate() {
                let diff = val - means[d];
                stds[d] += diff * diff;
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
        }

        Self { means, stds }
    }

    /// Columns whose variance is (numerically) zero.
    pub fn constant_columns(&self) -> Vec<usize> {
        (0..FEATURE_DIM).filter(|&d| self.stds[d] < MIN_STD).collect()
    }

    /// Standardize one row. Constant columns map to 0.
    pub fn transform_row(&self, row: &[f64; FEATURE_DIM]) -> [f64; FEATURE_DIM] {
        let mut out = [0.0_f64; FEATURE_DIM];
        for d in 0..FEATURE_DIM {
            if self.stds[d] >= MIN_STD {
                out[d] = (row[d] - self.means[d]) / self.stds[d];
            }
        }
        out
    }

    pub fn transform(&self, rows: &[[f64; FEATURE_DIM]]) -> Vec<[f64; FEATURE_DIM]> {
        rows.iter().map(|r| self.transform_row(r)).collect()
    }

    pub fn fit_transform(rows: &[[f64; FEATURE_DIM]]) -> (Self, Vec<[f64; FEATURE_DIM]>) {
        let scaler = Self::fit(rows);
        let normed = scaler.transform(rows);
        (scaler, normed)
    }
}
