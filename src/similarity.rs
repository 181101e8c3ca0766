use indicatif::ProgressBar;
use rayon::prelude::*;
use thiserror::Error;

use crate::FEATURE_DIM;

/// Vectors with a norm below this are degenerate; their similarity to anything is 0.
const MIN_NORM: f64 = 1e-10;

#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Dense pairwise cosine similarity over a fixed set of vectors.
///
/// Only the upper triangle (diagonal included) is stored, row-major, so
/// `get(i, j)` and `get(j, i)` read the same cell. Entries are clamped to [-1, 1];
/// the diagonal is exactly 1 for non-degenerate rows and 0 for degenerate ones.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f64>,
    degenerate: Vec<bool>,
}

impl SimilarityMatrix {
    /// Compute all pairs, parallel over rows on a pool of `jobs` threads.
    pub fn compute(
        vectors: &[[f64; FEATURE_DIM]],
        jobs: usize,
        pb: &ProgressBar,
    ) -> Result<Self, SimilarityError> {
        let n = vectors.len();
        let norms: Vec<f64> = vectors.iter().map(|v| norm(v)).collect();
        let degenerate: Vec<bool> = norms.iter().map(|&nrm| nrm < MIN_NORM).collect();

        let zero_rows = degenerate.iter().filter(|&&d| d).count();
        if zero_rows > 0 {
            log::warn!(
                "{} songs have an all-zero normalized feature vector; their similarity is 0",
                zero_rows
            );
        }

        log::info!(
            "Computing similarity for {} songs ({}-dim vectors, {} workers)",
            n,
            FEATURE_DIM,
            jobs
        );

        let mut data = vec![0.0_f64; n * (n + 1) / 2];

        // Carve the packed buffer into one slice per row: row i covers columns i..n
        let mut rows: Vec<&mut [f64]> = Vec::with_capacity(n);
        let mut rest = data.as_mut_slice();
        for i in 0..n {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(n - i);
            rows.push(head);
            rest = tail;
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()?;

        pb.set_length(n as u64);
        pool.install(|| {
            rows.into_par_iter().enumerate().for_each(|(i, row)| {
                for (k, slot) in row.iter_mut().enumerate() {
                    let j = i + k;
                    *slot = if degenerate[i] || degenerate[j] {
                        0.0
                    } else if i == j {
                        1.0
                    } else {
                        (dot(&vectors[i], &vectors[j]) / (norms[i] * norms[j])).clamp(-1.0, 1.0)
                    };
                }
                pb.inc(1);
            });
        });
        pb.finish_and_clear();

        Ok(Self {
            n,
            data,
            degenerate,
        })
    }

    /// Number of rows (and columns).
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Similarity between rows `i` and `j`. Panics if either is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of range for {}", self.n);
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        self.data[row_start(lo, self.n) + (hi - lo)]
    }

    /// Row `i` as (column, similarity) pairs in column order.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..self.n).map(move |j| (j, self.get(i, j)))
    }

    pub fn is_degenerate(&self, i: usize) -> bool {
        self.degenerate[i]
    }

    pub fn degenerate_count(&self) -> usize {
        self.degenerate.iter().filter(|&&d| d).count()
    }
}

/// Offset of row `i` in the packed upper triangle of an n x n matrix.
fn row_start(i: usize, n: usize) -> usize {
    i * (2 * n - i + 1) / 2
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Cosine similarity between two vectors; 0 when either has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let denom = norm(a) * norm(b);
    if denom < MIN_NORM * MIN_NORM {
        0.0
    } else {
        (dot(a, b) / denom).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec10(head: &[f64]) -> [f64; FEATURE_DIM] {
        let mut v = [0.0; FEATURE_DIM];
        v[..head.len()].copy_from_slice(head);
        v
    }

    fn matrix(vectors: &[[f64; FEATURE_DIM]]) -> SimilarityMatrix {
        SimilarityMatrix::compute(vectors, 2, &ProgressBar::hidden()).unwrap()
    }

    fn spread(n: usize) -> Vec<[f64; FEATURE_DIM]> {
        (0..n)
            .map(|i| {
                let mut v = [0.0; FEATURE_DIM];
                for (d, x) in v.iter_mut().enumerate() {
                    *x = ((i * 7 + d * 3) % 11) as f64 - 5.0 + (i as f64) * 0.01;
                }
                v
            })
            .collect()
    }

    #[test]
    fn test_cosine_scaled_feature_vector_is_one() {
        let a = vec10(&[0.7, -1.2, 0.3, 2.0, -0.4, 0.0, 1.1, -0.9, 0.5, 1.6]);
        let b: Vec<f64> = a.iter().map(|x| x * 3.5).collect();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_disjoint_features_is_zero() {
        let a = vec10(&[1.5, -0.3, 0.8, 0.0, 0.0]);
        let b = vec10(&[0.0, 0.0, 0.0, 2.2, -1.0, 0.4, 0.9, 0.1, -0.6, 1.3]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_cosine_negated_feature_vector_is_minus_one() {
        let a = vec10(&[0.2, 1.4, -0.8, 0.6, -2.1, 0.9, 0.05, -0.3, 1.7, -1.1]);
        let b: Vec<f64> = a.iter().map(|x| -x).collect();
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_row_start_layout() {
        let n = 5;
        let mut expected = 0;
        for i in 0..n {
            assert_eq!(row_start(i, n), expected);
            expected += n - i;
        }
        assert_eq!(expected, n * (n + 1) / 2);
    }

    #[test]
    fn test_matrix_symmetric_bounded_unit_diagonal() {
        let vectors = spread(17);
        let m = matrix(&vectors);
        assert_eq!(m.len(), 17);
        for i in 0..17 {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..17 {
                let s = m.get(i, j);
                assert_eq!(s, m.get(j, i));
                assert!((-1.0..=1.0).contains(&s));
            }
        }
    }

    #[test]
    fn test_matrix_matches_pairwise_cosine() {
        let vectors = spread(9);
        let m = matrix(&vectors);
        for i in 0..9 {
            for j in 0..9 {
                let expected = cosine_similarity(&vectors[i], &vectors[j]);
                assert!((m.get(i, j) - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_degenerate_row_is_zero() {
        let vectors = vec![vec10(&[1.0, 2.0]), vec10(&[]), vec10(&[2.0, 1.0])];
        let m = matrix(&vectors);
        assert!(m.is_degenerate(1));
        assert_eq!(m.degenerate_count(), 1);
        for j in 0..3 {
            assert_eq!(m.get(1, j), 0.0);
        }
        assert_eq!(m.get(0, 0), 1.0);
    }

    #[test]
    fn test_row_iterates_full_row() {
        let vectors = vec![vec10(&[1.0]), vec10(&[1.0, 1.0]), vec10(&[0.0, 1.0])];
        let m = matrix(&vectors);
        let row: Vec<(usize, f64)> = m.row(2).collect();
        assert_eq!(row.len(), 3);
        assert!(row[0].1.abs() < 1e-12);
        assert!((row[1].1 - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert_eq!(row[2], (2, 1.0));
    }
}
