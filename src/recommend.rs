use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;

use crate::similarity::SimilarityMatrix;

#[derive(Error, Debug, PartialEq)]
pub enum QueryError {
    #[error("Song index {index} out of range (catalog has {len} songs)")]
    OutOfRange { index: usize, len: usize },
    #[error("No song named \"{0}\" in the catalog")]
    UnknownSong(String),
    #[error("Number of recommendations must be at least 1")]
    InvalidTopN,
}

/// One ranked neighbor of the query song.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Row in the working catalog.
    pub index: usize,
    pub name: String,
    /// Cosine similarity rounded to 2 decimals.
    pub score: f64,
}

/// Rank every other song by similarity to `query` and return the best `top_n`.
///
/// Order is similarity descending, then row index ascending. Ranking uses the
/// unrounded similarity; only the reported score is rounded.
///
/// `names` must hold one identifier per matrix row.
pub fn recommend(
    matrix: &SimilarityMatrix,
    names: &[String],
    query: usize,
    top_n: usize,
) -> Result<Vec<Recommendation>, QueryError> {
    let len = matrix.len();
    debug_assert_eq!(names.len(), len, "one name per similarity row");
    if query >= len {
        return Err(QueryError::OutOfRange { index: query, len });
    }
    if top_n == 0 {
        return Err(QueryError::InvalidTopN);
    }

    let mut scores: Vec<(usize, f64)> = matrix.row(query).filter(|&(j, _)| j != query).collect();

    let k = top_n.min(scores.len());
    if k < scores.len() {
        // Partial sort: only need the top k
        scores.select_nth_unstable_by(k - 1, rank_order);
        scores.truncate(k);
    }
    scores.sort_by(rank_order);

    Ok(scores
        .into_iter()
        .map(|(j, sim)| Recommendation {
            index: j,
            name: names[j].clone(),
            score: round2(sim),
        })
        .collect())
}

/// Similarity descending, ties by ascending row index.
fn rank_order(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Round to 2 decimal places, halves away from zero.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
