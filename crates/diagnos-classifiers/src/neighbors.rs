//! Brute-force Euclidean nearest-neighbor search.
//!
//! Used by the SMOTE balancer and the k-nearest-neighbors classifier. The
//! tables involved are small (hundreds of rows), so a full distance scan is
//! cheaper than building a tree. Ties are broken by row index so results are
//! deterministic.
use std::cmp::Ordering;

use ndarray::{ArrayView1, ArrayView2};

/// Squared Euclidean distance between two equally long vectors.
pub fn squared_euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Indices of the `k` rows of `points` closest to `query`, nearest first.
///
/// `exclude` skips one row (the query itself when searching within a set).
/// Returns fewer than `k` indices when not enough candidate rows exist.
pub fn k_nearest(
    points: ArrayView2<f64>,
    query: ArrayView1<f64>,
    k: usize,
    exclude: Option<usize>,
) -> Vec<usize> {
    let mut candidates: Vec<(f64, usize)> = points
        .outer_iter()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != exclude)
        .map(|(idx, row)| (squared_euclidean(row, query), idx))
        .collect();

    let by_distance = |a: &(f64, usize), b: &(f64, usize)| -> Ordering {
        a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
    };

    if k < candidates.len() {
        candidates.select_nth_unstable_by(k, by_distance);
        candidates.truncate(k);
    }
    candidates.sort_unstable_by(by_distance);
    candidates.into_iter().map(|(_, idx)| idx).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn nearest_first_with_index_tie_break() {
        let points: Array2<f64> = array![[0.0, 0.0], [1.0, 0.0], [-1.0, 0.0], [5.0, 5.0]];
        let query = array![0.0, 0.0];
        let nn = k_nearest(points.view(), query.view(), 3, Some(0));
        // rows 1 and 2 are equidistant: lower index first
        assert_eq!(nn, vec![1, 2, 3]);
    }

    #[test]
    fn fewer_candidates_than_k() {
        let points: Array2<f64> = array![[0.0], [2.0]];
        let nn = k_nearest(points.view(), array![1.5].view(), 5, None);
        assert_eq!(nn, vec![1, 0]);
    }

    #[test]
    fn squared_distance() {
        let d = squared_euclidean(array![1.0, 2.0].view(), array![4.0, 6.0].view());
        assert!((d - 25.0).abs() < 1e-12);
    }
}
