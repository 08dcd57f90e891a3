//! Significance-weighted vote aggregation for ensembles.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// Index of the largest value; the lowest index wins ties.
pub fn argmax(values: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Accumulated significance per class state for every sample.
///
/// `votes` is `m x num_models` and holds the class state each model predicted.
/// Votes for states outside `0..n_classes` are ignored.
pub fn vote_scores(votes: ArrayView2<'_, usize>, significances: &[f64], n_classes: usize) -> Array2<f64> {
    let mut scores = Array2::zeros((votes.nrows(), n_classes));
    for (sample_votes, mut bucket) in votes.axis_iter(Axis(0)).zip(scores.axis_iter_mut(Axis(0))) {
        for (&state, &significance) in sample_votes.iter().zip(significances) {
            if state < n_classes {
                bucket[state] += significance;
            }
        }
    }
    scores
}

/// Final label per sample: the class state with the highest accumulated
/// significance, lowest state on ties.
pub fn vote(votes: ArrayView2<'_, usize>, significances: &[f64], n_classes: usize) -> Vec<usize> {
    vote_scores(votes, significances, n_classes)
        .axis_iter(Axis(0))
        .map(argmax)
        .collect()
}

/// Significance-weighted average of per-model probability matrices.
pub fn average_probabilities(probabilities: &[Array2<f64>], significances: &[f64]) -> Option<Array2<f64>> {
    let first = probabilities.first()?;
    let mut total: Array2<f64> = Array2::zeros(first.raw_dim());
    for (proba, &significance) in probabilities.iter().zip(significances) {
        total.scaled_add(significance, proba);
    }
    normalize_rows(&mut total);
    Some(total)
}

/// Scales every row to sum to one; all-zero rows become uniform.
pub fn normalize_rows(matrix: &mut Array2<f64>) {
    let width = matrix.ncols() as f64;
    for mut row in matrix.axis_iter_mut(Axis(0)) {
        let sum = row.sum();
        if sum > 0.0 {
            row /= sum;
        } else {
            row.fill(1.0 / width);
        }
    }
}
