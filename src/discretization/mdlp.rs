//! Fayyad-Irani entropy discretization with the MDL stopping rule.
//!
//! Cut points are searched recursively between adjacent distinct values of
//! the sorted feature. A candidate partition is kept only when its
//! information gain pays for the cost of encoding it.

use crate::network::{BayesNetError, Result};
use log::debug;
use ndarray::{Array1, ArrayView1};
use std::collections::HashMap;
use std::hash::Hash;

/// `3^k` overflows the mantissa long before this, so larger class counts
/// use `k * log2(3)` directly.
const EXACT_POWER_LIMIT: usize = 30;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mdlp {
    cut_points: Vec<f64>,
}

impl Mdlp {
    pub fn new() -> Self {
        Mdlp::default()
    }

    /// Learns cut points for `values` against `labels`, replacing any
    /// previous ones.
    pub fn fit(&mut self, values: ArrayView1<'_, f64>, labels: ArrayView1<'_, usize>) -> Result<()> {
        if values.len() != labels.len() {
            return Err(BayesNetError::dimension("discretizer labels", values.len(), labels.len()));
        }
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let sorted_values: Vec<f64> = order.iter().map(|&i| values[i]).collect();
        let sorted_labels: Vec<usize> = order.iter().map(|&i| labels[i]).collect();
        let n_classes = sorted_labels.iter().max().map_or(0, |&max| max + 1);

        let mut search = CutSearch {
            values: &sorted_values,
            labels: &sorted_labels,
            n_classes,
            cuts: Vec::new(),
        };
        search.split(0, sorted_values.len());
        let mut cuts = search.cuts;
        cuts.sort_by(f64::total_cmp);
        debug!("MDLP found {} cut points", cuts.len());
        self.cut_points = cuts;
        Ok(())
    }

    pub fn cut_points(&self) -> &[f64] {
        &self.cut_points
    }

    pub fn n_states(&self) -> usize {
        self.cut_points.len() + 1
    }

    /// Number of cut points less than or equal to `value`.
    pub fn transform_value(&self, value: f64) -> usize {
        self.cut_points.partition_point(|&cut| cut <= value)
    }

    pub fn transform(&self, values: ArrayView1<'_, f64>) -> Array1<usize> {
        values.mapv(|v| self.transform_value(v))
    }
}

struct CutSearch<'a> {
    values: &'a [f64],
    labels: &'a [usize],
    n_classes: usize,
    cuts: Vec<f64>,
}

struct Candidate {
    position: usize,
    entropy: f64,
    left_entropy: f64,
    right_entropy: f64,
    left_classes: usize,
    right_classes: usize,
}

impl CutSearch<'_> {
    fn split(&mut self, start: usize, end: usize) {
        let n = end - start;
        if n < 2 {
            return;
        }
        let total = self.counts(start, end);
        let entropy = entropy(&total, n as f64);
        if entropy == 0.0 {
            return;
        }
        let Some(best) = self.best_candidate(start, end, &total) else {
            return;
        };

        let k = distinct(&total) as f64;
        let gain = entropy - best.entropy;
        let delta = log2_three_pow_minus_two(distinct(&total))
            - (k * entropy
                - best.left_classes as f64 * best.left_entropy
                - best.right_classes as f64 * best.right_entropy);
        let threshold = ((n as f64 - 1.0).log2() + delta) / n as f64;
        if gain <= threshold {
            return;
        }

        let cut = (self.values[best.position - 1] + self.values[best.position]) / 2.0;
        self.cuts.push(cut);
        self.split(start, best.position);
        self.split(best.position, end);
    }

    /// Boundary with the lowest weighted class entropy; the first one wins ties.
    fn best_candidate(&self, start: usize, end: usize, total: &[f64]) -> Option<Candidate> {
        let n = (end - start) as f64;
        let mut left = vec![0.0; self.n_classes];
        let mut best: Option<Candidate> = None;
        for position in start + 1..end {
            left[self.labels[position - 1]] += 1.0;
            if self.values[position] == self.values[position - 1] {
                continue;
            }
            let right: Vec<f64> = total.iter().zip(&left).map(|(t, l)| t - l).collect();
            let n_left = (position - start) as f64;
            let n_right = n - n_left;
            let left_entropy = entropy(&left, n_left);
            let right_entropy = entropy(&right, n_right);
            let weighted = (n_left * left_entropy + n_right * right_entropy) / n;
            if best.as_ref().is_none_or(|b| weighted < b.entropy) {
                best = Some(Candidate {
                    position,
                    entropy: weighted,
                    left_entropy,
                    right_entropy,
                    left_classes: distinct(&left),
                    right_classes: distinct(&right),
                });
            }
        }
        best
    }

    fn counts(&self, start: usize, end: usize) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &label in &self.labels[start..end] {
            counts[label] += 1.0;
        }
        counts
    }
}

/// Class entropy in bits.
fn entropy(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    counts
        .iter()
        .filter(|&&c| c > 0.0)
        .map(|&c| {
            let p = c / total;
            -p * p.log2()
        })
        .sum()
}

fn distinct(counts: &[f64]) -> usize {
    counts.iter().filter(|&&c| c > 0.0).count()
}

fn log2_three_pow_minus_two(k: usize) -> f64 {
    if k < EXACT_POWER_LIMIT {
        (3f64.powi(k as i32) - 2.0).log2()
    } else {
        k as f64 * 3f64.log2()
    }
}

/// Maps each key to the index of its first appearance.
pub fn factorize<K: Hash + Eq + Clone>(keys: &[K]) -> Array1<usize> {
    let mut codes: HashMap<K, usize> = HashMap::new();
    keys.iter()
        .map(|key| {
            let next = codes.len();
            *codes.entry(key.clone()).or_insert(next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separable_classes_get_one_cut() {
        let mut mdlp = Mdlp::new();
        mdlp.fit(array![1.0, 2.0, 3.0, 10.0, 11.0, 12.0].view(), array![0, 0, 0, 1, 1, 1].view())
            .unwrap();
        assert_eq!(mdlp.cut_points(), &[6.5]);
        assert_eq!(mdlp.n_states(), 2);
        let codes = mdlp.transform(array![0.0, 6.4, 6.5, 20.0].view());
        assert_eq!(codes.to_vec(), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_unsorted_input_with_repeated_values() {
        let mut mdlp = Mdlp::new();
        mdlp.fit(array![5.0, 1.0, 5.0, 1.0, 5.0, 1.0].view(), array![1, 0, 1, 0, 1, 0].view())
            .unwrap();
        assert_eq!(mdlp.cut_points(), &[3.0]);
    }

    #[test]
    fn test_pure_labels_need_no_cut() {
        let mut mdlp = Mdlp::new();
        mdlp.fit(array![1.0, 2.0, 3.0].view(), array![1, 1, 1].view()).unwrap();
        assert!(mdlp.cut_points().is_empty());
        assert_eq!(mdlp.transform_value(100.0), 0);
    }

    #[test]
    fn test_weak_split_is_rejected() {
        let mut mdlp = Mdlp::new();
        mdlp.fit(array![1.0, 2.0, 3.0, 4.0].view(), array![0, 1, 0, 1].view())
            .unwrap();
        assert_eq!(mdlp.n_states(), 1);
    }

    #[test]
    fn test_refit_replaces_cuts() {
        let mut mdlp = Mdlp::new();
        mdlp.fit(array![1.0, 2.0, 3.0, 10.0, 11.0, 12.0].view(), array![0, 0, 0, 1, 1, 1].view())
            .unwrap();
        mdlp.fit(array![1.0, 2.0, 3.0].view(), array![0, 0, 0].view()).unwrap();
        assert!(mdlp.cut_points().is_empty());
    }

    #[test]
    fn test_length_mismatch() {
        let mut mdlp = Mdlp::new();
        let err = mdlp.fit(array![1.0, 2.0].view(), array![0].view()).unwrap_err();
        assert!(matches!(err, BayesNetError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_factorize_first_appearance() {
        let keys = vec![vec![1, 0], vec![0, 2], vec![1, 0], vec![2, 2]];
        assert_eq!(factorize(&keys).to_vec(), vec![0, 1, 0, 2]);
    }

    #[test]
    fn test_large_class_count_cost_is_finite() {
        assert!(log2_three_pow_minus_two(500).is_finite());
        assert_eq!(log2_three_pow_minus_two(1), 0.0);
    }
}
