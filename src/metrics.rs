//! Weighted information-theoretic statistics over discrete samples.
//!
//! All quantities use natural logarithms and the sample weights of the
//! dataset they are computed on.

use crate::dataset::{Dataset, TrainingSet};
use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView2};
use std::collections::BTreeMap;

pub struct Metrics<'a> {
    data: &'a Dataset,
}

impl<'a> Metrics<'a> {
    pub fn new(data: &'a Dataset) -> Self {
        Metrics { data }
    }

    /// H(X)
    pub fn entropy(&self, x: ArrayView1<'_, usize>) -> f64 {
        self.weighted_entropy(x.iter().copied())
    }

    /// H(X | Y)
    pub fn conditional_entropy(&self, x: ArrayView1<'_, usize>, y: ArrayView1<'_, usize>) -> f64 {
        let joint = self.weighted_entropy(x.iter().zip(y.iter()));
        (joint - self.entropy(y)).max(0.0)
    }

    /// I(X; Y) = H(X) - H(X | Y)
    pub fn mutual_information(&self, x: ArrayView1<'_, usize>, y: ArrayView1<'_, usize>) -> f64 {
        (self.entropy(x) - self.conditional_entropy(x, y)).max(0.0)
    }

    /// I(X; Y | Z) = H(X, Z) + H(Y, Z) - H(X, Y, Z) - H(Z)
    pub fn conditional_mutual_information(
        &self,
        x: ArrayView1<'_, usize>,
        y: ArrayView1<'_, usize>,
        z: ArrayView1<'_, usize>,
    ) -> f64 {
        let xz = self.weighted_entropy(x.iter().zip(z.iter()));
        let yz = self.weighted_entropy(y.iter().zip(z.iter()));
        let xyz = self.weighted_entropy(x.iter().zip(y.iter()).zip(z.iter()));
        (xz + yz - xyz - self.entropy(z)).max(0.0)
    }

    /// I(feature; class) for every feature, in feature order.
    pub fn class_mutual_information(&self) -> Vec<f64> {
        let labels = self.data.labels();
        (0..self.data.n_features())
            .map(|i| {
                let mi = self.mutual_information(self.data.column(i), labels);
                debug!(
                    "I({}; {}) = {:.6}",
                    self.data.features()[i],
                    self.data.class_name(),
                    mi
                );
                mi
            })
            .collect()
    }

    /// Symmetric `n x n` matrix of I(Xi; Xj | class) with a zero diagonal.
    pub fn conditional_edge_weights(&self) -> Array2<f64> {
        let n = self.data.n_features();
        let labels = self.data.labels();
        let mut weights = Array2::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let cmi = self.conditional_mutual_information(self.data.column(i), self.data.column(j), labels);
                weights[[i, j]] = cmi;
                weights[[j, i]] = cmi;
            }
        }
        weights
    }

    /// Indices of the `k` features with the highest I(feature; class).
    pub fn select_k_best(&self, k: usize) -> Vec<usize> {
        let scores = self.class_mutual_information();
        let mut order = argsort_descending(&scores);
        order.truncate(k);
        order
    }

    fn weighted_entropy<K, I>(&self, keys: I) -> f64
    where
        K: Ord,
        I: Iterator<Item = K>,
    {
        // ordered keys fix the summation order
        let mut counts: BTreeMap<K, f64> = BTreeMap::new();
        let mut total = 0.0;
        for (key, &w) in keys.zip(self.data.weights().iter()) {
            *counts.entry(key).or_insert(0.0) += w;
            total += w;
        }
        if total <= 0.0 {
            return 0.0;
        }
        counts
            .values()
            .filter(|&&c| c > 0.0)
            .map(|&c| {
                let p = c / total;
                -p * p.ln()
            })
            .sum()
    }
}

/// Indices sorted by decreasing value; equal values keep ascending index order.
pub fn argsort_descending(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));
    indices
}

/// Maximum spanning tree over a symmetric weight matrix (Prim), grown from
/// `root`. Edges are returned as `(parent, child)` in the order they join the
/// tree, so every edge points away from the root.
pub fn maximum_spanning_tree(weights: ArrayView2<'_, f64>, root: usize) -> Vec<(usize, usize)> {
    let n = weights.nrows();
    if n == 0 || root >= n {
        return Vec::new();
    }
    let mut in_tree = vec![false; n];
    in_tree[root] = true;
    let mut best: Vec<(f64, usize)> = (0..n).map(|v| (weights[[root, v]], root)).collect();
    let mut edges = Vec::with_capacity(n - 1);
    for _ in 1..n {
        let mut next: Option<usize> = None;
        for v in (0..n).filter(|&v| !in_tree[v]) {
            match next {
                Some(u) if best[v].0 <= best[u].0 => {}
                _ => next = Some(v),
            }
        }
        let Some(v) = next else { break };
        in_tree[v] = true;
        edges.push((best[v].1, v));
        for u in (0..n).filter(|&u| !in_tree[u]) {
            if weights[[v, u]] > best[u].0 {
                best[u] = (weights[[v, u]], v);
            }
        }
    }
    edges
}
