use super::errors::{BayesNetError, Result};
use super::node::Node;
use crate::dataset::{Dataset, TrainingSet};
use log::{debug, trace};
use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayView2, Axis, IxDyn};
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Visited,
}

/// A discrete Bayesian network over named categorical variables.
///
/// Lifecycle: nodes and edges are added while the structure is learned,
/// [`fit`](Network::fit) estimates every CPT, and the fitted network is then
/// read-only. Any structural change drops the CPTs again.
///
/// CPTs are dense arrays, so their size grows with the product of the parent
/// cardinalities. The learners in this crate bound the in-degree to `k + 1`.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    class: Option<usize>,
    /// Sample column of every node; `None` for the class node. Filled by `fit`.
    columns: Vec<Option<usize>>,
    fitted: bool,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every node and edge, returning to the empty state.
    pub fn initialize(&mut self) {
        *self = Self::default();
    }

    pub fn add_node(&mut self, name: &str, cardinality: usize) -> Result<()> {
        if self.index.contains_key(name) {
            return Err(BayesNetError::DuplicateName(name.to_string()));
        }
        if cardinality == 0 {
            return Err(BayesNetError::DegenerateVariable {
                name: name.to_string(),
                cardinality,
            });
        }
        self.invalidate();
        self.index.insert(name.to_string(), self.nodes.len());
        self.nodes.push(Node::new(name, cardinality));
        Ok(())
    }

    /// Adds `parent -> child`. Re-adding an existing edge is a no-op.
    ///
    /// The graph is left untouched when the edge is rejected.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> Result<()> {
        let p = self.lookup(parent)?;
        let c = self.lookup(child)?;
        if self.nodes[c].has_parent(p) {
            return Ok(());
        }
        if p == c || self.reaches(c, p) {
            return Err(BayesNetError::Cycle(format!("{} -> {}", parent, child)));
        }
        self.invalidate();
        self.nodes[c].add_parent(p);
        Ok(())
    }

    /// Marks `name` as the class variable. Moving the class drops the CPTs.
    pub fn set_class(&mut self, name: &str) -> Result<()> {
        let class = self.lookup(name)?;
        if self.class != Some(class) {
            self.invalidate();
            self.class = Some(class);
        }
        Ok(())
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class.map(|c| self.nodes[c].name())
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Node names in insertion order.
    pub fn features(&self) -> Vec<&str> {
        self.nodes.iter().map(Node::name).collect()
    }

    pub fn parents(&self, name: &str) -> Result<Vec<&str>> {
        let node = &self.nodes[self.lookup(name)?];
        Ok(node.parents().iter().map(|&p| self.nodes[p].name()).collect())
    }

    pub fn children(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.lookup(name)?;
        Ok(self.children_lists()[idx]
            .iter()
            .map(|&c| self.nodes[c].name())
            .collect())
    }

    /// Every `(parent, child)` pair, grouped by parent in insertion order.
    pub fn edges(&self) -> Vec<(String, String)> {
        let children = self.children_lists();
        let mut edges = Vec::new();
        for (p, node) in self.nodes.iter().enumerate() {
            for &c in &children[p] {
                edges.push((node.name().to_string(), self.nodes[c].name().to_string()));
            }
        }
        edges
    }

    pub fn cpt(&self, name: &str) -> Result<&ArrayD<f64>> {
        let node = &self.nodes[self.lookup(name)?];
        node.cpt().ok_or(BayesNetError::NotFitted)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.nodes.iter().map(|n| n.parents().len()).sum()
    }

    /// Sum of the cardinalities of every node.
    pub fn num_states(&self) -> usize {
        self.nodes.iter().map(Node::cardinality).sum()
    }

    /// Total number of CPT cells across all nodes.
    pub fn num_cpt_cells(&self) -> usize {
        let cardinalities: Vec<usize> = self.nodes.iter().map(Node::cardinality).collect();
        self.nodes.iter().map(|n| n.cpt_cells(&cardinalities)).sum()
    }

    /// Node names ordered parent-before-child. Ties are resolved by insertion
    /// order, so the result is deterministic.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        Ok(self
            .topological_indices()?
            .into_iter()
            .map(|i| self.nodes[i].name().to_string())
            .collect())
    }

    /// Estimates every CPT from `data` with add-one smoothing.
    ///
    /// The class node is the node named like the dataset's class; every other
    /// node must match a dataset feature. Cardinalities are taken from the
    /// dataset's state map.
    pub fn fit(&mut self, data: &Dataset) -> Result<()> {
        self.fitted = false;
        let class = self.lookup(data.class_name())?;
        let expected = self.nodes.len() - 1;
        if data.n_features() != expected {
            return Err(BayesNetError::dimension("network features", expected, data.n_features()));
        }

        let mut columns = Vec::with_capacity(self.nodes.len());
        let mut cardinalities = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let column = if i == class {
                None
            } else {
                let column = data
                    .feature_index(node.name())
                    .ok_or_else(|| BayesNetError::UnknownNode(node.name().to_string()))?;
                Some(column)
            };
            let cardinality = data
                .cardinality(node.name())
                .ok_or_else(|| BayesNetError::UnknownNode(node.name().to_string()))?;
            columns.push(column);
            cardinalities.push(cardinality);
        }

        let order = self.topological_indices()?;
        let mut cpts: Vec<Option<ArrayD<f64>>> = vec![None; self.nodes.len()];
        for &i in &order {
            trace!("estimating CPT of '{}'", self.nodes[i].name());
            cpts[i] = Some(self.estimate_cpt(i, &columns, &cardinalities, data));
        }

        for ((node, cardinality), cpt) in self.nodes.iter_mut().zip(cardinalities).zip(cpts) {
            node.set_cardinality(cardinality);
            if let Some(cpt) = cpt {
                node.set_cpt(cpt);
            }
        }
        self.class = Some(class);
        self.columns = columns;
        self.fitted = true;
        debug!(
            "fitted network: {} nodes, {} edges, {} CPT cells",
            self.num_nodes(),
            self.num_edges(),
            self.num_cpt_cells()
        );
        Ok(())
    }

    /// Class posterior of a single sample given in dataset feature order.
    pub fn predict_proba_sample(&self, sample: ArrayView1<'_, usize>) -> Result<Array1<f64>> {
        let class = self.fitted_class()?;
        let expected = self.nodes.len() - 1;
        if sample.len() != expected {
            return Err(BayesNetError::dimension("sample", expected, sample.len()));
        }
        for (node, column) in self.nodes.iter().zip(&self.columns) {
            if let Some(col) = column {
                let state = sample[*col];
                if state >= node.cardinality() {
                    return Err(BayesNetError::InvalidState {
                        variable: node.name().to_string(),
                        state,
                        cardinality: node.cardinality(),
                    });
                }
            }
        }

        let n_classes = self.nodes[class].cardinality();
        let value = |node: usize, class_state: usize| match self.columns[node] {
            Some(col) => sample[col],
            None => class_state,
        };
        let mut log_scores: Array1<f64> = Array1::zeros(n_classes);
        let mut index = Vec::new();
        for (c, score) in log_scores.iter_mut().enumerate() {
            for (i, node) in self.nodes.iter().enumerate() {
                index.clear();
                index.push(value(i, c));
                index.extend(node.parents().iter().map(|&p| value(p, c)));
                let p = node.probability(&index).ok_or(BayesNetError::NotFitted)?;
                *score += p.ln();
            }
        }
        Ok(normalize_log(log_scores))
    }

    /// One posterior row per sample, `m x class cardinality`.
    pub fn predict_proba(&self, samples: ArrayView2<'_, usize>) -> Result<Array2<f64>> {
        let class = self.fitted_class()?;
        let mut proba = Array2::zeros((samples.nrows(), self.nodes[class].cardinality()));
        for (sample, mut row) in samples.axis_iter(Axis(0)).zip(proba.axis_iter_mut(Axis(0))) {
            row.assign(&self.predict_proba_sample(sample)?);
        }
        Ok(proba)
    }

    /// Most probable class per sample; ties go to the lowest class state.
    pub fn predict(&self, samples: ArrayView2<'_, usize>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(samples)?;
        Ok(proba.axis_iter(Axis(0)).map(|row| crate::classifiers::voting::argmax(row)).collect())
    }

    /// Accuracy of [`predict`](Network::predict) against `labels`.
    pub fn score(&self, samples: ArrayView2<'_, usize>, labels: ArrayView1<'_, usize>) -> Result<f64> {
        if labels.len() != samples.nrows() {
            return Err(BayesNetError::dimension("labels", samples.nrows(), labels.len()));
        }
        let predictions = self.predict(samples)?;
        Ok(accuracy(&predictions, labels))
    }

    /// One line per node: `"A -> B, C, "`.
    pub fn show(&self) -> Vec<String> {
        let children = self.children_lists();
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let listed: String = children[i]
                    .iter()
                    .map(|&c| format!("{}, ", self.nodes[c].name()))
                    .collect();
                format!("{} -> {}", node.name(), listed)
            })
            .collect()
    }

    /// Graphviz description of the structure, one statement per line.
    pub fn graph(&self, title: &str) -> Vec<String> {
        let children = self.children_lists();
        let mut lines = vec![format!(
            "digraph BayesNet {{\nlabel=<BayesNet {}>\nfontsize=30\nfontcolor=blue\nlabelloc=t\nlayout=circo\n",
            title
        )];
        for (i, node) in self.nodes.iter().enumerate() {
            if Some(i) == self.class {
                lines.push(format!(
                    "{} [shape=circle, fontcolor=red, fillcolor=lightblue, style=filled ] \n",
                    node.name()
                ));
            } else {
                lines.push(format!("{} [shape=circle] \n", node.name()));
            }
            for &c in &children[i] {
                lines.push(format!("{} -> {}", node.name(), self.nodes[c].name()));
            }
        }
        lines.push("}\n".to_string());
        lines
    }

    /// Text rendering of every estimated CPT.
    pub fn dump_cpt(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for node in &self.nodes {
            if let Some(cpt) = node.cpt() {
                lines.push(format!("* {}: {:?}", node.name(), cpt.shape()));
                lines.push(format!("{:.6}", cpt));
            }
        }
        lines
    }

    fn lookup(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| BayesNetError::UnknownNode(name.to_string()))
    }

    fn fitted_class(&self) -> Result<usize> {
        match (self.fitted, self.class) {
            (true, Some(class)) => Ok(class),
            _ => Err(BayesNetError::NotFitted),
        }
    }

    /// Keeps the CPTs but refuses inference until the next successful fit.
    pub(crate) fn mark_unfitted(&mut self) {
        self.fitted = false;
    }

    fn invalidate(&mut self) {
        if self.fitted {
            debug!("structure changed, dropping estimated CPTs");
        }
        self.fitted = false;
        for node in &mut self.nodes {
            node.clear_cpt();
        }
    }

    fn children_lists(&self) -> Vec<Vec<usize>> {
        let mut children = vec![Vec::new(); self.nodes.len()];
        for (c, node) in self.nodes.iter().enumerate() {
            for &p in node.parents() {
                children[p].push(c);
            }
        }
        children
    }

    /// Whether `target` is reachable from `start` following child edges.
    fn reaches(&self, start: usize, target: usize) -> bool {
        let children = self.children_lists();
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        Self::visit(start, target, &children, &mut marks)
    }

    fn visit(node: usize, target: usize, children: &[Vec<usize>], marks: &mut [Mark]) -> bool {
        if node == target {
            return true;
        }
        marks[node] = Mark::Visiting;
        for &child in &children[node] {
            if marks[child] == Mark::Unvisited && Self::visit(child, target, children, marks) {
                return true;
            }
        }
        marks[node] = Mark::Visited;
        false
    }

    fn topological_indices(&self) -> Result<Vec<usize>> {
        let children = self.children_lists();
        let mut pending: Vec<usize> = self.nodes.iter().map(|n| n.parents().len()).collect();
        let mut ready: BTreeSet<usize> = (0..self.nodes.len()).filter(|&i| pending[i] == 0).collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(next) = ready.pop_first() {
            order.push(next);
            for &c in &children[next] {
                pending[c] -= 1;
                if pending[c] == 0 {
                    ready.insert(c);
                }
            }
        }
        if order.len() != self.nodes.len() {
            let stuck: Vec<&str> = (0..self.nodes.len())
                .filter(|&i| pending[i] > 0)
                .map(|i| self.nodes[i].name())
                .collect();
            return Err(BayesNetError::Cycle(format!("unresolved nodes {:?}", stuck)));
        }
        Ok(order)
    }

    fn estimate_cpt(
        &self,
        node: usize,
        columns: &[Option<usize>],
        cardinalities: &[usize],
        data: &Dataset,
    ) -> ArrayD<f64> {
        let parents = self.nodes[node].parents();
        let shape: Vec<usize> = std::iter::once(cardinalities[node])
            .chain(parents.iter().map(|&p| cardinalities[p]))
            .collect();
        let mut counts = ArrayD::from_elem(IxDyn(&shape), 1.0);

        let samples = data.samples();
        let labels = data.labels();
        let value = |n: usize, s: usize| match columns[n] {
            Some(col) => samples[[s, col]],
            None => labels[s],
        };
        let mut index = Vec::with_capacity(shape.len());
        for (s, &weight) in data.weights().iter().enumerate() {
            index.clear();
            index.push(value(node, s));
            index.extend(parents.iter().map(|&p| value(p, s)));
            counts[IxDyn(&index)] += weight;
        }

        let totals = counts.sum_axis(Axis(0)).insert_axis(Axis(0));
        counts /= &totals;
        counts
    }
}

fn normalize_log(log_scores: Array1<f64>) -> Array1<f64> {
    let max = log_scores.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
    let mut proba = log_scores.mapv(|x| (x - max).exp());
    let total = proba.sum();
    proba /= total;
    proba
}

pub(crate) fn accuracy(predictions: &[usize], labels: ArrayView1<'_, usize>) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(labels.iter())
        .filter(|(p, y)| p == y)
        .count();
    correct as f64 / predictions.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::collections::BTreeMap;

    fn abc() -> Network {
        let mut net = Network::new();
        net.add_node("A", 2).unwrap();
        net.add_node("B", 2).unwrap();
        net.add_node("C", 2).unwrap();
        net
    }

    fn features(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// class -> a, class -> b, a -> b
    fn small_dataset() -> Dataset {
        Dataset::from_samples(
            array![[0, 0], [0, 1], [1, 1], [1, 1], [0, 0], [1, 0]],
            array![0, 0, 1, 1, 0, 1],
            features(&["a", "b"]),
            "class",
        )
        .unwrap()
    }

    fn small_network() -> Network {
        let mut net = Network::new();
        net.add_node("a", 2).unwrap();
        net.add_node("b", 2).unwrap();
        net.add_node("class", 2).unwrap();
        net.add_edge("class", "a").unwrap();
        net.add_edge("class", "b").unwrap();
        net.add_edge("a", "b").unwrap();
        net
    }

    #[test]
    fn test_duplicate_node() {
        let mut net = abc();
        assert_eq!(net.add_node("A", 3), Err(BayesNetError::DuplicateName("A".to_string())));
    }

    #[test]
    fn test_unknown_endpoint() {
        let mut net = abc();
        assert_eq!(net.add_edge("A", "Z"), Err(BayesNetError::UnknownNode("Z".to_string())));
        assert_eq!(net.add_edge("Z", "A"), Err(BayesNetError::UnknownNode("Z".to_string())));
    }

    #[test]
    fn test_get_edges() {
        let mut net = abc();
        net.add_edge("A", "B").unwrap();
        net.add_edge("B", "C").unwrap();
        assert_eq!(net.num_edges(), 2);
        net.add_edge("A", "C").unwrap();
        let edges: Vec<(String, String)> = vec![
            ("A".into(), "B".into()),
            ("A".into(), "C".into()),
            ("B".into(), "C".into()),
        ];
        assert_eq!(net.edges(), edges);
        assert_eq!(net.num_edges(), 3);
    }

    #[test]
    fn test_cycle_leaves_graph_unchanged() {
        let mut net = abc();
        net.add_edge("A", "B").unwrap();
        net.add_edge("B", "C").unwrap();
        let before = net.edges();
        assert!(matches!(net.add_edge("C", "A"), Err(BayesNetError::Cycle(_))));
        assert!(matches!(net.add_edge("B", "B"), Err(BayesNetError::Cycle(_))));
        assert_eq!(net.edges(), before);
        assert_eq!(net.parents("A").unwrap(), Vec::<&str>::new());
    }

    #[test]
    fn test_duplicate_edge_is_noop() {
        let mut net = abc();
        net.add_edge("A", "B").unwrap();
        net.add_edge("A", "B").unwrap();
        assert_eq!(net.num_edges(), 1);
    }

    #[test]
    fn test_show() {
        let mut net = abc();
        net.add_edge("A", "B").unwrap();
        net.add_edge("A", "C").unwrap();
        assert_eq!(net.show(), vec!["A -> B, C, ", "B -> ", "C -> "]);
    }

    #[test]
    fn test_topological_order() {
        let mut net = abc();
        net.add_edge("C", "B").unwrap();
        net.add_edge("A", "C").unwrap();
        let order = net.topological_order().unwrap();
        assert_eq!(order, vec!["A", "C", "B"]);
        assert_eq!(net.topological_order().unwrap(), order);
    }

    #[test]
    fn test_graph() {
        let mut net = abc();
        net.add_edge("A", "B").unwrap();
        net.add_edge("A", "C").unwrap();
        let lines = net.graph("Test Graph");
        assert_eq!(lines.len(), 7);
        assert_eq!(
            lines[0],
            "digraph BayesNet {\nlabel=<BayesNet Test Graph>\nfontsize=30\nfontcolor=blue\nlabelloc=t\nlayout=circo\n"
        );
        assert_eq!(lines[1], "A [shape=circle] \n");
        assert_eq!(lines[2], "A -> B");
        assert_eq!(lines[3], "A -> C");
        assert_eq!(lines[4], "B [shape=circle] \n");
        assert_eq!(lines[5], "C [shape=circle] \n");
        assert_eq!(lines[6], "}\n");
    }

    #[test]
    fn test_children_are_derived() {
        let mut net = abc();
        net.add_edge("A", "C").unwrap();
        net.add_edge("B", "C").unwrap();
        assert_eq!(net.children("A").unwrap(), vec!["C"]);
        assert_eq!(net.parents("C").unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_predict_before_fit() {
        let net = small_network();
        let samples = array![[0, 1]];
        assert_eq!(net.predict(samples.view()), Err(BayesNetError::NotFitted));
        assert_eq!(net.cpt("a"), Err(BayesNetError::NotFitted));
    }

    #[test]
    fn test_fit_laplace_counts() {
        let mut net = small_network();
        net.fit(&small_dataset()).unwrap();
        // class: 3 zeros, 3 ones -> (3+1)/(6+2)
        let class_cpt = net.cpt("class").unwrap();
        assert!((class_cpt[IxDyn(&[0])] - 0.5).abs() < 1e-12);
        // a | class=0 : a=0 three times out of three -> (3+1)/(3+2)
        let a_cpt = net.cpt("a").unwrap();
        assert!((a_cpt[IxDyn(&[0, 0])] - 0.8).abs() < 1e-12);
        assert!((a_cpt[IxDyn(&[1, 0])] - 0.2).abs() < 1e-12);
        assert_eq!(net.cpt("b").unwrap().shape(), &[2, 2, 2]);
    }

    #[test]
    fn test_cpt_columns_sum_to_one() {
        let mut net = small_network();
        net.fit(&small_dataset()).unwrap();
        for name in ["a", "b", "class"] {
            let sums = net.cpt(name).unwrap().sum_axis(Axis(0));
            assert!(sums.iter().all(|s| (s - 1.0).abs() < 1e-6));
        }
    }

    #[test]
    fn test_weights_shift_counts() {
        let data = small_dataset().with_weights(array![3.0, 1.0, 1.0, 1.0, 1.0, 1.0]).unwrap();
        let mut net = small_network();
        net.fit(&data).unwrap();
        // class 0 weight = 5, class 1 weight = 3 -> (5+1)/(8+2)
        assert!((net.cpt("class").unwrap()[IxDyn(&[0])] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_fit_dimension_mismatch() {
        let mut net = small_network();
        net.add_node("extra", 2).unwrap();
        let err = net.fit(&small_dataset()).unwrap_err();
        assert!(matches!(err, BayesNetError::DimensionMismatch { expected: 3, found: 2, .. }));
        assert!(!net.is_fitted());
    }

    #[test]
    fn test_predict_proba_rows_sum_to_one() {
        let mut net = small_network();
        let data = small_dataset();
        net.fit(&data).unwrap();
        let proba = net.predict_proba(data.samples()).unwrap();
        assert_eq!(proba.shape(), &[6, 2]);
        for row in proba.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-9);
            assert!(row.iter().all(|&p| p >= 0.0));
        }
        assert_eq!(net.predict(array![[1, 1], [0, 0]].view()).unwrap(), vec![1, 0]);
        assert!(net.score(data.samples(), data.labels()).unwrap() > 0.6);
    }

    #[test]
    fn test_predict_rejects_unknown_state() {
        let mut net = small_network();
        net.fit(&small_dataset()).unwrap();
        let err = net.predict(array![[0, 5]].view()).unwrap_err();
        assert!(matches!(err, BayesNetError::InvalidState { state: 5, .. }));
        let err = net.predict(array![[0, 1, 1]].view()).unwrap_err();
        assert!(matches!(err, BayesNetError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_structure_change_drops_cpts() {
        let mut net = small_network();
        net.fit(&small_dataset()).unwrap();
        assert!(net.is_fitted());
        net.add_node("d", 2).unwrap();
        assert!(!net.is_fitted());
        assert_eq!(net.cpt("a"), Err(BayesNetError::NotFitted));
    }

    #[test]
    fn test_summary_counts() {
        let mut net = small_network();
        net.fit(&small_dataset()).unwrap();
        assert_eq!(net.num_nodes(), 3);
        assert_eq!(net.num_edges(), 3);
        assert_eq!(net.num_states(), 6);
        // a: 2x2, b: 2x2x2, class: 2
        assert_eq!(net.num_cpt_cells(), 14);
        assert_eq!(net.dump_cpt().len(), 6);
    }

    #[test]
    fn test_unseen_declared_states_get_smoothed_rows() {
        let states = BTreeMap::from([
            ("a".to_string(), 4),
            ("b".to_string(), 2),
            ("class".to_string(), 3),
        ]);
        let data = Dataset::new(
            array![[0, 0], [0, 1], [1, 1], [1, 1], [0, 0], [1, 0]],
            array![0, 0, 1, 1, 0, 1],
            features(&["a", "b"]),
            "class",
            states,
        )
        .unwrap();
        let mut net = small_network();
        net.fit(&data).unwrap();

        assert_eq!(net.cpt("a").unwrap().shape(), &[4, 3]);
        let b = net.cpt("b").unwrap();
        assert_eq!(b.shape(), &[2, 3, 4]);
        for class in 0..3 {
            assert!((b[[0, class, 3]] - 0.5).abs() < 1e-12);
            assert!((b[[1, class, 3]] - 0.5).abs() < 1e-12);
        }
        let prior = net.cpt("class").unwrap();
        assert!(prior[[2]] > 0.0 && prior[[2]] < prior[[0]]);

        let proba = net.predict_proba(array![[3, 1]].view()).unwrap();
        assert_eq!(proba.shape(), &[1, 3]);
        assert!((proba.row(0).sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_moving_the_class_drops_the_fit() {
        let mut net = small_network();
        net.fit(&small_dataset()).unwrap();
        net.set_class("class").unwrap();
        assert!(net.is_fitted());
        net.set_class("b").unwrap();
        assert!(!net.is_fitted());
        assert_eq!(net.class_name(), Some("b"));
        assert!(net.cpt("a").is_err());
        assert_eq!(
            net.predict_proba(array![[0, 1]].view()),
            Err(BayesNetError::NotFitted)
        );
    }
}
