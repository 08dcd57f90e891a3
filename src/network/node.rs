use ndarray::{ArrayD, IxDyn};

/// A categorical variable of a [`Network`](super::Network).
///
/// Parents are stored as indices into the owning network, in the order the
/// edges were added. Children are never stored; the network derives them from
/// the parent lists.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    cardinality: usize,
    parents: Vec<usize>,
    /// Indexed by `[own state, parent 1 state, parent 2 state, ...]`.
    cpt: Option<ArrayD<f64>>,
}

impl Node {
    pub(crate) fn new(name: &str, cardinality: usize) -> Self {
        Node {
            name: name.to_string(),
            cardinality,
            parents: Vec::new(),
            cpt: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    pub fn parents(&self) -> &[usize] {
        &self.parents
    }

    pub fn cpt(&self) -> Option<&ArrayD<f64>> {
        self.cpt.as_ref()
    }

    /// Number of cells the CPT has, or would have with the current cardinalities.
    pub fn cpt_cells(&self, cardinalities: &[usize]) -> usize {
        match &self.cpt {
            Some(cpt) => cpt.len(),
            None => self
                .parents
                .iter()
                .map(|&p| cardinalities[p])
                .product::<usize>()
                * self.cardinality,
        }
    }

    pub(crate) fn has_parent(&self, parent: usize) -> bool {
        self.parents.contains(&parent)
    }

    pub(crate) fn add_parent(&mut self, parent: usize) {
        self.parents.push(parent);
    }

    pub(crate) fn set_cardinality(&mut self, cardinality: usize) {
        self.cardinality = cardinality;
    }

    pub(crate) fn set_cpt(&mut self, cpt: ArrayD<f64>) {
        self.cpt = Some(cpt);
    }

    pub(crate) fn clear_cpt(&mut self) {
        self.cpt = None;
    }

    pub(crate) fn probability(&self, index: &[usize]) -> Option<f64> {
        self.cpt.as_ref().and_then(|cpt| cpt.get(IxDyn(index)).copied())
    }
}
