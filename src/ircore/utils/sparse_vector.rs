use crate::ircore::NodeId;
use std::collections::HashMap;

pub type SparseVector = HashMap<NodeId, f64>;

pub trait SparseVectorOp {
    fn vec_len(&self) -> f64;
    fn vec_get(&self, id: NodeId) -> f64;
    fn vec_normalize(&mut self);
    fn vec_l1_distance(&self, other: &SparseVector) -> f64;
    fn vec_top(&self, k: usize) -> Vec<(NodeId, f64)>;
}

impl SparseVectorOp for SparseVector {
    fn vec_len(&self) -> f64 {
        let mut length = 0.0f64;
        for v in self.values() {
            length += v * v;
        }
        length.sqrt()
    }
    fn vec_get(&self, id: NodeId) -> f64 {
        self.get(&id).copied().unwrap_or_default()
    }
    // a zero vector stays zero
    fn vec_normalize(&mut self) {
        let length = self.vec_len();
        if length == 0.0 || !length.is_finite() {
            return;
        }
        for value in self.values_mut() {
            *value /= length;
        }
    }
    fn vec_l1_distance(&self, other: &SparseVector) -> f64 {
        let mut distance = 0.0f64;
        for (id, value) in self.iter() {
            distance += (value - other.vec_get(*id)).abs();
        }
        for (id, value) in other.iter() {
            if !self.contains_key(id) {
                distance += value.abs();
            }
        }
        distance
    }
    fn vec_top(&self, k: usize) -> Vec<(NodeId, f64)> {
        let mut entries: Vec<(NodeId, f64)> = self.iter().map(|(id, v)| (*id, *v)).collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        entries.truncate(k);
        entries
    }
}
