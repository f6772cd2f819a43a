use crate::components::DistanceEvaluator;
use crate::graph::VertexId;
use crate::state::RealVectorState;
use kiddo::float::{distance::SquaredEuclidean, kdtree::Axis, kdtree::KdTree};
use num_traits::Float;

/// Distance evaluator backed by a linear scan.
///
/// No per-query data structure overhead; useful for small graphs and as a
/// reference oracle for the k-d tree evaluator.
pub struct LinearDistanceEvaluator<F, const N: usize> {
    states: Vec<(RealVectorState<F, N>, VertexId)>,
}

impl<F: Float, const N: usize> LinearDistanceEvaluator<F, N> {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }
}

impl<F: Float, const N: usize> Default for LinearDistanceEvaluator<F, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float, const N: usize> DistanceEvaluator<F, RealVectorState<F, N>>
    for LinearDistanceEvaluator<F, N>
{
    fn notify_vertex_inserted(&mut self, id: VertexId, state: &RealVectorState<F, N>) {
        self.states.push((*state, id));
    }

    fn notify_vertex_removed(&mut self, id: VertexId, _state: &RealVectorState<F, N>) {
        self.states.retain(|&(_, item)| item != id);
    }

    fn nearest(&self, state: &RealVectorState<F, N>) -> Option<VertexId> {
        self.states
            .iter()
            .min_by(|a, b| {
                state
                    .euclidean_distance_squared(&a.0)
                    .partial_cmp(&state.euclidean_distance_squared(&b.0))
                    .unwrap()
            })
            .map(|&(_, id)| id)
    }

    fn near(&self, state: &RealVectorState<F, N>, radius: F) -> Vec<VertexId> {
        self.states
            .iter()
            .filter(|(s, _)| state.euclidean_distance_squared(s) <= radius * radius)
            .map(|&(_, id)| id)
            .collect()
    }
}

/// Distance evaluator backed by a k-d tree.
pub struct KdTreeDistanceEvaluator<F: Float + Axis, const N: usize> {
    kdtree: KdTree<F, usize, N, 32, u32>,
}

impl<F: Float + Axis, const N: usize> KdTreeDistanceEvaluator<F, N> {
    pub fn new() -> Self {
        Self {
            kdtree: KdTree::new(),
        }
    }
}

impl<F: Float + Axis, const N: usize> Default for KdTreeDistanceEvaluator<F, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float + Axis, const N: usize> DistanceEvaluator<F, RealVectorState<F, N>>
    for KdTreeDistanceEvaluator<F, N>
{
    fn notify_vertex_inserted(&mut self, id: VertexId, state: &RealVectorState<F, N>) {
        self.kdtree.add(state.values(), id.index());
    }

    fn notify_vertex_removed(&mut self, id: VertexId, state: &RealVectorState<F, N>) {
        self.kdtree.remove(state.values(), id.index());
    }

    fn nearest(&self, state: &RealVectorState<F, N>) -> Option<VertexId> {
        if self.kdtree.size() == 0 {
            return None;
        }
        let neighbor = self.kdtree.nearest_one::<SquaredEuclidean>(state.values());
        Some(VertexId::from_index(neighbor.item))
    }

    fn near(&self, state: &RealVectorState<F, N>, radius: F) -> Vec<VertexId> {
        self.kdtree
            .within_unsorted::<SquaredEuclidean>(state.values(), radius * radius)
            .iter()
            .map(|n| VertexId::from_index(n.item))
            .collect()
    }
}
