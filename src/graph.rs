use crate::error::PlannerError;
use crate::trajectory::Trajectory;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// Stable handle to a vertex.
///
/// Handles stay valid until the vertex is deleted. A freed slot may be
/// reused by a later insertion, but only after every component has seen
/// the delete notification, so a handle held across its own delete
/// notification must be dropped there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexId(usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Rebuilds a handle from a raw slot index. Intended for components
    /// whose backing store can only hold plain integers, such as a k-d
    /// tree keyed by `usize`; the index must come from [`VertexId::index`].
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// Stable handle to an edge. Same lifetime rules as [`VertexId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Rebuilds a handle from a raw slot index; see [`VertexId::from_index`].
    pub fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// A vertex of the planning graph: one state plus its incident edges and
/// the per-algorithm annotations maintained by the planners.
#[derive(Clone, Debug)]
pub struct Vertex<F, S> {
    state: S,
    incoming: Vec<EdgeId>,
    outgoing: Vec<EdgeId>,
    total_cost: F,
    reaches_goal: bool,
}

impl<F: Float, S> Vertex<F, S> {
    fn new(state: S) -> Self {
        Self {
            state,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            total_cost: F::zero(),
            reaches_goal: false,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    /// Accumulated path cost from the root along the chosen parent chain.
    /// Maintained by the RRT* planner; zero elsewhere.
    pub fn total_cost(&self) -> F {
        self.total_cost
    }

    pub fn set_total_cost(&mut self, total_cost: F) {
        self.total_cost = total_cost;
    }

    /// Whether the state lies in the goal region. Annotated by the model
    /// checker when the vertex is inserted.
    pub fn reaches_goal(&self) -> bool {
        self.reaches_goal
    }

    pub fn set_reaches_goal(&mut self, reaches_goal: bool) {
        self.reaches_goal = reaches_goal;
    }
}

/// A directed edge owning the trajectory that connects its endpoints.
#[derive(Clone, Debug)]
pub struct Edge<F, S, U> {
    src: VertexId,
    dst: VertexId,
    trajectory: Trajectory<S, U>,
    cost: F,
}

impl<F: Float, S, U> Edge<F, S, U> {
    pub fn src(&self) -> VertexId {
        self.src
    }

    pub fn dst(&self) -> VertexId {
        self.dst
    }

    /// Intermediate states and inputs between the endpoint vertices. The
    /// destination vertex holds the final state, so `states` has one
    /// element fewer than `inputs`.
    pub fn trajectory(&self) -> &Trajectory<S, U> {
        &self.trajectory
    }

    /// Cost of traversing this edge, as assigned by the cost evaluator.
    pub fn cost(&self) -> F {
        self.cost
    }

    pub fn set_cost(&mut self, cost: F) {
        self.cost = cost;
    }
}

/// Arena-backed directed graph of reachable states.
///
/// Vertices and edges live in slot arenas addressed by stable ids; the
/// incidence lists on each vertex are maintained by the insertion and
/// removal operations. Exactly one vertex is the root for the lifetime of
/// a planning run.
#[derive(Clone, Debug)]
pub struct Graph<F, S, U> {
    vertices: Vec<Option<Vertex<F, S>>>,
    free_vertices: Vec<usize>,
    edges: Vec<Option<Edge<F, S, U>>>,
    free_edges: Vec<usize>,
    vertex_count: usize,
    edge_count: usize,
    root: Option<VertexId>,
}

impl<F: Float, S, U> Graph<F, S, U> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            free_vertices: Vec::new(),
            edges: Vec::new(),
            free_edges: Vec::new(),
            vertex_count: 0,
            edge_count: 0,
            root: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn root(&self) -> Option<VertexId> {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: Option<VertexId>) {
        self.root = root;
    }

    /// Returns the vertex behind `id`. Panics if the id is stale; holding
    /// a handle past its delete notification is a defect, not a
    /// recoverable condition.
    pub fn vertex(&self, id: VertexId) -> &Vertex<F, S> {
        self.vertices[id.0]
            .as_ref()
            .expect("stale vertex id: vertex was deleted")
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex<F, S> {
        self.vertices[id.0]
            .as_mut()
            .expect("stale vertex id: vertex was deleted")
    }

    pub fn get_vertex(&self, id: VertexId) -> Option<&Vertex<F, S>> {
        self.vertices.get(id.0).and_then(Option::as_ref)
    }

    /// Returns the edge behind `id`. Panics if the id is stale.
    pub fn edge(&self, id: EdgeId) -> &Edge<F, S, U> {
        self.edges[id.0]
            .as_ref()
            .expect("stale edge id: edge was deleted")
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge<F, S, U> {
        self.edges[id.0]
            .as_mut()
            .expect("stale edge id: edge was deleted")
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge<F, S, U>> {
        self.edges.get(id.0).and_then(Option::as_ref)
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| VertexId(i))
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| EdgeId(i))
    }

    /// The source of the most recently inserted incoming edge, if any.
    /// Under the tree planners every non-root vertex has exactly one.
    pub fn parent(&self, id: VertexId) -> Option<VertexId> {
        self.vertex(id)
            .incoming
            .last()
            .map(|&edge| self.edge(edge).src())
    }

    pub(crate) fn add_vertex(&mut self, state: S) -> VertexId {
        let vertex = Vertex::new(state);
        self.vertex_count += 1;
        match self.free_vertices.pop() {
            Some(slot) => {
                self.vertices[slot] = Some(vertex);
                VertexId(slot)
            }
            None => {
                self.vertices.push(Some(vertex));
                VertexId(self.vertices.len() - 1)
            }
        }
    }

    /// Removes a vertex whose incident edges have already been removed.
    pub(crate) fn remove_vertex(&mut self, id: VertexId) -> Result<Vertex<F, S>, PlannerError> {
        {
            let vertex = self.vertex(id);
            if !vertex.incoming.is_empty() || !vertex.outgoing.is_empty() {
                return Err(PlannerError::Inconsistent(format!(
                    "vertex {} removed while edges are still attached",
                    id.0
                )));
            }
        }
        let vertex = self.vertices[id.0]
            .take()
            .expect("stale vertex id: vertex was deleted");
        self.free_vertices.push(id.0);
        self.vertex_count -= 1;
        if self.root == Some(id) {
            self.root = None;
        }
        Ok(vertex)
    }

    pub(crate) fn add_edge(
        &mut self,
        src: VertexId,
        dst: VertexId,
        trajectory: Trajectory<S, U>,
        cost: F,
    ) -> EdgeId {
        let edge = Edge {
            src,
            dst,
            trajectory,
            cost,
        };
        self.edge_count += 1;
        let id = match self.free_edges.pop() {
            Some(slot) => {
                self.edges[slot] = Some(edge);
                EdgeId(slot)
            }
            None => {
                self.edges.push(Some(edge));
                EdgeId(self.edges.len() - 1)
            }
        };
        self.vertex_mut(src).outgoing.push(id);
        self.vertex_mut(dst).incoming.push(id);
        id
    }

    pub(crate) fn remove_edge(&mut self, id: EdgeId) -> Edge<F, S, U> {
        let edge = self.edges[id.0]
            .take()
            .expect("stale edge id: edge was deleted");
        self.free_edges.push(id.0);
        self.edge_count -= 1;
        Self::unlink(&mut self.vertex_mut(edge.src).outgoing, id);
        Self::unlink(&mut self.vertex_mut(edge.dst).incoming, id);
        edge
    }

    fn unlink(list: &mut Vec<EdgeId>, id: EdgeId) {
        match list.iter().position(|&e| e == id) {
            Some(index) => {
                list.remove(index);
            }
            None => debug_assert!(false, "edge {} missing from incidence list", id.0),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.vertices.clear();
        self.free_vertices.clear();
        self.edges.clear();
        self.free_edges.clear();
        self.vertex_count = 0;
        self.edge_count = 0;
        self.root = None;
    }

    /// Verifies the structural invariants:
    /// incidence lists and edge endpoints agree both ways, the root has no
    /// incoming edge, and every vertex is reachable from the root.
    pub fn check_consistency(&self) -> Result<(), PlannerError> {
        for edge_id in self.edge_ids() {
            let edge = self.edge(edge_id);
            let src = self
                .get_vertex(edge.src)
                .ok_or_else(|| PlannerError::Inconsistent(format!("edge {} has a stale source", edge_id.0)))?;
            let dst = self
                .get_vertex(edge.dst)
                .ok_or_else(|| PlannerError::Inconsistent(format!("edge {} has a stale destination", edge_id.0)))?;
            if !src.outgoing.contains(&edge_id) {
                return Err(PlannerError::Inconsistent(format!(
                    "edge {} missing from source outgoing list",
                    edge_id.0
                )));
            }
            if !dst.incoming.contains(&edge_id) {
                return Err(PlannerError::Inconsistent(format!(
                    "edge {} missing from destination incoming list",
                    edge_id.0
                )));
            }
        }

        for vertex_id in self.vertex_ids() {
            let vertex = self.vertex(vertex_id);
            for &edge_id in vertex.incoming.iter() {
                let edge = self.get_edge(edge_id).ok_or_else(|| {
                    PlannerError::Inconsistent(format!("vertex {} lists a stale incoming edge", vertex_id.0))
                })?;
                if edge.dst != vertex_id {
                    return Err(PlannerError::Inconsistent(format!(
                        "incoming edge {} does not end at vertex {}",
                        edge_id.0, vertex_id.0
                    )));
                }
            }
            for &edge_id in vertex.outgoing.iter() {
                let edge = self.get_edge(edge_id).ok_or_else(|| {
                    PlannerError::Inconsistent(format!("vertex {} lists a stale outgoing edge", vertex_id.0))
                })?;
                if edge.src != vertex_id {
                    return Err(PlannerError::Inconsistent(format!(
                        "outgoing edge {} does not start at vertex {}",
                        edge_id.0, vertex_id.0
                    )));
                }
            }
        }

        if let Some(root) = self.root {
            if !self.vertex(root).incoming.is_empty() {
                return Err(PlannerError::Inconsistent(
                    "root vertex has an incoming edge".to_string(),
                ));
            }
            let mut visited = vec![false; self.vertices.len()];
            let mut stack = vec![root];
            let mut reached = 0usize;
            while let Some(current) = stack.pop() {
                if visited[current.0] {
                    continue;
                }
                visited[current.0] = true;
                reached += 1;
                for &edge_id in self.vertex(current).outgoing.iter() {
                    stack.push(self.edge(edge_id).dst);
                }
            }
            if reached != self.vertex_count {
                return Err(PlannerError::Inconsistent(format!(
                    "{} of {} vertices unreachable from the root",
                    self.vertex_count - reached,
                    self.vertex_count
                )));
            }
        }

        Ok(())
    }
}
