//! Labeled transition system (component D): a directed multigraph with a
//! bundled property on states and transitions, indexed by state identity, and
//! tracking anonymous (identity-less) states separately from regular ones.

pub mod builder;
pub mod condenser;
pub mod event_log_ts;
pub mod rebuilder;
pub mod sas;
pub mod sloops;

use crate::attr::AttributeValue;
use crate::error::{Error, Result};
use crate::state_id::StateIdHandle;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashSet};

pub use petgraph::stable_graph::{EdgeIndex, NodeIndex};

/// Vertex property bundle: a state's identity (absent for anonymous states)
/// plus an optional user payload.
#[derive(Debug, Clone)]
pub struct StateBundle<D> {
    pub id: Option<StateIdHandle>,
    pub data: Option<D>,
}

impl<D> Default for StateBundle<D> {
    fn default() -> Self {
        StateBundle {
            id: None,
            data: None,
        }
    }
}

/// Edge property bundle: the label the transition fires on (absent for
/// anonymous transitions created by self-loop lifting and the like) plus an
/// optional user payload.
#[derive(Debug, Clone, Default)]
pub struct TransBundle<T> {
    pub label: Option<AttributeValue>,
    pub data: Option<T>,
}

type Graph<D, T> = StableDiGraph<StateBundle<D>, TransBundle<T>>;

/// A labeled transition system. `D` is the per-state user payload type, `T`
/// the per-transition one; both default to `()` for callers with no need for
/// extra data.
#[derive(Debug)]
pub struct LabeledTs<D = (), T = ()> {
    graph: Graph<D, T>,
    id_index: BTreeMap<StateIdHandle, NodeIndex>,
    anon_states: HashSet<NodeIndex>,
    initial: NodeIndex,
}

impl<D, T> LabeledTs<D, T> {
    /// Creates a new transition system whose sole state is the initial one,
    /// bound to the pool's initial identifier.
    pub fn new(initial_id: StateIdHandle) -> Self {
        let mut graph = Graph::default();
        let initial = graph.add_node(StateBundle {
            id: Some(initial_id.clone()),
            data: None,
        });
        let mut id_index = BTreeMap::new();
        id_index.insert(initial_id, initial);
        LabeledTs {
            graph,
            id_index,
            anon_states: HashSet::new(),
            initial,
        }
    }

    pub fn initial_state(&self) -> NodeIndex {
        self.initial
    }

    pub fn state_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn transition_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn state_bundle(&self, state: NodeIndex) -> Option<&StateBundle<D>> {
        self.graph.node_weight(state)
    }

    pub fn state_bundle_mut(&mut self, state: NodeIndex) -> Option<&mut StateBundle<D>> {
        self.graph.node_weight_mut(state)
    }

    pub fn trans_bundle(&self, trans: EdgeIndex) -> Option<&TransBundle<T>> {
        self.graph.edge_weight(trans)
    }

    pub fn trans_bundle_mut(&mut self, trans: EdgeIndex) -> Option<&mut TransBundle<T>> {
        self.graph.edge_weight_mut(trans)
    }

    pub fn source(&self, trans: EdgeIndex) -> Option<NodeIndex> {
        self.graph.edge_endpoints(trans).map(|(s, _)| s)
    }

    pub fn target(&self, trans: EdgeIndex) -> Option<NodeIndex> {
        self.graph.edge_endpoints(trans).map(|(_, t)| t)
    }

    pub fn is_anon(&self, state: NodeIndex) -> bool {
        self.anon_states.contains(&state)
    }

    pub fn is_regular(&self, state: NodeIndex) -> bool {
        !self.is_anon(state)
    }

    /// Returns the existing state bound to `id`, creating a fresh regular
    /// state for it if none exists yet.
    pub fn get_or_add_state(&mut self, id: StateIdHandle) -> NodeIndex {
        if let Some(&existing) = self.id_index.get(&id) {
            return existing;
        }
        let node = self.graph.add_node(StateBundle {
            id: Some(id.clone()),
            data: None,
        });
        self.id_index.insert(id, node);
        node
    }

    pub fn get_state(&self, id: &StateIdHandle) -> Option<NodeIndex> {
        self.id_index.get(id).copied()
    }

    /// Unconditionally creates a fresh state with no identity.
    pub fn add_anon_state(&mut self) -> NodeIndex {
        let node = self.graph.add_node(StateBundle::default());
        self.anon_states.insert(node);
        node
    }

    /// Returns the transition `(src, tgt, label)` if one already exists,
    /// otherwise creates it. Parallel transitions between the same pair of
    /// states are permitted iff their labels differ, so this is the sole
    /// mutator that must be used to add labeled transitions.
    pub fn get_or_add_trans(
        &mut self,
        src: NodeIndex,
        tgt: NodeIndex,
        label: AttributeValue,
    ) -> EdgeIndex {
        if let Some(existing) = self.get_trans(src, tgt, &label) {
            return existing;
        }
        self.graph.add_edge(
            src,
            tgt,
            TransBundle {
                label: Some(label),
                data: None,
            },
        )
    }

    /// Unconditionally creates a new, unlabeled transition.
    pub fn add_anon_trans(&mut self, src: NodeIndex, tgt: NodeIndex) -> EdgeIndex {
        self.graph.add_edge(
            src,
            tgt,
            TransBundle {
                label: None,
                data: None,
            },
        )
    }

    /// Scans `src`'s outgoing transitions for one targeting `tgt` with label
    /// `label`; ties break on out-edge iteration order, the first match wins.
    pub fn get_trans(
        &self,
        src: NodeIndex,
        tgt: NodeIndex,
        label: &AttributeValue,
    ) -> Option<EdgeIndex> {
        self.graph
            .edges_directed(src, Direction::Outgoing)
            .find(|e| e.target() == tgt && e.weight().label.as_ref() == Some(label))
            .map(|e| e.id())
    }

    /// Scans `src`'s outgoing transitions for the first one labeled `label`,
    /// regardless of target.
    pub fn get_first_out_trans(&self, src: NodeIndex, label: &AttributeValue) -> Option<EdgeIndex> {
        self.graph
            .edges_directed(src, Direction::Outgoing)
            .find(|e| e.weight().label.as_ref() == Some(label))
            .map(|e| e.id())
    }

    pub fn out_transitions(&self, src: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph
            .edges_directed(src, Direction::Outgoing)
            .map(|e| e.id())
    }

    pub fn in_transitions(&self, tgt: NodeIndex) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph
            .edges_directed(tgt, Direction::Incoming)
            .map(|e| e.id())
    }

    pub fn states(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn transitions(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    /// Clears every transition incident to `state`, in either direction.
    fn clear_transitions(&mut self, state: NodeIndex) {
        let incident: Vec<EdgeIndex> = self
            .graph
            .edges_directed(state, Direction::Outgoing)
            .map(|e| e.id())
            .chain(
                self.graph
                    .edges_directed(state, Direction::Incoming)
                    .map(|e| e.id()),
            )
            .collect();
        for e in incident {
            self.graph.remove_edge(e);
        }
    }

    /// Removes `state`. All incident transitions are cleared first, the
    /// id-index or anon-set entry is dropped, and finally the vertex itself
    /// is removed.
    pub fn remove_state(&mut self, state: NodeIndex) -> Result<()> {
        if self.graph.node_weight(state).is_none() {
            return Err(Error::InvalidArgument(format!(
                "state {:?} does not exist",
                state
            )));
        }
        self.clear_transitions(state);
        if self.anon_states.remove(&state) {
            // anonymous: nothing else to clean up
        } else if let Some(bundle) = self.graph.node_weight(state) {
            if let Some(id) = bundle.id.clone() {
                self.id_index.remove(&id);
            }
        }
        self.graph.remove_node(state);
        Ok(())
    }

    pub fn remove_trans(&mut self, trans: EdgeIndex) -> Result<()> {
        if self.graph.remove_edge(trans).is_none() {
            return Err(Error::InvalidArgument(format!(
                "transition {:?} does not exist",
                trans
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_id::StateIdPool;

    fn fresh_ts() -> LabeledTs<(), ()> {
        let mut pool = StateIdPool::new();
        LabeledTs::new(pool.initial())
    }

    #[test]
    fn get_or_add_state_deduplicates_by_identity() {
        let mut pool = StateIdPool::new();
        let mut ts: LabeledTs<(), ()> = LabeledTs::new(pool.initial());
        let id_a = pool.intern(crate::state_id::StateId::from_values(vec![
            AttributeValue::from("A"),
        ]));
        let s1 = ts.get_or_add_state(id_a.clone());
        let s2 = ts.get_or_add_state(id_a);
        assert_eq!(s1, s2);
        assert_eq!(ts.state_count(), 2);
    }

    #[test]
    fn parallel_transitions_require_distinct_labels() {
        let mut ts = fresh_ts();
        let a = ts.add_anon_state();
        let b = ts.add_anon_state();
        let e1 = ts.get_or_add_trans(a, b, AttributeValue::from("X"));
        let e2 = ts.get_or_add_trans(a, b, AttributeValue::from("X"));
        let e3 = ts.get_or_add_trans(a, b, AttributeValue::from("Y"));
        assert_eq!(e1, e2);
        assert_ne!(e1, e3);
        assert_eq!(ts.transition_count(), 2);
    }

    #[test]
    fn remove_state_clears_incident_transitions_first() {
        let mut ts = fresh_ts();
        let a = ts.add_anon_state();
        let b = ts.add_anon_state();
        let t = ts.get_or_add_trans(a, b, AttributeValue::from("X"));
        ts.remove_state(a).unwrap();
        assert!(ts.trans_bundle(t).is_none());
        assert_eq!(ts.transition_count(), 0);
    }

    #[test]
    fn remove_unknown_state_is_invalid_argument() {
        let mut ts = fresh_ts();
        let a = ts.add_anon_state();
        ts.remove_state(a).unwrap();
        assert!(matches!(ts.remove_state(a), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn anon_states_are_never_in_id_index() {
        let mut ts = fresh_ts();
        let a = ts.add_anon_state();
        assert!(ts.is_anon(a));
        assert!(ts.is_regular(ts.initial_state()));
    }

    #[test]
    fn get_first_out_trans_matches_on_label_only() {
        let mut ts = fresh_ts();
        let a = ts.add_anon_state();
        let b = ts.add_anon_state();
        let c = ts.add_anon_state();
        ts.get_or_add_trans(a, b, AttributeValue::from("X"));
        let found = ts.get_first_out_trans(a, &AttributeValue::from("X"));
        assert!(found.is_some());
        assert!(ts.get_first_out_trans(a, &AttributeValue::from("Z")).is_none());
        let _ = c;
    }
}
