//! Petri-net model (component L): a bipartite directed graph of positions and
//! transitions, with typed, weighted arcs and a marking.

pub mod synthesis;

use crate::error::{Error, Result};
use petgraph::stable_graph::StableDiGraph;
use petgraph::Direction;

pub use petgraph::stable_graph::{EdgeIndex, NodeIndex};

/// The two disjoint kinds of Petri-net vertex. Encoded as a 1-bit tag in the
/// original source layout; here a plain enum, with `misc` kept alongside for
/// callers that want the spare bits without resurrecting the bit-packed
/// struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    Position,
    Transition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcType {
    Regular,
    Inhibitor,
}

#[derive(Debug, Clone)]
pub struct VertexBundle<D> {
    pub kind: VertexKind,
    pub misc: u8,
    pub data: Option<D>,
}

#[derive(Debug, Clone)]
pub struct ArcBundle<A> {
    pub arc_type: ArcType,
    pub weight: u32,
    pub misc: u8,
    pub data: Option<A>,
}

type Graph<D, A> = StableDiGraph<VertexBundle<D>, ArcBundle<A>>;

/// A Petri net: positions and transitions as two kinds of vertex, arcs
/// required to connect opposite kinds, and a marking over positions.
#[derive(Debug, Default)]
pub struct PetriNet<D = (), A = ()> {
    graph: Graph<D, A>,
    marking: std::collections::HashMap<NodeIndex, u64>,
}

impl<D, A> PetriNet<D, A> {
    pub fn new() -> Self {
        PetriNet {
            graph: Graph::default(),
            marking: std::collections::HashMap::new(),
        }
    }

    pub fn add_position(&mut self, data: Option<D>) -> NodeIndex {
        self.graph.add_node(VertexBundle {
            kind: VertexKind::Position,
            misc: 0,
            data,
        })
    }

    pub fn add_transition(&mut self, data: Option<D>) -> NodeIndex {
        self.graph.add_node(VertexBundle {
            kind: VertexKind::Transition,
            misc: 0,
            data,
        })
    }

    pub fn kind(&self, v: NodeIndex) -> Option<VertexKind> {
        self.graph.node_weight(v).map(|b| b.kind)
    }

    pub fn is_position(&self, v: NodeIndex) -> bool {
        self.kind(v) == Some(VertexKind::Position)
    }

    pub fn is_transition(&self, v: NodeIndex) -> bool {
        self.kind(v) == Some(VertexKind::Transition)
    }

    /// Adds an arc from `src` to `tgt`. Fails with `InvalidArgument` unless
    /// `src` and `tgt` are of opposite kinds (the bipartite invariant) or the
    /// weight is zero.
    pub fn add_arc(
        &mut self,
        src: NodeIndex,
        tgt: NodeIndex,
        arc_type: ArcType,
        weight: u32,
        data: Option<A>,
    ) -> Result<EdgeIndex> {
        if weight == 0 {
            return Err(Error::InvalidArgument("arc weight must be >= 1".into()));
        }
        let (sk, tk) = (self.kind(src), self.kind(tgt));
        match (sk, tk) {
            (Some(VertexKind::Position), Some(VertexKind::Transition))
            | (Some(VertexKind::Transition), Some(VertexKind::Position)) => {}
            _ => {
                return Err(Error::InvalidArgument(
                    "arcs must connect a position and a transition".into(),
                ))
            }
        }
        if arc_type == ArcType::Inhibitor && sk != Some(VertexKind::Position) {
            return Err(Error::InvalidArgument(
                "inhibitor arcs must run from a position to a transition".into(),
            ));
        }
        Ok(self.graph.add_edge(
            src,
            tgt,
            ArcBundle {
                arc_type,
                weight,
                misc: 0,
                data,
            },
        ))
    }

    pub fn marking(&self, p: NodeIndex) -> u64 {
        self.marking.get(&p).copied().unwrap_or(0)
    }

    pub fn set_marking(&mut self, p: NodeIndex, tokens: u64) {
        self.marking.insert(p, tokens);
    }

    pub fn positions(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(move |&n| self.is_position(n))
    }

    pub fn transitions(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(move |&n| self.is_transition(n))
    }

    pub fn arcs(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn arc_bundle(&self, a: EdgeIndex) -> Option<&ArcBundle<A>> {
        self.graph.edge_weight(a)
    }

    pub fn arc_endpoints(&self, a: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(a)
    }

    pub fn preset(&self, v: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .neighbors_directed(v, Direction::Incoming)
    }

    pub fn postset(&self, v: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .neighbors_directed(v, Direction::Outgoing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bipartite_invariant_enforced() {
        let mut net: PetriNet<(), ()> = PetriNet::new();
        let p1 = net.add_position(None);
        let p2 = net.add_position(None);
        assert!(matches!(
            net.add_arc(p1, p2, ArcType::Regular, 1, None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn zero_weight_rejected() {
        let mut net: PetriNet<(), ()> = PetriNet::new();
        let p = net.add_position(None);
        let t = net.add_transition(None);
        assert!(matches!(
            net.add_arc(p, t, ArcType::Regular, 0, None),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn inhibitor_arc_requires_position_source() {
        let mut net: PetriNet<(), ()> = PetriNet::new();
        let p = net.add_position(None);
        let t = net.add_transition(None);
        assert!(net.add_arc(t, p, ArcType::Inhibitor, 1, None).is_err());
        assert!(net.add_arc(p, t, ArcType::Inhibitor, 1, None).is_ok());
    }

    #[test]
    fn marking_defaults_to_zero() {
        let mut net: PetriNet<(), ()> = PetriNet::new();
        let p = net.add_position(None);
        assert_eq!(net.marking(p), 0);
        net.set_marking(p, 3);
        assert_eq!(net.marking(p), 3);
    }
}
