//! DAG view of a frozen circuit.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex as PetNodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use crate::catalog::CanonicalGate;
use crate::circuit::FrozenCircuit;
use crate::register::{BitRef, RegisterId};

/// Node index type for the circuit DAG.
pub type NodeIndex = PetNodeIndex<u32>;

/// A node in the circuit DAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DagNode {
    /// Input node for a wire.
    In(BitRef),
    /// Output node for a wire.
    Out(BitRef),
    /// Operation node.
    Op {
        /// Position of the operation in the circuit.
        index: usize,
        /// Barriers order the wires they touch but do not add depth.
        barrier: bool,
    },
}

impl DagNode {
    /// Check if this is an operation node.
    #[inline]
    pub fn is_op(&self) -> bool {
        matches!(self, DagNode::Op { .. })
    }

    /// Operation position, if this is an operation node.
    #[inline]
    pub fn op_index(&self) -> Option<usize> {
        match self {
            DagNode::Op { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// An edge in the circuit DAG: one wire segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DagEdge {
    /// The wire this edge represents.
    pub wire: BitRef,
}

/// Dependency DAG where nodes are operations and edges are wires, with
/// one input and one output node per qubit and classical bit.
///
/// Nodes are added inputs first, then operations in program order, then
/// outputs, so node index order is a topological order.
#[derive(Debug)]
pub struct CircuitDag {
    graph: DiGraph<DagNode, DagEdge, u32>,
    inputs: FxHashMap<BitRef, NodeIndex>,
    num_ops: usize,
}

impl CircuitDag {
    /// Build the DAG of a frozen circuit.
    pub fn from_circuit(circuit: &FrozenCircuit) -> Self {
        let mut graph = DiGraph::default();
        let mut inputs = FxHashMap::default();
        // Wire front: the last node on each wire so far.
        let mut wire_front: FxHashMap<BitRef, NodeIndex> = FxHashMap::default();
        let mut wires = Vec::new();

        for (id, register) in circuit.registers().iter().enumerate() {
            for i in 0..register.size {
                let wire = BitRef::new(RegisterId::from(id), i);
                let node = graph.add_node(DagNode::In(wire));
                inputs.insert(wire, node);
                wire_front.insert(wire, node);
                wires.push(wire);
            }
        }

        for (index, op) in circuit.operations().iter().enumerate() {
            let barrier = circuit.canonical(op) == CanonicalGate::Barrier;
            let node = graph.add_node(DagNode::Op { index, barrier });
            for &wire in op.operands() {
                if let Some(prev) = wire_front.insert(wire, node) {
                    graph.add_edge(prev, node, DagEdge { wire });
                }
            }
        }

        for wire in wires {
            let out = graph.add_node(DagNode::Out(wire));
            if let Some(&prev) = wire_front.get(&wire) {
                graph.add_edge(prev, out, DagEdge { wire });
            }
        }

        Self {
            graph,
            inputs,
            num_ops: circuit.operations().len(),
        }
    }

    /// Number of operation nodes.
    #[inline]
    pub fn num_ops(&self) -> usize {
        self.num_ops
    }

    /// Number of wires (qubits plus classical bits).
    pub fn num_wires(&self) -> usize {
        self.inputs.len()
    }

    /// Input node of a wire.
    pub fn input_node(&self, wire: BitRef) -> Option<NodeIndex> {
        self.inputs.get(&wire).copied()
    }

    /// Layer of every node: longest weighted path from any input.
    fn node_depths(&self) -> Vec<usize> {
        let mut depths = vec![0usize; self.graph.node_count()];
        for node in self.graph.node_indices() {
            let max_pred_depth = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|e| depths[e.source().index()])
                .max()
                .unwrap_or(0);

            depths[node.index()] = match self.graph[node] {
                DagNode::Op { barrier: false, .. } => max_pred_depth + 1,
                _ => max_pred_depth,
            };
        }
        depths
    }

    /// Circuit depth: the length of the longest path counted in
    /// non-barrier operations.
    pub fn depth(&self) -> usize {
        self.node_depths().into_iter().max().unwrap_or(0)
    }

    /// Operation positions grouped by ASAP layer.
    ///
    /// Barriers occupy no layer and are not listed.
    pub fn layers(&self) -> Vec<Vec<usize>> {
        let depths = self.node_depths();
        let mut layers: Vec<Vec<usize>> = Vec::new();
        for node in self.graph.node_indices() {
            if let DagNode::Op {
                index,
                barrier: false,
            } = self.graph[node]
            {
                let layer = depths[node.index()] - 1;
                if layers.len() <= layer {
                    layers.resize_with(layer + 1, Vec::new);
                }
                layers[layer].push(index);
            }
        }
        layers
    }

    /// Get the underlying graph.
    pub fn graph(&self) -> &DiGraph<DagNode, DagEdge, u32> {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;

    #[test]
    fn test_empty_dag() {
        let frozen = Circuit::standard("empty").freeze().unwrap();
        let dag = CircuitDag::from_circuit(&frozen);
        assert_eq!(dag.num_ops(), 0);
        assert_eq!(dag.num_wires(), 0);
        assert_eq!(dag.depth(), 0);
        assert!(dag.layers().is_empty());
    }

    #[test]
    fn test_bell_state_depth() {
        let mut circuit = Circuit::with_size("bell", 2, 2).unwrap();
        let q = circuit.register_by_name("q").unwrap();
        let c = circuit.register_by_name("c").unwrap();
        circuit
            .h(q.bit(0))
            .unwrap()
            .cx(q.bit(0), q.bit(1))
            .unwrap()
            .measure(q.bit(0), c.bit(0))
            .unwrap()
            .measure(q.bit(1), c.bit(1))
            .unwrap();
        let frozen = circuit.freeze().unwrap();
        let dag = frozen.dag();

        assert_eq!(dag.num_wires(), 4);
        assert_eq!(dag.depth(), 3); // H, CX, parallel measures
        assert_eq!(dag.layers(), vec![vec![0], vec![1], vec![2, 3]]);
    }

    #[test]
    fn test_parallel_gates_depth() {
        let mut circuit = Circuit::with_size("parallel", 3, 0).unwrap();
        let q = circuit.register_by_name("q").unwrap();
        for i in 0..3 {
            circuit.h(q.bit(i)).unwrap();
        }
        let frozen = circuit.freeze().unwrap();
        assert_eq!(frozen.depth(), 1);
    }

    #[test]
    fn test_barrier_adds_no_depth_but_orders() {
        let mut circuit = Circuit::with_size("barrier", 2, 0).unwrap();
        let q = circuit.register_by_name("q").unwrap();
        circuit
            .h(q.bit(0))
            .unwrap()
            .h(q.bit(0))
            .unwrap()
            .barrier_all()
            .unwrap()
            .x(q.bit(1))
            .unwrap();
        let frozen = circuit.freeze().unwrap();

        // x on q[1] must wait for the barrier, which waits for both h gates.
        assert_eq!(frozen.depth(), 3);
        assert_eq!(frozen.dag().layers(), vec![vec![0], vec![1], vec![3]]);
    }

    #[test]
    fn test_classical_wires_create_dependencies() {
        let mut circuit = Circuit::with_size("meas", 2, 1).unwrap();
        let q = circuit.register_by_name("q").unwrap();
        let c = circuit.register_by_name("c").unwrap();
        circuit
            .measure(q.bit(0), c.bit(0))
            .unwrap()
            .measure(q.bit(1), c.bit(0))
            .unwrap();
        let frozen = circuit.freeze().unwrap();
        assert_eq!(frozen.depth(), 2);
    }
}
