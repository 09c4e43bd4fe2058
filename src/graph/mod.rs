//! The structural skeleton of a strategy: nodes, edges and the queries the
//! mutation engine and compiler rely on.

use ahash::AHashSet;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

mod edge;
mod node;

pub use edge::*;
pub use node::*;

/// Id of the single START node in every graph.
pub const START_ID: &str = "start";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Default for StrategyGraph {
    fn default() -> Self {
        Self::new(Position::default())
    }
}

impl StrategyGraph {
    /// Creates a graph holding only the START node.
    pub fn new(start_position: Position) -> Self {
        Self {
            nodes: vec![Node::new(START_ID, NodeKind::Start, start_position)],
            edges: Vec::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn start(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.kind == NodeKind::Start)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn outgoing_condition_edge(&self, node_id: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.is_condition_edge() && e.source == node_id)
    }

    pub fn incoming_condition_edge(&self, node_id: &str) -> Option<&Edge> {
        self.edges
            .iter()
            .find(|e| e.is_condition_edge() && e.target == node_id)
    }

    pub fn has_action_edge(&self, condition_id: &str, action_id: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.is_action_edge() && e.source == condition_id && e.target == action_id)
    }

    /// Action edges leaving `condition_id`, in their current sequence order.
    pub fn action_edges_from(&self, condition_id: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.is_action_edge() && e.source == condition_id)
            .sorted_by_key(|e| e.sequence().unwrap_or(u32::MAX))
            .collect()
    }

    /// Ids of the action nodes a condition fans out to, in sequence order.
    pub fn action_targets(&self, condition_id: &str) -> Vec<String> {
        self.action_edges_from(condition_id)
            .into_iter()
            .map(|e| e.target.clone())
            .collect()
    }

    /// Walks the vertical chain from START and returns every node on it,
    /// START first. A malformed cycle ends the walk at the repeated node.
    pub fn chain(&self) -> Vec<&Node> {
        let mut chain = Vec::new();
        let mut visited = AHashSet::new();
        let mut cursor = self.start();
        while let Some(node) = cursor {
            if !visited.insert(node.id.as_str()) {
                break;
            }
            chain.push(node);
            cursor = self
                .outgoing_condition_edge(&node.id)
                .and_then(|e| self.node(&e.target));
        }
        chain
    }

    /// START-reachable condition ids in chain order.
    pub fn condition_chain(&self) -> Vec<String> {
        self.chain()
            .into_iter()
            .filter(|n| n.is_condition())
            .map(|n| n.id.clone())
            .collect()
    }

    /// The last node of the vertical chain, START when the chain is empty.
    pub fn chain_tail(&self) -> Option<&Node> {
        self.chain().last().copied()
    }

    /// Reassigns a dense `1..N` sequence to the action edges of `condition_id`,
    /// ranked by the target node's vertical position.
    ///
    /// Edges whose target no longer exists are left out of the ranking.
    pub fn resequence(&mut self, condition_id: &str) {
        let ranked: Vec<usize> = self
            .edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_action_edge() && e.source == condition_id)
            .filter_map(|(idx, e)| self.node(&e.target).map(|n| (idx, n.position.y, e.sequence())))
            .sorted_by(|a, b| {
                a.1.total_cmp(&b.1)
                    .then_with(|| a.2.unwrap_or(u32::MAX).cmp(&b.2.unwrap_or(u32::MAX)))
            })
            .map(|(idx, _, _)| idx)
            .collect();

        for (rank, idx) in ranked.into_iter().enumerate() {
            self.edges[idx].set_sequence(rank as u32 + 1);
        }
    }

    /// Distinct condition ids that fan out to `action_id`.
    pub fn sources_of(&self, action_id: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter(|e| e.is_action_edge() && e.target == action_id)
            .map(|e| e.source.clone())
            .unique()
            .collect()
    }
}
