use super::GraphEngine;
use crate::action::ActionNode;
use crate::condition::{Block, ConditionNode, SubSection};
use crate::error::GraphError;
use crate::graph::{Edge, Node, NodeKind, Position, START_ID};
use crate::state::StrategyState;
use ahash::AHashSet;
use tracing::debug;

impl GraphEngine {
    /// Appends a condition node below the tail of the vertical chain and links
    /// it with one condition edge.
    ///
    /// When `after` is given it must name the current chain tail; any other
    /// value leaves the snapshot unchanged.
    pub fn insert_condition_node(
        &mut self,
        state: &StrategyState,
        after: Option<&str>,
    ) -> Result<(StrategyState, Option<String>), GraphError> {
        let tail = state
            .graph
            .chain_tail()
            .ok_or_else(|| GraphError::NodeNotFound(START_ID.to_string()))?;
        if let Some(after) = after {
            if after != tail.id {
                debug!(after, tail = %tail.id, "insert target is not the chain tail, ignoring");
                return Ok((state.clone(), None));
            }
        }

        let id = self.node_id(state, "condition")?;
        let position = tail.position.offset(0.0, self.layout.vertical_gap);
        let edge = Edge::condition(&tail.id, &id);
        let name = format!(
            "Condition {}",
            state.graph.nodes_of(NodeKind::Condition).count() + 1
        );
        let block_id = self.condition_part_id(state, "block")?;
        let sub = SubSection::empty(self.condition_part_id(state, "sub")?);
        let block = Block::new(block_id, sub);

        let mut next = state.clone();
        next.graph
            .nodes
            .push(Node::new(id.clone(), NodeKind::Condition, position));
        next.graph.edges.push(edge);
        next.conditions
            .insert(id.clone(), ConditionNode::new(name, block));
        Ok((next, Some(id)))
    }

    /// Stacks a new action node below the existing ones. The first action node
    /// is placed to the right of `via` (or the first condition). No edge is
    /// created.
    pub fn insert_action_node(
        &mut self,
        state: &StrategyState,
        via: Option<&str>,
    ) -> Result<(StrategyState, String), GraphError> {
        let graph = &state.graph;
        let lowest_action = graph
            .nodes_of(NodeKind::Action)
            .max_by(|a, b| a.position.y.total_cmp(&b.position.y));

        let position = match lowest_action {
            Some(action) => action.position.offset(0.0, self.layout.action_gap),
            None => {
                let anchor = via
                    .and_then(|id| graph.node(id))
                    .filter(|n| n.is_condition())
                    .or_else(|| {
                        graph
                            .condition_chain()
                            .first()
                            .and_then(|id| graph.node(id))
                    })
                    .or_else(|| graph.start())
                    .map(|n| n.position)
                    .unwrap_or(self.layout.start_position);
                anchor.offset(self.layout.action_offset_x, 0.0)
            }
        };

        let id = self.node_id(state, "action")?;
        let name = format!("Action {}", graph.nodes_of(NodeKind::Action).count() + 1);

        let mut next = state.clone();
        next.graph
            .nodes
            .push(Node::new(id.clone(), NodeKind::Action, position));
        next.actions.insert(id.clone(), ActionNode::new(name));
        Ok((next, id))
    }

    /// Links a condition's right handle to an action node and recomputes the
    /// condition's fan-out sequence.
    pub fn connect_condition_to_action(
        &mut self,
        state: &StrategyState,
        condition_id: &str,
        action_id: &str,
    ) -> Result<StrategyState, GraphError> {
        let graph = &state.graph;
        let invalid = |message: &str| GraphError::InvalidConnection {
            source_id: condition_id.to_string(),
            target_id: action_id.to_string(),
            message: message.to_string(),
        };

        let source = graph
            .node(condition_id)
            .ok_or_else(|| GraphError::NodeNotFound(condition_id.to_string()))?;
        let target = graph
            .node(action_id)
            .ok_or_else(|| GraphError::NodeNotFound(action_id.to_string()))?;
        if !source.is_condition() {
            return Err(invalid("source is not a condition node"));
        }
        if !target.is_action() {
            return Err(invalid("target is not an action node"));
        }
        if graph.has_action_edge(condition_id, action_id) {
            return Err(GraphError::DuplicateActionEdge {
                condition_id: condition_id.to_string(),
                action_id: action_id.to_string(),
            });
        }

        let mut next = state.clone();
        next.graph.edges.push(Edge::action(condition_id, action_id));
        next.graph.resequence(condition_id);
        Ok(next)
    }

    /// Removes one action edge and densely renumbers what is left of its
    /// source's fan-out. Unknown edge ids are a no-op.
    pub fn disconnect(
        &mut self,
        state: &StrategyState,
        edge_id: &str,
    ) -> Result<StrategyState, GraphError> {
        let Some(edge) = state.graph.edge(edge_id) else {
            debug!(edge = edge_id, "disconnect of unknown edge ignored");
            return Ok(state.clone());
        };
        if edge.is_condition_edge() {
            return Err(GraphError::ChainEdge(edge_id.to_string()));
        }

        let source = edge.source.clone();
        let mut next = state.clone();
        next.graph.edges.retain(|e| e.id != edge_id);
        next.graph.resequence(&source);
        Ok(next)
    }

    /// Deletes a batch of nodes, splicing the condition chain around removed
    /// conditions and renumbering the fan-out of conditions that lost an
    /// action target. Unknown ids are skipped; START cannot be deleted.
    pub fn delete_nodes(
        &mut self,
        state: &StrategyState,
        ids: &[String],
    ) -> Result<StrategyState, GraphError> {
        if ids
            .iter()
            .any(|id| state.graph.node(id).is_some_and(|n| n.kind == NodeKind::Start))
        {
            return Err(GraphError::CannotDeleteStart);
        }

        let mut next = state.clone();
        for id in ids {
            let Some(kind) = next.graph.node(id).map(|n| n.kind) else {
                debug!(node = %id, "delete of unknown node ignored");
                continue;
            };
            match kind {
                NodeKind::Action => {
                    next.actions.remove(id);
                    let sources = next.graph.sources_of(id);
                    remove_node(&mut next, id);
                    for source in sources {
                        next.graph.resequence(&source);
                    }
                }
                NodeKind::Condition => {
                    next.conditions.remove(id);
                    let predecessor = next
                        .graph
                        .incoming_condition_edge(id)
                        .map(|e| e.source.clone());
                    let successor = next
                        .graph
                        .outgoing_condition_edge(id)
                        .map(|e| e.target.clone());
                    remove_node(&mut next, id);
                    if let (Some(pred), Some(succ)) = (predecessor, successor) {
                        next.graph.edges.push(Edge::condition(&pred, &succ));
                    }
                }
                NodeKind::Start => continue,
            }
        }

        reconnect_start(&mut next);
        Ok(next)
    }

    /// Exchanges the positions of two adjacent condition nodes and repoints the
    /// vertical edges around them. Action edges keep their sources.
    pub fn swap_condition_nodes(
        &mut self,
        state: &StrategyState,
        a: &str,
        b: &str,
    ) -> Result<StrategyState, GraphError> {
        let graph = &state.graph;
        let node_a = graph
            .node(a)
            .ok_or_else(|| GraphError::NodeNotFound(a.to_string()))?;
        let node_b = graph
            .node(b)
            .ok_or_else(|| GraphError::NodeNotFound(b.to_string()))?;
        let adjacent = graph.edges.iter().any(|e| {
            e.is_vertical() && ((e.source == a && e.target == b) || (e.source == b && e.target == a))
        });
        if !node_a.is_condition() || !node_b.is_condition() || !adjacent {
            return Err(GraphError::NotAdjacent(a.to_string(), b.to_string()));
        }

        let (pos_a, pos_b) = (node_a.position, node_b.position);
        let swap = |id: &str| -> String {
            if id == a {
                b.to_string()
            } else if id == b {
                a.to_string()
            } else {
                id.to_string()
            }
        };

        let mut next = state.clone();
        for node in next.graph.nodes.iter_mut() {
            if node.id == a {
                node.position = pos_b;
            } else if node.id == b {
                node.position = pos_a;
            }
        }
        for edge in next.graph.edges.iter_mut() {
            if edge.is_vertical() && (edge.touches(a) || edge.touches(b)) {
                *edge = Edge::condition(&swap(&edge.source), &swap(&edge.target));
            }
        }
        Ok(next)
    }

    /// Moves a node. Moving an action node resequences every condition that
    /// fans out to it. Unknown ids are a no-op.
    pub fn move_node(
        &mut self,
        state: &StrategyState,
        id: &str,
        position: Position,
    ) -> Result<StrategyState, GraphError> {
        if !state.graph.contains(id) {
            debug!(node = id, "move of unknown node ignored");
            return Ok(state.clone());
        }

        let mut next = state.clone();
        let mut is_action = false;
        if let Some(node) = next.graph.node_mut(id) {
            node.position = position;
            is_action = node.is_action();
        }
        if is_action {
            for source in next.graph.sources_of(id) {
                next.graph.resequence(&source);
            }
        }
        Ok(next)
    }
}

fn remove_node(state: &mut StrategyState, id: &str) {
    state.graph.edges.retain(|e| !e.touches(id));
    state.graph.nodes.retain(|n| n.id != id);
}

/// Restores a START→chain link when START lost its successor but condition
/// nodes remain. The topmost condition without a predecessor is chosen.
fn reconnect_start(state: &mut StrategyState) {
    let graph = &state.graph;
    let Some(start) = graph.start() else {
        return;
    };
    if graph.outgoing_condition_edge(&start.id).is_some() {
        return;
    }

    let has_predecessor: AHashSet<&str> = graph
        .edges
        .iter()
        .filter(|e| e.is_condition_edge())
        .map(|e| e.target.as_str())
        .collect();
    let head = graph
        .nodes_of(NodeKind::Condition)
        .filter(|n| !has_predecessor.contains(n.id.as_str()))
        .min_by(|a, b| a.position.y.total_cmp(&b.position.y))
        .map(|n| n.id.clone());

    if let Some(head) = head {
        let start_id = start.id.clone();
        debug!(start = %start_id, head = %head, "reconnecting START to topmost condition");
        state.graph.edges.push(Edge::condition(&start_id, &head));
    }
}
