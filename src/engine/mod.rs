//! The synchronous command handler that keeps the graph and its node state
//! consistent under edits.
//!
//! Every operation takes a snapshot by reference and hands back a new one.
//! Rejected operations return a [`GraphError`] and leave the input snapshot
//! as it was, so callers can keep the previous value for undo or retry.

use crate::error::GraphError;
use crate::graph::Position;
use crate::ids::{DEFAULT_MAX_ID_ATTEMPTS, IdGenerator};
use crate::state::StrategyState;
use serde::{Deserialize, Serialize};
use tracing::debug;

mod command;
mod editing;
mod mutation;

pub use command::*;

/// Spacing used when the engine places new nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Distance between consecutive nodes of the condition chain.
    pub vertical_gap: f64,
    /// Horizontal distance from a condition to the first action node.
    pub action_offset_x: f64,
    /// Distance between stacked action nodes.
    pub action_gap: f64,
    pub start_position: Position,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            vertical_gap: 150.0,
            action_offset_x: 400.0,
            action_gap: 150.0,
            start_position: Position::new(0.0, 0.0),
        }
    }
}

/// Outcome of applying a [`Command`].
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: StrategyState,
    /// Id of the entity the command created, if any.
    pub created: Option<String>,
    /// Set when the command was rejected and `state` is the prior snapshot.
    pub rejection: Option<GraphError>,
}

impl Transition {
    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

pub struct GraphEngine {
    layout: Layout,
    ids: IdGenerator,
    max_id_attempts: u32,
}

pub struct GraphEngineBuilder {
    layout: Layout,
    seed: Option<u64>,
    max_id_attempts: u32,
}

impl Default for GraphEngineBuilder {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            seed: None,
            max_id_attempts: DEFAULT_MAX_ID_ATTEMPTS,
        }
    }
}

impl GraphEngineBuilder {
    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Makes generated ids reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn max_id_attempts(mut self, attempts: u32) -> Self {
        self.max_id_attempts = attempts.max(1);
        self
    }

    pub fn build(self) -> GraphEngine {
        GraphEngine {
            layout: self.layout,
            ids: self.seed.map(IdGenerator::seeded).unwrap_or_default(),
            max_id_attempts: self.max_id_attempts,
        }
    }
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GraphEngine {
    pub fn builder() -> GraphEngineBuilder {
        GraphEngineBuilder::default()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// A fresh snapshot holding only the START node.
    pub fn new_state(&self, name: &str) -> StrategyState {
        StrategyState::new(name, self.layout.start_position)
    }

    /// Applies one command. Never fails: a rejected command yields the prior
    /// snapshot together with the reason.
    pub fn apply(&mut self, state: &StrategyState, command: Command) -> Transition {
        let label = command.label();
        match self.dispatch(state, command) {
            Ok((next, created)) => Transition {
                state: next,
                created,
                rejection: None,
            },
            Err(err) => {
                debug!(command = label, error = %err, "command rejected");
                Transition {
                    state: state.clone(),
                    created: None,
                    rejection: Some(err),
                }
            }
        }
    }

    fn dispatch(
        &mut self,
        state: &StrategyState,
        command: Command,
    ) -> Result<(StrategyState, Option<String>), GraphError> {
        let created = |(state, id): (StrategyState, String)| (state, Some(id));
        let plain = |state: StrategyState| (state, None);

        match command {
            Command::InsertCondition { after } => {
                self.insert_condition_node(state, after.as_deref())
            }
            Command::InsertAction { via } => {
                self.insert_action_node(state, via.as_deref()).map(created)
            }
            Command::Connect { condition, action } => self
                .connect_condition_to_action(state, &condition, &action)
                .map(plain),
            Command::Disconnect { edge } => self.disconnect(state, &edge).map(plain),
            Command::DeleteNodes { ids } => self.delete_nodes(state, &ids).map(plain),
            Command::SwapConditions { a, b } => {
                self.swap_condition_nodes(state, &a, &b).map(plain)
            }
            Command::MoveNode { id, position } => self.move_node(state, &id, position).map(plain),
            Command::AddBlock {
                condition,
                relation,
            } => self.add_block(state, &condition, relation).map(created),
            Command::RemoveBlock { condition, block } => {
                self.remove_block(state, &condition, &block).map(plain)
            }
            Command::SetBlockRelation {
                condition,
                index,
                relation,
            } => self
                .set_block_relation(state, &condition, index, relation)
                .map(plain),
            Command::AddSubSection { condition, block } => self
                .add_sub_section(state, &condition, &block)
                .map(created),
            Command::UpdateSubSection {
                condition,
                block,
                sub_section,
            } => self
                .update_sub_section(state, &condition, &block, sub_section)
                .map(plain),
            Command::RemoveSubSection {
                condition,
                block,
                sub_section,
            } => self
                .remove_sub_section(state, &condition, &block, &sub_section)
                .map(plain),
            Command::UpdateConditionMeta { condition, meta } => self
                .update_condition_meta(state, &condition, meta)
                .map(plain),
            Command::AddItem { action, body } => {
                self.add_item(state, &action, body).map(created)
            }
            Command::UpdateItem { action, item, body } => {
                self.update_item(state, &action, &item, body).map(plain)
            }
            Command::RemoveItem { action, item } => {
                self.remove_item(state, &action, &item).map(plain)
            }
            Command::MoveItem { action, item, to } => {
                self.move_item(state, &action, &item, to).map(plain)
            }
        }
    }

    /// A node id not used anywhere in `state`.
    fn node_id(&mut self, state: &StrategyState, prefix: &str) -> Result<String, GraphError> {
        self.ids
            .unique(prefix, self.max_id_attempts, |candidate| state.id_in_use(candidate))
    }

    /// A block or sub-section id not used by any condition in `state`.
    fn condition_part_id(
        &mut self,
        state: &StrategyState,
        prefix: &str,
    ) -> Result<String, GraphError> {
        self.ids.unique(prefix, self.max_id_attempts, |candidate| {
            state.condition_part_in_use(candidate)
        })
    }

    /// An item id not used by any action node in `state`.
    fn item_id(&mut self, state: &StrategyState) -> Result<String, GraphError> {
        self.ids
            .unique("item", self.max_id_attempts, |candidate| state.item_in_use(candidate))
    }
}
