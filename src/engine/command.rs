use crate::action::ItemBody;
use crate::condition::{ConditionMeta, Relation, SubSection};
use crate::graph::Position;

/// Discrete user edits accepted by [`GraphEngine::apply`](super::GraphEngine::apply).
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    InsertCondition {
        after: Option<String>,
    },
    InsertAction {
        via: Option<String>,
    },
    Connect {
        condition: String,
        action: String,
    },
    Disconnect {
        edge: String,
    },
    DeleteNodes {
        ids: Vec<String>,
    },
    SwapConditions {
        a: String,
        b: String,
    },
    MoveNode {
        id: String,
        position: Position,
    },
    AddBlock {
        condition: String,
        relation: Relation,
    },
    RemoveBlock {
        condition: String,
        block: String,
    },
    SetBlockRelation {
        condition: String,
        index: usize,
        relation: Relation,
    },
    AddSubSection {
        condition: String,
        block: String,
    },
    UpdateSubSection {
        condition: String,
        block: String,
        sub_section: SubSection,
    },
    RemoveSubSection {
        condition: String,
        block: String,
        sub_section: String,
    },
    UpdateConditionMeta {
        condition: String,
        meta: ConditionMeta,
    },
    AddItem {
        action: String,
        body: ItemBody,
    },
    UpdateItem {
        action: String,
        item: String,
        body: ItemBody,
    },
    RemoveItem {
        action: String,
        item: String,
    },
    MoveItem {
        action: String,
        item: String,
        to: usize,
    },
}

impl Command {
    pub fn label(&self) -> &'static str {
        match self {
            Command::InsertCondition { .. } => "insert_condition",
            Command::InsertAction { .. } => "insert_action",
            Command::Connect { .. } => "connect",
            Command::Disconnect { .. } => "disconnect",
            Command::DeleteNodes { .. } => "delete_nodes",
            Command::SwapConditions { .. } => "swap_conditions",
            Command::MoveNode { .. } => "move_node",
            Command::AddBlock { .. } => "add_block",
            Command::RemoveBlock { .. } => "remove_block",
            Command::SetBlockRelation { .. } => "set_block_relation",
            Command::AddSubSection { .. } => "add_sub_section",
            Command::UpdateSubSection { .. } => "update_sub_section",
            Command::RemoveSubSection { .. } => "remove_sub_section",
            Command::UpdateConditionMeta { .. } => "update_condition_meta",
            Command::AddItem { .. } => "add_item",
            Command::UpdateItem { .. } => "update_item",
            Command::RemoveItem { .. } => "remove_item",
            Command::MoveItem { .. } => "move_item",
        }
    }
}
