use super::GraphEngine;
use crate::action::{ActionNode, ItemBody};
use crate::condition::{Block, ConditionMeta, ConditionNode, Relation, SubSection};
use crate::error::GraphError;
use crate::state::StrategyState;

fn condition_mut<'s>(
    state: &'s mut StrategyState,
    id: &str,
) -> Result<&'s mut ConditionNode, GraphError> {
    state
        .conditions
        .get_mut(id)
        .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
}

fn action_mut<'s>(state: &'s mut StrategyState, id: &str) -> Result<&'s mut ActionNode, GraphError> {
    state
        .actions
        .get_mut(id)
        .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
}

/// Clones `state`, runs `edit` on the clone and returns it only if the edit succeeded.
fn edited(
    state: &StrategyState,
    edit: impl FnOnce(&mut StrategyState) -> Result<(), GraphError>,
) -> Result<StrategyState, GraphError> {
    let mut next = state.clone();
    edit(&mut next)?;
    Ok(next)
}

impl GraphEngine {
    /// Appends a block holding one empty sub-section. Returns the block id.
    pub fn add_block(
        &mut self,
        state: &StrategyState,
        condition_id: &str,
        relation: Relation,
    ) -> Result<(StrategyState, String), GraphError> {
        let block_id = self.condition_part_id(state, "block")?;
        let sub = SubSection::empty(self.condition_part_id(state, "sub")?);
        let block = Block::new(block_id.clone(), sub);
        let next = edited(state, |s| {
            condition_mut(s, condition_id)?.add_block(block, relation);
            Ok(())
        })?;
        Ok((next, block_id))
    }

    pub fn remove_block(
        &mut self,
        state: &StrategyState,
        condition_id: &str,
        block_id: &str,
    ) -> Result<StrategyState, GraphError> {
        edited(state, |s| {
            condition_mut(s, condition_id)?.remove_block(condition_id, block_id)
        })
    }

    pub fn set_block_relation(
        &mut self,
        state: &StrategyState,
        condition_id: &str,
        index: usize,
        relation: Relation,
    ) -> Result<StrategyState, GraphError> {
        edited(state, |s| {
            condition_mut(s, condition_id)?.set_block_relation(condition_id, index, relation)
        })
    }

    /// Appends an empty sub-section to a block. Returns the sub-section id.
    pub fn add_sub_section(
        &mut self,
        state: &StrategyState,
        condition_id: &str,
        block_id: &str,
    ) -> Result<(StrategyState, String), GraphError> {
        let sub_id = self.condition_part_id(state, "sub")?;
        let sub = SubSection::empty(sub_id.clone());
        let next = edited(state, |s| {
            condition_mut(s, condition_id)?.add_sub_section(condition_id, block_id, sub)
        })?;
        Ok((next, sub_id))
    }

    pub fn update_sub_section(
        &mut self,
        state: &StrategyState,
        condition_id: &str,
        block_id: &str,
        sub_section: SubSection,
    ) -> Result<StrategyState, GraphError> {
        edited(state, |s| {
            condition_mut(s, condition_id)?.update_sub_section(condition_id, block_id, sub_section)
        })
    }

    pub fn remove_sub_section(
        &mut self,
        state: &StrategyState,
        condition_id: &str,
        block_id: &str,
        sub_section_id: &str,
    ) -> Result<StrategyState, GraphError> {
        edited(state, |s| {
            condition_mut(s, condition_id)?.remove_sub_section(
                condition_id,
                block_id,
                sub_section_id,
            )
        })
    }

    pub fn update_condition_meta(
        &mut self,
        state: &StrategyState,
        condition_id: &str,
        meta: ConditionMeta,
    ) -> Result<StrategyState, GraphError> {
        edited(state, |s| {
            condition_mut(s, condition_id)?.apply_meta(meta);
            Ok(())
        })
    }

    /// Appends an item at the end of an action node's sequence. Returns the item id.
    pub fn add_item(
        &mut self,
        state: &StrategyState,
        action_id: &str,
        body: ItemBody,
    ) -> Result<(StrategyState, String), GraphError> {
        let item_id = self.item_id(state)?;
        let next = edited(state, |s| {
            action_mut(s, action_id)?.add_item(item_id.clone(), body);
            Ok(())
        })?;
        Ok((next, item_id))
    }

    pub fn update_item(
        &mut self,
        state: &StrategyState,
        action_id: &str,
        item_id: &str,
        body: ItemBody,
    ) -> Result<StrategyState, GraphError> {
        edited(state, |s| {
            action_mut(s, action_id)?.update_item(action_id, item_id, body)
        })
    }

    pub fn remove_item(
        &mut self,
        state: &StrategyState,
        action_id: &str,
        item_id: &str,
    ) -> Result<StrategyState, GraphError> {
        edited(state, |s| action_mut(s, action_id)?.remove_item(action_id, item_id))
    }

    pub fn move_item(
        &mut self,
        state: &StrategyState,
        action_id: &str,
        item_id: &str,
        to: usize,
    ) -> Result<StrategyState, GraphError> {
        edited(state, |s| {
            action_mut(s, action_id)?.move_item(action_id, item_id, to)
        })
    }
}
