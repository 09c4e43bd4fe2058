use super::compiler::{BlockToken, Comparison, CompiledCondition, ConditionExpr};
use super::model::{Block, ConditionNode, Relation, SubSection};
use super::path::decode;
use crate::error::ReformError;
use crate::ids::IdGenerator;
use crate::registry::{ElementRegistry, is_enumerated};
use ahash::AHashSet;
use serde_json::Value;
use tracing::warn;

/// Rebuilds a [`ConditionNode`] from its compiled form.
///
/// Top-level relation tokens become `block_relations`, relation tokens inside
/// a block become the preceding sub-section's badge. Dangling relations with no
/// following block are dropped. Block and sub-section ids are unique within
/// the rebuilt node.
pub fn reform_condition(
    compiled: &CompiledCondition,
    registry: &dyn ElementRegistry,
    ids: &mut IdGenerator,
) -> Result<ConditionNode, ReformError> {
    let mut taken = AHashSet::new();
    let mut blocks: Vec<Block> = Vec::new();
    let mut relations = Vec::new();
    let mut pending: Option<Relation> = None;

    for expr in &compiled.conditions {
        match expr {
            ConditionExpr::Join(relation) => pending = Some(*relation),
            ConditionExpr::Block(tokens) => {
                let block = reform_block(&compiled.node, tokens, registry, ids, &mut taken)?;
                if block.sub_sections.is_empty() {
                    continue;
                }
                if !blocks.is_empty() {
                    relations.push(pending.unwrap_or_default());
                }
                pending = None;
                blocks.push(block);
            }
        }
    }

    if blocks.is_empty() {
        let block_id = ids.unique_in("block", &mut taken)?;
        let sub = SubSection::empty(ids.unique_in("sub", &mut taken)?);
        blocks.push(Block::new(block_id, sub));
    }

    let mut node = ConditionNode {
        name: compiled.description.clone(),
        kind: compiled.kind,
        max_entries: compiled.maxentries,
        wait_trigger: compiled.check_when_trigger_open,
        position_open: compiled.check_when_position_open,
        blocks,
        block_relations: relations,
    };
    node.sync_block_relations();
    Ok(node)
}

fn reform_block(
    node_id: &str,
    tokens: &[BlockToken],
    registry: &dyn ElementRegistry,
    ids: &mut IdGenerator,
    taken: &mut AHashSet<String>,
) -> Result<Block, ReformError> {
    let mut sub_sections: Vec<SubSection> = Vec::new();
    for token in tokens {
        match token {
            BlockToken::Comparison(comparison) => {
                let id = ids.unique_in("sub", taken)?;
                sub_sections.push(reform_comparison(comparison, registry, id));
            }
            BlockToken::Join(relation) => match sub_sections.last_mut() {
                Some(last) => last.add_badge = *relation,
                None => warn!(node = node_id, "relation token before any comparison ignored"),
            },
        }
    }
    Ok(Block {
        id: ids.unique_in("block", taken)?,
        sub_sections,
        relation: Relation::And,
    })
}

fn reform_comparison(
    Comparison(lhs, operator, rhs): &Comparison,
    registry: &dyn ElementRegistry,
    id: String,
) -> SubSection {
    let mut sub = SubSection::empty(id);
    let lhs = decode(lhs, registry);
    let enumerated = is_enumerated(&lhs.base);
    sub.set_lhs(lhs);
    sub.operator = Some(operator.clone());

    match rhs {
        Value::String(raw) if enumerated => sub.rhs = Some(raw.clone()),
        Value::String(raw) => {
            let base = raw.split('.').next().unwrap_or_default();
            if registry.contains(base) {
                sub.set_rhs(decode(raw, registry));
            } else {
                sub.set_literal(raw.clone());
            }
        }
        Value::Number(n) => sub.set_literal(n.to_string()),
        other => sub.set_literal(other.to_string()),
    }
    sub
}
