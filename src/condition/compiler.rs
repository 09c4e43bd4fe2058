use super::model::{Block, ConditionNode, ConditionType, Relation, SubSection};
use crate::registry::{ElementRegistry, is_enumerated};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::debug;

/// A compiled `[lhs, operator, rhs]` triplet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison(pub String, pub String, pub Value);

/// One element inside a compiled block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockToken {
    Comparison(Comparison),
    Join(Relation),
}

/// One top-level element of a compiled condition: a block or the relation
/// joining two blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionExpr {
    Block(Vec<BlockToken>),
    Join(Relation),
}

/// Wire form of a single condition node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledCondition {
    pub node: String,
    #[serde(rename = "type")]
    pub kind: ConditionType,
    pub description: String,
    pub maxentries: u32,
    pub check_when_position_open: bool,
    pub check_when_trigger_open: bool,
    pub actions: Vec<String>,
    pub conditions: Vec<ConditionExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completeness {
    Blank,
    Partial,
    Complete,
}

/// Compiles one condition node. `actions` are the action node ids the
/// condition fans out to, already in sequence order.
pub fn compile_condition(
    node_id: &str,
    condition: &ConditionNode,
    actions: Vec<String>,
    registry: &dyn ElementRegistry,
) -> CompiledCondition {
    // Exit conditions never gate on position or trigger state.
    let gated = condition.kind != ConditionType::Exit;

    CompiledCondition {
        node: node_id.to_string(),
        kind: condition.kind,
        description: condition.name.clone(),
        maxentries: condition.max_entries,
        check_when_position_open: gated && condition.position_open,
        check_when_trigger_open: gated && condition.wait_trigger,
        actions,
        conditions: compile_blocks(node_id, condition, registry),
    }
}

fn compile_blocks(
    node_id: &str,
    condition: &ConditionNode,
    registry: &dyn ElementRegistry,
) -> Vec<ConditionExpr> {
    let mut exprs = Vec::new();
    let mut emitted_any = false;

    for (idx, block) in condition.blocks.iter().enumerate() {
        let Some(tokens) = compile_block(block, registry) else {
            debug!(node = node_id, block = %block.id, "omitting block without complete comparisons");
            continue;
        };
        if emitted_any {
            let relation = idx
                .checked_sub(1)
                .and_then(|prev| condition.block_relations.get(prev))
                .copied()
                .unwrap_or_default();
            exprs.push(ConditionExpr::Join(relation));
        }
        exprs.push(ConditionExpr::Block(tokens));
        emitted_any = true;
    }
    exprs
}

/// Returns `None` when the block has nothing complete to emit, or when any
/// started sub-section is still missing required parts.
fn compile_block(block: &Block, registry: &dyn ElementRegistry) -> Option<Vec<BlockToken>> {
    let mut complete = Vec::new();
    for sub in &block.sub_sections {
        match completeness(sub, registry) {
            Completeness::Blank => {}
            Completeness::Partial => return None,
            Completeness::Complete => complete.push(sub),
        }
    }
    if complete.is_empty() {
        return None;
    }

    let mut tokens = Vec::with_capacity(complete.len() * 2);
    for (i, sub) in complete.iter().enumerate() {
        tokens.push(BlockToken::Comparison(compile_comparison(sub, registry)?));
        if i + 1 < complete.len() {
            tokens.push(BlockToken::Join(sub.add_badge));
        }
    }
    Some(tokens)
}

fn completeness(sub: &SubSection, registry: &dyn ElementRegistry) -> Completeness {
    if sub.is_blank() {
        return Completeness::Blank;
    }
    let (Some(lhs), Some(_)) = (sub.lhs.as_deref(), sub.operator.as_deref()) else {
        return Completeness::Partial;
    };

    let needs_column = |name: &str| registry.options(name).is_some_and(|o| o.has_columns());
    if needs_column(lhs) && sub.column.is_none() {
        return Completeness::Partial;
    }

    if sub.rhs_value.is_some() {
        return Completeness::Complete;
    }
    match sub.rhs_ref() {
        None => Completeness::Partial,
        Some(_) if is_enumerated(lhs) => Completeness::Complete,
        Some(rhs) if needs_column(&rhs.base) && rhs.column.is_none() => Completeness::Partial,
        Some(_) => Completeness::Complete,
    }
}

fn compile_comparison(sub: &SubSection, registry: &dyn ElementRegistry) -> Option<Comparison> {
    let lhs = sub.lhs_ref()?;
    let operator = sub.operator.clone()?;
    let rhs = compile_rhs(sub, &lhs.base, registry)?;
    Some(Comparison(lhs.encode(), operator, rhs))
}

fn compile_rhs(sub: &SubSection, lhs: &str, registry: &dyn ElementRegistry) -> Option<Value> {
    if let Some(raw) = &sub.rhs_value {
        let numeric = registry
            .options(lhs)
            .is_some_and(|o| o.compares_numerically());
        return Some(if numeric {
            parse_number(raw).unwrap_or_else(|| Value::String(raw.clone()))
        } else {
            Value::String(raw.clone())
        });
    }
    if is_enumerated(lhs) {
        return sub.rhs.clone().map(Value::String);
    }
    sub.rhs_ref().map(|r| Value::String(r.encode()))
}

/// Parses a literal the way the backend expects numbers: integers stay integral.
pub fn parse_number(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return Some(Value::from(int));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}
