use super::path::{ElementRef, Period};
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical join between two sub-sections or two blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Relation {
    #[default]
    #[serde(rename = "and", alias = "AND")]
    And,
    #[serde(rename = "or", alias = "OR")]
    Or,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::And => f.write_str("and"),
            Relation::Or => f.write_str("or"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionType {
    #[default]
    Entry,
    Exit,
    Adjustment,
}

/// Marker stored in `rhs` when the right-hand side is a typed literal.
pub const LITERAL_RHS: &str = "value";

/// One `lhs operator rhs` comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubSection {
    pub id: String,
    pub add_badge: Relation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lhs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, rename = "selectedPeriod", skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhs: Option<String>,
    #[serde(default, rename = "rhs_column", skip_serializing_if = "Option::is_none")]
    pub rhs_column: Option<String>,
    #[serde(
        default,
        rename = "rhs_selectedPeriod",
        skip_serializing_if = "Option::is_none"
    )]
    pub rhs_period: Option<Period>,
    #[serde(default, rename = "_rhsValue", skip_serializing_if = "Option::is_none")]
    pub rhs_value: Option<String>,
}

impl SubSection {
    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// True for a freshly added row nobody has filled in yet.
    pub fn is_blank(&self) -> bool {
        self.lhs.is_none()
            && self.operator.is_none()
            && self.rhs.is_none()
            && self.rhs_value.is_none()
    }

    pub fn lhs_ref(&self) -> Option<ElementRef> {
        self.lhs.as_ref().map(|base| ElementRef {
            base: base.clone(),
            column: self.column.clone(),
            period: self.period,
        })
    }

    /// The referenced right-hand element, if the rhs is neither a literal nor empty.
    pub fn rhs_ref(&self) -> Option<ElementRef> {
        match self.rhs.as_deref() {
            Some(LITERAL_RHS) | None => None,
            Some(base) => Some(ElementRef {
                base: base.to_string(),
                column: self.rhs_column.clone(),
                period: self.rhs_period,
            }),
        }
    }

    pub fn set_lhs(&mut self, element: ElementRef) {
        self.lhs = Some(element.base);
        self.column = element.column;
        self.period = element.period;
    }

    pub fn set_rhs(&mut self, element: ElementRef) {
        self.rhs = Some(element.base);
        self.rhs_column = element.column;
        self.rhs_period = element.period;
        self.rhs_value = None;
    }

    pub fn set_literal(&mut self, value: impl Into<String>) {
        self.rhs = Some(LITERAL_RHS.to_string());
        self.rhs_column = None;
        self.rhs_period = None;
        self.rhs_value = Some(value.into());
    }
}

/// An ordered group of sub-sections joined by their badges.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub sub_sections: Vec<SubSection>,
    /// Relation joining this block to the next one.
    pub relation: Relation,
}

impl Block {
    pub fn new(id: impl Into<String>, first_sub_section: SubSection) -> Self {
        Self {
            id: id.into(),
            sub_sections: vec![first_sub_section],
            relation: Relation::And,
        }
    }
}

/// Editable header fields of a condition node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionMeta {
    pub name: String,
    pub kind: ConditionType,
    pub max_entries: u32,
    pub wait_trigger: bool,
    pub position_open: bool,
}

/// Per condition-node state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionNode {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConditionType,
    pub max_entries: u32,
    pub wait_trigger: bool,
    pub position_open: bool,
    pub blocks: Vec<Block>,
    pub block_relations: Vec<Relation>,
}

impl ConditionNode {
    pub fn new(name: impl Into<String>, first_block: Block) -> Self {
        Self {
            name: name.into(),
            kind: ConditionType::Entry,
            max_entries: 1,
            wait_trigger: false,
            position_open: false,
            blocks: vec![first_block],
            block_relations: Vec::new(),
        }
    }

    pub fn apply_meta(&mut self, meta: ConditionMeta) {
        self.name = meta.name;
        self.kind = meta.kind;
        self.max_entries = meta.max_entries;
        self.wait_trigger = meta.wait_trigger;
        self.position_open = meta.position_open;
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    fn block_index(&self, condition_id: &str, block_id: &str) -> Result<usize, GraphError> {
        self.blocks
            .iter()
            .position(|b| b.id == block_id)
            .ok_or_else(|| GraphError::BlockNotFound {
                condition_id: condition_id.to_string(),
                block_id: block_id.to_string(),
            })
    }

    /// Appends a block joined to the previous one by `relation`.
    pub fn add_block(&mut self, block: Block, relation: Relation) {
        if !self.blocks.is_empty() {
            self.block_relations.push(relation);
        }
        self.blocks.push(block);
        self.sync_block_relations();
    }

    /// Removes a block together with the relation that joined it to its neighbour.
    pub fn remove_block(&mut self, condition_id: &str, block_id: &str) -> Result<(), GraphError> {
        let idx = self.block_index(condition_id, block_id)?;
        self.blocks.remove(idx);
        if !self.block_relations.is_empty() {
            self.block_relations.remove(idx.saturating_sub(1));
        }
        self.sync_block_relations();
        Ok(())
    }

    pub fn set_block_relation(
        &mut self,
        condition_id: &str,
        index: usize,
        relation: Relation,
    ) -> Result<(), GraphError> {
        let slot = self
            .block_relations
            .get_mut(index)
            .ok_or_else(|| GraphError::RelationOutOfRange {
                condition_id: condition_id.to_string(),
                index,
            })?;
        *slot = relation;
        self.sync_block_relations();
        Ok(())
    }

    pub fn add_sub_section(
        &mut self,
        condition_id: &str,
        block_id: &str,
        sub_section: SubSection,
    ) -> Result<(), GraphError> {
        let idx = self.block_index(condition_id, block_id)?;
        self.blocks[idx].sub_sections.push(sub_section);
        Ok(())
    }

    pub fn update_sub_section(
        &mut self,
        condition_id: &str,
        block_id: &str,
        sub_section: SubSection,
    ) -> Result<(), GraphError> {
        let idx = self.block_index(condition_id, block_id)?;
        let slot = self.blocks[idx]
            .sub_sections
            .iter_mut()
            .find(|s| s.id == sub_section.id)
            .ok_or_else(|| GraphError::SubSectionNotFound {
                block_id: block_id.to_string(),
                sub_section_id: sub_section.id.clone(),
            })?;
        *slot = sub_section;
        Ok(())
    }

    pub fn remove_sub_section(
        &mut self,
        condition_id: &str,
        block_id: &str,
        sub_section_id: &str,
    ) -> Result<(), GraphError> {
        let idx = self.block_index(condition_id, block_id)?;
        let sub_sections = &mut self.blocks[idx].sub_sections;
        let before = sub_sections.len();
        sub_sections.retain(|s| s.id != sub_section_id);
        if sub_sections.len() == before {
            return Err(GraphError::SubSectionNotFound {
                block_id: block_id.to_string(),
                sub_section_id: sub_section_id.to_string(),
            });
        }
        Ok(())
    }

    /// Mirrors `block_relations` onto each block's own `relation` field.
    /// Blocks with no following neighbour fall back to the default.
    pub(crate) fn sync_block_relations(&mut self) {
        let relations = self
            .block_relations
            .iter()
            .copied()
            .chain(std::iter::repeat(Relation::default()));
        for (block, relation) in self.blocks.iter_mut().zip(relations) {
            block.relation = relation;
        }
    }

    /// True if `id` names one of this condition's blocks or sub-sections.
    pub fn contains_id(&self, id: &str) -> bool {
        self.blocks
            .iter()
            .any(|b| b.id == id || b.sub_sections.iter().any(|s| s.id == id))
    }
}
