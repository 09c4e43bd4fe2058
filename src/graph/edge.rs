use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which side of a node a handle sits on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandleSide {
    Top,
    Bottom,
    Left,
    Right,
    /// A handle name we don't lay out, kept verbatim.
    Other(String),
}

impl HandleSide {
    fn as_str(&self) -> &str {
        match self {
            HandleSide::Top => "top",
            HandleSide::Bottom => "bottom",
            HandleSide::Left => "left",
            HandleSide::Right => "right",
            HandleSide::Other(name) => name,
        }
    }
}

/// A connection point on a node. Serialized as `{node_id}-{side}`.
///
/// Deserialization never fails: handles that don't parse are kept as
/// [`HandleSide::Other`] so they are written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct HandleRef {
    pub node_id: String,
    pub side: HandleSide,
}

impl HandleRef {
    pub fn new(node_id: impl Into<String>, side: HandleSide) -> Self {
        Self {
            node_id: node_id.into(),
            side,
        }
    }

    pub fn top(node_id: &str) -> Self {
        Self::new(node_id, HandleSide::Top)
    }

    pub fn bottom(node_id: &str) -> Self {
        Self::new(node_id, HandleSide::Bottom)
    }

    pub fn left(node_id: &str) -> Self {
        Self::new(node_id, HandleSide::Left)
    }

    pub fn right(node_id: &str) -> Self {
        Self::new(node_id, HandleSide::Right)
    }

    /// Parses `raw`, falling back to [`HandleSide::Other`] for unknown forms.
    pub fn lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|reason: String| {
            debug!(handle = raw, %reason, "keeping unrecognised handle as-is");
            match raw.rsplit_once('-') {
                Some((node_id, side)) => Self::new(node_id, HandleSide::Other(side.to_string())),
                None => Self::new("", HandleSide::Other(raw.to_string())),
            }
        })
    }
}

impl fmt::Display for HandleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.node_id.is_empty() {
            return f.write_str(self.side.as_str());
        }
        write!(f, "{}-{}", self.node_id, self.side.as_str())
    }
}

impl FromStr for HandleRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (node_id, side) = s
            .rsplit_once('-')
            .ok_or_else(|| format!("Handle '{}' has no side suffix", s))?;
        let side = match side {
            "top" => HandleSide::Top,
            "bottom" => HandleSide::Bottom,
            "left" => HandleSide::Left,
            "right" => HandleSide::Right,
            other => return Err(format!("Unknown handle side '{}' in '{}'", other, s)),
        };
        Ok(Self::new(node_id, side))
    }
}

impl From<String> for HandleRef {
    fn from(value: String) -> Self {
        Self::lenient(&value)
    }
}

impl From<HandleRef> for String {
    fn from(handle: HandleRef) -> Self {
        handle.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    #[serde(rename = "conditionEdge")]
    Condition,
    #[serde(rename = "actionEdge")]
    Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<HandleRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<HandleRef>,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<EdgeData>,
}

impl Edge {
    pub fn derive_id(source: &str, target: &str) -> String {
        format!("e_{}_{}", source, target)
    }

    /// A chain edge from `source`'s bottom handle to `target`'s top handle.
    pub fn condition(source: &str, target: &str) -> Self {
        Self {
            id: Self::derive_id(source, target),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: Some(HandleRef::bottom(source)),
            target_handle: Some(HandleRef::top(target)),
            kind: EdgeKind::Condition,
            data: None,
        }
    }

    /// A fan-out edge from a condition's right handle into an action node.
    pub fn action(condition_id: &str, action_id: &str) -> Self {
        Self {
            id: Self::derive_id(condition_id, action_id),
            source: condition_id.to_string(),
            target: action_id.to_string(),
            source_handle: Some(HandleRef::right(condition_id)),
            target_handle: Some(HandleRef::left(action_id)),
            kind: EdgeKind::Action,
            data: Some(EdgeData {
                sequence: None,
                source_condition: Some(condition_id.to_string()),
            }),
        }
    }

    pub fn is_condition_edge(&self) -> bool {
        self.kind == EdgeKind::Condition
    }

    pub fn is_action_edge(&self) -> bool {
        self.kind == EdgeKind::Action
    }

    /// Vertical edges are the ones not leaving through a right-hand handle.
    pub fn is_vertical(&self) -> bool {
        !matches!(
            self.source_handle,
            Some(HandleRef {
                side: HandleSide::Right,
                ..
            })
        ) && self.is_condition_edge()
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    pub fn sequence(&self) -> Option<u32> {
        self.data.as_ref().and_then(|d| d.sequence)
    }

    pub fn set_sequence(&mut self, sequence: u32) {
        self.data.get_or_insert_with(EdgeData::default).sequence = Some(sequence);
    }
}
