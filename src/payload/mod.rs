//! The wire contract with the execution backend.

use crate::action::CompiledAction;
use crate::condition::CompiledCondition;
use crate::elements::{DataPointDef, IndicatorDef};
use crate::error::PayloadError;
use crate::graph::{Edge, Node};
use crate::state::{Settings, StratInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

mod compiler;
mod reformer;

pub use compiler::*;
pub use reformer::*;

/// A compiled strategy, as saved and sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "strategyName")]
    pub strategy_name: String,
    pub settings: Settings,
    #[serde(default)]
    pub data: Vec<DataPointDef>,
    #[serde(default)]
    pub indicators: Vec<IndicatorDef>,
    #[serde(default)]
    pub actions: BTreeMap<String, CompiledAction>,
    #[serde(default)]
    pub conditions: BTreeMap<String, CompiledCondition>,
    #[serde(default)]
    pub conditions_seq: Vec<String>,
    #[serde(default)]
    pub conditions_loc: Vec<Node>,
    #[serde(default)]
    pub actions_loc: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stratinfo: Option<StratInfo>,
}

impl Payload {
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
