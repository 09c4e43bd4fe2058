use crate::action::ActionNode;
use crate::condition::ConditionNode;
use crate::elements::{DataPoint, Indicator};
use crate::error::PayloadError;
use crate::graph::{Position, StrategyGraph};
use crate::registry::ElementCatalog;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Condition node state keyed by condition node id.
pub type ConditionBlockMap = AHashMap<String, ConditionNode>;

/// Action node state keyed by action node id.
pub type ActionNodeMap = AHashMap<String, ActionNode>;

/// Limits applied when placing entry or exit orders. Serializes as `{}` when unset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_execute: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_buffer: Option<f64>,
}

/// Strategy-wide execution settings, passed to the backend verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub underlying: String,
    pub strategy_type: String,
    pub timeframe: u32,
    #[serde(rename = "tradingDays")]
    pub trading_days: String,
    #[serde(rename = "tradingDaysList", default)]
    pub trading_days_list: Vec<u32>,
    #[serde(rename = "productType")]
    pub product_type: String,
    #[serde(rename = "entryOperation", default)]
    pub entry_operation: OrderOperation,
    #[serde(rename = "exitOperation", default)]
    pub exit_operation: OrderOperation,
    #[serde(rename = "orderType")]
    pub order_type: String,
    #[serde(
        rename = "squareoffTime",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub squareoff_time: Option<String>,
}

/// Listing metadata shown alongside a published strategy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StratInfo {
    pub visibility: String,
    pub description: String,
    #[serde(rename = "capitalReq")]
    pub capital_req: f64,
    pub createdon: String,
    pub status: String,
}

/// The complete in-memory snapshot of a strategy being edited.
///
/// Every engine operation takes a snapshot by reference and returns a new one;
/// a snapshot is never edited in place once handed out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyState {
    pub name: String,
    pub settings: Settings,
    pub graph: StrategyGraph,
    pub conditions: ConditionBlockMap,
    pub actions: ActionNodeMap,
    #[serde(default)]
    pub data_points: Vec<DataPoint>,
    #[serde(default)]
    pub indicators: Vec<Indicator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strat_info: Option<StratInfo>,
}

impl StrategyState {
    pub fn new(name: impl Into<String>, start_position: Position) -> Self {
        Self {
            name: name.into(),
            graph: StrategyGraph::new(start_position),
            ..Default::default()
        }
    }

    /// The element registry implied by this strategy's data points and indicators.
    pub fn catalog(&self) -> ElementCatalog {
        ElementCatalog::from_elements(&self.data_points, &self.indicators)
    }

    /// True if `id` names a node or a node-state entry.
    pub fn id_in_use(&self, id: &str) -> bool {
        self.graph.contains(id) || self.conditions.contains_key(id) || self.actions.contains_key(id)
    }

    /// True if `id` names a block or sub-section of any condition.
    pub fn condition_part_in_use(&self, id: &str) -> bool {
        self.conditions.values().any(|c| c.contains_id(id))
    }

    pub fn item_in_use(&self, id: &str) -> bool {
        self.actions.values().any(|a| a.contains_item(id))
    }

    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
