use crate::error::GraphError;
use serde::{Deserialize, Serialize};

/// Re-entry counts the backend accepts per leg.
pub const MAX_REENTRIES: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Segment {
    #[default]
    Opt,
    Fut,
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[default]
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Ce,
    Pe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrikeBy {
    #[default]
    Moneyness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryType {
    #[default]
    Weekly,
    Monthly,
}

/// Unit a risk threshold is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "₹")]
    Currency,
}

impl Unit {
    /// The token the backend uses for this unit.
    pub fn token(self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::Currency => "val",
        }
    }

    pub fn from_token(token: &str) -> Self {
        match token {
            "val" => Unit::Currency,
            _ => Unit::Percent,
        }
    }
}

/// One tradable position definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionLeg {
    #[serde(rename = "legID")]
    pub leg_id: String,
    pub segment: Segment,
    pub transaction_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_type: Option<OptionType>,
    pub qty: u32,
    pub strike_by: StrikeBy,
    pub strike_val: String,
    pub exp_type: ExpiryType,
    pub exp_no: u32,

    pub is_target: bool,
    pub target_on: Unit,
    pub target_value: f64,

    #[serde(rename = "isSL")]
    pub is_sl: bool,
    #[serde(rename = "SLon")]
    pub sl_on: Unit,
    #[serde(rename = "SLvalue")]
    pub sl_value: f64,

    #[serde(rename = "isTrailSL")]
    pub is_trail_sl: bool,
    #[serde(rename = "trailSLon")]
    pub trail_sl_on: Unit,
    #[serde(rename = "trailSL_X")]
    pub trail_sl_x: f64,
    #[serde(rename = "trailSL_Y")]
    pub trail_sl_y: f64,

    #[serde(rename = "isWT")]
    pub is_wt: bool,
    pub wt_on: String,
    pub wt_val: f64,

    pub is_re_entry_tg: bool,
    pub re_entry_tg_on: String,
    pub re_entry_tg_val: f64,
    pub re_entry_tg_max_no: u32,

    #[serde(rename = "isReEntrySL")]
    pub is_re_entry_sl: bool,
    #[serde(rename = "reEntrySLOn")]
    pub re_entry_sl_on: String,
    #[serde(rename = "reEntrySLVal")]
    pub re_entry_sl_val: f64,
    #[serde(rename = "reEntrySLMaxNo")]
    pub re_entry_sl_max_no: u32,
}

impl PositionLeg {
    /// An at-the-money weekly option buy with every risk feature disabled.
    pub fn new(leg_id: impl Into<String>) -> Self {
        Self {
            leg_id: leg_id.into(),
            segment: Segment::Opt,
            transaction_type: TransactionType::Buy,
            option_type: Some(OptionType::Ce),
            qty: 1,
            strike_by: StrikeBy::Moneyness,
            strike_val: "ATM".to_string(),
            exp_type: ExpiryType::Weekly,
            exp_no: 0,
            is_target: false,
            target_on: Unit::Percent,
            target_value: 0.0,
            is_sl: false,
            sl_on: Unit::Percent,
            sl_value: 0.0,
            is_trail_sl: false,
            trail_sl_on: Unit::Percent,
            trail_sl_x: 0.0,
            trail_sl_y: 0.0,
            is_wt: false,
            wt_on: String::new(),
            wt_val: 0.0,
            is_re_entry_tg: false,
            re_entry_tg_on: String::new(),
            re_entry_tg_val: 0.0,
            re_entry_tg_max_no: 0,
            is_re_entry_sl: false,
            re_entry_sl_on: String::new(),
            re_entry_sl_val: 0.0,
            re_entry_sl_max_no: 0,
        }
    }
}

/// Item kinds that carry no parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructuralAction {
    #[serde(rename = "squareoff_all")]
    SquareoffAll,
    #[serde(rename = "stop_WaitTrade_triggers")]
    StopWaitTradeTriggers,
}

impl StructuralAction {
    pub fn func(self) -> &'static str {
        match self {
            StructuralAction::SquareoffAll => "squareoff_all",
            StructuralAction::StopWaitTradeTriggers => "stop_WaitTrade_triggers",
        }
    }

    pub fn from_func(func: &str) -> Option<Self> {
        match func {
            "squareoff_all" => Some(StructuralAction::SquareoffAll),
            "stop_WaitTrade_triggers" => Some(StructuralAction::StopWaitTradeTriggers),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ItemBody {
    Position(PositionLeg),
    Action(StructuralAction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub order: u32,
    pub body: ItemBody,
}

/// Per action-node state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionNode {
    pub node_name: String,
    pub items: Vec<Item>,
}

impl ActionNode {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            items: Vec::new(),
        }
    }

    /// Items in execution order.
    pub fn sorted_items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.iter().collect();
        items.sort_by_key(|i| i.order);
        items
    }

    /// Appends an item at the end of the execution order.
    pub fn add_item(&mut self, id: impl Into<String>, body: ItemBody) {
        self.renumber();
        self.items.push(Item {
            id: id.into(),
            order: self.items.len() as u32,
            body,
        });
    }

    pub fn remove_item(&mut self, action_id: &str, item_id: &str) -> Result<(), GraphError> {
        let idx = self.item_index(action_id, item_id)?;
        self.items.remove(idx);
        self.renumber();
        Ok(())
    }

    pub fn update_item(
        &mut self,
        action_id: &str,
        item_id: &str,
        body: ItemBody,
    ) -> Result<(), GraphError> {
        let idx = self.item_index(action_id, item_id)?;
        self.items[idx].body = body;
        Ok(())
    }

    /// Moves an item to position `to` in the execution order, clamped to the end.
    pub fn move_item(&mut self, action_id: &str, item_id: &str, to: usize) -> Result<(), GraphError> {
        self.item_index(action_id, item_id)?;
        let mut ordered: Vec<Item> = std::mem::take(&mut self.items);
        ordered.sort_by_key(|i| i.order);
        let from = ordered
            .iter()
            .position(|i| i.id == item_id)
            .unwrap_or_default();
        let item = ordered.remove(from);
        ordered.insert(to.min(ordered.len()), item);
        for (order, item) in ordered.iter_mut().enumerate() {
            item.order = order as u32;
        }
        self.items = ordered;
        Ok(())
    }

    pub fn contains_item(&self, item_id: &str) -> bool {
        self.items.iter().any(|i| i.id == item_id)
    }

    /// Restores a dense `0..N-1` order, keeping the relative order of items.
    pub fn renumber(&mut self) {
        self.items.sort_by_key(|i| i.order);
        for (order, item) in self.items.iter_mut().enumerate() {
            item.order = order as u32;
        }
    }

    fn item_index(&self, action_id: &str, item_id: &str) -> Result<usize, GraphError> {
        self.items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| GraphError::ItemNotFound {
                action_id: action_id.to_string(),
                item_id: item_id.to_string(),
            })
    }
}
