use super::model::{
    ActionNode, ExpiryType, ItemBody, MAX_REENTRIES, OptionType, PositionLeg, Segment, StrikeBy,
    TransactionType,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Function name the backend uses for opening a position leg.
pub const ADD_LEG: &str = "addLeg";

/// Wire form of a position leg. Disabled risk features are absent entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegParams {
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

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_target: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,

    #[serde(default, rename = "isSL", skip_serializing_if = "Option::is_none")]
    pub is_sl: Option<bool>,
    #[serde(default, rename = "SLon", skip_serializing_if = "Option::is_none")]
    pub sl_on: Option<String>,
    #[serde(default, rename = "SLvalue", skip_serializing_if = "Option::is_none")]
    pub sl_value: Option<f64>,

    #[serde(default, rename = "isTrailSL", skip_serializing_if = "Option::is_none")]
    pub is_trail_sl: Option<bool>,
    #[serde(default, rename = "trailSLon", skip_serializing_if = "Option::is_none")]
    pub trail_sl_on: Option<String>,
    #[serde(default, rename = "trailSL_X", skip_serializing_if = "Option::is_none")]
    pub trail_sl_x: Option<f64>,
    #[serde(default, rename = "trailSL_Y", skip_serializing_if = "Option::is_none")]
    pub trail_sl_y: Option<f64>,

    #[serde(default, rename = "isWT", skip_serializing_if = "Option::is_none")]
    pub is_wt: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wt_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wt_val: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_re_entry_tg: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub re_entry_tg_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub re_entry_tg_val: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub re_entry_tg_max_no: Option<u32>,

    #[serde(default, rename = "isReEntrySL", skip_serializing_if = "Option::is_none")]
    pub is_re_entry_sl: Option<bool>,
    #[serde(default, rename = "reEntrySLOn", skip_serializing_if = "Option::is_none")]
    pub re_entry_sl_on: Option<String>,
    #[serde(default, rename = "reEntrySLVal", skip_serializing_if = "Option::is_none")]
    pub re_entry_sl_val: Option<f64>,
    #[serde(default, rename = "reEntrySLMaxNo", skip_serializing_if = "Option::is_none")]
    pub re_entry_sl_max_no: Option<u32>,
}

/// One step of an action node's execution sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActCall {
    pub func: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<LegParams>,
}

/// Wire form of a single action node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledAction {
    pub description: String,
    pub act: Vec<ActCall>,
}

pub fn compile_action(node: &ActionNode) -> CompiledAction {
    let act = node
        .sorted_items()
        .into_iter()
        .map(|item| match &item.body {
            ItemBody::Position(leg) => ActCall {
                func: ADD_LEG.to_string(),
                params: Some(compile_leg(leg)),
            },
            ItemBody::Action(action) => ActCall {
                func: action.func().to_string(),
                params: None,
            },
        })
        .collect();

    CompiledAction {
        description: node.node_name.clone(),
        act,
    }
}

/// Caps a re-entry count at [`MAX_REENTRIES`].
pub(crate) fn clamp_reentries(leg_id: &str, count: u32) -> u32 {
    if count > MAX_REENTRIES {
        warn!(leg = leg_id, count, "re-entry count clamped to {}", MAX_REENTRIES);
    }
    count.min(MAX_REENTRIES)
}

fn enabled<T>(flag: bool, value: T) -> Option<T> {
    flag.then_some(value)
}

pub fn compile_leg(leg: &PositionLeg) -> LegParams {
    LegParams {
        leg_id: leg.leg_id.clone(),
        segment: leg.segment,
        transaction_type: leg.transaction_type,
        option_type: leg.option_type,
        qty: leg.qty,
        strike_by: leg.strike_by,
        strike_val: leg.strike_val.clone(),
        exp_type: leg.exp_type,
        exp_no: leg.exp_no,

        is_target: enabled(leg.is_target, true),
        target_on: enabled(leg.is_target, leg.target_on.token().to_string()),
        target_value: enabled(leg.is_target, leg.target_value),

        is_sl: enabled(leg.is_sl, true),
        sl_on: enabled(leg.is_sl, leg.sl_on.token().to_string()),
        sl_value: enabled(leg.is_sl, leg.sl_value),

        is_trail_sl: enabled(leg.is_trail_sl, true),
        trail_sl_on: enabled(leg.is_trail_sl, leg.trail_sl_on.token().to_string()),
        trail_sl_x: enabled(leg.is_trail_sl, leg.trail_sl_x),
        trail_sl_y: enabled(leg.is_trail_sl, leg.trail_sl_y),

        is_wt: enabled(leg.is_wt, true),
        wt_on: enabled(leg.is_wt, leg.wt_on.clone()),
        wt_val: enabled(leg.is_wt, leg.wt_val),

        is_re_entry_tg: enabled(leg.is_re_entry_tg, true),
        re_entry_tg_on: enabled(leg.is_re_entry_tg, leg.re_entry_tg_on.clone()),
        re_entry_tg_val: enabled(leg.is_re_entry_tg, leg.re_entry_tg_val),
        re_entry_tg_max_no: leg
            .is_re_entry_tg
            .then(|| clamp_reentries(&leg.leg_id, leg.re_entry_tg_max_no)),

        is_re_entry_sl: enabled(leg.is_re_entry_sl, true),
        re_entry_sl_on: enabled(leg.is_re_entry_sl, leg.re_entry_sl_on.clone()),
        re_entry_sl_val: enabled(leg.is_re_entry_sl, leg.re_entry_sl_val),
        re_entry_sl_max_no: leg
            .is_re_entry_sl
            .then(|| clamp_reentries(&leg.leg_id, leg.re_entry_sl_max_no)),
    }
}
