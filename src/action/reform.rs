use super::compiler::{ADD_LEG, CompiledAction, LegParams, clamp_reentries};
use super::model::{ActionNode, ItemBody, PositionLeg, StructuralAction, Unit};
use crate::error::ReformError;
use crate::ids::IdGenerator;
use ahash::AHashSet;
use tracing::warn;

/// Rebuilds an [`ActionNode`] from its compiled form. Item order follows the
/// position in `act`; unknown functions are skipped.
pub fn reform_action(
    action_id: &str,
    compiled: &CompiledAction,
    ids: &mut IdGenerator,
) -> Result<ActionNode, ReformError> {
    let mut node = ActionNode::new(compiled.description.clone());
    let mut taken = AHashSet::new();
    for call in &compiled.act {
        let body = if call.func == ADD_LEG {
            let params = call
                .params
                .as_ref()
                .ok_or_else(|| ReformError::MissingLegParams {
                    action_id: action_id.to_string(),
                })?;
            ItemBody::Position(reform_leg(params))
        } else if let Some(action) = StructuralAction::from_func(&call.func) {
            ItemBody::Action(action)
        } else {
            warn!(action = action_id, func = %call.func, "skipping unknown action function");
            continue;
        };
        node.add_item(ids.unique_in("item", &mut taken)?, body);
    }
    Ok(node)
}

fn unit(token: &Option<String>) -> Unit {
    token.as_deref().map(Unit::from_token).unwrap_or_default()
}

/// Re-derives the `is*` flags from which value fields are present.
pub fn reform_leg(params: &LegParams) -> PositionLeg {
    let mut leg = PositionLeg::new(params.leg_id.clone());
    leg.segment = params.segment;
    leg.transaction_type = params.transaction_type;
    leg.option_type = params.option_type;
    leg.qty = params.qty;
    leg.strike_by = params.strike_by;
    leg.strike_val = params.strike_val.clone();
    leg.exp_type = params.exp_type;
    leg.exp_no = params.exp_no;

    if let Some(value) = params.target_value {
        leg.is_target = true;
        leg.target_on = unit(&params.target_on);
        leg.target_value = value;
    }
    if let Some(value) = params.sl_value {
        leg.is_sl = true;
        leg.sl_on = unit(&params.sl_on);
        leg.sl_value = value;
    }
    if let (Some(x), Some(y)) = (params.trail_sl_x, params.trail_sl_y) {
        leg.is_trail_sl = true;
        leg.trail_sl_on = unit(&params.trail_sl_on);
        leg.trail_sl_x = x;
        leg.trail_sl_y = y;
    }
    if let Some(value) = params.wt_val {
        leg.is_wt = true;
        leg.wt_on = params.wt_on.clone().unwrap_or_default();
        leg.wt_val = value;
    }
    if let Some(value) = params.re_entry_tg_val {
        leg.is_re_entry_tg = true;
        leg.re_entry_tg_on = params.re_entry_tg_on.clone().unwrap_or_default();
        leg.re_entry_tg_val = value;
        leg.re_entry_tg_max_no =
            clamp_reentries(&leg.leg_id, params.re_entry_tg_max_no.unwrap_or_default());
    }
    if let Some(value) = params.re_entry_sl_val {
        leg.is_re_entry_sl = true;
        leg.re_entry_sl_on = params.re_entry_sl_on.clone().unwrap_or_default();
        leg.re_entry_sl_val = value;
        leg.re_entry_sl_max_no =
            clamp_reentries(&leg.leg_id, params.re_entry_sl_max_no.unwrap_or_default());
    }
    leg
}
