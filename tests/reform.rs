//! Tests for rebuilding in-memory state from saved payloads.
mod common;
use common::*;
use serde_json::json;
use stratgraph::action::{CompiledAction, compile_leg, reform_action, reform_leg};
use stratgraph::graph::START_ID;
use stratgraph::ids::IdGenerator;
use stratgraph::prelude::*;

#[cfg(test)]
mod payload_reform_tests {
    use super::*;

    #[test]
    fn test_sample_payload_round_trips() {
        let payload = Payload::from_json(SAMPLE_PAYLOAD_JSON).expect("Failed to parse payload");
        let state = Reformer::seeded(11)
            .reform(&payload)
            .expect("Failed to reform payload");

        let recompiled = compile(&state);
        assert_eq!(recompiled, payload);
    }

    #[test]
    fn test_reformed_condition_structure() {
        let payload = Payload::from_json(SAMPLE_PAYLOAD_JSON).unwrap();
        let state = reform(&payload).unwrap();

        let condition = &state.conditions["condition_00000001"];
        assert_eq!(condition.name, "Breakout");
        assert_eq!(condition.max_entries, 2);
        assert!(condition.wait_trigger);
        assert!(!condition.position_open);
        assert_eq!(condition.blocks.len(), 2);
        assert_eq!(condition.block_relations, vec![Relation::And]);

        let first = &condition.blocks[0].sub_sections;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].add_badge, Relation::Or);
        assert_eq!(first[0].lhs.as_deref(), Some("spotNF"));
        assert_eq!(first[0].column.as_deref(), Some("close"));
        assert_eq!(
            first[0].rhs_ref(),
            Some(
                ElementRef::new("spotNF")
                    .with_column("high")
                    .with_period(Period::Prev)
            )
        );
        assert_eq!(first[1].lhs.as_deref(), Some("ema20"));
        assert_eq!(first[1].rhs.as_deref(), Some("value"));
        assert_eq!(first[1].rhs_value.as_deref(), Some("20000"));

        let second = &condition.blocks[1].sub_sections[0];
        assert_eq!(second.lhs.as_deref(), Some("day_of_week"));
        assert_eq!(second.rhs.as_deref(), Some("monday"));
        assert!(second.rhs_value.is_none());
    }

    #[test]
    fn test_reformed_elements_get_fresh_ids() {
        let payload = Payload::from_json(SAMPLE_PAYLOAD_JSON).unwrap();
        let state = Reformer::seeded(3).reform(&payload).unwrap();

        assert_eq!(state.data_points.len(), 1);
        assert_eq!(state.data_points[0].name, "spotNF");
        assert_eq!(state.data_points[0].params["symbol"], "NIFTY");
        assert!(state.data_points[0].id.starts_with("data_"));
        assert_eq!(state.indicators[0].kind, IndicatorKind::Ema);
        assert!(state.indicators[0].id.starts_with("indicator_"));
    }

    #[test]
    fn test_reformed_actions_keep_order_and_flags() {
        let payload = Payload::from_json(SAMPLE_PAYLOAD_JSON).unwrap();
        let state = reform(&payload).unwrap();

        let action = &state.actions["action_0000000a"];
        assert_eq!(action.node_name, "Sell straddle");
        let items = action.sorted_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].order, 0);
        assert_eq!(items[1].body, ItemBody::Action(StructuralAction::SquareoffAll));

        let ItemBody::Position(leg) = &items[0].body else {
            panic!("Expected a position leg first");
        };
        assert_eq!(leg.qty, 50);
        assert!(leg.is_sl);
        assert_eq!(leg.sl_on, Unit::Currency);
        assert_eq!(leg.sl_value, 30.0);
        assert!(!leg.is_target);
        assert!(!leg.is_trail_sl);
    }

    #[test]
    fn test_missing_start_is_inserted() {
        let mut payload = Payload::from_json(SAMPLE_PAYLOAD_JSON).unwrap();
        payload.conditions_loc.retain(|n| n.id != START_ID);

        let state = reform(&payload).unwrap();
        let start = state.graph.start().expect("START should be restored");
        assert_eq!(start.id, START_ID);
        assert_eq!(state.graph.nodes[0].kind, NodeKind::Start);
    }

    #[test]
    fn test_element_override_changes_path_decoding() {
        let payload = Payload::from_json(SAMPLE_PAYLOAD_JSON).unwrap();
        let state = Reformer::new()
            .with_element("ema20", ElementOptions::indicator(&["upper".to_string()]))
            .reform(&payload)
            .unwrap();

        // "ema20" now exposes columns, so a bare reference carries no column.
        let sub = &state.conditions["condition_00000001"].blocks[0].sub_sections[1];
        assert_eq!(sub.lhs.as_deref(), Some("ema20"));
        assert!(sub.column.is_none());
    }

    #[test]
    fn test_unknown_edge_handle_survives_reform() {
        let json = SAMPLE_PAYLOAD_JSON.replace("\"action_0000000a-left\"", "\"a1\"");
        let payload = Payload::from_json(&json).expect("Unknown handles should still parse");
        let state = reform(&payload).expect("Failed to reform payload");

        let edge = state
            .graph
            .edges
            .iter()
            .find(|e| e.is_action_edge())
            .expect("action edge should be kept");
        assert_eq!(
            edge.target_handle.as_ref().map(|h| h.side.clone()),
            Some(HandleSide::Other("a1".to_string()))
        );
        assert_eq!(compile(&state), payload);
        assert!(payload.to_json_pretty().unwrap().contains("\"targetHandle\": \"a1\""));
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let result = Payload::from_json("{ \"strategyName\": 5 }");
        assert!(matches!(result, Err(PayloadError::Json(_))));
    }

    #[test]
    fn test_payload_with_empty_condition_reforms_to_blank_block() {
        let mut payload = Payload::from_json(SAMPLE_PAYLOAD_JSON).unwrap();
        payload
            .conditions
            .get_mut("condition_00000001")
            .unwrap()
            .conditions
            .clear();

        let state = reform(&payload).unwrap();
        let condition = &state.conditions["condition_00000001"];
        assert_eq!(condition.blocks.len(), 1);
        assert!(condition.blocks[0].sub_sections[0].is_blank());
        assert!(condition.block_relations.is_empty());
    }
}

#[cfg(test)]
mod leg_reform_tests {
    use super::*;

    #[test]
    fn test_leg_flags_follow_value_presence() {
        let mut leg = protected_leg("leg_7");
        leg.is_wt = true;
        leg.wt_on = "up".to_string();
        leg.wt_val = 2.5;
        leg.is_re_entry_tg = true;
        leg.re_entry_tg_on = "asap".to_string();
        leg.re_entry_tg_val = 1.0;
        leg.re_entry_tg_max_no = 3;

        let reformed = reform_leg(&compile_leg(&leg));
        assert_eq!(reformed, leg);
    }

    #[test]
    fn test_trailing_stop_needs_both_steps() {
        let mut params = compile_leg(&PositionLeg::new("leg_1"));
        params.trail_sl_x = Some(10.0);
        assert!(!reform_leg(&params).is_trail_sl);

        params.trail_sl_y = Some(4.0);
        params.trail_sl_on = Some("val".to_string());
        let leg = reform_leg(&params);
        assert!(leg.is_trail_sl);
        assert_eq!(leg.trail_sl_on, Unit::Currency);
    }

    #[test]
    fn test_unknown_unit_token_reads_as_percent() {
        let mut params = compile_leg(&PositionLeg::new("leg_1"));
        params.target_value = Some(12.0);
        params.target_on = Some("pts".to_string());
        assert_eq!(reform_leg(&params).target_on, Unit::Percent);
    }

    #[test]
    fn test_add_leg_without_params_is_rejected() {
        let compiled: CompiledAction = serde_json::from_value(json!({
            "description": "Broken",
            "act": [{ "func": "addLeg" }]
        }))
        .unwrap();

        let mut ids = IdGenerator::seeded(1);
        assert_eq!(
            reform_action("action_1", &compiled, &mut ids),
            Err(ReformError::MissingLegParams {
                action_id: "action_1".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_action_function_is_skipped() {
        let compiled: CompiledAction = serde_json::from_value(json!({
            "description": "Mixed",
            "act": [{ "func": "hedge_delta" }, { "func": "stop_WaitTrade_triggers" }]
        }))
        .unwrap();

        let mut ids = IdGenerator::seeded(1);
        let node = reform_action("action_1", &compiled, &mut ids).unwrap();
        assert_eq!(node.items.len(), 1);
        assert_eq!(
            node.items[0].body,
            ItemBody::Action(StructuralAction::StopWaitTradeTriggers)
        );
        assert_eq!(node.items[0].order, 0);
    }
}
