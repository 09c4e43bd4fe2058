//! Tests for the condition compiler, the action compiler and payload assembly.
mod common;
use common::*;
use serde_json::json;
use stratgraph::action::{ADD_LEG, compile_action, compile_leg};
use stratgraph::condition::{ConditionExpr, compile_condition};
use stratgraph::prelude::*;

fn compile_one(condition: &ConditionNode) -> serde_json::Value {
    let compiled = compile_condition("condition_1", condition, Vec::new(), &test_registry());
    serde_json::to_value(&compiled.conditions).unwrap()
}

#[cfg(test)]
mod condition_tests {
    use super::*;

    #[test]
    fn test_two_anded_subsections() {
        let mut first = literal_sub("s1", "spotNF", Some("close"), "is_above", "20000");
        first.add_badge = Relation::And;
        let second = literal_sub("s2", "rsi14", None, "less_than", "30");
        let condition = condition_with("Entry", vec![first, second]);

        assert_eq!(
            compile_one(&condition),
            json!([[["spotNF.close", "is_above", 20000], "and", ["rsi14", "less_than", 30]]])
        );
    }

    #[test]
    fn test_badge_of_last_subsection_is_not_emitted() {
        let mut first = literal_sub("s1", "rsi14", None, "greater_than", "70");
        first.add_badge = Relation::Or;
        let mut second = literal_sub("s2", "rsi14", None, "less_than", "30");
        second.add_badge = Relation::Or;
        let condition = condition_with("Extremes", vec![first, second]);

        assert_eq!(
            compile_one(&condition),
            json!([[["rsi14", "greater_than", 70], "or", ["rsi14", "less_than", 30]]])
        );
    }

    #[test]
    fn test_block_relation_between_blocks() {
        let mut condition =
            condition_with("Two", vec![literal_sub("s1", "rsi14", None, "greater_than", "50")]);
        let mut second = Block::new("block_2", literal_sub("s2", "dte", None, "equals", "2"));
        second.sub_sections[0].add_badge = Relation::And;
        condition.add_block(second, Relation::Or);

        assert_eq!(condition.block_relations, vec![Relation::Or]);
        assert_eq!(
            compile_one(&condition),
            json!([[["rsi14", "greater_than", 50]], "or", [["dte", "equals", 2]]])
        );
    }

    #[test]
    fn test_empty_trailing_block_suppresses_relation() {
        let mut condition =
            condition_with("Trailing", vec![literal_sub("s1", "rsi14", None, "greater_than", "50")]);
        condition.add_block(Block::new("block_2", SubSection::empty("s2")), Relation::Or);

        assert_eq!(
            compile_one(&condition),
            json!([[["rsi14", "greater_than", 50]]])
        );
    }

    #[test]
    fn test_partial_block_is_omitted() {
        let mut condition =
            condition_with("Partial", vec![literal_sub("s1", "rsi14", None, "greater_than", "50")]);

        // Missing the column a candle feed requires.
        let mut incomplete = literal_sub("s2", "spotNF", None, "is_above", "100");
        incomplete.add_badge = Relation::And;
        let mut block = Block::new(
            "block_2",
            literal_sub("s3", "rsi14", None, "less_than", "80"),
        );
        block.sub_sections.push(incomplete);
        condition.add_block(block, Relation::And);

        let mut third = Block::new("block_3", literal_sub("s4", "dte", None, "equals", "0"));
        third.sub_sections[0].add_badge = Relation::And;
        condition.add_block(third, Relation::Or);

        // The relation emitted before block 3 is the one joining it to block 2.
        assert_eq!(
            compile_one(&condition),
            json!([[["rsi14", "greater_than", 50]], "or", [["dte", "equals", 0]]])
        );
    }

    #[test]
    fn test_blank_subsections_are_skipped() {
        let condition = condition_with(
            "Blank",
            vec![
                SubSection::empty("s0"),
                literal_sub("s1", "rsi14", None, "greater_than", "50"),
                SubSection::empty("s2"),
            ],
        );
        assert_eq!(
            compile_one(&condition),
            json!([[["rsi14", "greater_than", 50]]])
        );
    }

    #[test]
    fn test_condition_with_no_complete_blocks_compiles_empty() {
        let condition = condition_with("Nothing", vec![SubSection::empty("s1")]);
        assert_eq!(compile_one(&condition), json!([]));
    }

    #[test]
    fn test_rhs_element_reference_is_path_encoded() {
        let mut sub = SubSection::empty("s1");
        sub.set_lhs(
            ElementRef::new("spotNF")
                .with_column("close")
                .with_period(Period::Current),
        );
        sub.operator = Some("crosses_above".to_string());
        sub.set_rhs(
            ElementRef::new("spotNF")
                .with_column("high")
                .with_period(Period::PrevN(3)),
        );
        let condition = condition_with("Reference", vec![sub]);

        assert_eq!(
            compile_one(&condition),
            json!([[["spotNF.close.current", "crosses_above", "spotNF.high.prev-3"]]])
        );
    }

    #[test]
    fn test_rhs_reference_missing_column_is_incomplete() {
        let mut sub = SubSection::empty("s1");
        sub.set_lhs(ElementRef::new("rsi14"));
        sub.operator = Some("greater_than".to_string());
        sub.set_rhs(ElementRef::new("spotNF"));
        let condition = condition_with("Incomplete", vec![sub]);

        assert_eq!(compile_one(&condition), json!([]));
    }

    #[test]
    fn test_enumerated_rhs_is_passed_through() {
        let mut sub = SubSection::empty("s1");
        sub.lhs = Some("day_of_week".to_string());
        sub.operator = Some("equals".to_string());
        sub.rhs = Some("thursday".to_string());
        let condition = condition_with("Expiry day", vec![sub]);

        assert_eq!(
            compile_one(&condition),
            json!([[["day_of_week", "equals", "thursday"]]])
        );
    }

    #[test]
    fn test_literal_coercion() {
        let condition = condition_with(
            "Literals",
            vec![
                literal_sub("s1", "rsi14", None, "greater_than", "55.5"),
                literal_sub("s2", "rsi14", None, "less_than", "high"),
                literal_sub("s3", "candle_time", None, "equals", "09:20"),
            ],
        );
        assert_eq!(
            compile_one(&condition),
            json!([[
                ["rsi14", "greater_than", 55.5],
                "and",
                ["rsi14", "less_than", "high"],
                "and",
                ["candle_time", "equals", "09:20"]
            ]])
        );
    }

    #[test]
    fn test_unknown_lhs_compiles_raw_path() {
        let condition = condition_with(
            "Unknown",
            vec![literal_sub("s1", "vix", None, "greater_than", "20")],
        );
        assert_eq!(
            compile_one(&condition),
            json!([[["vix", "greater_than", "20"]]])
        );
    }

    #[test]
    fn test_exit_condition_clears_check_flags() {
        let mut condition =
            condition_with("Exit", vec![literal_sub("s1", "rsi14", None, "less_than", "30")]);
        condition.kind = ConditionType::Exit;
        condition.position_open = true;
        condition.wait_trigger = true;

        let compiled = compile_condition("c", &condition, Vec::new(), &test_registry());
        assert!(!compiled.check_when_position_open);
        assert!(!compiled.check_when_trigger_open);

        condition.kind = ConditionType::Adjustment;
        let compiled = compile_condition("c", &condition, Vec::new(), &test_registry());
        assert!(compiled.check_when_position_open);
        assert!(compiled.check_when_trigger_open);
    }

    #[test]
    fn test_compiled_condition_header() {
        let mut condition =
            condition_with("Header", vec![literal_sub("s1", "rsi14", None, "less_than", "30")]);
        condition.max_entries = 3;

        let compiled = compile_condition(
            "condition_1",
            &condition,
            vec!["action_b".to_string(), "action_a".to_string()],
            &test_registry(),
        );
        let value = serde_json::to_value(&compiled).unwrap();
        assert_eq!(value["node"], "condition_1");
        assert_eq!(value["type"], "entry");
        assert_eq!(value["description"], "Header");
        assert_eq!(value["maxentries"], 3);
        assert_eq!(value["actions"], json!(["action_b", "action_a"]));
        assert!(matches!(compiled.conditions[0], ConditionExpr::Block(_)));
    }
}

#[cfg(test)]
mod action_tests {
    use super::*;

    #[test]
    fn test_disabled_features_are_absent() {
        let leg = PositionLeg::new("leg_1");
        let params = serde_json::to_value(compile_leg(&leg)).unwrap();
        let keys: Vec<&str> = params
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();

        assert!(keys.iter().all(|k| !k.starts_with("is")), "{:?}", keys);
        assert!(params.get("SLvalue").is_none());
        assert!(params.get("reEntryTgMaxNo").is_none());
        assert_eq!(params["legID"], "leg_1");
        assert_eq!(params["strikeBy"], "moneyness");
        assert_eq!(params["optionType"], "CE");
    }

    #[test]
    fn test_units_serialize_as_tokens() {
        let mut leg = protected_leg("leg_1");
        leg.is_trail_sl = true;
        leg.trail_sl_on = Unit::Currency;
        leg.trail_sl_x = 10.0;
        leg.trail_sl_y = 5.0;

        let params = serde_json::to_value(compile_leg(&leg)).unwrap();
        assert_eq!(params["isTarget"], true);
        assert_eq!(params["targetOn"], "%");
        assert_eq!(params["targetValue"], 40.0);
        assert_eq!(params["isSL"], true);
        assert_eq!(params["SLon"], "val");
        assert_eq!(params["trailSLon"], "val");
        assert_eq!(params["trailSL_X"], 10.0);
        assert_eq!(params["trailSL_Y"], 5.0);
    }

    #[test]
    fn test_reentry_count_is_capped() {
        let mut leg = PositionLeg::new("leg_1");
        leg.is_re_entry_sl = true;
        leg.re_entry_sl_on = "asap".to_string();
        leg.re_entry_sl_val = 1.0;
        leg.re_entry_sl_max_no = 45;

        let params = compile_leg(&leg);
        assert_eq!(params.re_entry_sl_max_no, Some(20));
        assert_eq!(params.is_re_entry_tg, None);
    }

    #[test]
    fn test_items_compile_in_order() {
        let mut node = ActionNode::new("Hedge");
        node.add_item("i1", ItemBody::Action(StructuralAction::StopWaitTradeTriggers));
        node.add_item("i2", ItemBody::Position(PositionLeg::new("leg_1")));
        node.add_item("i3", ItemBody::Action(StructuralAction::SquareoffAll));
        node.move_item("a", "i3", 0).unwrap();

        let compiled = compile_action(&node);
        let funcs: Vec<&str> = compiled.act.iter().map(|a| a.func.as_str()).collect();
        assert_eq!(funcs, vec!["squareoff_all", "stop_WaitTrade_triggers", ADD_LEG]);
        assert_eq!(compiled.description, "Hedge");
        assert!(compiled.act[0].params.is_none());
        assert!(compiled.act[2].params.is_some());

        let value = serde_json::to_value(&compiled.act[0]).unwrap();
        assert_eq!(value, json!({ "func": "squareoff_all" }));
    }
}

#[cfg(test)]
mod payload_tests {
    use super::*;

    #[test]
    fn test_end_to_end_compile() {
        let mut engine = seeded_engine();
        let (state, conditions) = chain_of(&mut engine, 2);
        let (mut state, actions) = fan_out(&mut engine, state, &conditions[0], 2);
        state.settings = sample_settings();

        let condition = state.conditions.get_mut(&conditions[0]).unwrap();
        let block_id = condition.blocks[0].id.clone();
        let sub_id = condition.blocks[0].sub_sections[0].id.clone();
        let sub = literal_sub(&sub_id, "rsi14", None, "less_than", "30");

        let step = engine.apply(
            &state,
            Command::UpdateSubSection {
                condition: conditions[0].clone(),
                block: block_id,
                sub_section: sub,
            },
        );
        assert!(!step.is_rejected());

        let payload = Compiler::builder(&step.state)
            .with_element("rsi14", ElementOptions::indicator(&[]))
            .build()
            .compile();

        assert_eq!(payload.conditions_seq, conditions);
        assert_eq!(payload.conditions.len(), 2);
        assert_eq!(payload.actions.len(), 2);
        assert_eq!(payload.conditions[&conditions[0]].actions, actions);
        assert!(payload.conditions[&conditions[1]].actions.is_empty());
        assert!(payload.conditions[&conditions[1]].conditions.is_empty());
        assert_eq!(payload.conditions_loc.len(), 5);
        assert_eq!(payload.actions_loc.len(), step.state.graph.edges.len());

        let value = serde_json::to_value(&payload.conditions[&conditions[0]].conditions).unwrap();
        assert_eq!(value, json!([[["rsi14", "less_than", 30]]]));
    }

    #[test]
    fn test_orphan_state_entries_are_not_compiled() {
        let mut engine = seeded_engine();
        let (mut state, _) = chain_of(&mut engine, 1);
        state.conditions.insert(
            "condition_orphan".to_string(),
            condition_with("Orphan", vec![SubSection::empty("s")]),
        );
        state
            .actions
            .insert("action_orphan".to_string(), ActionNode::new("Orphan"));

        let payload = compile(&state);
        assert!(!payload.conditions.contains_key("condition_orphan"));
        assert!(!payload.actions.contains_key("action_orphan"));
        assert_eq!(payload.conditions.len(), 1);
    }

    #[test]
    fn test_payload_serializes_wire_names() {
        let mut engine = seeded_engine();
        let (mut state, _) = chain_of(&mut engine, 1);
        state.settings = sample_settings();

        let value: serde_json::Value =
            serde_json::from_str(&compile(&state).to_json().unwrap()).unwrap();
        for key in [
            "strategyName",
            "settings",
            "data",
            "indicators",
            "actions",
            "conditions",
            "conditions_seq",
            "conditions_loc",
            "actions_loc",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["settings"]["tradingDays"], "all");
        assert_eq!(value["conditions_loc"][0]["type"], "START");
        assert_eq!(value["actions_loc"][0]["type"], "conditionEdge");
        assert_eq!(value["actions_loc"][0]["sourceHandle"], "start-bottom");
        assert!(value.get("stratinfo").is_none());
    }

    #[test]
    fn test_custom_registry_replaces_derived_one() {
        let mut engine = seeded_engine();
        let (mut state, conditions) = chain_of(&mut engine, 1);
        let condition = state.conditions.get_mut(&conditions[0]).unwrap();
        condition.blocks[0].sub_sections[0] =
            literal_sub("s1", "spotNF", Some("close"), "is_above", "100");

        // Without a registry entry the literal stays a string.
        let plain = compile(&state);
        let value = serde_json::to_value(&plain.conditions[&conditions[0]].conditions).unwrap();
        assert_eq!(value, json!([[["spotNF.close", "is_above", "100"]]]));

        let compiler = Compiler::builder(&state)
            .with_registry(Box::new(test_registry()))
            .build();
        assert!(compiler.registry().contains("spotNF"));
        let value =
            serde_json::to_value(&compiler.compile().conditions[&conditions[0]].conditions).unwrap();
        assert_eq!(value, json!([[["spotNF.close", "is_above", 100]]]));
    }
}
