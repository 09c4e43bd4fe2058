//! Common test utilities for building strategy snapshots and registries.
use serde_json::Map;
use stratgraph::elements::{DataPointDef, IndicatorDef};
use stratgraph::prelude::*;

/// Registry used by the compiler tests.
///
/// `spotNF` is a candle feed with OHLCV columns, `rsi14` an indicator with no
/// columns that still supports candle lookups.
#[allow(dead_code)]
pub fn test_registry() -> ElementCatalog {
    ElementCatalog::new()
        .with_element("spotNF", ElementOptions::candle_data())
        .with_element("rsi14", ElementOptions::indicator(&[]))
        .with_element("dte", ElementOptions::dte())
}

/// An engine with reproducible ids.
#[allow(dead_code)]
pub fn seeded_engine() -> GraphEngine {
    GraphEngine::builder().seed(42).build()
}

/// Builds `START → C1 → … → Cn` and returns the snapshot with the condition ids in chain order.
#[allow(dead_code)]
pub fn chain_of(engine: &mut GraphEngine, n: usize) -> (StrategyState, Vec<String>) {
    let mut state = engine.new_state("Test Strategy");
    let mut ids = Vec::with_capacity(n);
    for _ in 0..n {
        let step = engine.apply(&state, Command::InsertCondition { after: None });
        ids.push(step.created.clone().expect("condition inserted"));
        state = step.state;
    }
    (state, ids)
}

/// Adds `n` action nodes and connects each of them to `condition`. Returns the action ids
/// in insertion order, which is also top-to-bottom order.
#[allow(dead_code)]
pub fn fan_out(
    engine: &mut GraphEngine,
    state: StrategyState,
    condition: &str,
    n: usize,
) -> (StrategyState, Vec<String>) {
    let mut state = state;
    let mut ids = Vec::with_capacity(n);
    for _ in 0..n {
        let step = engine.apply(
            &state,
            Command::InsertAction {
                via: Some(condition.to_string()),
            },
        );
        let action = step.created.clone().expect("action inserted");
        let step = engine.apply(
            &step.state,
            Command::Connect {
                condition: condition.to_string(),
                action: action.clone(),
            },
        );
        assert!(!step.is_rejected(), "connect failed: {:?}", step.rejection);
        ids.push(action);
        state = step.state;
    }
    (state, ids)
}

/// Sequence numbers of a condition's action edges keyed by target, sorted by target id.
#[allow(dead_code)]
pub fn sequences(state: &StrategyState, condition: &str) -> Vec<(String, u32)> {
    let mut seqs: Vec<(String, u32)> = state
        .graph
        .edges
        .iter()
        .filter(|e| e.is_action_edge() && e.source == condition)
        .map(|e| (e.target.clone(), e.sequence().unwrap_or(0)))
        .collect();
    seqs.sort();
    seqs
}

/// A filled-in sub-section comparing `lhs[.column]` against a literal.
#[allow(dead_code)]
pub fn literal_sub(id: &str, lhs: &str, column: Option<&str>, operator: &str, value: &str) -> SubSection {
    let mut sub = SubSection::empty(id);
    sub.lhs = Some(lhs.to_string());
    sub.column = column.map(str::to_string);
    sub.operator = Some(operator.to_string());
    sub.set_literal(value);
    sub
}

/// A condition node holding a single block of the given sub-sections.
#[allow(dead_code)]
pub fn condition_with(name: &str, subs: Vec<SubSection>) -> ConditionNode {
    let mut block = Block::new("block_1", SubSection::empty("unused"));
    block.sub_sections = subs;
    ConditionNode::new(name, block)
}

/// A sell leg with a percentage target and a currency stop loss.
#[allow(dead_code)]
pub fn protected_leg(leg_id: &str) -> PositionLeg {
    let mut leg = PositionLeg::new(leg_id);
    leg.is_target = true;
    leg.target_on = Unit::Percent;
    leg.target_value = 40.0;
    leg.is_sl = true;
    leg.sl_on = Unit::Currency;
    leg.sl_value = 25.0;
    leg
}

/// Settings shared by payload fixtures.
#[allow(dead_code)]
pub fn sample_settings() -> Settings {
    Settings {
        underlying: "NIFTY".to_string(),
        strategy_type: "intraday".to_string(),
        timeframe: 5,
        trading_days: "all".to_string(),
        trading_days_list: vec![1, 2, 3, 4, 5],
        product_type: "MIS".to_string(),
        order_type: "market".to_string(),
        squareoff_time: Some("15:15".to_string()),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn spot_def() -> DataPointDef {
    DataPointDef {
        name: "spotNF".to_string(),
        kind: DataKind::CandleData,
        params: Map::new(),
    }
}

#[allow(dead_code)]
pub fn ema_def() -> IndicatorDef {
    IndicatorDef {
        name: "ema20".to_string(),
        indicator: IndicatorKind::Ema,
        on_data: "spotNF".to_string(),
        on_entire_data: false,
        columns: Vec::new(),
        params: IndicatorParams {
            length: 20,
            offset: None,
            multiplier: None,
        },
    }
}

/// A saved payload with one condition feeding one action.
#[allow(dead_code)]
pub const SAMPLE_PAYLOAD_JSON: &str = r#"{
  "strategyName": "Opening Range",
  "settings": {
    "underlying": "NIFTY",
    "strategy_type": "intraday",
    "timeframe": 5,
    "tradingDays": "all",
    "tradingDaysList": [1, 2, 3, 4, 5],
    "productType": "MIS",
    "entryOperation": {},
    "exitOperation": {},
    "orderType": "market"
  },
  "data": [
    { "name": "spotNF", "type": "candleData", "params": { "symbol": "NIFTY" } }
  ],
  "indicators": [
    {
      "name": "ema20",
      "indicator": "ema",
      "onData": "spotNF",
      "onEntireData": false,
      "columns": [],
      "params": { "length": 20 }
    }
  ],
  "actions": {
    "action_0000000a": {
      "description": "Sell straddle",
      "act": [
        {
          "func": "addLeg",
          "params": {
            "legID": "leg_1",
            "segment": "OPT",
            "transactionType": "sell",
            "optionType": "CE",
            "qty": 50,
            "strikeBy": "moneyness",
            "strikeVal": "ATM",
            "expType": "weekly",
            "expNo": 0,
            "isSL": true,
            "SLon": "val",
            "SLvalue": 30.0
          }
        },
        { "func": "squareoff_all" }
      ]
    }
  },
  "conditions": {
    "condition_00000001": {
      "node": "condition_00000001",
      "type": "entry",
      "description": "Breakout",
      "maxentries": 2,
      "check_when_position_open": false,
      "check_when_trigger_open": true,
      "actions": ["action_0000000a"],
      "conditions": [
        [["spotNF.close", "is_above", "spotNF.high.prev"], "or", ["ema20", "crosses_above", 20000]],
        "and",
        [["day_of_week", "equals", "monday"]]
      ]
    }
  },
  "conditions_seq": ["condition_00000001"],
  "conditions_loc": [
    { "id": "start", "type": "START", "position": { "x": 0.0, "y": 0.0 } },
    { "id": "condition_00000001", "type": "CONDITION", "position": { "x": 0.0, "y": 150.0 } },
    { "id": "action_0000000a", "type": "ACTION", "position": { "x": 400.0, "y": 150.0 } }
  ],
  "actions_loc": [
    {
      "id": "e_start_condition_00000001",
      "source": "start",
      "target": "condition_00000001",
      "sourceHandle": "start-bottom",
      "targetHandle": "condition_00000001-top",
      "type": "conditionEdge"
    },
    {
      "id": "e_condition_00000001_action_0000000a",
      "source": "condition_00000001",
      "target": "action_0000000a",
      "sourceHandle": "condition_00000001-right",
      "targetHandle": "action_0000000a-left",
      "type": "actionEdge",
      "data": { "sequence": 1, "sourceCondition": "condition_00000001" }
    }
  ]
}"#;
