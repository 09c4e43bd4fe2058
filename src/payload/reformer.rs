use super::Payload;
use crate::action::reform_action;
use crate::condition::reform_condition;
use crate::elements::{DataPoint, Indicator};
use crate::error::ReformError;
use crate::graph::{Node, NodeKind, Position, START_ID, StrategyGraph};
use crate::ids::IdGenerator;
use crate::registry::{ElementCatalog, ElementOptions};
use crate::state::{ActionNodeMap, ConditionBlockMap, StrategyState};
use ahash::AHashSet;
use tracing::{debug, warn};

/// Rebuilds a [`StrategyState`] from a previously compiled [`Payload`].
///
/// Element, block, sub-section and item ids are regenerated; node ids are
/// kept so the graph snapshot still lines up with the node state.
#[derive(Debug, Default)]
pub struct Reformer {
    ids: IdGenerator,
    overrides: Vec<(String, ElementOptions)>,
}

impl Reformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            ids: IdGenerator::seeded(seed),
            overrides: Vec::new(),
        }
    }

    /// Overrides the options the payload's own elements would imply.
    pub fn with_element(mut self, name: &str, options: ElementOptions) -> Self {
        self.overrides.push((name.to_string(), options));
        self
    }

    pub fn reform(&mut self, payload: &Payload) -> Result<StrategyState, ReformError> {
        let mut element_ids = AHashSet::new();
        let mut data_points = Vec::with_capacity(payload.data.len());
        for def in &payload.data {
            let id = self.ids.unique_in("data", &mut element_ids)?;
            data_points.push(DataPoint::from_def(id, def.clone()));
        }
        let mut indicators = Vec::with_capacity(payload.indicators.len());
        for def in &payload.indicators {
            let id = self.ids.unique_in("indicator", &mut element_ids)?;
            indicators.push(Indicator::from_def(id, def.clone()));
        }

        let mut catalog = ElementCatalog::from_elements(&data_points, &indicators);
        for (name, options) in &self.overrides {
            catalog.insert(name, options.clone());
        }

        let mut actions = ActionNodeMap::default();
        for (id, compiled) in &payload.actions {
            actions.insert(id.clone(), reform_action(id, compiled, &mut self.ids)?);
        }

        let mut conditions = ConditionBlockMap::default();
        for (id, compiled) in &payload.conditions {
            if compiled.node != *id {
                warn!(key = %id, node = %compiled.node, "condition key does not match its node id");
            }
            conditions.insert(id.clone(), reform_condition(compiled, &catalog, &mut self.ids)?);
        }

        Ok(StrategyState {
            name: payload.strategy_name.clone(),
            settings: payload.settings.clone(),
            graph: reform_graph(payload),
            conditions,
            actions,
            data_points,
            indicators,
            strat_info: payload.stratinfo.clone(),
        })
    }
}

fn reform_graph(payload: &Payload) -> StrategyGraph {
    let mut graph = StrategyGraph {
        nodes: payload.conditions_loc.clone(),
        edges: payload.actions_loc.clone(),
    };
    if graph.start().is_none() {
        debug!("payload has no START node, inserting one");
        graph
            .nodes
            .insert(0, Node::new(START_ID, NodeKind::Start, Position::default()));
    }
    graph
}

/// Reforms a payload with a fresh, randomly seeded id generator.
pub fn reform(payload: &Payload) -> Result<StrategyState, ReformError> {
    Reformer::new().reform(payload)
}
