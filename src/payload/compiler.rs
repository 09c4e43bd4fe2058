use super::Payload;
use crate::action::compile_action;
use crate::condition::compile_condition;
use crate::graph::NodeKind;
use crate::registry::{ElementCatalog, ElementOptions, ElementRegistry};
use crate::state::StrategyState;
use tracing::debug;

/// Turns a [`StrategyState`] snapshot into the backend [`Payload`].
pub struct Compiler<'a> {
    state: &'a StrategyState,
    registry: Box<dyn ElementRegistry>,
}

pub struct CompilerBuilder<'a> {
    state: &'a StrategyState,
    catalog: ElementCatalog,
    custom: Option<Box<dyn ElementRegistry>>,
}

impl<'a> CompilerBuilder<'a> {
    pub fn new(state: &'a StrategyState) -> Self {
        Self {
            state,
            catalog: state.catalog(),
            custom: None,
        }
    }

    /// Overrides or adds a single element in the registry derived from the state.
    pub fn with_element(mut self, name: &str, options: ElementOptions) -> Self {
        self.catalog.insert(name, options);
        self
    }

    /// Replaces the derived registry entirely.
    pub fn with_registry(mut self, registry: Box<dyn ElementRegistry>) -> Self {
        self.custom = Some(registry);
        self
    }

    pub fn build(self) -> Compiler<'a> {
        let registry: Box<dyn ElementRegistry> = match self.custom {
            Some(custom) => custom,
            None => Box::new(self.catalog),
        };
        Compiler {
            state: self.state,
            registry,
        }
    }
}

impl<'a> Compiler<'a> {
    pub fn builder(state: &'a StrategyState) -> CompilerBuilder<'a> {
        CompilerBuilder::new(state)
    }

    pub fn registry(&self) -> &dyn ElementRegistry {
        self.registry.as_ref()
    }

    /// Compiles the snapshot. Entries whose node is missing from the graph
    /// and blocks with incomplete comparisons are left out.
    pub fn compile(&self) -> Payload {
        let state = self.state;
        let graph = &state.graph;
        let is_kind = |id: &str, kind: NodeKind| graph.node(id).is_some_and(|n| n.kind == kind);

        let conditions = state
            .conditions
            .iter()
            .filter(|(id, _)| {
                let present = is_kind(id.as_str(), NodeKind::Condition);
                if !present {
                    debug!(node = %id, "skipping condition state without a graph node");
                }
                present
            })
            .map(|(id, condition)| {
                let compiled = compile_condition(
                    id,
                    condition,
                    graph.action_targets(id),
                    self.registry.as_ref(),
                );
                (id.clone(), compiled)
            })
            .collect();

        let actions = state
            .actions
            .iter()
            .filter(|(id, _)| is_kind(id.as_str(), NodeKind::Action))
            .map(|(id, action)| (id.clone(), compile_action(action)))
            .collect();

        Payload {
            strategy_name: state.name.clone(),
            settings: state.settings.clone(),
            data: state.data_points.iter().map(|d| d.to_def()).collect(),
            indicators: state.indicators.iter().map(|i| i.to_def()).collect(),
            actions,
            conditions,
            conditions_seq: graph.condition_chain(),
            conditions_loc: graph.nodes.clone(),
            actions_loc: graph.edges.clone(),
            stratinfo: state.strat_info.clone(),
        }
    }
}

/// Compiles a snapshot with the registry derived from its own elements.
pub fn compile(state: &StrategyState) -> Payload {
    Compiler::builder(state).build().compile()
}
