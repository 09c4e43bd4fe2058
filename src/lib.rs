//! # stratgraph - Strategy Graph Editing and Compilation Engine
//!
//! **stratgraph** models an automated trading strategy as a directed graph of
//! condition nodes (entry/exit rule groups) and action nodes (order and position
//! operations), keeps that graph consistent under edits, and compiles it into
//! the rule payload an execution or backtesting backend consumes.
//!
//! ## Core Workflow
//!
//! 1.  **Edit**: Drive a [`engine::GraphEngine`] with [`engine::Command`]s. Every command
//!     takes a [`state::StrategyState`] snapshot and returns a new one; rejected commands
//!     hand back the prior snapshot with the reason.
//! 2.  **Compile**: Use [`payload::Compiler::builder`] to turn a snapshot into a
//!     [`payload::Payload`], the JSON contract with the backend.
//! 3.  **Reform**: Use [`payload::Reformer`] to rebuild a snapshot from a saved payload.
//!
//! ## Quick Start
//!
//! ```rust
//! use stratgraph::prelude::*;
//!
//! let mut engine = GraphEngine::builder().seed(7).build();
//! let state = engine.new_state("Breakout");
//!
//! // Chain one condition under START and hang an action off it.
//! let step = engine.apply(&state, Command::InsertCondition { after: None });
//! let condition = step.created.clone().unwrap();
//! let step = engine.apply(&step.state, Command::InsertAction { via: Some(condition.clone()) });
//! let action = step.created.clone().unwrap();
//! let step = engine.apply(
//!     &step.state,
//!     Command::Connect { condition: condition.clone(), action: action.clone() },
//! );
//! assert!(!step.is_rejected());
//!
//! let payload = Compiler::builder(&step.state).build().compile();
//! assert_eq!(payload.conditions_seq, vec![condition.clone()]);
//! assert_eq!(payload.conditions[&condition].actions, vec![action]);
//! ```

pub mod action;
pub mod condition;
pub mod elements;
pub mod engine;
pub mod error;
pub mod graph;
pub mod ids;
pub mod payload;
pub mod prelude;
pub mod registry;
pub mod state;
