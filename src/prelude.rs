//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the stratgraph crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use stratgraph::prelude::*;
//!
//! # fn run_example() -> Result<(), Box<dyn std::error::Error>> {
//! let json = std::fs::read_to_string("path/to/payload.json")?;
//! let payload = Payload::from_json(&json)?;
//!
//! let state = Reformer::new().reform(&payload)?;
//! let recompiled = Compiler::builder(&state).build().compile();
//! assert_eq!(recompiled.conditions_seq, payload.conditions_seq);
//! # Ok(())
//! # }
//! ```

// Editing
pub use crate::engine::{Command, GraphEngine, Layout, Transition};

// Compilation and reform
pub use crate::payload::{Compiler, Payload, Reformer, compile, reform};

// Graph and node state
pub use crate::action::{ActionNode, Item, ItemBody, PositionLeg, StructuralAction, Unit};
pub use crate::condition::{
    Block, ConditionMeta, ConditionNode, ConditionType, ElementRef, Period, Relation, SubSection,
};
pub use crate::graph::{Edge, EdgeKind, HandleRef, HandleSide, Node, NodeKind, Position, StrategyGraph};
pub use crate::state::{Settings, StrategyState};

// Elements
pub use crate::elements::{DataKind, DataPoint, Indicator, IndicatorKind, IndicatorParams};
pub use crate::registry::{ElementCatalog, ElementOptions, ElementRegistry};

// Error types
pub use crate::error::{GraphError, PayloadError, ReformError};
