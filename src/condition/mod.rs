//! Condition nodes: the block model, the dotted path grammar and the
//! compile/reform pair for the nested AND/OR expression format.

pub mod compiler;
pub mod model;
pub mod path;
pub mod reform;

pub use compiler::*;
pub use model::*;
pub use path::*;
pub use reform::*;
