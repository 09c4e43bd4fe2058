//! Action nodes: ordered position legs and structural actions, and their
//! compile/reform pair.

pub mod compiler;
pub mod model;
pub mod reform;

pub use compiler::*;
pub use model::*;
pub use reform::*;
