use thiserror::Error;

/// Structural violations raised by graph and node-model mutations.
///
/// A mutation that returns one of these leaves the prior snapshot untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("An action edge from '{condition_id}' to '{action_id}' already exists")]
    DuplicateActionEdge {
        condition_id: String,
        action_id: String,
    },

    #[error("Could not generate a unique '{prefix}' id after {attempts} attempts")]
    IdCollision { prefix: String, attempts: u32 },

    #[error("Node '{0}' not found in the strategy graph")]
    NodeNotFound(String),

    #[error("Cannot connect '{source_id}' to '{target_id}': {message}")]
    InvalidConnection {
        source_id: String,
        target_id: String,
        message: String,
    },

    #[error("Condition nodes '{0}' and '{1}' are not adjacent in the condition chain")]
    NotAdjacent(String, String),

    #[error("Block '{block_id}' not found in condition '{condition_id}'")]
    BlockNotFound {
        condition_id: String,
        block_id: String,
    },

    #[error("Sub-section '{sub_section_id}' not found in block '{block_id}'")]
    SubSectionNotFound {
        block_id: String,
        sub_section_id: String,
    },

    #[error("Block relation index {index} is out of range for condition '{condition_id}'")]
    RelationOutOfRange { condition_id: String, index: usize },

    #[error("Item '{item_id}' not found in action node '{action_id}'")]
    ItemNotFound { action_id: String, item_id: String },

    #[error("Edge '{0}' is part of the condition chain and cannot be disconnected directly")]
    ChainEdge(String),

    #[error("The START node cannot be deleted")]
    CannotDeleteStart,
}

/// Errors raised while rebuilding in-memory state from a saved payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReformError {
    #[error("Action '{action_id}' contains an 'addLeg' call without params")]
    MissingLegParams { action_id: String },

    #[error(transparent)]
    Ids(#[from] GraphError),
}

/// Errors raised at the JSON boundary.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to reform payload: {0}")]
    Reform(#[from] ReformError),
}
