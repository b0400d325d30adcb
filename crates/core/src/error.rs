/// Errors produced by the pipeline editor.
///
/// Every rejected operation leaves the editor state exactly as it was before
/// the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Unknown reference: {entity} '{id}'")]
    UnknownReference { entity: &'static str, id: String },

    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for an unknown processor identifier.
    pub fn unknown_processor(id: impl ToString) -> Self {
        Self::UnknownReference {
            entity: "processor",
            id: id.to_string(),
        }
    }

    /// Shorthand for an out-of-range entry index on a processor.
    pub fn unknown_entry(processor_id: impl std::fmt::Display, index: usize) -> Self {
        Self::UnknownReference {
            entity: "entry",
            id: format!("{processor_id}[{index}]"),
        }
    }
}
