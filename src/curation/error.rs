use thiserror::Error;

/// Errors that can occur during playlist generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Ruleset not found: {0}")]
    RulesetNotFound(String),

    #[error("Source playlist not found: {0}")]
    SourcePlaylistNotFound(String),

    #[error("A playlist named '{0}' already exists")]
    NameConflict(String),

    #[error("No valid items found for the playlist")]
    EmptyResult,

    #[error("Store error: {0}")]
    Store(anyhow::Error),

    #[error("Catalog error: {0}")]
    Catalog(anyhow::Error),
}

impl GenerationError {
    /// Whether the error is a policy rejection rather than an upstream failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            GenerationError::InvalidRequest(_)
                | GenerationError::RulesetNotFound(_)
                | GenerationError::SourcePlaylistNotFound(_)
                | GenerationError::NameConflict(_)
                | GenerationError::EmptyResult
        )
    }
}
