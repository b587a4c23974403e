use thiserror::Error;

/// Error types for the engine module
#[derive(Error, Debug)]
pub enum EngineError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A recurring template could not be processed (bad or missing data)
    #[error("Template error: {0}")]
    Template(String),

    /// An alert rule could not be evaluated
    #[error("Rule error: {0}")]
    Rule(String),

    /// A per-item step exceeded its time budget
    #[error("Timed out: {0}")]
    Timeout(String),
}

/// Type alias for Result with EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
