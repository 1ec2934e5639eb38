use thiserror::Error;

/// Simplified `Result` using [`ForestError`](crate::ForestError) as error type
pub type Result<T> = std::result::Result<T, ForestError>;

#[derive(Error, Debug, Clone)]
pub enum ForestError {
    /// The forest is configured in a way that does not allow the requested operation
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A count or index lies outside of the permitted range
    #[error("out of range: {0}")]
    Range(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Core(#[from] sylva::error::Error),
}
