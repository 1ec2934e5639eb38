//! Error types in Sylva
//!

use thiserror::Error;

use ndarray::ShapeError;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid parameter {0}")]
    Parameters(String),
    #[error("no channel named {0}")]
    MissingChannel(String),
    #[error("channel {name} holds {found} exemplars, expected {expected}")]
    ChannelLength {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("channel {0} has no features")]
    EmptyChannel(String),
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
    #[error("tree operation failed: {0}")]
    Tree(String),
}
