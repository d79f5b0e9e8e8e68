//! Codec error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid position encoding: {0}")]
    InvalidEncoding(String),

    #[error("Illegal move '{0}': {1}")]
    IllegalMove(String, String),

    #[error("Invalid move descriptor: {0}")]
    InvalidDescriptor(String),
}
