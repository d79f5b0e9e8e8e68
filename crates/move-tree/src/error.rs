//! Move tree error types

use chess_core::CodecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PGN read error: {0}")]
    Pgn(#[from] std::io::Error),

    #[error("No game found in PGN input")]
    EmptyPgn,
}

impl TreeError {
    /// True when the codec refused the move, as opposed to a broken encoding
    /// or an internal failure.
    pub fn is_illegal_move(&self) -> bool {
        matches!(self, TreeError::Codec(CodecError::IllegalMove(..)))
    }
}
