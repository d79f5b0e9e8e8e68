//! Position codec: the only place chess rules are consulted.
//!
//! Positions travel through the rest of the workspace as opaque FEN strings.

use shakmaty::{
    fen::Fen, san::San, uci::UciMove, CastlingMode, Chess, EnPassantMode, Move, Position,
};

use crate::error::CodecError;
use crate::game_data::{AppliedMove, MoveDescriptor, Side};

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Validates positions and executes moves against them.
pub trait PositionCodec {
    /// Encoding of the position a new game starts from.
    fn initial_encoding(&self) -> String;

    fn validate_encoding(&self, encoding: &str) -> Result<(), CodecError>;

    /// Execute `mv` in `encoding`. Illegal moves are reported as
    /// [`CodecError::IllegalMove`]; the caller's state is never touched.
    fn apply_move(&self, encoding: &str, mv: &MoveDescriptor) -> Result<AppliedMove, CodecError>;
}

/// Standard chess rules via shakmaty.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyCodec;

impl ShakmatyCodec {
    pub fn new() -> Self {
        Self
    }
}

/// Parse a FEN string into a playable position.
pub fn parse_position(encoding: &str) -> Result<Chess, CodecError> {
    let fen: Fen = encoding
        .trim()
        .parse()
        .map_err(|e| CodecError::InvalidEncoding(format!("{encoding}: {e}")))?;
    fen.into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| CodecError::InvalidEncoding(format!("{encoding}: {e}")))
}

/// FEN for `pos`, writing the en passant square only when a capture is possible.
pub fn encode_position(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Play an already-legal move, returning the successor position and the
/// move as the rest of the workspace sees it.
pub fn play_move(pos: &Chess, mv: Move) -> Result<(Chess, AppliedMove), CodecError> {
    let side = Side::from(pos.turn());
    let uci = mv.to_uci(CastlingMode::Standard).to_string();
    let descriptor: MoveDescriptor = uci.parse()?;
    let san = San::from_move(pos, mv.clone()).to_string();

    let next = pos
        .clone()
        .play(mv)
        .map_err(|e| CodecError::IllegalMove(uci.clone(), e.to_string()))?;

    let suffix = if next.is_checkmate() {
        "#"
    } else if next.is_check() {
        "+"
    } else {
        ""
    };

    let applied = AppliedMove {
        side,
        descriptor,
        encoding: encode_position(&next),
        notation: format!("{san}{suffix}"),
    };
    Ok((next, applied))
}

impl PositionCodec for ShakmatyCodec {
    fn initial_encoding(&self) -> String {
        STANDARD_START_FEN.to_string()
    }

    fn validate_encoding(&self, encoding: &str) -> Result<(), CodecError> {
        parse_position(encoding).map(|_| ())
    }

    fn apply_move(&self, encoding: &str, mv: &MoveDescriptor) -> Result<AppliedMove, CodecError> {
        let pos = parse_position(encoding)?;
        let uci_text = mv.to_uci();

        let uci: UciMove = uci_text
            .parse()
            .map_err(|_| CodecError::InvalidDescriptor(uci_text.clone()))?;
        let legal = uci.to_move(&pos).map_err(|e| {
            tracing::debug!(uci = %uci_text, fen = %encoding, "rejected illegal move");
            CodecError::IllegalMove(uci_text.clone(), e.to_string())
        })?;

        play_move(&pos, legal).map(|(_, applied)| applied)
    }
}
