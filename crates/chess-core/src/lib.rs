//! Shared chess vocabulary for the gamebox workspace.
//!
//! Owns the position codec seam: everything that needs chess rules (legality,
//! FEN, SAN) goes through [`codec::PositionCodec`], backed by shakmaty.

pub mod codec;
pub mod error;
pub mod game_data;
pub mod pgn;

pub use codec::{
    encode_position, parse_position, play_move, PositionCodec, ShakmatyCodec, STANDARD_START_FEN,
};
pub use error::CodecError;
pub use game_data::{AppliedMove, GameMetadata, MoveDescriptor, Side};
