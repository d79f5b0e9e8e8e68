#![allow(dead_code)]

use chess_core::MoveDescriptor;
use move_tree::{Navigator, Path, Variation};

/// Parse a UCI move for tests.
pub fn mv(uci: &str) -> MoveDescriptor {
    uci.parse()
        .unwrap_or_else(|e| panic!("bad test move {uci}: {e}"))
}

/// Parse a textual path (`start`, `2`, `1/v0/0`).
pub fn path(text: &str) -> Path {
    text.parse().unwrap()
}

/// Play a run of UCI moves from the cursor.
pub fn play(nav: &mut Navigator, moves: &[&str]) {
    for uci in moves {
        nav.apply_move(&mv(uci))
            .unwrap_or_else(|e| panic!("move {uci} rejected: {e}"));
    }
}

/// Navigator with the given mainline already played.
pub fn navigator_with(moves: &[&str]) -> Navigator {
    let mut nav = Navigator::standard();
    play(&mut nav, moves);
    nav
}

/// SAN of each ply in a line.
pub fn sans(line: &Variation) -> Vec<&str> {
    line.iter().map(|node| node.notation()).collect()
}
