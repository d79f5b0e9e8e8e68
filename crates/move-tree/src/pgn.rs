//! PGN import and export for game documents.
//!
//! Import runs a pgn-reader visitor that builds the move tree directly,
//! keeping variations, NAGs, comments and `[%csl]` square highlights.
//! Export renders the tree back to movetext.
//!
//! A comment ahead of the first mainline move is kept verbatim under the
//! [`GAME_COMMENT_KEY`] metadata entry and written back before the movetext.
//! A comment ahead of the first move of a variation is attached to that move.

use std::ops::ControlFlow;

use chess_core::pgn::{format_comment, split_comment, Highlight};
use chess_core::{parse_position, play_move, GameMetadata, Side, STANDARD_START_FEN};
use pgn_reader::{Nag, RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::Chess;

use crate::annotation::Annotation;
use crate::document::GameDocument;
use crate::error::TreeError;
use crate::node::{MoveNode, Variation};

const ROSTER: [(&str, &str); 7] = [
    ("Event", "?"),
    ("Site", "?"),
    ("Date", "????.??.??"),
    ("Round", "?"),
    ("White", "?"),
    ("Black", "?"),
    ("Result", "*"),
];

const LINE_WIDTH: usize = 80;

/// Metadata key holding the comment that precedes the first move.
pub const GAME_COMMENT_KEY: &str = "GameComment";

/// One line under construction: the main line or an open variation.
struct Frame {
    moves: Vec<MoveNode>,
    position: Chess,
    /// Position before the last move, where an alternative to it starts.
    before_last: Option<Chess>,
    /// Annotations seen before the first move of this line.
    pending: Vec<Annotation>,
    /// Raw bytes of a comment the reader delivers in pieces.
    comment: Vec<u8>,
    /// Set after an illegal move; the rest of the line is ignored.
    broken: bool,
}

impl Frame {
    fn new(position: Chess) -> Self {
        Self {
            moves: Vec::new(),
            position,
            before_last: None,
            pending: Vec::new(),
            comment: Vec::new(),
            broken: false,
        }
    }

    fn annotate(&mut self, annotation: Annotation) {
        match self.moves.last_mut() {
            Some(node) => node.push_annotation(annotation),
            None => self.pending.push(annotation),
        }
    }
}

struct Movetext {
    start_position: String,
    metadata: GameMetadata,
    frames: Vec<Frame>,
    /// Comment text ahead of the first mainline move.
    intro: String,
}

impl Movetext {
    fn top(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Turn the buffered comment of the innermost line into annotations.
    fn flush_comment(&mut self) {
        let at_game_start = self.frames.len() == 1;
        let frame = self.top();
        let raw = std::mem::take(&mut frame.comment);
        if raw.is_empty() || frame.broken {
            return;
        }
        let raw = String::from_utf8_lossy(&raw).into_owned();

        if at_game_start && frame.moves.is_empty() {
            let text = raw.trim();
            if !text.is_empty() {
                if !self.intro.is_empty() {
                    self.intro.push(' ');
                }
                self.intro.push_str(text);
            }
            return;
        }

        let parts = split_comment(&raw);
        let frame = self.top();
        if let Some(text) = parts.text {
            frame.annotate(Annotation::text(text));
        }
        for highlight in parts.highlights {
            frame.annotate(Annotation::highlight(highlight.square, highlight.color));
        }
    }

    /// Close the innermost variation, hanging it off the move it replaces.
    /// Alternatives to the variation's first move start from the same
    /// position, so they become siblings of the variation.
    fn close_variation(&mut self) {
        if self.frames.len() < 2 {
            return;
        }
        self.flush_comment();
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let mut moves = frame.moves;
        if moves.is_empty() {
            return;
        }
        if let Some(anchor) = self.top().moves.last_mut() {
            let nested = moves[0].take_variations();
            anchor.variations_mut().push(Variation::from(moves));
            anchor.variations_mut().extend(nested);
        }
    }
}

/// Visitor that turns each PGN game into a [`GameDocument`].
#[derive(Default)]
struct DocumentBuilder {
    illegal_moves: usize,
}

impl Visitor for DocumentBuilder {
    type Tags = GameMetadata;
    type Movetext = Movetext;
    type Output = Result<GameDocument, TreeError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameMetadata::new())
    }

    fn tag(&mut self, tags: &mut Self::Tags, name: &[u8], value: RawTag<'_>) -> ControlFlow<Self::Output> {
        let name = String::from_utf8_lossy(name).into_owned();
        tags.set(name, value.decode_utf8_lossy().into_owned());
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, mut tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        tags.remove("SetUp");
        let start_position = tags
            .remove("FEN")
            .unwrap_or_else(|| STANDARD_START_FEN.to_string());

        let position = match parse_position(&start_position) {
            Ok(pos) => pos,
            Err(e) => return ControlFlow::Break(Err(e.into())),
        };

        ControlFlow::Continue(Movetext {
            start_position,
            metadata: tags,
            frames: vec![Frame::new(position)],
            intro: String::new(),
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        movetext.flush_comment();
        let frame = movetext.top();
        if frame.broken {
            return ControlFlow::Continue(());
        }

        let played = san_plus
            .san
            .to_move(&frame.position)
            .map_err(|e| e.to_string())
            .and_then(|mv| play_move(&frame.position, mv).map_err(|e| e.to_string()));

        match played {
            Ok((next, applied)) => {
                let mut node = MoveNode::from(applied);
                if !frame.pending.is_empty() {
                    node.set_annotations(std::mem::take(&mut frame.pending));
                }
                frame.before_last = Some(std::mem::replace(&mut frame.position, next));
                frame.moves.push(node);
            }
            Err(e) => {
                self.illegal_moves += 1;
                tracing::warn!(san = %san_plus, error = %e, "Illegal move in PGN, dropping rest of line");
                frame.broken = true;
            }
        }
        ControlFlow::Continue(())
    }

    fn nag(&mut self, movetext: &mut Self::Movetext, nag: Nag) -> ControlFlow<Self::Output> {
        movetext.flush_comment();
        let frame = movetext.top();
        if !frame.broken {
            frame.annotate(Annotation::glyph(nag.0));
        }
        ControlFlow::Continue(())
    }

    // Comments longer than the reader's buffer arrive as partial pieces
    // followed by a final `comment` call.
    fn partial_comment(
        &mut self,
        movetext: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        movetext.top().comment.extend_from_slice(comment.as_bytes());
        ControlFlow::Continue(())
    }

    fn comment(&mut self, movetext: &mut Self::Movetext, comment: RawComment<'_>) -> ControlFlow<Self::Output> {
        movetext.top().comment.extend_from_slice(comment.as_bytes());
        movetext.flush_comment();
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, movetext: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        movetext.flush_comment();
        // Always open a frame so that every end_variation has one to close.
        let top = movetext.top();
        let frame = match (&top.before_last, top.broken) {
            (Some(before), false) => Frame::new(before.clone()),
            _ => {
                let mut orphan = Frame::new(top.position.clone());
                orphan.broken = true;
                orphan
            }
        };
        movetext.frames.push(frame);
        ControlFlow::Continue(Skip(false))
    }

    fn end_variation(&mut self, movetext: &mut Self::Movetext) -> ControlFlow<Self::Output> {
        movetext.close_variation();
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, mut movetext: Self::Movetext) -> Self::Output {
        while movetext.frames.len() > 1 {
            movetext.close_variation();
        }
        movetext.flush_comment();
        if !movetext.intro.is_empty() {
            movetext.metadata.set(GAME_COMMENT_KEY, movetext.intro);
        }
        let mainline = movetext
            .frames
            .pop()
            .map(|frame| Variation::from(frame.moves))
            .unwrap_or_default();

        Ok(GameDocument::from_parts(
            movetext.start_position,
            mainline,
            movetext.metadata,
        ))
    }
}

/// Parse every game in `pgn`.
pub fn read_games(pgn: &str) -> Result<Vec<GameDocument>, TreeError> {
    let mut reader = Reader::new(pgn.as_bytes());
    let mut builder = DocumentBuilder::default();
    let mut games = Vec::new();

    while let Some(game) = reader.read_game(&mut builder)? {
        games.push(game?);
    }

    tracing::debug!(
        games = games.len(),
        illegal_moves = builder.illegal_moves,
        "Read PGN"
    );
    Ok(games)
}

/// Parse the first game in `pgn`.
pub fn read_game(pgn: &str) -> Result<GameDocument, TreeError> {
    read_games(pgn)?.into_iter().next().ok_or(TreeError::EmptyPgn)
}

fn move_number(node: &MoveNode) -> u32 {
    // Fullmove counter of the position after the move; it only advances
    // after Black has moved.
    let after = node
        .position()
        .split_whitespace()
        .nth(5)
        .and_then(|n| n.parse::<u32>().ok())
        .unwrap_or(1);
    match node.side() {
        Side::White => after,
        Side::Black => after.saturating_sub(1).max(1),
    }
}

fn comment_for(node: &MoveNode) -> Option<String> {
    let texts: Vec<&str> = node
        .annotations()
        .iter()
        .filter_map(|a| match a {
            Annotation::Text { body } => Some(body.as_str()),
            _ => None,
        })
        .collect();
    let highlights: Vec<Highlight> = node
        .annotations()
        .iter()
        .filter_map(|a| match a {
            Annotation::SquareHighlight { square, color } => Some(Highlight {
                square: square.clone(),
                color: color.clone(),
            }),
            _ => None,
        })
        .collect();

    let text = texts.join(" ");
    format_comment(Some(text.as_str()).filter(|t| !t.is_empty()), &highlights)
}

fn write_line(line: &Variation, tokens: &mut Vec<String>) {
    let mut need_number = true;

    for node in line {
        let number = move_number(node);
        match node.side() {
            Side::White => tokens.push(format!("{number}.")),
            Side::Black if need_number => tokens.push(format!("{number}...")),
            Side::Black => {}
        }
        tokens.push(node.notation().to_string());
        need_number = false;

        for code in node.glyphs() {
            tokens.push(format!("${code}"));
        }
        if let Some(comment) = comment_for(node) {
            tokens.push(format!("{{{comment}}}"));
            need_number = true;
        }
        for variation in node.variations() {
            let mut inner = Vec::new();
            write_line(variation, &mut inner);
            tokens.push(format!("({})", inner.join(" ")));
            need_number = true;
        }
    }
}

/// Render tags and movetext.
pub fn write_pgn(document: &GameDocument) -> String {
    let metadata = document.metadata();
    let mut out = String::new();

    for (name, default) in ROSTER {
        let value = metadata.get(name).unwrap_or(default);
        out.push_str(&format!("[{name} \"{}\"]\n", escape_tag(value)));
    }
    for (name, value) in metadata.iter() {
        if name == GAME_COMMENT_KEY || ROSTER.iter().any(|(n, _)| *n == name) {
            continue;
        }
        out.push_str(&format!("[{name} \"{}\"]\n", escape_tag(value)));
    }
    if document.start_position() != STANDARD_START_FEN {
        out.push_str("[SetUp \"1\"]\n");
        out.push_str(&format!("[FEN \"{}\"]\n", document.start_position()));
    }
    out.push('\n');

    let mut tokens = Vec::new();
    if let Some(intro) = metadata.get(GAME_COMMENT_KEY) {
        tokens.push(format!("{{{}}}", intro.replace('}', ")")));
    }
    write_line(document.mainline(), &mut tokens);
    tokens.push(metadata.result().to_string());

    let mut width = 0;
    for token in tokens {
        if width > 0 && width + 1 + token.len() > LINE_WIDTH {
            out.push('\n');
            width = 0;
        } else if width > 0 {
            out.push(' ');
            width += 1;
        }
        width += token.len();
        out.push_str(&token);
    }
    out.push('\n');
    out
}

fn escape_tag(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Movetext only, without tags or result; handy for logs and tests.
pub fn movetext(line: &Variation) -> String {
    let mut tokens = Vec::new();
    write_line(line, &mut tokens);
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Path;

    const ANNOTATED: &str = r#"[Event "Club night"]
[White "Anna"]
[Black "Ben"]
[Result "1-0"]

1. e4 e5 (1... c5 2. Nf3) 2. Nf3 $1 {Develops [%csl Ge5]} Nc6 1-0
"#;

    #[test]
    fn test_import_variations_and_annotations() {
        let doc = read_game(ANNOTATED).unwrap();
        assert_eq!(doc.metadata().white(), "Anna");
        assert_eq!(doc.metadata().result(), "1-0");

        let line: Vec<&str> = doc.mainline().iter().map(MoveNode::notation).collect();
        assert_eq!(line, vec!["e4", "e5", "Nf3", "Nc6"]);

        let alt = doc.node_at(&"1/v0/1".parse().unwrap()).unwrap();
        assert_eq!(alt.notation(), "Nf3");

        let nf3 = doc.node_at(&Path::mainline(2)).unwrap();
        assert_eq!(
            nf3.annotations(),
            &[
                Annotation::glyph(1),
                Annotation::text("Develops"),
                Annotation::highlight("e5", "green"),
            ]
        );
    }

    #[test]
    fn test_export_movetext() {
        let doc = read_game(ANNOTATED).unwrap();
        assert_eq!(
            movetext(doc.mainline()),
            "1. e4 e5 (1... c5 2. Nf3) 2. Nf3 $1 {[%csl Ge5] Develops} 2... Nc6"
        );

        let pgn = write_pgn(&doc);
        assert!(pgn.starts_with("[Event \"Club night\"]\n[Site \"?\"]\n"));
        assert!(pgn.trim_end().ends_with("1-0"));

        let again = read_game(&pgn).unwrap();
        assert_eq!(again.mainline(), doc.mainline());
    }

    #[test]
    fn test_fen_tag_sets_start_position() {
        let pgn = r#"[SetUp "1"]
[FEN "8/4P3/8/8/8/8/k7/4K3 w - - 0 1"]

1. e8=Q *
"#;
        let doc = read_game(pgn).unwrap();
        assert_eq!(doc.start_position(), "8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        assert_eq!(doc.metadata().get("FEN"), None);
        assert_eq!(doc.mainline().get(0).unwrap().notation(), "e8=Q");

        let out = write_pgn(&doc);
        assert!(out.contains("[FEN \"8/4P3/8/8/8/8/k7/4K3 w - - 0 1\"]"));
    }

    #[test]
    fn test_illegal_move_truncates_line() {
        let doc = read_game("1. e4 e5 2. Ke3 Nc6 *\n").unwrap();
        assert_eq!(doc.mainline().len(), 2);
    }

    #[test]
    fn test_black_to_move_numbering() {
        let pgn = r#"[FEN "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"]

1... e5 2. Nf3 *
"#;
        let doc = read_game(pgn).unwrap();
        assert_eq!(movetext(doc.mainline()), "1... e5 2. Nf3");
    }

    #[test]
    fn test_long_comment_stays_whole() {
        let prose = "The knight heads for d5 via c3 and e2. ".repeat(8);
        let tail = "White keeps a small edge. ".repeat(4);
        let pgn = format!("1. e4 {{{prose}[%csl Gd4,Re5] {tail}}} e5 *\n");
        assert!(pgn.len() > 400);

        let doc = read_game(&pgn).unwrap();
        let e4 = doc.node_at(&Path::mainline(0)).unwrap();
        let expected = format!("{prose}{tail}")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(
            e4.annotations(),
            &[
                Annotation::text(expected),
                Annotation::highlight("d4", "green"),
                Annotation::highlight("e5", "red"),
            ]
        );

        let again = read_game(&write_pgn(&doc)).unwrap();
        assert_eq!(again.mainline(), doc.mainline());
    }

    #[test]
    fn test_game_comment_keeps_its_place() {
        let doc = read_game("{Played in the club final} 1. e4 {Best by test} e5 *\n").unwrap();
        assert_eq!(doc.metadata().get(GAME_COMMENT_KEY), Some("Played in the club final"));
        assert_eq!(doc.node_at(&Path::mainline(0)).unwrap().annotations(), &[Annotation::text("Best by test")]);

        let out = write_pgn(&doc);
        assert!(!out.contains("[GameComment"));
        assert!(out.contains("\n{Played in the club final} 1. e4 {Best by test} 1... e5 *"));

        let again = read_game(&out).unwrap();
        assert_eq!(again.metadata().get(GAME_COMMENT_KEY), Some("Played in the club final"));
        assert_eq!(again.mainline(), doc.mainline());
    }

    #[test]
    fn test_variation_comment_before_first_move() {
        let doc = read_game("1. e4 ({Or} 1. d4) e5 *\n").unwrap();
        let d4 = doc.node_at(&"0/v0/0".parse().unwrap()).unwrap();
        assert_eq!(d4.comment(), Some("Or"));
        assert_eq!(doc.metadata().get(GAME_COMMENT_KEY), None);
    }

    #[test]
    fn test_nested_first_move_alternatives_flattened() {
        let doc = read_game("1. e4 (1. d4 (1. c4)) e5 *\n").unwrap();
        let e4 = doc.node_at(&Path::mainline(0)).unwrap();
        assert_eq!(e4.variations().len(), 2);
        assert_eq!(e4.variations()[0].first().unwrap().notation(), "d4");
        assert!(e4.variations()[0].first().unwrap().variations().is_empty());
        assert_eq!(e4.variations()[1].first().unwrap().notation(), "c4");
        assert_eq!(movetext(doc.mainline()), "1. e4 (1. d4) (1. c4) 1... e5");
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(read_game(""), Err(TreeError::EmptyPgn)));
    }
}
