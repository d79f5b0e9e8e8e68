//! Integration tests: PGN import into the move tree, editing, and export.

mod common;

use common::{mv, path, sans};
use move_tree::{pgn, Annotation, GameDocument, Navigator, Path};

/// Exported PGN with line breaks folded, so assertions ignore wrapping.
fn flat_pgn(doc: &GameDocument) -> String {
    pgn::write_pgn(doc).split_whitespace().collect::<Vec<_>>().join(" ")
}

const IMMORTAL_OPENING: &str = r#"[Event "London casual"]
[Site "London ENG"]
[Date "1851.06.21"]
[White "Adolf Anderssen"]
[Black "Lionel Kieseritzky"]
[Result "1-0"]

1. e4 e5 2. f4 $1 {King's Gambit} exf4 (2... d5 {Falkbeer} 3. exd5 (3. Nf3)) 3. Bc4
Qh4+ 4. Kf1 1-0

[Event "Second"]
[Result "*"]

1. d4 d5 *
"#;

#[test]
fn test_reads_every_game() {
    let games = pgn::read_games(IMMORTAL_OPENING).unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(sans(games[1].mainline()), vec!["d4", "d5"]);
    assert_eq!(games[1].metadata().event(), Some("Second"));
}

#[test]
fn test_nested_variations_land_on_the_right_ply() {
    let doc = pgn::read_game(IMMORTAL_OPENING).unwrap();
    assert_eq!(sans(doc.mainline()), vec!["e4", "e5", "f4", "exf4", "Bc4", "Qh4+", "Kf1"]);
    assert_eq!(doc.metadata().black(), "Lionel Kieseritzky");

    let falkbeer = doc.node_at(&path("3/v0/0")).unwrap();
    assert_eq!(falkbeer.notation(), "d5");
    assert_eq!(falkbeer.comment(), Some("Falkbeer"));
    assert_eq!(doc.node_at(&path("3/v0/1")).unwrap().notation(), "exd5");
    assert_eq!(doc.node_at(&path("3/v0/1/v0/0")).unwrap().notation(), "Nf3");

    let f4 = doc.node_at(&path("2")).unwrap();
    assert_eq!(
        f4.annotations(),
        &[Annotation::glyph(1), Annotation::text("King's Gambit")]
    );
}

#[test]
fn test_export_then_import_is_stable() {
    let doc = pgn::read_game(IMMORTAL_OPENING).unwrap();
    let text = pgn::write_pgn(&doc);
    assert!(text.lines().all(|line| line.len() <= 80));

    let flat = flat_pgn(&doc);
    assert!(flat.contains("[White \"Adolf Anderssen\"]"));
    assert!(flat.contains("2. f4 $1 {King's Gambit} 2... exf4 (2... d5 {Falkbeer} 3. exd5 (3. Nf3))"));
    assert!(flat.ends_with("4. Kf1 1-0"));

    let again = pgn::read_game(&text).unwrap();
    assert_eq!(again.mainline(), doc.mainline());
    assert_eq!(again.metadata().white(), "Adolf Anderssen");
    assert_eq!(again.metadata().date(), Some("1851.06.21"));
    assert_eq!(again.metadata().get("Round"), Some("?"));
}

#[test]
fn test_edit_imported_game() {
    let doc = pgn::read_game(IMMORTAL_OPENING).unwrap();
    let mut nav = Navigator::standard();
    nav.load_document(doc);

    nav.goto(path("3/v0/0"));
    assert!(nav.promote_variation(&path("3/v0/0")).unwrap());
    assert_eq!(sans(nav.mainline()), vec!["e4", "e5", "f4", "d5", "exd5"]);
    assert_eq!(nav.current_path(), &Path::start());

    nav.goto(Path::mainline(2));
    nav.apply_move(&mv("f8c5")).unwrap();
    let exported = flat_pgn(nav.document());
    assert!(exported.contains("2... Bc5"));
    assert!(exported.contains("(2... d5 {Falkbeer}"));
    assert!(exported.contains("(2... exf4 3. Bc4 Qh4+ 4. Kf1)"));
}

#[test]
fn test_promoting_imported_sibling_twice_restores_game() {
    let doc = pgn::read_game("1. e4 (1. d4 (1. c4)) e5 *\n").unwrap();
    let mut nav = Navigator::standard();
    nav.load_document(doc.clone());

    assert!(nav.promote_variation(&path("0/v0/0")).unwrap());
    assert_eq!(sans(nav.mainline()), vec!["d4"]);
    let d4 = nav.document().node_at(&Path::mainline(0)).unwrap();
    let firsts: Vec<&str> = d4
        .variations()
        .iter()
        .map(|v| v.first().unwrap().notation())
        .collect();
    assert_eq!(firsts, vec!["e4", "c4"]);

    assert!(nav.promote_variation(&path("0/v0/0")).unwrap());
    assert_eq!(nav.document(), &doc);
}

#[test]
fn test_long_annotated_comment_round_trips() {
    let note = "Black gives up the centre to open lines against the king. ".repeat(6);
    let text = format!("1. e4 e5 2. f4 {{[%csl Rf7,Ye1] {note}}} exf4 *\n");

    let doc = pgn::read_game(&text).unwrap();
    let f4 = doc.node_at(&path("2")).unwrap();
    assert_eq!(f4.annotations().iter().filter(|a| a.is_text()).count(), 1);
    assert_eq!(f4.comment(), Some(note.trim()));
    assert_eq!(
        &f4.annotations()[1..],
        &[Annotation::highlight("f7", "red"), Annotation::highlight("e1", "yellow")]
    );

    let again = pgn::read_game(&pgn::write_pgn(&doc)).unwrap();
    assert_eq!(again.mainline(), doc.mainline());
}
