//! Line commands driving a navigator.

use std::fs;
use std::io::Write;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use chess_core::MoveDescriptor;
use move_tree::{persist, pgn, Annotation, GameDocument, Navigator, Path};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(MoveDescriptor),
    Prev,
    Next,
    Back,
    Fwd,
    Goto(Path),
    Promote(Path),
    Delete(Path),
    Comment(String),
    Nag(u8),
    Uncomment,
    Undo,
    Fen(String),
    Show,
    Pgn,
    Save(String),
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "move" => Command::Move(rest.parse()?),
            "prev" => Command::Prev,
            "next" => Command::Next,
            "back" => Command::Back,
            "fwd" => Command::Fwd,
            "goto" => Command::Goto(rest.parse()?),
            "promote" => Command::Promote(rest.parse()?),
            "delete" => Command::Delete(rest.parse()?),
            "comment" if !rest.is_empty() => Command::Comment(rest.to_string()),
            "nag" => Command::Nag(
                rest.trim_start_matches('$')
                    .parse()
                    .with_context(|| format!("Bad NAG '{rest}'"))?,
            ),
            "uncomment" => Command::Uncomment,
            "undo" => Command::Undo,
            "fen" if !rest.is_empty() => Command::Fen(rest.to_string()),
            "show" => Command::Show,
            "pgn" => Command::Pgn,
            "save" if !rest.is_empty() => Command::Save(rest.to_string()),
            "quit" | "exit" => Command::Quit,
            "" => bail!("Empty command"),
            _ => bail!("Unknown command '{line}'"),
        };
        Ok(command)
    }
}

/// Load a `.pgn` or stored `.json` game.
pub fn load_file(path: &str, navigator: &Navigator) -> anyhow::Result<GameDocument> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let document = if path.ends_with(".json") {
        persist::from_json(&text, navigator.codec())?
    } else {
        pgn::read_game(&text)?
    };
    Ok(document)
}

pub struct Session {
    navigator: Navigator,
}

impl Session {
    pub fn new(navigator: Navigator) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Run one command, writing its output. Returns `false` on `quit`.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> anyhow::Result<bool> {
        let nav = &mut self.navigator;
        match command {
            Command::Move(mv) => {
                nav.apply_move(&mv)?;
            }
            Command::Prev => {
                nav.prev();
            }
            Command::Next => {
                nav.next();
            }
            Command::Back => {
                nav.backward();
            }
            Command::Fwd => {
                nav.forward();
            }
            Command::Goto(path) => nav.goto(path),
            Command::Promote(path) => {
                if !nav.promote_variation(&path)? {
                    writeln!(out, "nothing to promote at {path}")?;
                }
            }
            Command::Delete(path) => {
                if !nav.delete_variation(&path)? {
                    writeln!(out, "nothing to delete at {path}")?;
                }
            }
            Command::Comment(text) => {
                let path = nav.current_path().clone();
                let node = nav.current_node().ok_or_else(|| anyhow!("No move at {path}"))?;
                let mut annotations: Vec<Annotation> = node
                    .annotations()
                    .iter()
                    .filter(|a| !a.is_text())
                    .cloned()
                    .collect();
                annotations.push(Annotation::text(text));
                nav.set_annotations_at_path(&path, annotations)?;
            }
            Command::Nag(code) => {
                let path = nav.current_path().clone();
                let node = nav.current_node().ok_or_else(|| anyhow!("No move at {path}"))?;
                let mut annotations = node.annotations().to_vec();
                annotations.push(Annotation::glyph(code));
                nav.set_annotations_at_path(&path, annotations)?;
            }
            Command::Uncomment => {
                let path = nav.current_path().clone();
                nav.delete_comment(&path)?;
            }
            Command::Undo => {
                if !nav.undo()? {
                    writeln!(out, "nothing to undo")?;
                }
            }
            Command::Fen(fen) => nav.load_from_encoding(&fen)?,
            Command::Show => {
                writeln!(out, "{}", pgn::movetext(nav.mainline()))?;
                if let Some(node) = nav.current_node() {
                    writeln!(out, "{} {}", node.notation(), describe_annotations(node.annotations()))?;
                }
            }
            Command::Pgn => write!(out, "{}", pgn::write_pgn(nav.document()))?,
            Command::Save(file) => {
                let json = persist::to_json(nav.document())?;
                fs::write(&file, json).with_context(|| format!("Failed to write {file}"))?;
                tracing::info!(file = %file, "Saved game");
            }
            Command::Quit => return Ok(false),
        }

        writeln!(out, "{} {}", nav.current_path(), nav.current_position())?;
        Ok(true)
    }
}

fn describe_annotations(annotations: &[Annotation]) -> String {
    annotations
        .iter()
        .map(|a| match a {
            Annotation::Text { body } => format!("{{{body}}}"),
            Annotation::Glyph { code } => move_tree::annotation::glyph_symbol(*code)
                .map(str::to_string)
                .unwrap_or_else(|| format!("${code}")),
            Annotation::SquareHighlight { square, color } => format!("[{color} {square}]"),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
