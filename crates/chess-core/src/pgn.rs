//! PGN comment command helpers.
//!
//! Board markup travels inside PGN comments as `[%csl Gd4,Re5]` commands.
//! These helpers split a raw comment into free text and square highlights,
//! and render highlights back.

use std::sync::LazyLock;

use regex::Regex;

static CSL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[%csl\s+([^\]]*)\]").expect("valid csl regex"));

static HIGHLIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([GRYB])([a-h][1-8])$").expect("valid highlight regex"));

/// One highlighted square, e.g. d4 in green.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub square: String,
    pub color: String,
}

/// A PGN comment with its markup separated out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentParts {
    pub text: Option<String>,
    pub highlights: Vec<Highlight>,
}

fn color_name(letter: &str) -> &'static str {
    match letter {
        "R" => "red",
        "Y" => "yellow",
        "B" => "blue",
        _ => "green",
    }
}

fn color_letter(name: &str) -> Option<char> {
    match name.to_ascii_lowercase().as_str() {
        "green" | "g" => Some('G'),
        "red" | "r" => Some('R'),
        "yellow" | "y" => Some('Y'),
        "blue" | "b" => Some('B'),
        _ => None,
    }
}

/// Split a raw comment body into free text and `[%csl]` highlights.
/// Malformed highlight tokens are dropped.
pub fn split_comment(raw: &str) -> CommentParts {
    let mut highlights = Vec::new();

    for cap in CSL_RE.captures_iter(raw) {
        for token in cap[1].split(',') {
            if let Some(m) = HIGHLIGHT_RE.captures(token.trim()) {
                highlights.push(Highlight {
                    square: m[2].to_string(),
                    color: color_name(&m[1]).to_string(),
                });
            }
        }
    }

    let stripped = CSL_RE.replace_all(raw, "");
    let text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    CommentParts {
        text: if text.is_empty() { None } else { Some(text) },
        highlights,
    }
}

/// Render a comment body: the `[%csl]` command first, then the text.
/// Returns `None` when there is nothing to write.
pub fn format_comment(text: Option<&str>, highlights: &[Highlight]) -> Option<String> {
    let tokens: Vec<String> = highlights
        .iter()
        .filter_map(|h| color_letter(&h.color).map(|c| format!("{c}{}", h.square)))
        .collect();

    let mut out = String::new();
    if !tokens.is_empty() {
        out.push_str(&format!("[%csl {}]", tokens.join(",")));
    }
    if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        // A closing brace would end the comment early.
        out.push_str(&text.replace('}', ")"));
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
