use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Which side played a ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl From<shakmaty::Color> for Side {
    fn from(color: shakmaty::Color) -> Self {
        match color {
            shakmaty::Color::White => Side::White,
            shakmaty::Color::Black => Side::Black,
        }
    }
}

/// A move as the board UI submits it: origin, destination and an optional
/// promotion piece letter (`q`, `r`, `b`, `n`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
}

impl MoveDescriptor {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, piece: char) -> Self {
        self.promotion = Some(piece.to_ascii_lowercase());
        self
    }

    /// UCI text for this move, e.g. `e7e8q`.
    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(p) => format!("{}{}{}", self.from, self.to, p),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

fn is_square(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 2 && (b'a'..=b'h').contains(&b[0]) && (b'1'..=b'8').contains(&b[1])
}

impl FromStr for MoveDescriptor {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(s.len() == 4 || s.len() == 5) {
            return Err(CodecError::InvalidDescriptor(s.to_string()));
        }
        let (from, rest) = s.split_at(2);
        let (to, promo) = rest.split_at(2);
        if !is_square(from) || !is_square(to) {
            return Err(CodecError::InvalidDescriptor(s.to_string()));
        }
        let promotion = match promo.chars().next() {
            None => None,
            Some(c) if "qrbn".contains(c.to_ascii_lowercase()) => Some(c.to_ascii_lowercase()),
            Some(_) => return Err(CodecError::InvalidDescriptor(s.to_string())),
        };
        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
            promotion,
        })
    }
}

impl fmt::Display for MoveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

/// The codec's verdict for a legal move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub side: Side,
    pub descriptor: MoveDescriptor,
    /// FEN of the position after the move.
    pub encoding: String,
    /// SAN with check/mate suffix.
    pub notation: String,
}

/// Free-form game headers keyed by PGN tag name ("White", "Event", ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameMetadata(BTreeMap<String, String>);

impl GameMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn white(&self) -> &str {
        self.get("White").unwrap_or("Unknown")
    }

    pub fn black(&self) -> &str {
        self.get("Black").unwrap_or("Unknown")
    }

    /// "1-0", "0-1", "1/2-1/2" or "*" when unset.
    pub fn result(&self) -> &str {
        self.get("Result").unwrap_or("*")
    }

    pub fn event(&self) -> Option<&str> {
        self.get("Event")
    }

    pub fn date(&self) -> Option<&str> {
        self.get("Date")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_parse_promotion() {
        let mv: MoveDescriptor = "e7e8Q".parse().unwrap();
        assert_eq!(mv.from, "e7");
        assert_eq!(mv.to, "e8");
        assert_eq!(mv.promotion, Some('q'));
        assert_eq!(mv.to_string(), "e7e8q");
    }

    #[test]
    fn test_descriptor_rejects_garbage() {
        assert!("e9e4".parse::<MoveDescriptor>().is_err());
        assert!("e2".parse::<MoveDescriptor>().is_err());
        assert!("e7e8k".parse::<MoveDescriptor>().is_err());
    }

    #[test]
    fn test_descriptor_json_omits_missing_promotion() {
        let json = serde_json::to_string(&MoveDescriptor::new("g1", "f3")).unwrap();
        assert_eq!(json, r#"{"from":"g1","to":"f3"}"#);
    }

    #[test]
    fn test_metadata_defaults() {
        let mut meta = GameMetadata::new();
        assert_eq!(meta.white(), "Unknown");
        assert_eq!(meta.result(), "*");
        meta.set("White", "Carlsen");
        meta.set("Result", "1-0");
        assert_eq!(meta.white(), "Carlsen");
        assert_eq!(meta.result(), "1-0");
        assert_eq!(meta.len(), 2);
    }
}
