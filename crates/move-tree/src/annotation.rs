use serde::{Deserialize, Serialize};

/// Markup attached to a single ply. Insertion order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Annotation {
    Text { body: String },
    /// Numeric annotation glyph, e.g. 1 = good move, 4 = blunder.
    Glyph { code: u8 },
    SquareHighlight { square: String, color: String },
}

impl Annotation {
    pub fn text(body: impl Into<String>) -> Self {
        Annotation::Text { body: body.into() }
    }

    pub fn glyph(code: u8) -> Self {
        Annotation::Glyph { code }
    }

    pub fn highlight(square: impl Into<String>, color: impl Into<String>) -> Self {
        Annotation::SquareHighlight {
            square: square.into(),
            color: color.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Annotation::Text { .. })
    }
}

/// Conventional move-suffix symbol for the common glyphs.
pub fn glyph_symbol(code: u8) -> Option<&'static str> {
    match code {
        1 => Some("!"),
        2 => Some("?"),
        3 => Some("!!"),
        4 => Some("??"),
        5 => Some("!?"),
        6 => Some("?!"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_json_shape() {
        let json = serde_json::to_value(Annotation::highlight("e4", "green")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": "squareHighlight", "square": "e4", "color": "green" })
        );

        let back: Annotation =
            serde_json::from_str(r#"{"kind":"glyph","code":4}"#).unwrap();
        assert_eq!(back, Annotation::glyph(4));
        assert_eq!(glyph_symbol(4), Some("??"));
    }
}
