//! Move nodes and the variations that chain them.

use chess_core::{AppliedMove, MoveDescriptor, Side};
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;

/// One ply. Side, descriptor, position and notation are fixed by the move that
/// produced the node; only annotations and variations change afterwards.
///
/// `variations` holds alternatives to this very ply: lines that could have
/// been played from the position before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveNode {
    side: Side,
    descriptor: MoveDescriptor,
    position: String,
    notation: String,
    #[serde(default)]
    annotations: Vec<Annotation>,
    #[serde(default)]
    variations: Vec<Variation>,
}

impl From<AppliedMove> for MoveNode {
    fn from(applied: AppliedMove) -> Self {
        Self {
            side: applied.side,
            descriptor: applied.descriptor,
            position: applied.encoding,
            notation: applied.notation,
            annotations: Vec::new(),
            variations: Vec::new(),
        }
    }
}

impl MoveNode {
    pub fn side(&self) -> Side {
        self.side
    }

    pub fn descriptor(&self) -> &MoveDescriptor {
        &self.descriptor
    }

    /// Position encoding after this ply.
    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn notation(&self) -> &str {
        &self.notation
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn variations(&self) -> &[Variation] {
        &self.variations
    }

    /// First text annotation, the one a comment editor shows.
    pub fn comment(&self) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Text { body } => Some(body.as_str()),
            _ => None,
        })
    }

    pub fn glyphs(&self) -> impl Iterator<Item = u8> + '_ {
        self.annotations.iter().filter_map(|a| match a {
            Annotation::Glyph { code } => Some(*code),
            _ => None,
        })
    }

    pub(crate) fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
    }

    pub(crate) fn push_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub(crate) fn variations_mut(&mut self) -> &mut Vec<Variation> {
        &mut self.variations
    }

    pub(crate) fn take_variations(&mut self) -> Vec<Variation> {
        std::mem::take(&mut self.variations)
    }
}

/// A line of play, first ply to last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variation {
    moves: Vec<MoveNode>,
}

impl Variation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn moves(&self) -> &[MoveNode] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MoveNode> {
        self.moves.get(index)
    }

    pub fn first(&self) -> Option<&MoveNode> {
        self.moves.first()
    }

    pub fn last(&self) -> Option<&MoveNode> {
        self.moves.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoveNode> {
        self.moves.iter()
    }

    /// Sides alternate from the first ply onwards.
    pub fn alternates(&self) -> bool {
        self.moves
            .windows(2)
            .all(|w| w[1].side() == w[0].side().opposite())
    }

    /// Total plies in this line and every nested alternative.
    pub fn node_count(&self) -> usize {
        self.moves
            .iter()
            .map(|m| 1 + m.variations().iter().map(Variation::node_count).sum::<usize>())
            .sum()
    }

    pub(crate) fn moves_mut(&mut self) -> &mut Vec<MoveNode> {
        &mut self.moves
    }

    pub(crate) fn push(&mut self, node: MoveNode) {
        self.moves.push(node);
    }

    pub(crate) fn into_moves(self) -> Vec<MoveNode> {
        self.moves
    }
}

impl From<Vec<MoveNode>> for Variation {
    fn from(moves: Vec<MoveNode>) -> Self {
        Self { moves }
    }
}

impl FromIterator<MoveNode> for Variation {
    fn from_iter<I: IntoIterator<Item = MoveNode>>(iter: I) -> Self {
        Self {
            moves: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Variation {
    type Item = &'a MoveNode;
    type IntoIter = std::slice::Iter<'a, MoveNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
