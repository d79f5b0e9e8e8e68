//! Game document: the move tree plus its start position and headers.
//!
//! Pure data. Every mutation is addressed by a [`Path`]; a path that no longer
//! resolves turns the mutation into a no-op instead of an error.

use chess_core::{GameMetadata, STANDARD_START_FEN};
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::node::{MoveNode, Variation};
use crate::path::{Path, PathSegment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDocument {
    start_position: String,
    mainline: Variation,
    #[serde(default)]
    metadata: GameMetadata,
}

impl Default for GameDocument {
    fn default() -> Self {
        Self::new(STANDARD_START_FEN)
    }
}

impl GameDocument {
    /// Empty document rooted at `start_position`.
    pub fn new(start_position: impl Into<String>) -> Self {
        Self {
            start_position: start_position.into(),
            mainline: Variation::new(),
            metadata: GameMetadata::new(),
        }
    }

    pub fn from_parts(
        start_position: impl Into<String>,
        mainline: Variation,
        metadata: GameMetadata,
    ) -> Self {
        Self {
            start_position: start_position.into(),
            mainline,
            metadata,
        }
    }

    pub fn start_position(&self) -> &str {
        &self.start_position
    }

    pub fn mainline(&self) -> &Variation {
        &self.mainline
    }

    pub fn metadata(&self) -> &GameMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut GameMetadata {
        &mut self.metadata
    }

    /// The line addressed by `prefix`, a run of `Move, Variation` pairs.
    /// The empty prefix is the mainline.
    pub fn line_at(&self, prefix: &[PathSegment]) -> Option<&Variation> {
        let mut line = &self.mainline;
        for pair in prefix.chunks(2) {
            match pair {
                [PathSegment::Move(i), PathSegment::Variation(b)] => {
                    line = line.get(*i)?.variations().get(*b)?;
                }
                _ => return None,
            }
        }
        Some(line)
    }

    fn line_at_mut(&mut self, prefix: &[PathSegment]) -> Option<&mut Variation> {
        let mut line = &mut self.mainline;
        for pair in prefix.chunks(2) {
            match pair {
                [PathSegment::Move(i), PathSegment::Variation(b)] => {
                    line = line.moves_mut().get_mut(*i)?.variations_mut().get_mut(*b)?;
                }
                _ => return None,
            }
        }
        Some(line)
    }

    /// Resolve a node path. `None` for the start position or any path that
    /// does not resolve against this document.
    pub fn node_at(&self, path: &Path) -> Option<&MoveNode> {
        let (prefix, index) = path.split_last_move()?;
        self.line_at(prefix)?.get(index)
    }

    fn node_at_mut(&mut self, path: &Path) -> Option<&mut MoveNode> {
        let (prefix, index) = path.split_last_move()?;
        self.line_at_mut(prefix)?.moves_mut().get_mut(index)
    }

    /// Position after the node at `path`; the start position when the path is
    /// empty or dangling.
    pub fn position_at(&self, path: &Path) -> &str {
        self.node_at(path)
            .map(MoveNode::position)
            .unwrap_or(&self.start_position)
    }

    /// Insert `node` as the continuation after `path` and return its path.
    ///
    /// - Free slot: the line is extended.
    /// - Same resulting position already there: nothing changes, the existing
    ///   path is returned. An existing alternative with that position is
    ///   reused the same way.
    /// - Different move there: the old continuation and everything after it
    ///   is demoted to a new alternative (appended last) and `node` takes its
    ///   place.
    ///
    /// A dangling `path` is treated as the start position.
    pub fn add_move_at_path(&mut self, path: &Path, node: MoveNode) -> Path {
        let (mut line_prefix, mut slot) = match path.split_last_move() {
            Some((prefix, index)) => (prefix.to_vec(), index + 1),
            None => (Vec::new(), 0),
        };
        if !path.is_start() && self.node_at(path).is_none() {
            tracing::debug!(path = %path, "dangling path, adding from start position");
            line_prefix.clear();
            slot = 0;
        }

        let line_path = Path::from_segments(line_prefix);
        let Some(line) = self.line_at_mut(line_path.segments()) else {
            return Path::start();
        };
        let moves = line.moves_mut();

        if slot >= moves.len() {
            moves.push(node);
            return line_path.with_move(moves.len() - 1);
        }

        let slot_path = line_path.with_move(slot);
        let existing = &moves[slot];
        if existing.position() == node.position() {
            return slot_path;
        }
        if let Some(branch) = existing
            .variations()
            .iter()
            .position(|v| v.first().is_some_and(|first| first.position() == node.position()))
        {
            return slot_path.with_variation(branch).with_move(0);
        }

        let mut demoted = moves.split_off(slot);
        let siblings = demoted[0].take_variations();
        let mut node = node;
        *node.variations_mut() = siblings;
        node.variations_mut().push(Variation::from(demoted));
        moves.push(node);

        tracing::debug!(path = %slot_path, "forked variation on deviation");
        slot_path
    }

    /// Remove the innermost variation `path` passes through. Mainline paths
    /// are left alone. Returns whether anything was removed.
    pub fn delete_variation_intersecting(&mut self, path: &Path) -> bool {
        let Some((anchor, branch)) = path.innermost_variation() else {
            return false;
        };
        let Some(node) = self.node_at_mut(&anchor) else {
            return false;
        };
        if branch >= node.variations().len() {
            return false;
        }
        node.variations_mut().remove(branch);
        true
    }

    /// Swap the innermost variation `path` passes through with the line it
    /// branched from. One level per call; the demoted line takes the promoted
    /// variation's branch index, so promoting that index again undoes it.
    pub fn promote_variation_intersecting(&mut self, path: &Path) -> bool {
        let Some((anchor, branch)) = path.innermost_variation() else {
            return false;
        };
        let Some((line_prefix, index)) = anchor.split_last_move() else {
            return false;
        };
        let Some(line) = self.line_at_mut(line_prefix) else {
            return false;
        };
        let moves = line.moves_mut();
        let promotable = moves
            .get(index)
            .and_then(|node| node.variations().get(branch))
            .is_some_and(|v| !v.is_empty());
        if !promotable {
            return false;
        }

        let mut demoted = moves.split_off(index);
        let mut promoted = demoted[0].variations_mut().remove(branch).into_moves();
        let mut siblings = demoted[0].take_variations();
        let own = promoted[0].take_variations();

        siblings.insert(branch.min(siblings.len()), Variation::from(demoted));
        siblings.extend(own);
        *promoted[0].variations_mut() = siblings;
        moves.extend(promoted);
        true
    }

    /// Replace the annotations of the node at `path` wholesale.
    pub fn set_annotations_at_path(&mut self, path: &Path, annotations: Vec<Annotation>) -> bool {
        match self.node_at_mut(path) {
            Some(node) => {
                node.set_annotations(annotations);
                true
            }
            None => false,
        }
    }
}
