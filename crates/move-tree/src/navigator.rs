//! Document navigator: the cursor over a game document and the only way to
//! mutate it, so that every change is preceded by an undo snapshot.

use chess_core::{MoveDescriptor, PositionCodec, ShakmatyCodec};
use tracing::{debug, warn};

use crate::annotation::Annotation;
use crate::config::NavigatorConfig;
use crate::document::GameDocument;
use crate::error::TreeError;
use crate::node::{MoveNode, Variation};
use crate::path::Path;
use crate::undo::{Snapshot, UndoLog};

pub struct Navigator<C: PositionCodec = ShakmatyCodec> {
    codec: C,
    document: GameDocument,
    current: Path,
    undo: UndoLog,
    config: NavigatorConfig,
}

impl Navigator<ShakmatyCodec> {
    /// Standard chess, default configuration.
    pub fn standard() -> Self {
        Self::new(ShakmatyCodec::new())
    }
}

impl<C: PositionCodec> Navigator<C> {
    pub fn new(codec: C) -> Self {
        Self::with_config(codec, NavigatorConfig::default())
    }

    pub fn with_config(codec: C, config: NavigatorConfig) -> Self {
        let document = GameDocument::new(codec.initial_encoding());
        Self {
            codec,
            document,
            current: Path::start(),
            undo: UndoLog::with_limit(config.undo_limit),
            config,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn document(&self) -> &GameDocument {
        &self.document
    }

    pub fn into_document(self) -> GameDocument {
        self.document
    }

    pub fn mainline(&self) -> &Variation {
        self.document.mainline()
    }

    pub fn current_path(&self) -> &Path {
        &self.current
    }

    /// Position at the cursor; the start position for the start path or a
    /// path that no longer resolves.
    pub fn current_position(&self) -> &str {
        self.document.position_at(&self.current)
    }

    pub fn current_node(&self) -> Option<&MoveNode> {
        self.document.node_at(&self.current)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    fn checkpoint(&mut self) -> Result<(), TreeError> {
        let snapshot = Snapshot::capture(&self.document, &self.current)?;
        self.undo.push(snapshot);
        Ok(())
    }

    /// Play `mv` from the cursor. An illegal move leaves everything untouched
    /// and comes back as a codec error.
    pub fn apply_move(&mut self, mv: &MoveDescriptor) -> Result<Path, TreeError> {
        let applied = match self.codec.apply_move(self.current_position(), mv) {
            Ok(applied) => applied,
            Err(e) => {
                warn!(uci = %mv, path = %self.current, error = %e, "Move rejected");
                return Err(e.into());
            }
        };

        self.checkpoint()?;
        let notation = applied.notation.clone();
        let path = self
            .document
            .add_move_at_path(&self.current, MoveNode::from(applied));
        debug!(uci = %mv, san = %notation, path = %path, "Move applied");

        self.current = path.clone();
        Ok(path)
    }

    /// Move the cursor without validation. A path that does not resolve shows
    /// the start position.
    pub fn goto(&mut self, path: Path) {
        self.current = path;
    }

    /// One ply back within the current line. From the first ply of the
    /// mainline this reaches the start position. From the first ply of a
    /// variation it stays put unless `climb_out_of_variations` is set.
    pub fn prev(&mut self) -> bool {
        let Some((prefix, index)) = self.current.split_last_move() else {
            return false;
        };
        let target = if index > 0 {
            Some(Path::from_segments(prefix.to_vec()).with_move(index - 1))
        } else if prefix.is_empty() {
            Some(Path::start())
        } else if self.config.climb_out_of_variations {
            self.current.predecessor()
        } else {
            None
        };

        match target {
            Some(path) => {
                self.current = path;
                true
            }
            None => false,
        }
    }

    /// One ply forward within the current line; from the start position this
    /// enters the mainline.
    pub fn next(&mut self) -> bool {
        let target = match self.current.split_last_move() {
            Some((prefix, index)) => Path::from_segments(prefix.to_vec()).with_move(index + 1),
            None if self.current.is_start() => Path::mainline(0),
            None => return false,
        };
        if self.document.node_at(&target).is_none() {
            return false;
        }
        self.current = target;
        true
    }

    /// Up to `fast_step` plies back, stopping at a boundary. Returns the plies moved.
    pub fn backward(&mut self) -> usize {
        let steps = self.config.fast_step;
        (0..steps).take_while(|_| self.prev()).count()
    }

    /// Up to `fast_step` plies forward, stopping at a boundary. Returns the plies moved.
    pub fn forward(&mut self) -> usize {
        let steps = self.config.fast_step;
        (0..steps).take_while(|_| self.next()).count()
    }

    /// Promote the innermost variation `path` passes through. The cursor goes
    /// back to the start when the tree changed shape.
    pub fn promote_variation(&mut self, path: &Path) -> Result<bool, TreeError> {
        self.checkpoint()?;
        let changed = self.document.promote_variation_intersecting(path);
        if changed {
            self.current = Path::start();
        }
        debug!(path = %path, changed, "Promote variation");
        Ok(changed)
    }

    /// Delete the innermost variation `path` passes through. The cursor goes
    /// back to the start when the tree changed shape.
    pub fn delete_variation(&mut self, path: &Path) -> Result<bool, TreeError> {
        self.checkpoint()?;
        let changed = self.document.delete_variation_intersecting(path);
        if changed {
            self.current = Path::start();
        }
        debug!(path = %path, changed, "Delete variation");
        Ok(changed)
    }

    pub fn set_annotations_at_path(
        &mut self,
        path: &Path,
        annotations: Vec<Annotation>,
    ) -> Result<bool, TreeError> {
        self.checkpoint()?;
        let changed = self.document.set_annotations_at_path(path, annotations);
        debug!(path = %path, changed, "Set annotations");
        Ok(changed)
    }

    /// Clear every annotation on the node at `path`.
    pub fn delete_comment(&mut self, path: &Path) -> Result<bool, TreeError> {
        self.set_annotations_at_path(path, Vec::new())
    }

    /// Restore the document and cursor from the latest snapshot. `Ok(false)`
    /// when there is nothing to undo. A snapshot that fails to restore stays
    /// on the log.
    pub fn undo(&mut self) -> Result<bool, TreeError> {
        let Some(snapshot) = self.undo.peek() else {
            return Ok(false);
        };
        let (document, current) = snapshot.restore()?;
        self.undo.pop();
        self.document = document;
        self.current = current;
        debug!(path = %self.current, remaining = self.undo.len(), "Undo");
        Ok(true)
    }

    /// Start a fresh, empty document at `encoding`. Invalid encodings leave
    /// the navigator untouched.
    pub fn load_from_encoding(&mut self, encoding: &str) -> Result<(), TreeError> {
        let encoding = encoding.trim();
        if let Err(e) = self.codec.validate_encoding(encoding) {
            warn!(error = %e, "Rejected position encoding");
            return Err(e.into());
        }
        self.load_document(GameDocument::new(encoding));
        Ok(())
    }

    /// Replace the document wholesale; the cursor returns to the start and
    /// the undo history is dropped.
    pub fn load_document(&mut self, document: GameDocument) {
        self.document = document;
        self.current = Path::start();
        self.undo.clear();
    }

    pub fn new_game(&mut self) {
        let document = GameDocument::new(self.codec.initial_encoding());
        self.load_document(document);
    }
}
