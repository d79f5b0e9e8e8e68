//! Linear, snapshot-based undo. No redo.

use serde::{Deserialize, Serialize};

use crate::document::GameDocument;
use crate::error::TreeError;
use crate::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    #[serde(flatten)]
    document: &'a GameDocument,
    current_path: &'a Path,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotBody {
    #[serde(flatten)]
    document: GameDocument,
    #[serde(default)]
    current_path: Path,
}

/// A self-contained serialized copy of a document and its cursor.
#[derive(Debug, Clone)]
pub struct Snapshot {
    bytes: Vec<u8>,
}

impl Snapshot {
    #[cfg(test)]
    pub(crate) fn from_raw(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn capture(document: &GameDocument, current_path: &Path) -> Result<Self, TreeError> {
        let bytes = serde_json::to_vec(&SnapshotRef {
            document,
            current_path,
        })?;
        Ok(Self { bytes })
    }

    pub fn restore(&self) -> Result<(GameDocument, Path), TreeError> {
        let body: SnapshotBody = serde_json::from_slice(&self.bytes)?;
        Ok((body.document, body.current_path))
    }
}

#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    stack: Vec<Snapshot>,
    limit: Option<usize>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` snapshots, dropping the oldest first. A limit of
    /// zero is ignored.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            stack: Vec::new(),
            limit: limit.filter(|&n| n > 0),
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.stack.push(snapshot);
        if let Some(limit) = self.limit {
            if self.stack.len() > limit {
                let excess = self.stack.len() - limit;
                self.stack.drain(..excess);
            }
        }
    }

    /// Most recent snapshot, left in place.
    pub fn peek(&self) -> Option<&Snapshot> {
        self.stack.last()
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
