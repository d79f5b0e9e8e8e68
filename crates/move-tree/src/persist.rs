//! Persistence boundary: strip derivable fields on save, replay on load.
//!
//! Only `{from, to, promotion, annotations, variations}` is stored per ply.
//! Position encodings and notation are recomputed through the codec when the
//! game is hydrated so they can never drift from the rules.

use chess_core::{GameMetadata, MoveDescriptor, PositionCodec};
use serde::{Deserialize, Serialize};

use crate::annotation::Annotation;
use crate::document::GameDocument;
use crate::error::TreeError;
use crate::node::{MoveNode, Variation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGame {
    pub start_position: String,
    #[serde(default)]
    pub metadata: GameMetadata,
    #[serde(default)]
    pub moves: Vec<StoredMove>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMove {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<Vec<StoredMove>>,
}

impl StoredMove {
    pub fn descriptor(&self) -> MoveDescriptor {
        MoveDescriptor {
            from: self.from.clone(),
            to: self.to.clone(),
            promotion: self.promotion,
        }
    }
}

fn strip_line(line: &Variation) -> Vec<StoredMove> {
    line.iter()
        .map(|node| {
            let descriptor = node.descriptor();
            StoredMove {
                from: descriptor.from.clone(),
                to: descriptor.to.clone(),
                promotion: descriptor.promotion,
                annotations: node.annotations().to_vec(),
                variations: node.variations().iter().map(strip_line).collect(),
            }
        })
        .collect()
}

/// Plain-data form of `document` with derivable fields dropped.
pub fn strip(document: &GameDocument) -> StoredGame {
    StoredGame {
        start_position: document.start_position().to_string(),
        metadata: document.metadata().clone(),
        moves: strip_line(document.mainline()),
    }
}

fn hydrate_line<C: PositionCodec>(
    codec: &C,
    start: &str,
    moves: &[StoredMove],
) -> Result<Variation, TreeError> {
    let mut line = Variation::new();
    let mut position = start.to_string();

    for stored in moves {
        let applied = codec.apply_move(&position, &stored.descriptor())?;
        let mut node = MoveNode::from(applied);
        node.set_annotations(stored.annotations.clone());
        // Alternatives to this ply start from the same position it did, and
        // so do alternatives to their first ply: those become siblings here.
        for alternative in &stored.variations {
            let mut variation = hydrate_line(codec, &position, alternative)?;
            let nested = variation
                .moves_mut()
                .first_mut()
                .map(MoveNode::take_variations)
                .unwrap_or_default();
            node.variations_mut().push(variation);
            node.variations_mut().extend(nested);
        }
        position = node.position().to_string();
        line.push(node);
    }

    Ok(line)
}

/// Rebuild a document by replaying every stored move. Any illegal move fails
/// the whole load.
pub fn hydrate<C: PositionCodec>(stored: &StoredGame, codec: &C) -> Result<GameDocument, TreeError> {
    codec.validate_encoding(&stored.start_position)?;
    let mainline = hydrate_line(codec, &stored.start_position, &stored.moves)?;
    tracing::debug!(
        plies = mainline.node_count(),
        "Hydrated stored game"
    );
    Ok(GameDocument::from_parts(
        stored.start_position.clone(),
        mainline,
        stored.metadata.clone(),
    ))
}

pub fn to_json(document: &GameDocument) -> Result<String, TreeError> {
    Ok(serde_json::to_string_pretty(&strip(document))?)
}

pub fn from_json<C: PositionCodec>(json: &str, codec: &C) -> Result<GameDocument, TreeError> {
    let stored: StoredGame = serde_json::from_str(json)?;
    hydrate(&stored, codec)
}
