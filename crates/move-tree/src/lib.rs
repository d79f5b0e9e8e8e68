//! Annotated move trees for chess games.
//!
//! A [`GameDocument`] holds the main line with nested alternatives; a
//! [`Navigator`] walks it with a cursor [`Path`] and records an undo snapshot
//! before every change. [`persist`] and [`pgn`] move documents in and out.

pub mod annotation;
pub mod config;
pub mod document;
pub mod error;
pub mod navigator;
pub mod node;
pub mod path;
pub mod persist;
pub mod pgn;
pub mod undo;

pub use annotation::Annotation;
pub use config::NavigatorConfig;
pub use document::GameDocument;
pub use error::TreeError;
pub use navigator::Navigator;
pub use node::{MoveNode, Variation};
pub use path::{ParsePathError, Path, PathSegment};
pub use undo::{Snapshot, UndoLog};
