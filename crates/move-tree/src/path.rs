//! Path addressing into the move tree.
//!
//! A path is a run of segments: `Move(i)` indexes a ply within the current
//! line, `Variation(b)` descends into the b-th alternative hanging off the ply
//! just addressed. `[Move(3), Variation(1), Move(0)]` is the first ply of the
//! second alternative to mainline ply 3. The empty path is the start position.
//!
//! Paths are only meaningful against the document they were computed on.
//! Resolution never panics on a stale path; it just finds nothing.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

const VARIATIONS_MARKER: &str = "variations";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Move(usize),
    Variation(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Before the first move.
    pub fn start() -> Self {
        Self::default()
    }

    /// Ply `index` of the mainline.
    pub fn mainline(index: usize) -> Self {
        Self {
            segments: vec![PathSegment::Move(index)],
        }
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_start(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn with_move(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Move(index));
        next
    }

    pub fn with_variation(&self, branch: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Variation(branch));
        next
    }

    /// Number of variation markers crossed; 0 for mainline paths.
    pub fn depth(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, PathSegment::Variation(_)))
            .count()
    }

    /// `Move (Variation Move)*`, optionally ending in a bare `Variation`.
    pub fn is_well_formed(&self) -> bool {
        self.segments.iter().enumerate().all(|(i, s)| match s {
            PathSegment::Move(_) => i % 2 == 0,
            PathSegment::Variation(_) => i % 2 == 1,
        })
    }

    /// Split a node path into the segments addressing its line and its index
    /// within that line.
    pub fn split_last_move(&self) -> Option<(&[PathSegment], usize)> {
        match self.segments.split_last() {
            Some((PathSegment::Move(i), prefix)) => Some((prefix, *i)),
            _ => None,
        }
    }

    /// The innermost variation this path passes through, as the path of the
    /// node the variation hangs off plus the branch index.
    pub fn innermost_variation(&self) -> Option<(Path, usize)> {
        let at = self
            .segments
            .iter()
            .rposition(|s| matches!(s, PathSegment::Variation(_)))?;
        match self.segments[at] {
            PathSegment::Variation(branch) => {
                Some((Path::from_segments(self.segments[..at].to_vec()), branch))
            }
            PathSegment::Move(_) => None,
        }
    }

    /// Structural predecessor: the previous ply in the same line, or for the
    /// first ply of an alternative, the ply before the one it replaces.
    /// `None` for the start position or a malformed path.
    pub fn predecessor(&self) -> Option<Path> {
        let (prefix, index) = self.split_last_move()?;
        if index > 0 {
            let mut segments = prefix.to_vec();
            segments.push(PathSegment::Move(index - 1));
            return Some(Path::from_segments(segments));
        }
        match prefix.split_last() {
            None => Some(Path::start()),
            Some((PathSegment::Variation(_), anchor)) => {
                Path::from_segments(anchor.to_vec()).predecessor()
            }
            Some((PathSegment::Move(_), _)) => None,
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("start");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            match segment {
                PathSegment::Move(index) => write!(f, "{index}")?,
                PathSegment::Variation(branch) => write!(f, "v{branch}")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid path '{0}'")]
pub struct ParsePathError(String);

impl FromStr for Path {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "start" {
            return Ok(Path::start());
        }
        let mut segments = Vec::new();
        for token in s.split(['/', ',']).map(str::trim) {
            let segment = match token.strip_prefix('v') {
                Some(branch) => PathSegment::Variation(
                    branch.parse().map_err(|_| ParsePathError(s.to_string()))?,
                ),
                None => PathSegment::Move(token.parse().map_err(|_| ParsePathError(s.to_string()))?),
            };
            segments.push(segment);
        }
        let path = Path::from_segments(segments);
        if !path.is_well_formed() {
            return Err(ParsePathError(s.to_string()));
        }
        Ok(path)
    }
}

// JSON form: `[3, "variations", 1, 0]`, with `[]` or `null` for the start.
impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.segments.len() + self.depth();
        let mut seq = serializer.serialize_seq(Some(len))?;
        for segment in &self.segments {
            match segment {
                PathSegment::Move(index) => seq.serialize_element(index)?,
                PathSegment::Variation(branch) => {
                    seq.serialize_element(VARIATIONS_MARKER)?;
                    seq.serialize_element(branch)?;
                }
            }
        }
        seq.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathToken {
    Index(usize),
    Marker(String),
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tokens = Option::<Vec<PathToken>>::deserialize(deserializer)?.unwrap_or_default();
        let mut segments = Vec::new();
        let mut iter = tokens.into_iter();
        while let Some(token) = iter.next() {
            match token {
                PathToken::Index(index) => segments.push(PathSegment::Move(index)),
                PathToken::Marker(marker) if marker == VARIATIONS_MARKER => match iter.next() {
                    Some(PathToken::Index(branch)) => segments.push(PathSegment::Variation(branch)),
                    _ => return Err(de::Error::custom("variations marker without branch index")),
                },
                PathToken::Marker(other) => {
                    return Err(de::Error::custom(format!("unexpected path token '{other}'")))
                }
            }
        }
        let path = Path::from_segments(segments);
        if !path.is_well_formed() {
            return Err(de::Error::custom(format!("malformed path '{path}'")));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PathSegment::{Move, Variation};

    #[test]
    fn test_json_form() {
        let path = Path::from_segments(vec![Move(3), Variation(1), Move(0)]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"[3,"variations",1,0]"#);

        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);

        let start: Path = serde_json::from_str("null").unwrap();
        assert!(start.is_start());
        assert!(serde_json::from_str::<Path>(r#"[0,"variations"]"#).is_err());
    }

    #[test]
    fn test_text_form() {
        let path: Path = "3/v1/0".parse().unwrap();
        assert_eq!(path.segments(), &[Move(3), Variation(1), Move(0)]);
        assert_eq!(path.to_string(), "3/v1/0");
        assert_eq!(Path::start().to_string(), "start");
        assert!("3/x".parse::<Path>().is_err());
    }

    #[test]
    fn test_innermost_variation() {
        let path: Path = "2/v0/1/v3/0".parse().unwrap();
        let (anchor, branch) = path.innermost_variation().unwrap();
        assert_eq!(anchor.to_string(), "2/v0/1");
        assert_eq!(branch, 3);
        assert!(Path::mainline(4).innermost_variation().is_none());
    }

    #[test]
    fn test_predecessor() {
        assert_eq!(Path::mainline(0).predecessor(), Some(Path::start()));
        assert_eq!(Path::mainline(2).predecessor(), Some(Path::mainline(1)));
        // First ply of an alternative to ply 3 follows ply 2.
        let path: Path = "3/v0/0".parse().unwrap();
        assert_eq!(path.predecessor(), Some(Path::mainline(2)));
        let nested: Path = "0/v0/0".parse().unwrap();
        assert_eq!(nested.predecessor(), Some(Path::start()));
        assert_eq!(Path::start().predecessor(), None);
    }

    #[test]
    fn test_malformed_paths_rejected() {
        assert!("1/v0/2".parse::<Path>().unwrap().is_well_formed());
        assert!("1/v0".parse::<Path>().unwrap().is_well_formed());
        assert!("1/2".parse::<Path>().is_err());
        assert!("v0/1".parse::<Path>().is_err());
        assert!("1/v0/v1".parse::<Path>().is_err());
        assert!(serde_json::from_str::<Path>("[1,2]").is_err());
        assert!(!Path::from_segments(vec![Move(1), Move(2)]).is_well_formed());
    }
}
