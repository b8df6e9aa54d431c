//! Classified URL path segments.

use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum_macros::Display as StrumDisplay;

use crate::error::ResolveError;

// Digits are allowed in names (`rel1`, `v2`) as long as the token is not all digits.
static NAME_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]*[A-Za-z_-][A-Za-z0-9_-]*$").unwrap());
static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, Serialize, Deserialize)]
pub enum SegmentKind {
    Name,
    Numeric,
}

/// One slash-delimited token of a request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    raw: String,
    kind: SegmentKind,
}

impl PathSegment {
    /// Classify a single, already trimmed, token.
    pub fn classify(raw: &str) -> Result<Self, ResolveError> {
        let kind = if NUMERIC_SEGMENT.is_match(raw) {
            raw.parse::<i64>().map_err(|_| {
                ResolveError::InvalidPath(format!("numeric segment '{raw}' is out of range"))
            })?;
            SegmentKind::Numeric
        } else if NAME_SEGMENT.is_match(raw) {
            SegmentKind::Name
        } else {
            return Err(ResolveError::InvalidPath(format!(
                "segment '{raw}' is neither a name nor a numeric id"
            )));
        };
        Ok(Self {
            raw: raw.to_string(),
            kind,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn is_name(&self) -> bool {
        self.kind == SegmentKind::Name
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == SegmentKind::Numeric
    }

    /// The id carried by a numeric segment.
    pub fn as_id(&self) -> Option<i64> {
        match self.kind {
            SegmentKind::Numeric => self.raw.parse().ok(),
            SegmentKind::Name => None,
        }
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.raw)
    }
}

/// A full request path, split and classified.
///
/// Classification is positional: the same text is re-classified for every
/// path it appears in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentPath {
    segments: Vec<PathSegment>,
}

impl SegmentPath {
    /// Build from pre-split segments. Each segment is trimmed and empty ones
    /// are dropped; an empty result is an `InvalidPath`.
    pub fn parse<S: AsRef<str>>(segments: &[S]) -> Result<Self, ResolveError> {
        let segments = segments
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .map(PathSegment::classify)
            .collect::<Result<Vec<_>, _>>()?;

        if segments.is_empty() {
            return Err(ResolveError::InvalidPath(
                "path is empty after trimming".to_string(),
            ));
        }
        Ok(Self { segments })
    }

    /// Split a raw `a/b/3` style path and classify it.
    pub fn from_raw(path: &str) -> Result<Self, ResolveError> {
        let parts: Vec<&str> = path.split('/').collect();
        Self::parse(&parts)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PathSegment> {
        self.segments.get(index)
    }

    /// The raw path, segments joined by `/`.
    pub fn full_path(&self) -> String {
        self.segments.iter().map(PathSegment::raw).join("/")
    }

    /// The path reduced to addressing segments: every name, plus every id that
    /// is immediately followed by a name. A trailing id is dropped.
    pub fn canonical_with_ids(&self) -> String {
        self.segments
            .iter()
            .enumerate()
            .filter(|(i, seg)| {
                seg.is_name()
                    || self
                        .segments
                        .get(i + 1)
                        .is_some_and(PathSegment::is_name)
            })
            .map(|(_, seg)| seg.raw())
            .join("/")
    }
}
