//! Parsing of nested-relation ("pivot") paths.
//!
//! A pivot path looks like `base.../id/relation[/id]`, optionally with more
//! `id/relation` hops between the base entity and the final parent id:
//!
//! ```text
//! catalog/product/42/translations/7/comments/9
//! \_____________/ \_____________/ | \______/ |
//!    base path      intermediate  |  final   relation id
//!                   hop           |  relation
//!                           parent id
//! ```

use tracing::warn;

use crate::error::ResolveError;
use crate::types::{PathSegment, SegmentPath};

/// Addressing context extracted from a pivot path. Names are raw, as they
/// appeared in the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotParseResult {
    /// Name segments identifying the outermost entity.
    pub base_path: Vec<String>,
    /// Relation hops between the base entity and the parent, in path order.
    pub intermediate_relations: Vec<String>,
    /// The relation being traversed from the parent.
    pub original_relation: String,
    pub parent_id: i64,
    pub parent_id_index: usize,
    pub relation_id: Option<i64>,
    pub canonical_path_with_ids: String,
}

/// Extract the addressing context from a path the detector accepted.
///
/// The last id/name pair in the path wins: it names the immediate parent and
/// relation, earlier pairs only describe how to get there.
pub fn parse(path: &SegmentPath) -> Result<PivotParseResult, ResolveError> {
    let segments = path.segments();

    let Some(relation_index) = last_relation_index(segments) else {
        warn!(
            event = "Resolve",
            phase = "PivotParse",
            path = path.full_path(),
            "pivot parser found no id/relation pair"
        );
        return Err(ResolveError::MalformedPivotPath(path.full_path()));
    };
    let parent_id_index = relation_index - 1;
    let parent_id = segment_id(&segments[parent_id_index], path)?;

    // The base entity ends at the first id; every name between that id and
    // the parent id is a relation hop.
    let parent_model_end = segments[..parent_id_index]
        .iter()
        .position(PathSegment::is_numeric)
        .unwrap_or(parent_id_index);

    let base_path = names(&segments[..parent_model_end]);
    if base_path.is_empty() {
        return Err(ResolveError::EmptyBasePath(path.full_path()));
    }

    let intermediate_relations = if parent_model_end < parent_id_index {
        names(&segments[parent_model_end + 1..parent_id_index])
    } else {
        Vec::new()
    };

    let relation_id = segments
        .get(parent_id_index + 2)
        .and_then(PathSegment::as_id);

    Ok(PivotParseResult {
        base_path,
        intermediate_relations,
        original_relation: segments[relation_index].raw().to_string(),
        parent_id,
        parent_id_index,
        relation_id,
        canonical_path_with_ids: path.canonical_with_ids(),
    })
}

/// Backward scan for the last name preceded by an id.
fn last_relation_index(segments: &[PathSegment]) -> Option<usize> {
    (1..segments.len())
        .rev()
        .find(|&i| segments[i].is_name() && segments[i - 1].is_numeric())
}

fn segment_id(segment: &PathSegment, path: &SegmentPath) -> Result<i64, ResolveError> {
    segment
        .as_id()
        .ok_or_else(|| ResolveError::MalformedPivotPath(path.full_path()))
}

fn names(segments: &[PathSegment]) -> Vec<String> {
    segments
        .iter()
        .filter(|s| s.is_name())
        .map(|s| s.raw().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::has_id_name_pair;
    use yare::parameterized;

    fn parse_raw(raw: &str) -> Result<PivotParseResult, ResolveError> {
        parse(&SegmentPath::from_raw(raw).unwrap())
    }

    #[test]
    fn test_single_hop_with_relation_id() {
        let parsed = parse_raw("catalog/product/42/translations/7").unwrap();
        assert_eq!(parsed.base_path, vec!["catalog", "product"]);
        assert!(parsed.intermediate_relations.is_empty());
        assert_eq!(parsed.original_relation, "translations");
        assert_eq!(parsed.parent_id, 42);
        assert_eq!(parsed.parent_id_index, 2);
        assert_eq!(parsed.relation_id, Some(7));
        assert_eq!(parsed.canonical_path_with_ids, "catalog/product/42/translations");
    }

    #[test]
    fn test_last_pair_wins() {
        let parsed = parse_raw("a/1/rel1/2/rel2").unwrap();
        assert_eq!(parsed.original_relation, "rel2");
        assert_eq!(parsed.parent_id, 2);
        assert_eq!(parsed.base_path, vec!["a"]);
        assert_eq!(parsed.intermediate_relations, vec!["rel1"]);
        assert_eq!(parsed.relation_id, None);
    }

    #[test]
    fn test_multi_hop_chain() {
        let parsed = parse_raw("catalog/product/42/translations/7/comments").unwrap();
        assert_eq!(parsed.base_path, vec!["catalog", "product"]);
        assert_eq!(parsed.intermediate_relations, vec!["translations"]);
        assert_eq!(parsed.original_relation, "comments");
        assert_eq!(parsed.parent_id, 7);
        assert_eq!(parsed.relation_id, None);
    }

    #[test]
    fn test_three_hop_chain_keeps_base_intact() {
        let parsed = parse_raw("a/1/r1/2/r2/3/r3/4").unwrap();
        assert_eq!(parsed.base_path, vec!["a"]);
        assert_eq!(parsed.intermediate_relations, vec!["r1", "r2"]);
        assert_eq!(parsed.original_relation, "r3");
        assert_eq!(parsed.parent_id, 3);
        assert_eq!(parsed.relation_id, Some(4));
    }

    #[test]
    fn test_relation_id_after_chain() {
        let parsed = parse_raw("catalog/product/42/translations/7/comments/9").unwrap();
        assert_eq!(parsed.relation_id, Some(9));
        assert_eq!(
            parsed.canonical_path_with_ids,
            "catalog/product/42/translations/7/comments"
        );
    }

    #[test]
    fn test_no_pair_is_malformed() {
        let err = parse_raw("catalog/product/42").unwrap_err();
        assert_eq!(err, ResolveError::MalformedPivotPath("catalog/product/42".into()));
    }

    #[test]
    fn test_empty_base_path() {
        let err = parse_raw("1/translations/2").unwrap_err();
        assert!(matches!(err, ResolveError::EmptyBasePath(_)));
    }

    #[parameterized(
        pivot = { "catalog/product/42/translations/7" },
        chain = { "a/1/rel1/2/rel2" },
        plain = { "catalog/product/42" },
        collection = { "catalog/product" },
        ids = { "1/2/3" },
        leading_id = { "1/rel" },
        names = { "a/b/c" },
    )]
    fn test_detector_and_parser_agree(raw: &str) {
        let path = SegmentPath::from_raw(raw).unwrap();
        let detected = has_id_name_pair(path.segments());
        let malformed = matches!(parse(&path), Err(ResolveError::MalformedPivotPath(_)));
        assert_eq!(detected, !malformed);
    }
}
