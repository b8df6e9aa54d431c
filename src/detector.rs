use itertools::Itertools;

use crate::types::{PathSegment, SegmentPath};

/// Paths shorter than this can never hold an id/relation pair plus the entity
/// it hangs off.
pub const DEFAULT_MIN_PIVOT_SEGMENTS: usize = 3;

/// True when the path contains at least one numeric id directly followed by a
/// name, i.e. it addresses a relation under a parent instance.
///
/// Paths shorter than `min_segments` are never pivots.
pub fn is_pivot_path(path: &SegmentPath, min_segments: usize) -> bool {
    path.len() >= min_segments && has_id_name_pair(path.segments())
}

pub(crate) fn has_id_name_pair(segments: &[PathSegment]) -> bool {
    segments
        .iter()
        .tuple_windows()
        .any(|(id, name)| id.is_numeric() && name.is_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn path(raw: &str) -> SegmentPath {
        SegmentPath::from_raw(raw).unwrap()
    }

    #[parameterized(
        single_hop = { "catalog/product/42/translations", true },
        single_hop_with_id = { "catalog/product/42/translations/7", true },
        chain = { "a/1/rel1/2/rel2", true },
        collection = { "catalog/product", false },
        trailing_id = { "catalog/product/42", false },
        names_only_long = { "a/b/c/d/e", false },
        ids_only = { "1/2/3", false },
    )]
    fn test_is_pivot_path(raw: &str, expected: bool) {
        assert_eq!(is_pivot_path(&path(raw), DEFAULT_MIN_PIVOT_SEGMENTS), expected);
    }

    #[parameterized(
        id_then_name = { "1/rel" },
        name_then_id = { "product/1" },
        single = { "product" },
    )]
    fn test_short_paths_never_pivot(raw: &str) {
        assert!(!is_pivot_path(&path(raw), DEFAULT_MIN_PIVOT_SEGMENTS));
    }

    #[test]
    fn test_min_segments_is_respected() {
        let p = path("a/1/rel");
        assert!(is_pivot_path(&p, 3));
        assert!(!is_pivot_path(&p, 4));
    }
}
