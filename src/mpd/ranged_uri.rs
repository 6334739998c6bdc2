//! `RangedUri`: an immutable (base, reference, byte range) handle that
//! resolves to a concrete URI and can merge with an adjacent sibling into a
//! single HTTP range request.

use crate::upstream::constants::LENGTH_UNBOUNDED;
use crate::util::uri::resolve;

#[derive(Debug, Clone)]
pub struct RangedUri {
    resolved: String,
    pub start: i64,
    /// `LENGTH_UNBOUNDED` (-1) for "to the end of the resource".
    pub length: i64,
}

impl RangedUri {
    /// Resolution happens once at construction time: `RangedUri` is
    /// immutable for its whole lifetime, so there is nothing to gain from
    /// deferring it and every accessor would otherwise need to re-run RFC
    /// 3986 resolution.
    pub fn new(base_uri: &str, reference_uri: &str, start: i64, length: i64) -> Self {
        RangedUri { resolved: resolve(base_uri, reference_uri), start, length }
    }

    pub fn resolved_uri(&self) -> &str {
        &self.resolved
    }

    pub fn is_unbounded(&self) -> bool {
        self.length == LENGTH_UNBOUNDED
    }

    /// Merges `self` with `other` iff they resolve to the same URI and
    /// their ranges are byte-adjacent (in either order). An unbounded range
    /// absorbs anything that starts where it starts or later.
    pub fn merge(&self, other: &RangedUri) -> Option<RangedUri> {
        if self.resolved != other.resolved {
            return None;
        }
        let (first, second) = if self.start <= other.start { (self, other) } else { (other, self) };

        if first.is_unbounded() {
            return Some(first.clone());
        }
        let first_end = first.start + first.length;
        if first_end != second.start {
            return None;
        }
        let length = if second.is_unbounded() { LENGTH_UNBOUNDED } else { first.length + second.length };
        Some(RangedUri { resolved: first.resolved.clone(), start: first.start, length })
    }
}

impl PartialEq for RangedUri {
    fn eq(&self, other: &Self) -> bool {
        self.resolved == other.resolved && self.start == other.start && self.length == other.length
    }
}
impl Eq for RangedUri {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adjacent_ranges() {
        let a = RangedUri::new("http://h/", "seg.m4s", 0, 100);
        let b = RangedUri::new("http://h/", "seg.m4s", 100, 50);
        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.start, 0);
        assert_eq!(merged.length, 150);
    }

    #[test]
    fn merge_is_associative() {
        let a = RangedUri::new("http://h/", "seg.m4s", 0, 100);
        let b = RangedUri::new("http://h/", "seg.m4s", 100, 50);
        let c = RangedUri::new("http://h/", "seg.m4s", 150, 25);
        let ab_c = a.merge(&b).unwrap().merge(&c).unwrap();
        let a_bc = a.merge(&b.merge(&c).unwrap()).unwrap();
        assert_eq!(ab_c, a_bc);
    }

    #[test]
    fn merge_rejects_non_adjacent_or_different_uri() {
        let a = RangedUri::new("http://h/", "seg.m4s", 0, 100);
        let gap = RangedUri::new("http://h/", "seg.m4s", 200, 50);
        assert!(a.merge(&gap).is_none());
        let other = RangedUri::new("http://h/", "other.m4s", 100, 50);
        assert!(a.merge(&other).is_none());
    }

    #[test]
    fn unbounded_absorbs_following_range() {
        let a = RangedUri::new("http://h/", "seg.m4s", 0, LENGTH_UNBOUNDED);
        let b = RangedUri::new("http://h/", "seg.m4s", 0, 50);
        let merged = a.merge(&b).unwrap();
        assert!(merged.is_unbounded());
    }
}
