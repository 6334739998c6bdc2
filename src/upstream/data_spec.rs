//! `DataSpec`: describes a single (possibly byte-ranged) request.

use super::constants::LENGTH_UNBOUNDED;

#[derive(Debug, Clone)]
pub struct DataSpec {
    pub uri: String,
    /// Present for a POST request (e.g. the license fetcher's key message).
    pub post_body: Option<Vec<u8>>,
    /// Absolute position of `position` within the resource this data spec is
    /// a sub-range of; differs from `position` only after `remainder` has
    /// been applied more than once is not possible — both advance together.
    pub absolute_stream_position: i64,
    pub position: i64,
    /// `LENGTH_UNBOUNDED` (-1) means "read to the end".
    pub length: i64,
    pub key: Option<String>,
    pub flags: u32,
}

impl DataSpec {
    pub fn new(uri: impl Into<String>) -> Self {
        DataSpec {
            uri: uri.into(),
            post_body: None,
            absolute_stream_position: 0,
            position: 0,
            length: LENGTH_UNBOUNDED,
            key: None,
            flags: 0,
        }
    }

    pub fn with_range(uri: impl Into<String>, position: i64, length: i64) -> Self {
        DataSpec {
            uri: uri.into(),
            post_body: None,
            absolute_stream_position: position,
            position,
            length,
            key: None,
            flags: 0,
        }
    }

    /// Advances `position` by `bytes_loaded` and reduces `length`
    /// accordingly, for resuming a partially-loaded chunk.
    pub fn remainder(spec: &DataSpec, bytes_loaded: i64) -> DataSpec {
        let mut next = spec.clone();
        next.position = spec.position + bytes_loaded;
        next.absolute_stream_position = spec.absolute_stream_position + bytes_loaded;
        if spec.length != LENGTH_UNBOUNDED {
            next.length = spec.length - bytes_loaded;
        }
        next
    }

    pub fn is_unbounded(&self) -> bool {
        self.length == LENGTH_UNBOUNDED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_advances_and_shrinks() {
        let spec = DataSpec::with_range("http://h/seg", 100, 500);
        let rem = DataSpec::remainder(&spec, 200);
        assert_eq!(rem.position, 300);
        assert_eq!(rem.length, 300);
    }

    #[test]
    fn remainder_of_unbounded_stays_unbounded() {
        let spec = DataSpec::new("http://h/seg");
        let rem = DataSpec::remainder(&spec, 200);
        assert_eq!(rem.position, 200);
        assert!(rem.is_unbounded());
    }
}
