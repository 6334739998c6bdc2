//! Base chunk types shared by every loadable unit of work the format
//! evaluator selects a [`Format`] for, ported from `chunk/chunk.h` and
//! `chunk/media_chunk.h`.

use crate::mpd::Format;
use crate::upstream::DataSpec;

/// Why a chunk was requested, mirroring the reference's `TriggerReason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    Initial,
    Manual,
    Adaptive,
    Trick,
}

/// The data all chunk kinds share: what to fetch, and the window of the
/// presentation timeline it covers.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub data_spec: DataSpec,
    pub trigger: TriggerReason,
    pub format: Format,
    pub start_time_us: i64,
    pub end_time_us: i64,
    pub chunk_index: i64,
    /// Identifies the track/adaptation set this chunk belongs to, for
    /// chunks sharing a queue across multiple tracks.
    pub parent_id: i32,
}

/// A [`Chunk`] whose load appends samples to a track, rather than just
/// fetching bytes used for discovery (e.g. a segment index fetch).
#[derive(Debug, Clone)]
pub struct MediaChunk {
    pub chunk: Chunk,
    /// Whether `chunk.format` is this chunk's final media format, or
    /// provisional pending an index/initialization fetch.
    pub is_media_format_final: bool,
}
