//! Component L: extractor adapters — the trait seams a chunk's loaded bytes
//! are demuxed through, ported from `extractor/{track_output,
//! extractor_output, extractor_input}.h`.

pub mod rawcc;

use crate::mpd::Format;
use crate::upstream::constants::RESULT_END_OF_INPUT;

/// `kSampleFlagSync` — the only flag this crate's bundled extractors currently
/// emit; `ENCRYPTED`/`DECODE_ONLY` exist on the wire format (`util::sample_flags`)
/// for external collaborators but have no producer in this crate.
pub use crate::util::sample_flags::SYNC as SAMPLE_FLAG_SYNC;

/// A synchronous, unbuffered byte source an [`Extractor`] pulls from.
/// `UnbufferedExtractorInput` in the reference is a thin pass-through over a
/// `DataSourceInterface`; since extractors here only ever run over bytes a
/// [`crate::chunk`] loader has already buffered in memory, this trait is the
/// pass-through itself rather than a separate wrapper type.
pub trait ExtractorInput {
    /// Reads up to `buf.len()` bytes. Returns the byte count, or the
    /// `RESULT_END_OF_INPUT`/`RESULT_IO_ERROR` sentinels shared with
    /// [`crate::upstream::DataSource`].
    fn read(&mut self, buf: &mut [u8]) -> i64;
}

/// An [`ExtractorInput`] over an in-memory byte slice, for feeding an
/// extractor bytes already loaded by a chunk.
pub struct SliceExtractorInput<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceExtractorInput<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SliceExtractorInput { data, pos: 0 }
    }
}

impl<'a> ExtractorInput for SliceExtractorInput<'a> {
    fn read(&mut self, buf: &mut [u8]) -> i64 {
        let remaining = self.data.len() - self.pos;
        if remaining == 0 {
            return RESULT_END_OF_INPUT;
        }
        let n = buf.len().min(remaining);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        n as i64
    }
}

/// The sink a single demuxed track writes samples to, ported from
/// `TrackOutputInterface`.
pub trait TrackOutput: Send {
    fn give_format(&mut self, format: Format);

    /// The reference marks this overload as a known shortcut ("FixThis"):
    /// ordinary track outputs copy sample bytes straight out of an
    /// `ExtractorInput` without an intermediate buffer, but callers that
    /// already hold a complete sample in memory (like [`rawcc::RawccParser`])
    /// write it directly through this path instead. Returns the number of
    /// bytes actually accepted; a track output backed by a bounded buffer may
    /// accept fewer than `data.len()`, requiring the caller to retry with the
    /// remainder.
    fn write_sample_data_fix_this(&mut self, data: &[u8]) -> i64;

    #[allow(clippy::too_many_arguments)]
    fn write_sample_metadata(
        &mut self,
        time_us: i64,
        duration_us: i64,
        flags: u32,
        size: u32,
        offset: u32,
        encryption_key_id: Option<&[u8]>,
        iv: Option<&[u8]>,
    );
}

/// Extends [`TrackOutput`] with the write-index a [`crate::chunk`] chunk
/// captures at `init()` time so it can report how many samples it appended.
pub trait IndexedTrackOutput: TrackOutput {
    fn write_index(&self) -> usize;
}

/// Seek point lookup for a demuxed stream, ported from `SeekMapInterface`.
pub trait SeekMap: Send + Sync {
    fn is_seekable(&self) -> bool;
    fn get_position_us(&self, time_us: i64) -> i64;
}

/// The demuxer-side counterpart of [`TrackOutput`]: where an [`Extractor`]
/// registers the tracks it discovers, ported from `ExtractorOutputInterface`.
pub trait ExtractorOutput {
    fn register_track(&mut self, track_id: i32) -> &mut dyn TrackOutput;
    fn done_registering_tracks(&mut self);
    fn give_seek_map(&mut self, seek_map: Box<dyn SeekMap>);
}

/// A demuxer: pulls bytes from an [`ExtractorInput`] and emits samples
/// through its registered [`TrackOutput`]s via an [`ExtractorOutput`].
pub trait Extractor {
    /// Best-effort format sniff; extractors with no distinguishing magic
    /// bytes (like RAWCC, whose caller already knows the content type from
    /// the MPD) may simply return `true`.
    fn sniff(&mut self, input: &mut dyn ExtractorInput) -> bool;

    fn init(&mut self, output: &mut dyn ExtractorOutput);

    /// Pulls more data and emits whatever complete samples it now has.
    /// Returns `RESULT_CONTINUE` to be called again, `RESULT_END_OF_INPUT`
    /// once `input` is exhausted, or `RESULT_IO_ERROR` on malformed input.
    fn read(&mut self, input: &mut dyn ExtractorInput, output: &mut dyn ExtractorOutput) -> i64;

    fn seek(&mut self);
}
