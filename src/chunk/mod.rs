//! Component chunk pipeline: the loadable units a track's sample queue is
//! fed from, ported from `chunk/{chunk, base_media_chunk,
//! single_sample_media_chunk}.{h,cc}`.

pub mod chunk;
pub mod single_sample;
pub mod stream_parsed;

pub use chunk::{Chunk, MediaChunk, TriggerReason};
pub use single_sample::SingleSampleMediaChunk;
pub use stream_parsed::StreamParsedMediaChunk;

use std::sync::{Arc, Mutex};

use crate::extractor::IndexedTrackOutput;

/// A [`MediaChunk`](chunk::MediaChunk) that writes samples to a single
/// registered track, ported from `BaseMediaChunk`. `init()` captures the
/// track's current write index so a caller can later tell how many samples
/// this chunk itself contributed.
pub struct BaseMediaChunk {
    pub media_chunk: MediaChunk,
    output: Option<Arc<Mutex<Box<dyn IndexedTrackOutput + Send>>>>,
    first_sample_index: usize,
}

impl BaseMediaChunk {
    pub fn new(media_chunk: MediaChunk) -> Self {
        BaseMediaChunk { media_chunk, output: None, first_sample_index: 0 }
    }

    /// `BaseMediaChunk::Init`: `output_ = output; first_sample_index_ =
    /// output->GetWriteIndex();`
    pub fn init(&mut self, output: Arc<Mutex<Box<dyn IndexedTrackOutput + Send>>>) {
        self.first_sample_index = output.lock().unwrap().write_index();
        self.output = Some(output);
    }

    pub fn first_sample_index(&self) -> usize {
        self.first_sample_index
    }

    pub(crate) fn output(&self) -> Arc<Mutex<Box<dyn IndexedTrackOutput + Send>>> {
        self.output.clone().expect("init() must run before load()")
    }
}
