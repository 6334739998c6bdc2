//! `SingleSampleMediaChunk`: a chunk whose entire payload is one
//! container-less sample (e.g. a self-contained RAWCC or VTT caption file),
//! ported from `chunk/single_sample_media_chunk.{h,cc}`.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::extractor::IndexedTrackOutput;
use crate::mpd::Format;
use crate::upstream::constants::{RESULT_CONTINUE, RESULT_END_OF_INPUT, RESULT_IO_ERROR};
use crate::upstream::{CancellationFlag, DataSource, DataSpec};

use super::chunk::MediaChunk;
use super::BaseMediaChunk;

const READ_BUFFER_SIZE: usize = 4096;

fn io_error(msg: &str) -> crate::error::DashError {
    crate::error::DashError::Io(std::io::Error::new(std::io::ErrorKind::Other, msg.to_string()))
}

/// Loads the chunk's [`DataSpec`] as one opaque blob and writes it to the
/// track output as a single sample covering the chunk's whole time range.
/// `bytes_loaded` is kept in an `AtomicI64` so [`Self::num_bytes_loaded`] can
/// be read from another thread while `load()` is in flight, mirroring the
/// reference's lock around the same counter.
pub struct SingleSampleMediaChunk {
    base: BaseMediaChunk,
    format: Format,
    bytes_loaded: AtomicI64,
}

impl SingleSampleMediaChunk {
    pub fn new(media_chunk: MediaChunk, format: Format) -> Self {
        SingleSampleMediaChunk { base: BaseMediaChunk::new(media_chunk), format, bytes_loaded: AtomicI64::new(0) }
    }

    pub fn init(&mut self, output: Arc<Mutex<Box<dyn IndexedTrackOutput + Send>>>) {
        self.base.init(output);
    }

    pub fn num_bytes_loaded(&self) -> i64 {
        self.bytes_loaded.load(Ordering::SeqCst)
    }

    /// Opens the data source at `remainder(spec, bytes_loaded)` so a retried
    /// load after a partial failure only re-fetches the unread suffix, reads
    /// to end-of-input writing each buffer straight through to the track
    /// output, then emits one sample-metadata record spanning the whole
    /// chunk. Polls `cancel` between reads; a cancellation aborts the load
    /// without writing sample metadata, leaving `bytes_loaded` as a resume
    /// point for the next attempt.
    pub async fn load(&mut self, source: &mut dyn DataSource, cancel: CancellationFlag) -> Result<()> {
        let output = self.base.output();
        let data_spec = DataSpec::remainder(&self.base.media_chunk.chunk.data_spec, self.bytes_loaded.load(Ordering::SeqCst));

        if cancel.is_set() {
            return Err(crate::error::DashError::Cancelled);
        }
        source.open(data_spec, cancel.clone()).await?;

        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            if cancel.is_set() {
                source.close();
                return Err(crate::error::DashError::Cancelled);
            }
            let n = source.read(&mut buf).await;
            if n == RESULT_END_OF_INPUT {
                break;
            }
            if n == RESULT_IO_ERROR {
                source.close();
                return Err(io_error("data source read failed"));
            }
            if n == RESULT_CONTINUE || n == 0 {
                continue;
            }
            let mut written = 0i64;
            {
                let mut out = output.lock().unwrap();
                while written < n {
                    let accepted = out.write_sample_data_fix_this(&buf[written as usize..n as usize]);
                    if accepted <= 0 {
                        source.close();
                        return Err(io_error("track output rejected sample data"));
                    }
                    written += accepted;
                }
            }
            self.bytes_loaded.fetch_add(n, Ordering::SeqCst);
        }
        source.close();

        let chunk = &self.base.media_chunk.chunk;
        output.lock().unwrap().write_sample_metadata(
            chunk.start_time_us,
            chunk.end_time_us - chunk.start_time_us,
            crate::extractor::SAMPLE_FLAG_SYNC,
            self.bytes_loaded.load(Ordering::SeqCst) as u32,
            0,
            None,
            None,
        );
        Ok(())
    }

    pub fn format(&self) -> &Format {
        &self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::chunk::{Chunk, TriggerReason};
    use crate::upstream::constants::LENGTH_UNBOUNDED;

    struct FixtureSource {
        remaining: Vec<u8>,
        opened_position: i64,
    }

    impl DataSource for FixtureSource {
        async fn open(&mut self, spec: DataSpec, _cancel: CancellationFlag) -> Result<i64> {
            self.opened_position = spec.position;
            Ok(LENGTH_UNBOUNDED)
        }

        async fn read(&mut self, buf: &mut [u8]) -> i64 {
            if self.remaining.is_empty() {
                return RESULT_END_OF_INPUT;
            }
            let n = buf.len().min(self.remaining.len());
            buf[..n].copy_from_slice(&self.remaining[..n]);
            self.remaining.drain(..n);
            n as i64
        }

        fn close(&mut self) {}
    }

    #[derive(Default)]
    struct RecordingTrack {
        data: Vec<u8>,
        metadata: Vec<(i64, i64, u32, u32)>,
        write_index: usize,
    }

    impl crate::extractor::TrackOutput for RecordingTrack {
        fn give_format(&mut self, _format: Format) {}
        fn write_sample_data_fix_this(&mut self, data: &[u8]) -> i64 {
            self.data.extend_from_slice(data);
            data.len() as i64
        }
        fn write_sample_metadata(
            &mut self,
            time_us: i64,
            duration_us: i64,
            flags: u32,
            size: u32,
            _offset: u32,
            _encryption_key_id: Option<&[u8]>,
            _iv: Option<&[u8]>,
        ) {
            self.metadata.push((time_us, duration_us, flags, size));
            self.write_index += 1;
        }
    }

    impl IndexedTrackOutput for RecordingTrack {
        fn write_index(&self) -> usize {
            self.write_index
        }
    }

    fn fmt() -> Format {
        Format {
            id: "caps".to_string(),
            mime_type: "application/x-rawcc".to_string(),
            codecs: None,
            width: None,
            height: None,
            frame_rate: None,
            max_playout_rate: 1.0,
            audio_channels: None,
            audio_sampling_rate: None,
            bitrate: 0,
            language: None,
        }
    }

    fn media_chunk() -> MediaChunk {
        MediaChunk {
            chunk: Chunk {
                data_spec: DataSpec::new("http://h/caption.rcc"),
                trigger: TriggerReason::Initial,
                format: fmt(),
                start_time_us: 1_000,
                end_time_us: 5_000,
                chunk_index: 0,
                parent_id: 0,
            },
            is_media_format_final: true,
        }
    }

    #[tokio::test]
    async fn loads_whole_blob_as_one_sample() {
        let track: Box<dyn IndexedTrackOutput + Send> = Box::new(RecordingTrack::default());
        let output = Arc::new(Mutex::new(track));

        let mut chunk = SingleSampleMediaChunk::new(media_chunk(), fmt());
        chunk.init(output.clone());

        let mut source = FixtureSource { remaining: b"hello world".to_vec(), opened_position: -1 };
        chunk.load(&mut source, CancellationFlag::new()).await.unwrap();

        assert_eq!(chunk.num_bytes_loaded(), 11);
        assert_eq!(source.opened_position, 0);
    }

    #[tokio::test]
    async fn cancelled_load_does_not_write_metadata() {
        let track: Box<dyn IndexedTrackOutput + Send> = Box::new(RecordingTrack::default());
        let output = Arc::new(Mutex::new(track));

        let mut chunk = SingleSampleMediaChunk::new(media_chunk(), fmt());
        chunk.init(output.clone());

        let cancel = CancellationFlag::new();
        cancel.set();
        let mut source = FixtureSource { remaining: b"hello world".to_vec(), opened_position: -1 };
        let result = chunk.load(&mut source, cancel).await;
        assert!(result.is_err());
        assert_eq!(chunk.num_bytes_loaded(), 0);
    }
}
