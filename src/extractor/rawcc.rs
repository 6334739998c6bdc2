//! Component J: RAWCC caption track parser.
//!
//! Ported from `RawCCParserExtractor` (`rawcc_parser_extractor.cc`): a small
//! framing format wrapping CEA-708 user-data triplets —
//! `"RCC\x01"` + a version byte + 3 reserved flag bytes, then repeating
//! `(4-byte 45kHz PTS, 1-byte entry count, count * 3-byte entries)` groups —
//! re-packaged one entry at a time into 8-byte `(pts:4, field:1, cc1:1,
//! cc2:1, cc_valid:1)` records and flushed as a single sample per PTS group.

use crate::extractor::{Extractor, ExtractorInput, ExtractorOutput, TrackOutput, SAMPLE_FLAG_SYNC};
use crate::upstream::constants::{RESULT_CONTINUE, RESULT_END_OF_INPUT, RESULT_IO_ERROR};
use crate::util::duration::scale_large_timestamp;

const RAWCC_HEADER: [u8; 4] = [b'R', b'C', b'C', 0x01];
const HEADER_SIZE: usize = 8;
const FLAGS_SIZE: usize = 3;
const PTS_AND_COUNT_SIZE: usize = 5;
const SAMPLE_SIZE: usize = 3;
const ENTRY_SIZE: usize = 8;
const READ_BUFFER_SIZE: usize = 4096;
const MICROS_PER_MS: i64 = 1000;
/// Caps how many entries accumulate into a single emitted sample before a
/// mid-stream flush, bounding the size of any one `write_sample_metadata`
/// record regardless of how many entries a PTS group happens to contain.
const MAX_ENTRIES_PER_SAMPLE: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ParsingHeader,
    ParsingPtsAndCount,
    ParsingEntries,
}

/// Parses a RAWCC byte stream into 608/708 caption samples on track 0.
///
/// `trunc_start_us`/`trunc_end_us` restrict output to a PTS window (used
/// when a caption track is shared across multiple chunks of a longer
/// recording and only a sub-range belongs to this chunk); `sample_offset_us`
/// rebases emitted PTS values onto the chunk's own timeline.
pub struct RawccParser {
    sample_offset_us: i64,
    trunc_start_us: Option<i64>,
    trunc_end_us: Option<i64>,

    buf: Vec<u8>,
    read_pos: usize,

    state: State,
    version: u8,
    pts: u32,
    expected_count: u8,
    sample_index: u8,
    producing: bool,
    sample_pts_us: i64,
    total_written: u32,
}

impl RawccParser {
    pub fn new(sample_offset_us: i64, trunc_start_us: Option<i64>, trunc_end_us: Option<i64>) -> Self {
        let mut parser = RawccParser {
            sample_offset_us,
            trunc_start_us,
            trunc_end_us,
            buf: Vec::new(),
            read_pos: 0,
            state: State::ParsingHeader,
            version: 0,
            pts: 0,
            expected_count: 0,
            sample_index: 0,
            producing: true,
            sample_pts_us: 0,
            total_written: 0,
        };
        parser.reset_state();
        parser
    }

    fn reset_state(&mut self) {
        self.buf.clear();
        self.read_pos = 0;
        self.state = State::ParsingHeader;
        self.version = 0;
        self.pts = 0;
        self.expected_count = 0;
        self.sample_index = 0;
        self.producing = true;
        self.sample_pts_us = 0;
        self.total_written = 0;
    }

    fn available(&self) -> usize {
        self.buf.len() - self.read_pos
    }

    fn take_byte(&mut self) -> u8 {
        let v = self.buf[self.read_pos];
        self.read_pos += 1;
        v
    }

    fn take_u32(&mut self) -> u32 {
        use byteorder::{BigEndian, ByteOrder};
        let v = BigEndian::read_u32(&self.buf[self.read_pos..self.read_pos + 4]);
        self.read_pos += 4;
        v
    }

    fn pts_to_us(pts: u32) -> i64 {
        scale_large_timestamp(pts as i64, MICROS_PER_MS, 45)
    }

    fn flush_sample(&mut self, track: &mut dyn TrackOutput) {
        if self.total_written > 0 && self.producing {
            let last_pts_us = Self::pts_to_us(self.pts);
            track.write_sample_metadata(
                self.sample_pts_us,
                last_pts_us - self.sample_pts_us,
                SAMPLE_FLAG_SYNC,
                self.total_written * ENTRY_SIZE as u32,
                0,
                None,
                None,
            );
            self.total_written = 0;
        }
    }

    fn write_fully(track: &mut dyn TrackOutput, entry: &[u8; ENTRY_SIZE]) -> bool {
        let mut pos = 0;
        while pos < entry.len() {
            let n = track.write_sample_data_fix_this(&entry[pos..]);
            if n <= 0 {
                return false;
            }
            pos += n as usize;
        }
        true
    }
}

impl Extractor for RawccParser {
    fn sniff(&mut self, _input: &mut dyn ExtractorInput) -> bool {
        // No magic-byte buffering to sniff against ahead of Read(); the
        // caller already knows this is a RAWCC track from the MPD, so stay
        // optimistic like the reference.
        true
    }

    fn init(&mut self, output: &mut dyn ExtractorOutput) {
        output.register_track(0);
        output.done_registering_tracks();
    }

    fn read(&mut self, input: &mut dyn ExtractorInput, output: &mut dyn ExtractorOutput) -> i64 {
        let n = self.available();
        if n > 0 && self.read_pos != 0 {
            self.buf.copy_within(self.read_pos.., 0);
            self.buf.truncate(n);
            self.read_pos = 0;
        } else if n == 0 {
            self.buf.clear();
            self.read_pos = 0;
        }

        let write_pos = self.buf.len();
        self.buf.resize(write_pos + READ_BUFFER_SIZE, 0);
        let result = input.read(&mut self.buf[write_pos..]);

        if result == 0 {
            self.buf.truncate(write_pos);
            return RESULT_CONTINUE;
        }
        if result == RESULT_END_OF_INPUT {
            self.buf.truncate(write_pos);
            self.reset_state();
            return RESULT_END_OF_INPUT;
        }
        if result < 0 {
            self.buf.truncate(write_pos);
            return RESULT_IO_ERROR;
        }
        self.buf.truncate(write_pos + result as usize);

        let track = output.register_track(0);

        while self.read_pos < self.buf.len() {
            match self.state {
                State::ParsingHeader => {
                    if self.available() < HEADER_SIZE {
                        return RESULT_CONTINUE;
                    }
                    let hdr = [self.buf[self.read_pos], self.buf[self.read_pos + 1], self.buf[self.read_pos + 2], self.buf[self.read_pos + 3]];
                    self.read_pos += 4;
                    if hdr != RAWCC_HEADER {
                        return RESULT_IO_ERROR;
                    }
                    self.version = self.take_byte();
                    if self.version != 0x00 {
                        return RESULT_IO_ERROR;
                    }
                    self.read_pos += FLAGS_SIZE;
                    self.state = State::ParsingPtsAndCount;
                    continue;
                }
                State::ParsingPtsAndCount => {
                    if self.available() < PTS_AND_COUNT_SIZE {
                        return RESULT_CONTINUE;
                    }
                    self.pts = self.take_u32();
                    let this_sample_pts_us = Self::pts_to_us(self.pts);

                    self.producing = true;
                    if let Some(start) = self.trunc_start_us {
                        if this_sample_pts_us < start {
                            self.producing = false;
                        }
                    }
                    if let Some(end) = self.trunc_end_us {
                        if this_sample_pts_us > end {
                            self.producing = false;
                        }
                    }

                    if self.total_written == 0 {
                        self.sample_pts_us = this_sample_pts_us;
                    }

                    self.expected_count = self.take_byte();
                    self.sample_index = 0;
                    self.state = State::ParsingEntries;
                    continue;
                }
                State::ParsingEntries => {
                    while self.sample_index < self.expected_count {
                        if self.available() < SAMPLE_SIZE {
                            return RESULT_CONTINUE;
                        }
                        let flags = self.take_byte();
                        let cc1 = self.take_byte();
                        let cc2 = self.take_byte();

                        if !self.producing {
                            self.sample_index += 1;
                            continue;
                        }

                        let mut entry_pts = self.pts;
                        if self.sample_offset_us != 0 {
                            let shifted_us = Self::pts_to_us(self.pts) + self.sample_offset_us;
                            entry_pts = ((shifted_us / MICROS_PER_MS) * 45) as u32;
                        }

                        let entry: [u8; ENTRY_SIZE] = [
                            (entry_pts >> 24) as u8,
                            (entry_pts >> 16) as u8,
                            (entry_pts >> 8) as u8,
                            entry_pts as u8,
                            flags & 0x03,
                            cc1,
                            cc2,
                            ((flags & 0x04) != 0) as u8,
                        ];
                        if !Self::write_fully(track, &entry) {
                            return RESULT_IO_ERROR;
                        }
                        self.sample_index += 1;
                        self.total_written += 1;
                        if self.total_written > MAX_ENTRIES_PER_SAMPLE {
                            self.flush_sample(track);
                        }
                    }

                    self.expected_count = 0;
                    self.sample_index = 0;
                    self.state = State::ParsingPtsAndCount;
                }
            }
        }

        self.flush_sample(track);
        RESULT_CONTINUE
    }

    fn seek(&mut self) {
        self.reset_state();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpd::Format;

    const GOOD_PACKET: [u8; 28] = [
        b'R', b'C', b'C', 0x01, 0x00, 0x00, 0x00, 0x00, // header
        0x00, 0x00, 0x00, 0x01, // pts
        0x05, // count
        0x03, 0x80, 0x80, 0x03, 0x81, 0x81, 0x03, 0x82, 0x82, 0x03, 0x83, 0x83, 0x03, 0x84, 0x84,
    ];

    const BAD_HEADER: [u8; 8] = [b'B', b'A', b'R', b'F', 0x00, 0x00, 0x00, 0x00];

    #[derive(Default)]
    struct RecordingTrack {
        data: Vec<u8>,
        metadata: Vec<(i64, i64, u32, u32, u32)>,
    }

    impl TrackOutput for RecordingTrack {
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
            offset: u32,
            _encryption_key_id: Option<&[u8]>,
            _iv: Option<&[u8]>,
        ) {
            self.metadata.push((time_us, duration_us, flags, size, offset));
        }
    }

    struct FixedTrackOutput(RecordingTrack);

    impl ExtractorOutput for FixedTrackOutput {
        fn register_track(&mut self, _track_id: i32) -> &mut dyn TrackOutput {
            &mut self.0
        }
        fn done_registering_tracks(&mut self) {}
        fn give_seek_map(&mut self, _seek_map: Box<dyn crate::extractor::SeekMap>) {}
    }

    #[test]
    fn parses_whole_packet_in_one_read() {
        let mut parser = RawccParser::new(0, None, None);
        let mut output = FixedTrackOutput(RecordingTrack::default());
        parser.init(&mut output);

        let mut input = crate::extractor::SliceExtractorInput::new(&GOOD_PACKET);
        let result = parser.read(&mut input, &mut output);
        assert_eq!(result, RESULT_CONTINUE);
        assert_eq!(output.0.metadata, vec![(22, 0, SAMPLE_FLAG_SYNC, 40, 0)]);
        assert_eq!(output.0.data.len(), 40);

        let result = parser.read(&mut input, &mut output);
        assert_eq!(result, RESULT_END_OF_INPUT);
    }

    #[test]
    fn parses_byte_by_byte() {
        let mut parser = RawccParser::new(0, None, None);
        let mut output = FixedTrackOutput(RecordingTrack::default());
        parser.init(&mut output);

        for i in 0..GOOD_PACKET.len() {
            let mut input = crate::extractor::SliceExtractorInput::new(&GOOD_PACKET[i..i + 1]);
            let result = parser.read(&mut input, &mut output);
            assert_ne!(result, RESULT_IO_ERROR);
        }
        assert_eq!(output.0.metadata, vec![(22, 0, SAMPLE_FLAG_SYNC, 40, 0)]);
    }

    #[test]
    fn bad_header_is_io_error() {
        let mut parser = RawccParser::new(0, None, None);
        let mut output = FixedTrackOutput(RecordingTrack::default());
        parser.init(&mut output);

        let mut input = crate::extractor::SliceExtractorInput::new(&BAD_HEADER);
        let result = parser.read(&mut input, &mut output);
        assert_eq!(result, RESULT_IO_ERROR);
    }
}
