//! The three ways a `Representation` names its media segments, and the
//! timing/URI arithmetic shared by the two multi-segment forms.

use crate::mpd::ranged_uri::RangedUri;
use crate::mpd::url_template::UrlTemplate;
use crate::util::{ceil_divide, scale_large_timestamp};

/// One expanded `<S>` entry — `r` repeats have already been unrolled into
/// individual elements by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentTimelineElement {
    pub start_time: i64,
    pub duration: i64,
}

/// `last_segment_num` for an unbounded (dynamic, still-live) period has no
/// concrete answer; callers that need a single number must special-case it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentCount {
    Bounded(u64),
    Unbounded,
}

#[derive(Debug, Clone)]
pub enum SegmentUriRef {
    Ranged(RangedUri),
    Plain(String),
}

#[derive(Debug, Clone)]
pub struct SingleSegmentBase {
    pub timescale: u64,
    pub presentation_time_offset: u64,
    pub initialization: Option<RangedUri>,
    /// Present when the representation's one media file starts with a sidx
    /// box self-indexing it.
    pub index_range: Option<RangedUri>,
    pub media: RangedUri,
}

#[derive(Debug, Clone)]
pub struct SegmentList {
    pub timescale: u64,
    pub presentation_time_offset: u64,
    pub start_number: u64,
    pub default_duration: i64,
    pub timeline: Option<Vec<SegmentTimelineElement>>,
    pub initialization: Option<RangedUri>,
    pub media_segments: Vec<RangedUri>,
}

#[derive(Debug, Clone)]
pub struct SegmentTemplate {
    pub timescale: u64,
    pub presentation_time_offset: u64,
    pub start_number: u64,
    pub default_duration: i64,
    pub timeline: Option<Vec<SegmentTimelineElement>>,
    /// Exactly one of these two is populated (the parser enforces this).
    pub initialization_template: Option<UrlTemplate>,
    pub initialization_uri: Option<RangedUri>,
    pub media_template: UrlTemplate,
}

#[derive(Debug, Clone)]
pub enum SegmentBase {
    Single(SingleSegmentBase),
    List(SegmentList),
    Template(SegmentTemplate),
}

/// Shared timing/URI arithmetic for `SegmentList` and `SegmentTemplate`.
pub trait MultiSegmentBase {
    fn timescale(&self) -> u64;
    fn presentation_time_offset(&self) -> u64;
    fn start_number(&self) -> u64;
    fn default_duration(&self) -> i64;
    fn timeline(&self) -> Option<&[SegmentTimelineElement]>;

    fn is_explicit(&self) -> bool {
        self.timeline().is_some()
    }

    fn first_segment_num(&self) -> u64 {
        self.start_number()
    }

    fn last_segment_num(&self, period_duration_us: Option<i64>) -> SegmentCount {
        if let Some(timeline) = self.timeline() {
            return SegmentCount::Bounded(self.start_number() + timeline.len() as u64 - 1);
        }
        match period_duration_us {
            None => SegmentCount::Unbounded,
            Some(period_duration_us) => {
                let unit_us = self.default_segment_duration_us();
                let count = ceil_divide(period_duration_us, unit_us.max(1));
                SegmentCount::Bounded(self.start_number() + count.max(1) as u64 - 1)
            }
        }
    }

    fn segment_time_us(&self, n: u64) -> i64 {
        match self.timeline() {
            Some(timeline) => {
                let elem = timeline[(n - self.start_number()) as usize];
                scale_large_timestamp(elem.start_time - self.presentation_time_offset() as i64, 1_000_000, self.timescale() as i64)
            }
            None => {
                let index = n - self.start_number();
                index as i64 * self.default_segment_duration_us()
            }
        }
    }

    fn default_segment_duration_us(&self) -> i64 {
        scale_large_timestamp(self.default_duration(), 1_000_000, self.timescale() as i64)
    }

    fn segment_duration_us(&self, n: u64, period_duration_us: Option<i64>) -> i64 {
        match self.timeline() {
            Some(timeline) => {
                let elem = timeline[(n - self.start_number()) as usize];
                scale_large_timestamp(elem.duration, 1_000_000, self.timescale() as i64)
            }
            None => {
                let is_last = match self.last_segment_num(period_duration_us) {
                    SegmentCount::Bounded(last) => last == n,
                    SegmentCount::Unbounded => false,
                };
                if is_last {
                    if let Some(period_duration_us) = period_duration_us {
                        return period_duration_us - self.segment_time_us(n);
                    }
                }
                self.default_segment_duration_us()
            }
        }
    }

    fn segment_num_for_time(&self, t: i64, period_duration_us: Option<i64>) -> u64 {
        let first = self.first_segment_num();
        let last = self.last_segment_num(period_duration_us);
        if let Some(timeline) = self.timeline() {
            // Binary search for the largest n with segment_time_us(n) <= t.
            let mut lo = 0usize;
            let mut hi = timeline.len();
            while lo < hi {
                let mid = (lo + hi) / 2;
                let mid_time = self.segment_time_us(first + mid as u64);
                if mid_time <= t {
                    lo = mid + 1;
                } else {
                    hi = mid;
                }
            }
            let n = first + lo.saturating_sub(1) as u64;
            return clamp(n, first, last);
        }
        let unit_us = self.default_segment_duration_us().max(1);
        let n = first + (t / unit_us).max(0) as u64;
        clamp(n, first, last)
    }
}

fn clamp(n: u64, first: u64, last: SegmentCount) -> u64 {
    let n = n.max(first);
    match last {
        SegmentCount::Bounded(last) => n.min(last),
        SegmentCount::Unbounded => n,
    }
}

impl MultiSegmentBase for SegmentList {
    fn timescale(&self) -> u64 {
        self.timescale
    }
    fn presentation_time_offset(&self) -> u64 {
        self.presentation_time_offset
    }
    fn start_number(&self) -> u64 {
        self.start_number
    }
    fn default_duration(&self) -> i64 {
        self.default_duration
    }
    fn timeline(&self) -> Option<&[SegmentTimelineElement]> {
        self.timeline.as_deref()
    }
}

impl SegmentList {
    pub fn segment_uri(&self, n: u64) -> Option<SegmentUriRef> {
        let index = (n - self.start_number) as usize;
        self.media_segments.get(index).cloned().map(SegmentUriRef::Ranged)
    }

    pub fn get_initialization(&self) -> Option<RangedUri> {
        self.initialization.clone()
    }
}

impl MultiSegmentBase for SegmentTemplate {
    fn timescale(&self) -> u64 {
        self.timescale
    }
    fn presentation_time_offset(&self) -> u64 {
        self.presentation_time_offset
    }
    fn start_number(&self) -> u64 {
        self.start_number
    }
    fn default_duration(&self) -> i64 {
        self.default_duration
    }
    fn timeline(&self) -> Option<&[SegmentTimelineElement]> {
        self.timeline.as_deref()
    }
}

impl SegmentTemplate {
    pub fn get_initialization(&self, representation_id: &str, bandwidth: u64) -> Option<SegmentUriRef> {
        if let Some(template) = &self.initialization_template {
            return Some(SegmentUriRef::Plain(template.build_uri(representation_id, 0, bandwidth, 0)));
        }
        self.initialization_uri.clone().map(SegmentUriRef::Ranged)
    }

    pub fn get_segment_uri(&self, representation_id: &str, bandwidth: u64, n: u64) -> SegmentUriRef {
        let time = self.segment_time_us_raw(n);
        SegmentUriRef::Plain(self.media_template.build_uri(representation_id, n as i64, bandwidth, time))
    }

    /// The raw (untimescaled) `$Time$` value substituted into the media
    /// template, distinct from `segment_time_us` which is in microseconds.
    fn segment_time_us_raw(&self, n: u64) -> i64 {
        match &self.timeline {
            Some(timeline) => timeline[(n - self.start_number) as usize].start_time,
            None => (n - self.start_number) as i64 * self.default_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(timeline: Option<Vec<SegmentTimelineElement>>) -> SegmentTemplate {
        SegmentTemplate {
            timescale: 1000,
            presentation_time_offset: 0,
            start_number: 1,
            default_duration: 2000,
            timeline,
            initialization_template: None,
            initialization_uri: None,
            media_template: UrlTemplate::compile("seg-$Number$.m4s").unwrap(),
        }
    }

    #[test]
    fn explicit_timeline_round_trips_time_to_number() {
        let timeline = vec![
            SegmentTimelineElement { start_time: 0, duration: 2000 },
            SegmentTimelineElement { start_time: 2000, duration: 2000 },
            SegmentTimelineElement { start_time: 4000, duration: 1000 },
        ];
        let t = template(Some(timeline));
        for n in 1..=3u64 {
            let time = t.segment_time_us(n);
            assert_eq!(t.segment_num_for_time(time, None), n);
        }
        assert_eq!(t.segment_time_us(1), 0);
        assert_eq!(t.last_segment_num(None), SegmentCount::Bounded(3));
    }

    #[test]
    fn implicit_duration_last_segment_is_clipped_to_period_end() {
        let t = template(None);
        // period is 5.5s, default segment duration 2s -> segments 1,2,3 (last short)
        assert_eq!(t.last_segment_num(Some(5_500_000)), SegmentCount::Bounded(3));
        assert_eq!(t.segment_duration_us(3, Some(5_500_000)), 5_500_000 - t.segment_time_us(3));
    }

    #[test]
    fn unbounded_period_has_no_last_segment() {
        let t = template(None);
        assert_eq!(t.last_segment_num(None), SegmentCount::Unbounded);
    }
}
