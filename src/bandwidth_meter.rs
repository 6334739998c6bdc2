//! Component C: bandwidth meter.
//!
//! Listens for transfer events from one or more concurrently-open data
//! sources and turns them into a bits-per-second estimate, using a
//! [`SlidingMedian`](crate::sliding_median::SlidingMedian) as the averager.
//! Multiple overlapping transfers share one accounting window: the window
//! opens when `stream_count` goes 0→1 and the sample is published only when
//! `stream_count` returns to 0, so two transfers racing each other never
//! produce two independent (and therefore misleadingly small) samples.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::sliding_median::SlidingMedian;
use crate::task_runner::TaskRunner;

/// Published when no sample has ever been produced, or the last sample
/// computed a non-positive average.
pub const NO_ESTIMATE: i64 = -1;

/// `kDefaultMaxWeight` from the reference bandwidth meter.
pub const DEFAULT_MAX_WEIGHT: i64 = 20_000;

pub trait BandwidthSampleListener: Send + Sync {
    fn on_bandwidth_sample(&self, elapsed: Duration, bytes: u64, bitrate: i64);
}

struct Inner {
    averager: SlidingMedian,
    bytes_accumulator: u64,
    start_time: Instant,
    bitrate_estimate: i64,
    stream_count: u32,
}

/// Transfer-event listener producing bits-per-second estimates.
pub struct BandwidthMeter {
    inner: Mutex<Inner>,
    listener: Option<Arc<dyn BandwidthSampleListener>>,
    task_runner: Option<Arc<dyn TaskRunner>>,
}

impl BandwidthMeter {
    pub fn new(
        listener: Option<Arc<dyn BandwidthSampleListener>>,
        task_runner: Option<Arc<dyn TaskRunner>>,
    ) -> Self {
        Self::with_max_weight(listener, task_runner, DEFAULT_MAX_WEIGHT)
    }

    pub fn with_max_weight(
        listener: Option<Arc<dyn BandwidthSampleListener>>,
        task_runner: Option<Arc<dyn TaskRunner>>,
        max_weight: i64,
    ) -> Self {
        assert!(
            listener.is_none() || task_runner.is_some(),
            "a sample listener requires a task runner to post to"
        );
        BandwidthMeter {
            inner: Mutex::new(Inner {
                averager: SlidingMedian::new(max_weight),
                bytes_accumulator: 0,
                start_time: Instant::now(),
                bitrate_estimate: NO_ESTIMATE,
                stream_count: 0,
            }),
            listener,
            task_runner,
        }
    }

    /// Safe to call from any thread; returns the last published estimate or
    /// [`NO_ESTIMATE`].
    pub fn get_bitrate_estimate(&self) -> i64 {
        self.inner.lock().unwrap().bitrate_estimate
    }

    pub fn on_transfer_start(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.stream_count == 0 {
            inner.start_time = Instant::now();
            debug_assert_eq!(inner.bytes_accumulator, 0);
        }
        inner.stream_count += 1;
        tracing::trace!(stream_count = inner.stream_count, "transfer start");
    }

    pub fn on_bytes_transferred(&self, bytes: u32) {
        debug_assert!(bytes > 0);
        let mut inner = self.inner.lock().unwrap();
        inner.bytes_accumulator += bytes as u64;
    }

    pub fn on_transfer_end(&self) {
        let mut to_notify: Option<(Duration, u64, i64)> = None;
        {
            let mut inner = self.inner.lock().unwrap();
            debug_assert!(inner.stream_count > 0);
            inner.stream_count -= 1;
            tracing::trace!(stream_count = inner.stream_count, "transfer end");

            if inner.stream_count == 0 {
                let now = Instant::now();
                let elapsed = now.saturating_duration_since(inner.start_time);
                let accumulator = inner.bytes_accumulator;

                if !elapsed.is_zero() && accumulator > 0 {
                    let bits_per_second = (accumulator as u128 * 8 * 1_000_000
                        / elapsed.as_micros().max(1))
                        as i64;
                    let weight = (accumulator as f64).sqrt() as i64;
                    let weight = weight.max(1);
                    inner.averager.add_sample(weight, bits_per_second);
                    let mut estimate = inner.averager.get_average();
                    if estimate <= 0 {
                        estimate = NO_ESTIMATE;
                    }
                    inner.bitrate_estimate = estimate;
                    to_notify = Some((elapsed, accumulator, estimate));
                }

                inner.start_time = now;
                inner.bytes_accumulator = 0;
            }
        }

        if let Some((elapsed, bytes, bitrate)) = to_notify {
            self.notify_bandwidth_sample(elapsed, bytes, bitrate);
        }
    }

    fn notify_bandwidth_sample(&self, elapsed: Duration, bytes: u64, bitrate: i64) {
        let (listener, runner) = match (&self.listener, &self.task_runner) {
            (Some(l), Some(r)) => (l.clone(), r.clone()),
            _ => return,
        };
        tracing::debug!(?elapsed, bytes, bitrate, "new bandwidth estimate");
        runner.post(Box::new(move || listener.on_bandwidth_sample(elapsed, bytes, bitrate)));
    }
}
