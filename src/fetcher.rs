//! Component G: manifest fetcher.
//!
//! Ported from `ManifestFetcher`/`ManifestLoadable`
//! (`manifest_fetcher.cc`/`.h`): a single in-flight load at a time, an
//! enable/disable reference count gating whether refreshes are even
//! attempted, and an exponential-ish backoff on repeated failures. The
//! original detects a stale completed load by comparing the raw pointer of
//! the `Loadable` that finished against the one it currently expects; Rust
//! has no equivalent of comparing a freed-or-reused pointer safely, so this
//! uses a monotonically increasing generation counter instead — a load
//! started at generation N whose result arrives after `request_refresh` has
//! moved the fetcher to generation N+1 is discarded exactly like the stale
//! pointer would have been.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::mpd::Mpd;
use crate::task_runner::TaskRunner;
use crate::upstream::{CancellationFlag, DataSpec, HttpDataSource, HttpDataSourceConfig};

/// Mirrors `ManifestFetchError` (`NONE=0, UNKNOWN_ERROR=-1, NETWORK_ERROR=-2,
/// PARSING_ERROR=-3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFetchError {
    None,
    Unknown,
    Network,
    Parsing,
}

pub trait ManifestFetcherListener: Send + Sync {
    fn on_manifest_refresh_started(&self) {}
    fn on_manifest_refreshed(&self) {}
    fn on_manifest_error(&self, error: ManifestFetchError) {}
}

struct State {
    manifest: Option<Arc<Mpd>>,
    manifest_uri: String,
    load_error: ManifestFetchError,
    load_error_count: u32,
    load_error_timestamp: Option<Instant>,
    loading: bool,
    enable_count: u32,
    generation: u64,
}

/// Polls a single DASH manifest URI, re-parsing it into a fresh [`Mpd`] on
/// each successful refresh. Consumers read the latest manifest via
/// [`ManifestFetcher::manifest`]; they never see a half-applied refresh since
/// the `Arc<Mpd>` swap is atomic under the state lock.
pub struct ManifestFetcher {
    state: Mutex<State>,
    client: reqwest::Client,
    listener: Option<Arc<dyn ManifestFetcherListener>>,
    task_runner: Option<Arc<dyn TaskRunner>>,
    next_generation: AtomicU64,
}

impl ManifestFetcher {
    pub fn new(
        manifest_uri: impl Into<String>,
        client: reqwest::Client,
        listener: Option<Arc<dyn ManifestFetcherListener>>,
        task_runner: Option<Arc<dyn TaskRunner>>,
    ) -> Arc<Self> {
        assert!(
            listener.is_none() || task_runner.is_some(),
            "a fetcher listener requires a task runner to post to"
        );
        Arc::new(ManifestFetcher {
            state: Mutex::new(State {
                manifest: None,
                manifest_uri: manifest_uri.into(),
                load_error: ManifestFetchError::None,
                load_error_count: 0,
                load_error_timestamp: None,
                loading: false,
                enable_count: 0,
                generation: 0,
            }),
            client,
            listener,
            task_runner,
            next_generation: AtomicU64::new(1),
        })
    }

    pub fn manifest(&self) -> Option<Arc<Mpd>> {
        self.state.lock().unwrap().manifest.clone()
    }

    /// `GetRetryDelayMillis`: `min((error_count - 1) * 1000, 5000)`.
    fn retry_delay(error_count: u32) -> Duration {
        let millis = ((error_count.saturating_sub(1)) as u64 * 1000).min(5000);
        Duration::from_millis(millis)
    }

    /// `CanContinueBuffering`: no error yet, or exactly one error so far (the
    /// first failure doesn't block playback of already-buffered content).
    pub fn can_continue_buffering(&self) -> bool {
        let state = self.state.lock().unwrap();
        state.load_error == ManifestFetchError::None || state.load_error_count <= 1
    }

    /// Bumps the enable ref count; on the 0→1 transition, clears any
    /// previously recorded error so the next refresh attempt isn't
    /// immediately throttled by a backoff computed for a stale disablement.
    pub fn enable(&self) {
        let mut state = self.state.lock().unwrap();
        state.enable_count += 1;
        if state.enable_count == 1 {
            state.load_error = ManifestFetchError::None;
            state.load_error_count = 0;
            state.load_error_timestamp = None;
        }
    }

    /// Drops the enable ref count; on the last disable, bumps the
    /// generation so any in-flight load's result is discarded as stale when
    /// it eventually completes.
    pub fn disable(self: &Arc<Self>) {
        let mut state = self.state.lock().unwrap();
        assert!(state.enable_count > 0, "disable() without a matching enable()");
        state.enable_count -= 1;
        if state.enable_count == 0 {
            state.generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Starts a refresh if none is in flight, enough backoff time has
    /// elapsed since the last failure, and the fetcher is currently enabled.
    /// Fire-and-forget: spawns the load onto the Tokio runtime. Returns
    /// whether a load was actually started, so a caller deciding whether to
    /// keep polling (e.g. on a timer) can tell a throttled request apart
    /// from one that's now in flight.
    pub fn request_refresh(self: &Arc<Self>) -> bool {
        let generation = {
            let mut state = self.state.lock().unwrap();
            if state.enable_count == 0 || state.loading {
                return false;
            }
            if let Some(ts) = state.load_error_timestamp {
                if ts.elapsed() < Self::retry_delay(state.load_error_count) {
                    return false;
                }
            }
            state.loading = true;
            state.generation
        };

        self.notify(|l| l.on_manifest_refresh_started());

        let this = self.clone();
        tokio::spawn(async move {
            this.load(generation).await;
        });
        true
    }

    async fn load(self: &Arc<Self>, generation: u64) {
        let uri = self.state.lock().unwrap().manifest_uri.clone();

        let mut source = HttpDataSource::new(self.client.clone(), HttpDataSourceConfig::default());
        let cancel = CancellationFlag::new();
        let open_result = source.open(DataSpec::new(uri.clone()), cancel.clone()).await;

        let outcome = match open_result {
            Ok(len) if len >= crate::upstream::constants::LENGTH_UNBOUNDED => {
                let body = source.read_all_to_string(0).await;
                source.close();
                if body.is_empty() {
                    Err(ManifestFetchError::Network)
                } else {
                    match crate::mpd::parse(&body, &uri) {
                        Ok(mpd) => Ok(mpd),
                        Err(e) => {
                            tracing::warn!(error = %e, uri, "manifest parse failed");
                            Err(ManifestFetchError::Parsing)
                        }
                    }
                }
            }
            _ => {
                source.close();
                Err(ManifestFetchError::Network)
            }
        };

        self.load_complete(generation, outcome);
    }

    fn load_complete(self: &Arc<Self>, generation: u64, outcome: Result<Mpd, ManifestFetchError>) {
        let mut state = self.state.lock().unwrap();
        state.loading = false;
        if generation != state.generation {
            // A stale load finishing after disable()/re-enable() bumped the
            // generation: drop it, matching the reference's stale-pointer check.
            return;
        }
        match outcome {
            Ok(mpd) => {
                state.manifest = Some(Arc::new(mpd));
                state.load_error = ManifestFetchError::None;
                state.load_error_count = 0;
                state.load_error_timestamp = None;
                drop(state);
                self.notify(|l| l.on_manifest_refreshed());
            }
            Err(error) => {
                state.load_error = error;
                state.load_error_count += 1;
                state.load_error_timestamp = Some(Instant::now());
                drop(state);
                self.notify(move |l| l.on_manifest_error(error));
            }
        }
    }

    fn notify<F>(&self, call: F)
    where
        F: Fn(&dyn ManifestFetcherListener) + Send + 'static,
    {
        let (listener, runner) = match (&self.listener, &self.task_runner) {
            (Some(l), Some(r)) => (l.clone(), r.clone()),
            _ => return,
        };
        runner.post(Box::new(move || call(listener.as_ref())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inline;
    impl TaskRunner for Inline {
        fn post(&self, task: Box<dyn FnOnce() + Send>) {
            task();
        }
    }

    #[test]
    fn retry_delay_caps_at_five_seconds() {
        assert_eq!(ManifestFetcher::retry_delay(0), Duration::from_millis(0));
        assert_eq!(ManifestFetcher::retry_delay(1), Duration::from_millis(0));
        assert_eq!(ManifestFetcher::retry_delay(2), Duration::from_millis(1000));
        assert_eq!(ManifestFetcher::retry_delay(10), Duration::from_millis(5000));
        assert_eq!(ManifestFetcher::retry_delay(100), Duration::from_millis(5000));
    }

    #[tokio::test]
    async fn disable_without_enable_panics() {
        let fetcher =
            ManifestFetcher::new("http://example.invalid/manifest.mpd", reqwest::Client::new(), None, None);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| fetcher.disable()));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn enable_disable_ref_counts() {
        let fetcher =
            ManifestFetcher::new("http://example.invalid/manifest.mpd", reqwest::Client::new(), None, None);
        fetcher.enable();
        fetcher.enable();
        assert!(fetcher.can_continue_buffering());
        fetcher.disable();
        assert_eq!(fetcher.state.lock().unwrap().generation, 0);
        fetcher.disable();
        assert_eq!(fetcher.state.lock().unwrap().generation, 1);
    }

    #[tokio::test]
    async fn request_refresh_is_throttled_while_loading_or_backing_off() {
        let fetcher =
            ManifestFetcher::new("http://example.invalid/manifest.mpd", reqwest::Client::new(), None, None);

        // Disabled: no load starts.
        assert!(!fetcher.request_refresh());

        fetcher.enable();
        // A load is recorded as in flight the moment request_refresh
        // returns true, so a second call before it completes is throttled.
        {
            let mut state = fetcher.state.lock().unwrap();
            state.loading = true;
        }
        assert!(!fetcher.request_refresh());
        {
            let mut state = fetcher.state.lock().unwrap();
            state.loading = false;
        }

        // A fresh failure timestamp with error_count > 1 backs off for a
        // full second; request_refresh must not start a new load yet.
        {
            let mut state = fetcher.state.lock().unwrap();
            state.load_error_count = 2;
            state.load_error_timestamp = Some(Instant::now());
        }
        assert!(!fetcher.request_refresh());
    }

    #[tokio::test]
    async fn stale_generation_is_discarded() {
        let fetcher =
            ManifestFetcher::new("http://example.invalid/manifest.mpd", reqwest::Client::new(), None, None);
        fetcher.enable();
        fetcher.disable();
        // generation is now 1; a load started under generation 0 must be dropped.
        fetcher.load_complete(0, Err(ManifestFetchError::Network));
        assert_eq!(fetcher.state.lock().unwrap().load_error_count, 0);
    }
}
