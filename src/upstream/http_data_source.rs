//! Component D: cancellable, byte-range-aware, self-metering HTTP data
//! source.
//!
//! Two cooperating tasks sit either side of a bounded FIFO byte buffer: the
//! caller drives `open`/`read`/`close`, and a spawned worker task drives the
//! actual HTTP transfer, pushing body bytes into the buffer and blocking
//! (via `Notify`) when it is full. `reqwest` already parses status line and
//! headers before handing back a `Response`, so the "AwaitingHeaders" state
//! from spec.md §4.D collapses into the `send().await` call; the worker only
//! implements the remaining "Streaming"/"Draining" half of the state
//! machine.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, OnceLock};

use futures_util::StreamExt;
use tokio::sync::{Mutex, Notify};

use crate::error::Result;
use crate::upstream::cancellation::CancellationFlag;
use crate::upstream::constants::{LENGTH_UNBOUNDED, RESULT_END_OF_INPUT, RESULT_IO_ERROR};
use crate::upstream::data_spec::DataSpec;
use crate::upstream::transfer_listener::SharedTransferListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpError {
    Ok,
    IoError,
    ContentTypeError,
    ResponseCodeError,
}

#[derive(Debug, Clone)]
pub struct HttpDataSourceConfig {
    /// Default 10 MiB, per spec.md §4.D.
    pub buffer_capacity: usize,
    /// At most one active transfer across all instances flagged with this.
    pub use_global_lock: bool,
    pub user_agent: Option<String>,
}

impl Default for HttpDataSourceConfig {
    fn default() -> Self {
        HttpDataSourceConfig {
            buffer_capacity: 10 * 1024 * 1024,
            use_global_lock: false,
            user_agent: None,
        }
    }
}

fn global_transfer_lock() -> &'static tokio::sync::Mutex<()> {
    static LOCK: OnceLock<tokio::sync::Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| tokio::sync::Mutex::new(()))
}

struct BufState {
    data: VecDeque<u8>,
    eof: bool,
    error: bool,
}

struct SharedBuffer {
    capacity: usize,
    state: Mutex<BufState>,
    not_full: Notify,
    not_empty: Notify,
}

impl SharedBuffer {
    fn new(capacity: usize) -> Self {
        SharedBuffer {
            capacity,
            state: Mutex::new(BufState { data: VecDeque::new(), eof: false, error: false }),
            not_full: Notify::new(),
            not_empty: Notify::new(),
        }
    }

    /// Appends `chunk`, waiting for the reader to drain space when full.
    /// Returns `false` if cancelled while waiting.
    async fn push(&self, chunk: &[u8], cancel: &CancellationFlag) -> bool {
        let mut offset = 0;
        while offset < chunk.len() {
            loop {
                if cancel.is_set() {
                    return false;
                }
                let mut guard = self.state.lock().await;
                if guard.data.len() < self.capacity {
                    let room = self.capacity - guard.data.len();
                    let take = room.min(chunk.len() - offset);
                    guard.data.extend(&chunk[offset..offset + take]);
                    offset += take;
                    drop(guard);
                    self.not_empty.notify_waiters();
                    break;
                }
                drop(guard);
                self.not_full.notified().await;
            }
        }
        true
    }

    async fn fail(&self) {
        let mut guard = self.state.lock().await;
        guard.error = true;
        drop(guard);
        self.not_empty.notify_waiters();
    }

    async fn close_eof(&self) {
        let mut guard = self.state.lock().await;
        guard.eof = true;
        drop(guard);
        self.not_empty.notify_waiters();
    }
}

async fn run_worker(
    mut stream: impl futures_util::Stream<Item = reqwest::Result<bytes::Bytes>> + Unpin,
    shared: Arc<SharedBuffer>,
    cancel: CancellationFlag,
    listener: Option<SharedTransferListener>,
) {
    if let Some(l) = &listener {
        l.on_transfer_start();
    }
    loop {
        if cancel.is_set() {
            shared.fail().await;
            break;
        }
        match stream.next().await {
            Some(Ok(chunk)) => {
                if let Some(l) = &listener {
                    l.on_bytes_transferred(chunk.len() as u32);
                }
                if !shared.push(&chunk, &cancel).await {
                    shared.fail().await;
                    break;
                }
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "HTTP body read failed");
                shared.fail().await;
                break;
            }
            None => {
                shared.close_eof().await;
                break;
            }
        }
    }
    if let Some(l) = &listener {
        l.on_transfer_end();
    }
}

struct OpenState {
    shared: Arc<SharedBuffer>,
    worker: tokio::task::JoinHandle<()>,
    resolved_uri: String,
    response_code: u16,
    response_headers: Vec<(String, String)>,
    content_length: i64,
    http_error: HttpError,
    cancel: CancellationFlag,
    _global_guard: Option<tokio::sync::MutexGuard<'static, ()>>,
}

/// Cancellable, byte-range HTTP data source with an internal bounded buffer.
/// Contract: `open → (read)* → close` is mandatory even on failure; only one
/// request may be open per instance at a time.
pub struct HttpDataSource {
    client: reqwest::Client,
    config: HttpDataSourceConfig,
    request_properties: BTreeMap<String, String>,
    transfer_listener: Option<SharedTransferListener>,
    state: Option<OpenState>,
}

impl HttpDataSource {
    pub fn new(client: reqwest::Client, config: HttpDataSourceConfig) -> Self {
        let mut request_properties = BTreeMap::new();
        if let Some(ua) = &config.user_agent {
            request_properties.insert("User-Agent".to_string(), ua.clone());
        }
        HttpDataSource { client, config, request_properties, transfer_listener: None, state: None }
    }

    pub fn set_transfer_listener(&mut self, listener: SharedTransferListener) {
        self.transfer_listener = Some(listener);
    }

    /// Overwrites any existing value for `name`. An empty `value` sends the
    /// header with no value.
    pub fn set_request_property(&mut self, name: &str, value: &str) {
        self.request_properties.insert(name.to_string(), value.to_string());
    }

    pub fn clear_request_property(&mut self, name: &str) {
        self.request_properties.remove(name);
    }

    pub fn clear_all_request_properties(&mut self) {
        self.request_properties.clear();
    }

    pub fn get_response_headers(&self) -> Option<&[(String, String)]> {
        self.state.as_ref().map(|s| s.response_headers.as_slice())
    }

    pub fn get_response_code(&self) -> i32 {
        self.state.as_ref().map(|s| s.response_code as i32).unwrap_or(-1)
    }

    pub fn get_http_error(&self) -> HttpError {
        self.state.as_ref().map(|s| s.http_error).unwrap_or(HttpError::Ok)
    }

    pub fn get_uri(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.resolved_uri.as_str())
    }

    /// Opens the source. Returns the resolved content length, or
    /// `LENGTH_UNBOUNDED` if unknown, on success; on failure or cancellation
    /// returns `RESULT_IO_ERROR` (never an `Err` — transport failures are
    /// reported through this sentinel exactly like the reference contract,
    /// since callers branch on it inline with the byte-count case).
    pub async fn open(&mut self, spec: DataSpec, cancel: CancellationFlag) -> Result<i64> {
        assert!(self.state.is_none(), "Close() before the next Open()");

        if cancel.is_set() {
            return Ok(RESULT_IO_ERROR);
        }

        let global_guard = if self.config.use_global_lock {
            Some(global_transfer_lock().lock().await)
        } else {
            None
        };

        let method = if spec.post_body.is_some() { reqwest::Method::POST } else { reqwest::Method::GET };
        let mut req = self.client.request(method, &spec.uri);
        for (k, v) in &self.request_properties {
            req = req.header(k.as_str(), v.as_str());
        }

        let byte_range_requested = !(spec.position == 0 && spec.is_unbounded());
        if byte_range_requested {
            let range = if spec.is_unbounded() {
                format!("bytes={}-", spec.position)
            } else {
                format!("bytes={}-{}", spec.position, spec.position + spec.length - 1)
            };
            req = req.header(reqwest::header::RANGE, range);
        }
        if let Some(body) = spec.post_body.clone() {
            req = req.body(body);
        }

        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, uri = %spec.uri, "HTTP request failed");
                return Ok(RESULT_IO_ERROR);
            }
        };

        if cancel.is_set() {
            return Ok(RESULT_IO_ERROR);
        }

        let status = resp.status();
        let resolved_uri = resp.url().to_string();
        let headers: Vec<(String, String)> = resp
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();

        if !status.is_success() {
            self.state = Some(OpenState {
                shared: Arc::new(SharedBuffer::new(0)),
                worker: tokio::spawn(async {}),
                resolved_uri,
                response_code: status.as_u16(),
                response_headers: headers,
                content_length: LENGTH_UNBOUNDED,
                http_error: HttpError::ResponseCodeError,
                cancel,
                _global_guard: global_guard,
            });
            return Ok(RESULT_IO_ERROR);
        }
        if byte_range_requested && status.as_u16() == 200 {
            self.state = Some(OpenState {
                shared: Arc::new(SharedBuffer::new(0)),
                worker: tokio::spawn(async {}),
                resolved_uri,
                response_code: status.as_u16(),
                response_headers: headers,
                content_length: LENGTH_UNBOUNDED,
                http_error: HttpError::ContentTypeError,
                cancel,
                _global_guard: global_guard,
            });
            return Ok(RESULT_IO_ERROR);
        }

        let content_length = resp.content_length().map(|n| n as i64).unwrap_or(LENGTH_UNBOUNDED);
        let shared = Arc::new(SharedBuffer::new(self.config.buffer_capacity));
        let stream = resp.bytes_stream();
        let listener = self.transfer_listener.clone();
        let worker = tokio::spawn(run_worker(stream, shared.clone(), cancel.clone(), listener));

        self.state = Some(OpenState {
            shared,
            worker,
            resolved_uri,
            response_code: status.as_u16(),
            response_headers: headers,
            content_length,
            http_error: HttpError::Ok,
            cancel,
            _global_guard: global_guard,
        });

        Ok(content_length)
    }

    /// Reads up to `buf.len()` bytes. Returns the number of bytes read
    /// (`>= 0`, `0` is not an error), `RESULT_END_OF_INPUT`, or
    /// `RESULT_IO_ERROR`.
    pub async fn read(&mut self, buf: &mut [u8]) -> i64 {
        let state = match &self.state {
            Some(s) => s,
            None => return RESULT_IO_ERROR,
        };
        loop {
            {
                let mut guard = state.shared.state.lock().await;
                if !guard.data.is_empty() {
                    let n = buf.len().min(guard.data.len());
                    for slot in buf.iter_mut().take(n) {
                        *slot = guard.data.pop_front().expect("checked non-empty");
                    }
                    drop(guard);
                    state.shared.not_full.notify_waiters();
                    return n as i64;
                }
                if guard.error {
                    return RESULT_IO_ERROR;
                }
                if guard.eof {
                    return RESULT_END_OF_INPUT;
                }
            }
            if state.cancel.is_set() {
                return RESULT_IO_ERROR;
            }
            state.shared.not_empty.notified().await;
        }
    }

    /// Reads the entire remaining body into a single string, bounded by
    /// `max` bytes (0 means "use the buffer capacity"). Errors or overflow
    /// return an empty string. Must not be interleaved with `read()` calls.
    pub async fn read_all_to_string(&mut self, max: usize) -> String {
        let limit = if max == 0 { self.config.buffer_capacity } else { max };
        let mut out = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            let n = self.read(&mut chunk).await;
            if n == RESULT_END_OF_INPUT {
                break;
            }
            if n < 0 {
                return String::new();
            }
            out.extend_from_slice(&chunk[..n as usize]);
            if out.len() > limit {
                return String::new();
            }
        }
        String::from_utf8(out).unwrap_or_default()
    }

    /// Closes the source, resetting it to the `Idle` state. Safe to call
    /// after a failed or cancelled `open()`, and required before reopening.
    pub fn close(&mut self) {
        if let Some(state) = self.state.take() {
            state.worker.abort();
        }
    }
}

impl Drop for HttpDataSource {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use axum::Router;

    async fn spawn_server(router: Router) -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn full_body_read_matches_content_length() {
        let body = vec![7u8; 50_000];
        let router = Router::new().route(
            "/blob",
            get(move || {
                let body = body.clone();
                async move { body }
            }),
        );
        let addr = spawn_server(router).await;
        let mut ds = HttpDataSource::new(reqwest::Client::new(), HttpDataSourceConfig::default());
        let spec = DataSpec::new(format!("http://{addr}/blob"));
        let len = ds.open(spec, CancellationFlag::new()).await.unwrap();
        assert_eq!(len, 50_000);

        let mut total = 0usize;
        let mut buf = [0u8; 4096];
        loop {
            let n = ds.read(&mut buf).await;
            if n == RESULT_END_OF_INPUT {
                break;
            }
            assert!(n >= 0);
            total += n as usize;
        }
        assert_eq!(total, 50_000);
        ds.close();
    }

    #[tokio::test]
    async fn not_found_is_io_error_with_response_code() {
        let router = Router::new().route("/missing", get(|| async { (axum::http::StatusCode::NOT_FOUND, "") }));
        let addr = spawn_server(router).await;
        let mut ds = HttpDataSource::new(reqwest::Client::new(), HttpDataSourceConfig::default());
        let spec = DataSpec::new(format!("http://{addr}/missing"));
        let result = ds.open(spec, CancellationFlag::new()).await.unwrap();
        assert_eq!(result, RESULT_IO_ERROR);
        assert_eq!(ds.get_http_error(), HttpError::ResponseCodeError);
        ds.close();
    }

    #[tokio::test]
    async fn cancel_before_open_aborts_immediately() {
        let mut ds = HttpDataSource::new(reqwest::Client::new(), HttpDataSourceConfig::default());
        let cancel = CancellationFlag::new();
        cancel.set();
        let spec = DataSpec::new("http://127.0.0.1:1/unreachable");
        let result = ds.open(spec, cancel).await.unwrap();
        assert_eq!(result, RESULT_IO_ERROR);
    }
}
