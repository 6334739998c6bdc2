//! Component K: license fetcher.
//!
//! Ported from `LicenseFetcher` (`license_fetcher.cc`/`.h`): a POST of a
//! DRM key message to a license server, returning the raw license blob. Two
//! separate locks mirror the original's split between the attributes that
//! can be updated from any thread at any time (`license_uri`, `auth_token`)
//! and the fetch operation itself, which must be serialized so two
//! concurrent `fetch()` calls don't race on the shared `HttpDataSource`.

use std::sync::Mutex;

use crate::upstream::{CancellationFlag, DataSpec, HttpDataSource, HttpDataSourceConfig};

struct Attributes {
    license_uri: String,
    auth_token: Option<String>,
}

/// Fetches DRM license blobs by POSTing a key message to a license server
/// URI. `license_uri`/`auth_token` may be updated at any time (e.g. when a
/// manifest refresh carries a new license server or a fresh auth token);
/// `fetch` serializes against itself so only one POST is in flight.
pub struct LicenseFetcher {
    attributes: Mutex<Attributes>,
    fetch_lock: tokio::sync::Mutex<()>,
    client: reqwest::Client,
    user_agent: Option<String>,
}

impl LicenseFetcher {
    pub fn new(license_uri: impl Into<String>, client: reqwest::Client, user_agent: Option<String>) -> Self {
        LicenseFetcher {
            attributes: Mutex::new(Attributes { license_uri: license_uri.into(), auth_token: None }),
            fetch_lock: tokio::sync::Mutex::new(()),
            client,
            user_agent,
        }
    }

    pub fn update_license_uri(&self, license_uri: impl Into<String>) {
        self.attributes.lock().unwrap().license_uri = license_uri.into();
    }

    pub fn update_auth_token(&self, auth_token: Option<String>) {
        self.attributes.lock().unwrap().auth_token = auth_token;
    }

    pub fn license_uri(&self) -> String {
        self.attributes.lock().unwrap().license_uri.clone()
    }

    /// POSTs `key_message` to the current license URI and returns the
    /// response body. Returns `None` on any transport/HTTP failure or an
    /// empty response body (the reference treats both as "no license").
    pub async fn fetch(&self, key_message: Vec<u8>) -> Option<String> {
        let _guard = self.fetch_lock.lock().await;

        let (uri, auth_token) = {
            let attrs = self.attributes.lock().unwrap();
            (attrs.license_uri.clone(), attrs.auth_token.clone())
        };

        let mut source = HttpDataSource::new(self.client.clone(), HttpDataSourceConfig::default());
        source.set_request_property("Content-Type", "text/xml;charset=utf=8");
        if let Some(ua) = &self.user_agent {
            source.set_request_property("User-Agent", ua);
        }
        if let Some(token) = &auth_token {
            source.set_request_property("Authorization", token);
        }

        let mut spec = DataSpec::new(uri);
        spec.post_body = Some(key_message);

        let cancel = CancellationFlag::new();
        let open_result = source.open(spec, cancel).await;
        let license = match open_result {
            Ok(len) if len >= crate::upstream::constants::LENGTH_UNBOUNDED => {
                Some(source.read_all_to_string(8192).await)
            }
            _ => None,
        };
        source.close();

        match license {
            Some(body) if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
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
    async fn fetch_returns_body_on_success() {
        let router = Router::new().route("/license", post(|| async { "<license>blob</license>" }));
        let addr = spawn_server(router).await;
        let fetcher =
            LicenseFetcher::new(format!("http://{addr}/license"), reqwest::Client::new(), None);
        let license = fetcher.fetch(b"key-message".to_vec()).await;
        assert_eq!(license.as_deref(), Some("<license>blob</license>"));
    }

    #[tokio::test]
    async fn empty_response_body_is_none() {
        let router = Router::new().route("/license", post(|| async { "" }));
        let addr = spawn_server(router).await;
        let fetcher =
            LicenseFetcher::new(format!("http://{addr}/license"), reqwest::Client::new(), None);
        let license = fetcher.fetch(b"key-message".to_vec()).await;
        assert!(license.is_none());
    }

    #[tokio::test]
    async fn update_license_uri_is_used_by_next_fetch() {
        let router = Router::new().route("/v2", post(|| async { "license-v2" }));
        let addr = spawn_server(router).await;
        let fetcher = LicenseFetcher::new("http://example.invalid/v1", reqwest::Client::new(), None);
        fetcher.update_license_uri(format!("http://{addr}/v2"));
        let license = fetcher.fetch(b"key-message".to_vec()).await;
        assert_eq!(license.as_deref(), Some("license-v2"));
    }
}
