// Instagram API HTTP client.
// Builds request URIs, attaches the access token, and consults the response cache.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{self, ResponseCache};
use crate::error::{InstagramError, Result};
use crate::transport::{ReqwestTransport, Transport};

/// Base URL of the Instagram API.
pub const INSTAGRAM_API_BASE: &str = "https://api.instagram.com";

/// API version path segment used when none is configured.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Environment variable read by [`InstagramClient::from_env`].
pub const TOKEN_ENV_VAR: &str = "INSTAGRAM_ACCESS_TOKEN";

/// Instagram API client with pluggable response caching.
///
/// Every request goes through a [`Transport`]; responses are looked up in
/// and stored to a [`ResponseCache`] keyed by the full request URI plus the
/// access token. Response bodies are opaque text.
pub struct InstagramClient {
    client_id: Option<String>,
    client_secret: Option<String>,
    token: Option<String>,
    version: String,
    last_result: Option<String>,
    cache: Arc<dyn ResponseCache>,
    transport: Box<dyn Transport>,
}

impl InstagramClient {
    fn new() -> Result<Self> {
        Ok(Self {
            client_id: None,
            client_secret: None,
            token: None,
            version: DEFAULT_API_VERSION.to_string(),
            last_result: None,
            cache: cache::default_cache(),
            transport: Box::new(ReqwestTransport::new()?),
        })
    }

    /// Create a client from application credentials.
    ///
    /// The client cannot [`query`](Self::query) until a token is supplied
    /// via [`set_token`](Self::set_token).
    pub fn with_client(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let mut api = Self::new()?;
        api.client_id = Some(client_id.into());
        api.client_secret = Some(client_secret.into());
        Ok(api)
    }

    /// Create a client from an existing access token, ready to query.
    pub fn with_token(token: impl Into<String>) -> Result<Self> {
        let mut api = Self::new()?;
        api.token = Some(token.into());
        Ok(api)
    }

    /// Create a client from the `INSTAGRAM_ACCESS_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV_VAR).map_err(|_| InstagramError::MissingToken)?;
        Self::with_token(token)
    }

    /// Replace the access token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Use `version` instead of the default path segment.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Use `cache` instead of the process default captured at construction.
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Use `transport` instead of the default reqwest-backed one.
    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Raw body of the most recent successful network fetch, `None` after a
    /// failed attempt. Cache hits leave it untouched.
    pub fn last_result(&self) -> Option<&str> {
        self.last_result.as_deref()
    }

    /// Perform a generic query against the API.
    ///
    /// `query` is either a relative path, optionally with parameters
    /// (`users/self`, `tags/rust/media/recent?count=3`), or an absolute URL
    /// used verbatim as the base. The access token is appended as the
    /// `access_token` query parameter.
    ///
    /// On a cache hit the stored record is returned without touching the
    /// network. On a miss, exactly one GET is issued; a 2xx body is stored
    /// and the value the cache's `store` reports as canonical is returned
    /// (see [`ResponseCache::store`]).
    pub async fn query(&mut self, query: &str) -> Result<String> {
        let token = match self.token.as_deref() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return Err(InstagramError::MissingToken),
        };

        let uri = self.build_uri(query, &token);
        let key = cache_key(&uri, &token);

        if let Some(record) = self.cache.fetch(&key) {
            debug!(%uri, "cache hit");
            return Ok(record);
        }

        debug!(%uri, "cache miss, fetching");
        let response = match self.transport.get(&uri).await {
            Ok(response) => response,
            Err(err) => {
                self.last_result = None;
                return Err(err);
            }
        };

        if response.success() {
            let body = response.into_content();
            self.last_result = Some(body.clone());
            Ok(self.cache.store(&key, body))
        } else {
            debug!(status = response.status(), "request failed");
            self.last_result = None;
            Err(InstagramError::Status(response.status()))
        }
    }

    /// Build the fully-qualified request URI for `query`.
    fn build_uri(&self, query: &str, token: &str) -> String {
        let base = if query.starts_with("http://") || query.starts_with("https://") {
            query.to_string()
        } else {
            format!("{}/{}/{}", INSTAGRAM_API_BASE, self.version, query)
        };
        let separator = if query.contains('?') { '&' } else { '?' };

        format!("{}{}access_token={}", base, separator, token)
    }
}

/// Composite cache key for a request.
fn cache_key(uri: &str, token: &str) -> String {
    format!("{}|{}", uri, token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryCache, NullCache};
    use crate::transport::TransportResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that always answers with a fixed status and body,
    /// optionally asserting the requested URL.
    struct MockTransport {
        calls: Arc<AtomicUsize>,
        status: u16,
        body: &'static str,
        expect_url: Option<&'static str>,
    }

    impl MockTransport {
        fn new(status: u16, body: &'static str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let transport = Self {
                calls: calls.clone(),
                status,
                body,
                expect_url: None,
            };
            (transport, calls)
        }

        fn expecting(mut self, url: &'static str) -> Self {
            self.expect_url = Some(url);
            self
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, url: &str) -> Result<TransportResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(expected) = self.expect_url {
                assert_eq!(url, expected);
            }
            Ok(TransportResponse::new(self.status, self.body))
        }
    }

    /// Transport that fails below the HTTP layer.
    struct FailingTransport {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Transport for FailingTransport {
        async fn get(&self, _url: &str) -> Result<TransportResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(InstagramError::Other("connection reset".to_string()))
        }
    }

    /// Transport that must never be reached.
    struct UnreachableTransport;

    #[async_trait]
    impl Transport for UnreachableTransport {
        async fn get(&self, url: &str) -> Result<TransportResponse> {
            panic!("transport invoked for {url}");
        }
    }

    /// Cache that normalizes on write.
    struct UpcasingCache;

    impl ResponseCache for UpcasingCache {
        fn fetch(&self, _key: &str) -> Option<String> {
            None
        }

        fn store(&self, _key: &str, value: String) -> String {
            value.to_uppercase()
        }
    }

    fn client_with_token(token: &str) -> InstagramClient {
        InstagramClient::with_token(token).unwrap()
    }

    #[test]
    fn test_build_uri_relative() {
        let api = client_with_token("T1");
        assert_eq!(
            api.build_uri("users/self", "T1"),
            "https://api.instagram.com/v1/users/self?access_token=T1"
        );
    }

    #[test]
    fn test_build_uri_existing_params_use_ampersand() {
        let api = client_with_token("T1");
        assert_eq!(
            api.build_uri("tags/rust/media/recent?count=3", "T1"),
            "https://api.instagram.com/v1/tags/rust/media/recent?count=3&access_token=T1"
        );
    }

    #[test]
    fn test_build_uri_absolute_is_verbatim() {
        let api = client_with_token("T1");
        assert_eq!(
            api.build_uri("https://api.instagram.com/v2/users/self", "T1"),
            "https://api.instagram.com/v2/users/self?access_token=T1"
        );
        assert_eq!(
            api.build_uri("http://example.com/page?a=1", "T1"),
            "http://example.com/page?a=1&access_token=T1"
        );
    }

    #[test]
    fn test_build_uri_version_override() {
        let api = client_with_token("T1").with_version("v2");
        assert_eq!(
            api.build_uri("users/self", "T1"),
            "https://api.instagram.com/v2/users/self?access_token=T1"
        );
    }

    #[test]
    fn test_cache_key_idempotent() {
        let api = client_with_token("T1");

        let first = cache_key(&api.build_uri("users/self", "T1"), "T1");
        let second = cache_key(&api.build_uri("users/self", "T1"), "T1");

        assert_eq!(first, second);
        assert_eq!(
            first,
            "https://api.instagram.com/v1/users/self?access_token=T1|T1"
        );
    }

    #[tokio::test]
    async fn test_query_success() {
        let (transport, calls) = MockTransport::new(200, "{\"ok\":true}");
        let transport =
            transport.expecting("https://api.instagram.com/v1/users/self?access_token=T1");

        let mut api = client_with_token("T1")
            .with_cache(Arc::new(NullCache))
            .with_transport(Box::new(transport));

        let result = api.query("users/self").await.unwrap();

        assert_eq!(result, "{\"ok\":true}");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.last_result(), Some("{\"ok\":true}"));
    }

    #[tokio::test]
    async fn test_query_http_failure_is_not_cached() {
        let (transport, calls) = MockTransport::new(500, "oops");

        let mut api = client_with_token("T1")
            .with_cache(Arc::new(MemoryCache::new()))
            .with_transport(Box::new(transport));

        let err = api.query("users/self").await.unwrap_err();
        assert!(matches!(err, InstagramError::Status(500)));
        assert_eq!(api.last_result(), None);

        // Nothing was cached, so the second call goes to the wire again.
        let err = api.query("users/self").await.unwrap_err();
        assert!(matches!(err, InstagramError::Status(500)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_query_transport_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let transport = FailingTransport {
            calls: calls.clone(),
        };

        let mut api = client_with_token("T1")
            .with_cache(Arc::new(NullCache))
            .with_transport(Box::new(transport));

        let err = api.query("users/self").await.unwrap_err();
        assert!(matches!(err, InstagramError::Other(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.last_result(), None);
    }

    #[tokio::test]
    async fn test_query_without_token() {
        let mut api = InstagramClient::with_client("id", "secret")
            .unwrap()
            .with_transport(Box::new(UnreachableTransport));

        let err = api.query("anything").await.unwrap_err();
        assert!(matches!(err, InstagramError::MissingToken));
    }

    #[tokio::test]
    async fn test_query_with_empty_token() {
        let mut api = client_with_token("").with_transport(Box::new(UnreachableTransport));

        let err = api.query("anything").await.unwrap_err();
        assert!(matches!(err, InstagramError::MissingToken));
    }

    #[tokio::test]
    async fn test_cache_hit_short_circuits() {
        let cache = Arc::new(MemoryCache::new());
        let api = client_with_token("T1");
        let key = cache_key(&api.build_uri("users/self", "T1"), "T1");
        cache.store(&key, "stored record".to_string());

        let mut api = api
            .with_cache(cache)
            .with_transport(Box::new(UnreachableTransport));

        let result = api.query("users/self").await.unwrap();
        assert_eq!(result, "stored record");
        // A hit does not touch the last network result.
        assert_eq!(api.last_result(), None);
    }

    #[tokio::test]
    async fn test_second_query_served_from_cache() {
        let (transport, calls) = MockTransport::new(200, "body");

        let mut api = client_with_token("T1")
            .with_cache(Arc::new(MemoryCache::new()))
            .with_transport(Box::new(transport));

        assert_eq!(api.query("users/self").await.unwrap(), "body");
        assert_eq!(api.query("users/self").await.unwrap(), "body");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_return_value_is_canonical() {
        let (transport, _calls) = MockTransport::new(200, "body");

        let mut api = client_with_token("T1")
            .with_cache(Arc::new(UpcasingCache))
            .with_transport(Box::new(transport));

        let result = api.query("users/self").await.unwrap();

        // The cache rewrote the stored value; last_result keeps the raw body.
        assert_eq!(result, "BODY");
        assert_eq!(api.last_result(), Some("body"));
    }

    #[tokio::test]
    async fn test_set_token_enables_query() {
        let (transport, calls) = MockTransport::new(200, "body");

        let mut api = InstagramClient::with_client("id", "secret")
            .unwrap()
            .with_cache(Arc::new(NullCache))
            .with_transport(Box::new(transport));

        assert_eq!(api.client_id(), Some("id"));
        assert_eq!(api.client_secret(), Some("secret"));
        assert!(matches!(
            api.query("users/self").await.unwrap_err(),
            InstagramError::MissingToken
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        api.set_token("T1");
        assert_eq!(api.query("users/self").await.unwrap(), "body");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
