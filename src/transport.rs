// HTTP transport abstraction.
// Every request the client makes goes through this trait so the wire layer can be swapped.

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::error::Result;

/// A single HTTP GET capability.
///
/// Implementations perform exactly one request per call and surface the
/// response status and body without interpreting either.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET request against a fully-qualified URL.
    async fn get(&self, url: &str) -> Result<TransportResponse>;
}

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    status: u16,
    body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the request completed with a 2xx status.
    pub fn success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// The raw response body.
    pub fn content(&self) -> &str {
        &self.body
    }

    /// Consume the response, returning the body.
    pub fn into_content(self) -> String {
        self.body
    }
}

/// Default transport backed by a shared `reqwest` client.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the crate's default headers.
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("instagram-api"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse::new(status, body))
    }
}
