//! Client for the Instagram HTTP API.
//!
//! Builds versioned request URIs, attaches the access token as a query
//! parameter, performs a single GET per call, and stores raw responses in a
//! pluggable [`ResponseCache`]. Responses are opaque text; nothing here
//! parses, paginates, or retries.
//!
//! ```no_run
//! use instagram_api::InstagramClient;
//!
//! # async fn run() -> instagram_api::Result<()> {
//! let mut api = InstagramClient::with_token("ACCESS_TOKEN")?;
//! let profile = api.query("users/self").await?;
//! println!("{profile}");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod transport;

pub use cache::{
    CacheFactory, DiskCache, MemoryCache, NullCache, ResponseCache, default_cache,
    install_default_cache,
};
pub use client::{DEFAULT_API_VERSION, INSTAGRAM_API_BASE, InstagramClient, TOKEN_ENV_VAR};
pub use error::{InstagramError, Result};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
