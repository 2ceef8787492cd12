//! CodeGram REST client.
//!
//! [`CodegramApi`] is the contract the client-side stores depend on;
//! [`HttpClient`] implements it over reqwest. Every call attaches the
//! session cookie and the fixed base URL, and either resolves with a typed
//! payload or fails with an [`ApiError`]. There is no retry and no caching:
//! those are the caller's business.
//!
//! # Usage
//!
//! ```ignore
//! use codegram_client::{ClientOptions, CodegramApi, FeedSource, HttpClient};
//!
//! let client = HttpClient::new(ClientOptions {
//!     base_url: "https://codegram.dev/api".into(),
//!     session_cookie: Some("connect.sid=s%3Aabc".into()),
//! })?;
//! let page = client.fetch_feed(FeedSource::Home, 1, 10).await?;
//! ```

mod api;
mod error;
mod http;

pub use api::{CodegramApi, FeedSource};
pub use error::ApiError;
pub use http::{ClientOptions, HttpClient};
