//! Shared Application State
//!
//! The proxy's shared state: one reusable upstream HTTP client and the
//! normalized upstream base URL, created once at startup and cloned into
//! every handler invocation.

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub upstream_base_url: String,
}

impl AppState {
    pub fn new(http: reqwest::Client, upstream_base_url: impl Into<String>) -> Self {
        let upstream_base_url = upstream_base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            upstream_base_url,
        }
    }
}
