//! HTTP transport abstraction.
//!
//! All network access goes through the [`Requester`] trait so hosts can
//! substitute their own transport (proxies, auth headers, test mocks).
//! The default implementation is a plain `reqwest` client constructed
//! once; nothing in the crate mutates a process-wide default.

use anyhow::{bail, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Fetches the bytes behind a URL.
///
/// `Ok(None)` means the transport claims success but produced no body.
/// That is a contract violation (distinct from an empty body) and the
/// engine reports it as such rather than treating it as empty content.
#[async_trait]
pub trait Requester: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>>;
}

/// Default transport backed by a shared `reqwest` client.
pub struct HttpRequester {
    client: Client,
}

impl HttpRequester {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for HttpRequester {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Requester for HttpRequester {
    async fn fetch(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            bail!("bad http status from {}: {}", url, response.status());
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }
}
