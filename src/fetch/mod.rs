mod auth;
mod basic;
mod client;

pub use auth::ApiKey;
pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;
use tracing::debug;

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    debug!(url, bytes = bytes.len(), "Fetched");
    Ok(bytes.to_vec())
}

/// Loads a report from a local path or over HTTP(S).
///
/// When `api_key` is set, HTTP requests carry it as a bearer token.
pub async fn load_source(source: &str, api_key: Option<&str>) -> Result<Vec<u8>> {
    if !(source.starts_with("http://") || source.starts_with("https://")) {
        return Ok(tokio::fs::read(source).await?);
    }

    match api_key {
        Some(key) => fetch_bytes(&ApiKey::bearer(BasicClient::new(), key)?, source).await,
        None => fetch_bytes(&BasicClient::new(), source).await,
    }
}
