// Adapters layer: concrete implementations of the domain ports (HTTP APIs, session storage).

pub mod accounting;
pub mod hubspot;
pub mod oauth;
pub mod session;

use crate::utils::error::Result;
use reqwest::Client;
use std::time::Duration;

/// 所有外部 API 共用的 HTTP client，逾時由設定決定
pub fn build_http_client(timeout_seconds: u64) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("pea-to-hs/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
