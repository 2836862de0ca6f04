use crate::domain::model::{AccountingCredentials, SourceClient};
use crate::domain::ports::ClientSource;
use crate::utils::error::{Result, TransferError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

const SOURCE_NAME: &str = "PE Accounting";

#[derive(Debug, Deserialize)]
struct ClientListResponse {
    #[serde(default)]
    clients: Vec<SourceClient>,
}

/// PE Accounting REST API 的客戶端點
pub struct PeAccountingClient {
    http: Client,
    base_url: String,
}

impl PeAccountingClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn clients_url(&self, company_id: &str) -> String {
        format!("{}/company/{}/client", self.base_url, company_id)
    }
}

#[async_trait]
impl ClientSource for PeAccountingClient {
    async fn fetch_clients(&self, credentials: &AccountingCredentials) -> Result<Vec<SourceClient>> {
        let url = self.clients_url(&credentials.company_id);
        tracing::debug!("📡 Fetching clients from {}", url);

        let response = self
            .http
            .get(&url)
            .header("Content-Type", "application/json")
            .header("x-token", &credentials.api_key)
            .send()
            .await
            .map_err(|e| TransferError::upstream(SOURCE_NAME, e.to_string()))?;

        let status = response.status();
        tracing::debug!("{} response status: {}", SOURCE_NAME, status);

        if status == StatusCode::UNAUTHORIZED {
            return Err(TransferError::upstream(SOURCE_NAME, "Invalid credentials"));
        }
        if !status.is_success() {
            return Err(TransferError::upstream(
                SOURCE_NAME,
                format!("Unexpected response status {}", status),
            ));
        }

        let body: ClientListResponse = response
            .json()
            .await
            .map_err(|e| TransferError::upstream(SOURCE_NAME, format!("Malformed client list: {}", e)))?;

        if body.clients.is_empty() {
            return Err(TransferError::upstream(
                SOURCE_NAME,
                "The account contains no clients",
            ));
        }

        tracing::info!("📥 Fetched {} clients from {}", body.clients.len(), SOURCE_NAME);
        Ok(body.clients)
    }
}
