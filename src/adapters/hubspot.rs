use crate::domain::model::{CompanyRecord, CrmId, Directory};
use crate::domain::ports::{BatchUpsertClient, CrmConnector, DirectorySource};
use crate::utils::error::{Result, TransferError, UpsertPhase};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const SOURCE_NAME: &str = "HubSpot";
const COMPANIES_PATH: &str = "/crm/v3/objects/companies";

/// HubSpot 單次批次呼叫的上限
pub const MAX_BATCH_SIZE: usize = 100;
const PAGE_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct CompanyPage {
    #[serde(default)]
    results: Vec<CompanyResult>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct CompanyResult {
    id: CrmId,
    #[serde(default)]
    properties: CompanyResultProperties,
}

#[derive(Debug, Default, Deserialize)]
struct CompanyResultProperties {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<NextPage>,
}

#[derive(Debug, Deserialize)]
struct NextPage {
    after: String,
}

#[derive(Debug, Serialize)]
struct BatchInput<'a> {
    inputs: &'a [CompanyRecord],
}

/// 建立綁定 access token 的 HubSpot client
#[derive(Debug, Clone)]
pub struct HubSpotConnector {
    http: Client,
    base_url: String,
    batch_size: usize,
}

impl HubSpotConnector {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            batch_size: MAX_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }
}

impl CrmConnector for HubSpotConnector {
    type Client = HubSpotClient;

    fn connect(&self, access_token: &str) -> HubSpotClient {
        HubSpotClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            batch_size: self.batch_size,
            access_token: access_token.to_string(),
        }
    }
}

pub struct HubSpotClient {
    http: Client,
    base_url: String,
    batch_size: usize,
    access_token: String,
}

impl HubSpotClient {
    async fn fetch_page(&self, after: Option<&str>) -> Result<CompanyPage> {
        let mut request = self
            .http
            .get(format!("{}{}", self.base_url, COMPANIES_PATH))
            .bearer_auth(&self.access_token)
            .query(&[("limit", PAGE_LIMIT.to_string().as_str()), ("properties", "name")]);
        if let Some(after) = after {
            request = request.query(&[("after", after)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransferError::upstream(SOURCE_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::upstream(
                SOURCE_NAME,
                format!("Listing companies failed with {}: {}", status, body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| TransferError::upstream(SOURCE_NAME, format!("Malformed company page: {}", e)))
    }

    async fn post_batch(&self, phase: UpsertPhase, records: &[CompanyRecord]) -> Result<()> {
        if records.is_empty() {
            tracing::debug!("Batch {} has no inputs, skipping request", phase);
            return Ok(());
        }

        let url = format!("{}{}/batch/{}", self.base_url, COMPANIES_PATH, phase);
        for (index, chunk) in records.chunks(self.batch_size).enumerate() {
            tracing::debug!(
                "📤 Batch {} chunk {} with {} inputs",
                phase,
                index + 1,
                chunk.len()
            );

            let response = self
                .http
                .post(&url)
                .bearer_auth(&self.access_token)
                .json(&BatchInput { inputs: chunk })
                .send()
                .await
                .map_err(|e| TransferError::UpsertError {
                    phase,
                    message: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(TransferError::UpsertError {
                    phase,
                    message: format!("{}: {}", status, body),
                });
            }
        }

        Ok(())
    }
}

#[async_trait]
impl DirectorySource for HubSpotClient {
    /// 逐頁讀取所有公司；同名時保留最後一筆
    async fn fetch_directory(&self) -> Result<Directory> {
        let mut directory = Directory::new();
        let mut after: Option<String> = None;

        loop {
            let page = self.fetch_page(after.as_deref()).await?;
            for company in page.results {
                if let Some(name) = company.properties.name {
                    directory.insert(name, company.id);
                }
            }

            match page.paging.and_then(|p| p.next) {
                Some(next) => after = Some(next.after),
                None => break,
            }
        }

        tracing::info!("📇 Loaded {} companies from {}", directory.len(), SOURCE_NAME);
        Ok(directory)
    }
}

#[async_trait]
impl BatchUpsertClient for HubSpotClient {
    async fn batch_create(&self, records: &[CompanyRecord]) -> Result<()> {
        self.post_batch(UpsertPhase::Create, records).await
    }

    async fn batch_update(&self, records: &[CompanyRecord]) -> Result<()> {
        self.post_batch(UpsertPhase::Update, records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CompanyProperties;
    use httpmock::prelude::*;

    fn record(name: &str, id: Option<&str>) -> CompanyRecord {
        CompanyRecord {
            id: id.map(CrmId::from),
            properties: CompanyProperties {
                name: Some(name.to_string()),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_fetch_directory_maps_name_to_id() {
        let server = MockServer::start();
        let list_mock = server.mock(|when, then| {
            when.method(GET)
                .path(COMPANIES_PATH)
                .header("authorization", "Bearer token-1");
            then.status(200).json_body(serde_json::json!({
                "results": [
                    {"id": "companyIdOne", "properties": {"name": "companyNameOne"}},
                    {"id": "companyIdTwo", "properties": {"name": "companyNameTwo"}},
                    {"id": "noName", "properties": {"name": null}}
                ]
            }));
        });

        let client = HubSpotConnector::new(Client::new(), server.base_url()).connect("token-1");
        let directory = client.fetch_directory().await.unwrap();

        list_mock.assert();
        assert_eq!(directory.len(), 2);
        assert_eq!(
            directory.get("companyNameOne").map(CrmId::as_str),
            Some("companyIdOne")
        );
        assert_eq!(
            directory.get("companyNameTwo").map(CrmId::as_str),
            Some("companyIdTwo")
        );
    }

    #[tokio::test]
    async fn test_duplicate_names_keep_last_id() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(COMPANIES_PATH);
            then.status(200).json_body(serde_json::json!({
                "results": [
                    {"id": "111", "properties": {"name": "company one"}},
                    {"id": "222", "properties": {"name": "company two"}},
                    {"id": "333", "properties": {"name": "company one"}}
                ]
            }));
        });

        let client = HubSpotConnector::new(Client::new(), server.base_url()).connect("token-1");
        let directory = client.fetch_directory().await.unwrap();

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.get("company one").map(CrmId::as_str), Some("333"));
    }

    #[tokio::test]
    async fn test_fetch_directory_empty_result() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(COMPANIES_PATH);
            then.status(200).json_body(serde_json::json!({"results": []}));
        });

        let client = HubSpotConnector::new(Client::new(), server.base_url()).connect("t");
        let directory = client.fetch_directory().await.unwrap();

        assert!(directory.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_directory_follows_paging() {
        let server = MockServer::start();
        let second_page = server.mock(|when, then| {
            when.method(GET)
                .path(COMPANIES_PATH)
                .query_param("after", "cursor-2");
            then.status(200).json_body(serde_json::json!({
                "results": [{"id": "2", "properties": {"name": "Second"}}]
            }));
        });
        let first_page = server.mock(|when, then| {
            when.method(GET)
                .path(COMPANIES_PATH)
                .query_param_missing("after");
            then.status(200).json_body(serde_json::json!({
                "results": [{"id": "1", "properties": {"name": "First"}}],
                "paging": {"next": {"after": "cursor-2"}}
            }));
        });

        let client = HubSpotConnector::new(Client::new(), server.base_url()).connect("t");
        let directory = client.fetch_directory().await.unwrap();

        first_page.assert();
        second_page.assert();
        assert_eq!(directory.get("First").map(CrmId::as_str), Some("1"));
        assert_eq!(directory.get("Second").map(CrmId::as_str), Some("2"));
    }

    #[tokio::test]
    async fn test_batch_create_chunks_inputs() {
        let server = MockServer::start();
        let create_mock = server.mock(|when, then| {
            when.method(POST).path("/crm/v3/objects/companies/batch/create");
            then.status(201).json_body(serde_json::json!({"status": "COMPLETE"}));
        });

        let client = HubSpotConnector::new(Client::new(), server.base_url())
            .with_batch_size(2)
            .connect("t");
        let records: Vec<_> = (0..5).map(|i| record(&format!("c{}", i), None)).collect();

        client.batch_create(&records).await.unwrap();

        create_mock.assert_calls(3);
    }

    #[tokio::test]
    async fn test_batch_update_sends_ids() {
        let server = MockServer::start();
        let update_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/crm/v3/objects/companies/batch/update")
                .json_body(serde_json::json!({
                    "inputs": [{"id": "123", "properties": {"name": "company one"}}]
                }));
            then.status(200).json_body(serde_json::json!({"status": "COMPLETE"}));
        });

        let client = HubSpotConnector::new(Client::new(), server.base_url()).connect("t");
        client
            .batch_update(&[record("company one", Some("123"))])
            .await
            .unwrap();

        update_mock.assert();
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let server = MockServer::start();
        let create_mock = server.mock(|when, then| {
            when.method(POST).path("/crm/v3/objects/companies/batch/create");
            then.status(201);
        });

        let client = HubSpotConnector::new(Client::new(), server.base_url()).connect("t");
        client.batch_create(&[]).await.unwrap();
        client.batch_update(&[]).await.unwrap();

        create_mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_batch_failure_reports_phase() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/crm/v3/objects/companies/batch/update");
            then.status(400).body("VALIDATION_ERROR");
        });

        let client = HubSpotConnector::new(Client::new(), server.base_url()).connect("t");
        let err = client
            .batch_update(&[record("x", Some("1"))])
            .await
            .unwrap_err();

        match err {
            TransferError::UpsertError { phase, message } => {
                assert_eq!(phase, UpsertPhase::Update);
                assert!(message.contains("VALIDATION_ERROR"));
            }
            other => panic!("expected upsert error, got {:?}", other),
        }
    }
}
