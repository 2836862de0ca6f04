use crate::adapters::session::SessionStore;
use crate::core::transfer::TransferPipeline;
use crate::domain::model::{
    AccountingCredentials, Directory, DomainOverrides, ReconciliationResult, SourceClient,
    TokenGrant, TransferReport,
};
use crate::domain::ports::{ClientSource, CrmConnector, DirectorySource, TokenExchanger};
use crate::utils::error::{Result, TransferError};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    Refreshed,
}

/// 擷取結果：客戶清單、CRM 目錄與使用的 CRM client
struct Snapshot<C> {
    clients: Vec<SourceClient>,
    directory: Directory,
    crm: C,
}

/// 轉移流程外層：處理授權與資料擷取，再交給 [`TransferPipeline`]
pub struct TransferEngine<A, H, T>
where
    A: ClientSource,
    H: CrmConnector,
    T: TokenExchanger,
{
    accounting: A,
    crm: H,
    oauth: T,
    sessions: Arc<SessionStore>,
}

impl<A, H, T> TransferEngine<A, H, T>
where
    A: ClientSource,
    H: CrmConnector,
    T: TokenExchanger,
{
    pub fn new(accounting: A, crm: H, oauth: T, sessions: Arc<SessionStore>) -> Self {
        Self {
            accounting,
            crm,
            oauth,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// OAuth callback：以授權碼換取 token 並存入 session
    pub async fn authorize(&self, session_id: &str, code: &str) -> Result<()> {
        if code.trim().is_empty() {
            return Err(TransferError::auth("OAuth code missing"));
        }
        let tokens = self
            .oauth
            .exchange(TokenGrant::AuthorizationCode(code.to_string()))
            .await?;
        self.sessions.set_tokens(session_id, &tokens).await?;
        tracing::info!("🔐 Session {} authorized", session_id);
        Ok(())
    }

    pub async fn logout(&self, session_id: &str) {
        self.sessions.clear(session_id).await;
        tracing::info!("👋 Session {} logged out", session_id);
    }

    /// 確保有可用的 access token，過期時以 refresh token 換發
    pub async fn ensure_token(&self, session_id: &str) -> Result<(String, TokenStatus)> {
        if let Some(token) = self.sessions.valid_access_token(session_id).await {
            return Ok((token, TokenStatus::Valid));
        }

        let refresh_token = self
            .sessions
            .refresh_token(session_id)
            .await
            .ok_or_else(|| TransferError::auth("Not authorized"))?;

        let tokens = self
            .oauth
            .exchange(TokenGrant::RefreshToken(refresh_token))
            .await?;
        self.sessions.set_tokens(session_id, &tokens).await?;
        tracing::debug!("Access token refreshed for session {}", session_id);

        Ok((tokens.access_token, TokenStatus::Refreshed))
    }

    async fn snapshot(
        &self,
        session_id: &str,
        credentials: &AccountingCredentials,
    ) -> Result<Snapshot<H::Client>> {
        let (access_token, _) = self.ensure_token(session_id).await?;

        let clients = self
            .accounting
            .fetch_clients(credentials)
            .await
            .map_err(|e| into_upstream("PE Accounting", e))?;

        let crm = self.crm.connect(&access_token);
        let directory = crm
            .fetch_directory()
            .await
            .map_err(|e| into_upstream("HubSpot", e))?;

        Ok(Snapshot {
            clients,
            directory,
            crm,
        })
    }

    /// 只擷取並比對，不寫入 CRM
    pub async fn preview(
        &self,
        session_id: &str,
        credentials: &AccountingCredentials,
        overrides: DomainOverrides,
    ) -> Result<ReconciliationResult> {
        let snapshot = self.snapshot(session_id, credentials).await?;
        TransferPipeline::new(snapshot.crm)
            .with_domain_overrides(overrides)
            .preview(&snapshot.clients, &snapshot.directory)
    }

    pub async fn transfer(
        &self,
        session_id: &str,
        credentials: &AccountingCredentials,
        overrides: DomainOverrides,
    ) -> Result<TransferReport> {
        let snapshot = self.snapshot(session_id, credentials).await?;
        let mut pipeline = TransferPipeline::new(snapshot.crm).with_domain_overrides(overrides);
        pipeline.run(&snapshot.clients, &snapshot.directory).await
    }
}

/// 擷取階段的錯誤一律歸為 upstream，授權錯誤保持原樣
fn into_upstream(source_name: &str, error: TransferError) -> TransferError {
    match error {
        TransferError::UpstreamFetchError { .. } | TransferError::AuthError { .. } => error,
        other => TransferError::upstream(source_name, other.to_string()),
    }
}
