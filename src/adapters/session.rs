use crate::domain::model::TokenSet;
use crate::utils::error::{Result, TransferError};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// access token 只使用到實際有效期的 75%
const ACCESS_TOKEN_TTL_RATIO: f64 = 0.75;

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct SessionTokens {
    refresh_token: Option<String>,
    access_token: Option<CachedToken>,
}

/// 以 session id 為鍵的 token 儲存
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionTokens>>,
}

/// `expires_in` 來自 token 伺服器，超出 chrono 可表示的範圍時視為無效回應
pub fn access_token_ttl(expires_in: u64) -> Result<Duration> {
    let seconds = (expires_in as f64 * ACCESS_TOKEN_TTL_RATIO).round() as i64;
    Duration::try_seconds(seconds).ok_or_else(|| {
        TransferError::auth(format!("Invalid token lifetime: expires_in={}", expires_in))
    })
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 有 refresh token 即視為已授權
    pub async fn is_authorized(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .await
            .get(session_id)
            .is_some_and(|s| s.refresh_token.is_some())
    }

    pub async fn set_tokens(&self, session_id: &str, tokens: &TokenSet) -> Result<()> {
        self.set_tokens_at(session_id, tokens, Utc::now()).await
    }

    pub async fn set_tokens_at(
        &self,
        session_id: &str,
        tokens: &TokenSet,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let expires_at = now
            .checked_add_signed(access_token_ttl(tokens.expires_in)?)
            .ok_or_else(|| {
                TransferError::auth(format!(
                    "Invalid token lifetime: expires_in={}",
                    tokens.expires_in
                ))
            })?;
        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(session_id.to_string()).or_default();
        entry.refresh_token = Some(tokens.refresh_token.clone());
        entry.access_token = Some(CachedToken {
            value: tokens.access_token.clone(),
            expires_at,
        });
        tracing::debug!("Stored tokens for session {} (expires {})", session_id, expires_at);
        Ok(())
    }

    /// 只保存 refresh token，下一次取用時會換發 access token
    pub async fn set_refresh_token(&self, session_id: &str, refresh_token: &str) {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(session_id.to_string()).or_default();
        entry.refresh_token = Some(refresh_token.to_string());
        entry.access_token = None;
    }

    pub async fn refresh_token(&self, session_id: &str) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .and_then(|s| s.refresh_token.clone())
    }

    pub async fn valid_access_token(&self, session_id: &str) -> Option<String> {
        self.valid_access_token_at(session_id, Utc::now()).await
    }

    pub async fn valid_access_token_at(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Option<String> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .and_then(|s| s.access_token.as_ref())
            .filter(|t| t.expires_at > now)
            .map(|t| t.value.clone())
    }

    pub async fn clear(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }
}
