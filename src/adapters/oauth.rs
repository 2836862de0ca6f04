use crate::domain::model::{TokenGrant, TokenSet};
use crate::domain::ports::TokenExchanger;
use crate::utils::error::{Result, TransferError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// 組出 OAuth 授權頁網址，參數會經過 URL 編碼
pub fn authorize_url(
    authorize_base: &str,
    client_id: &str,
    scope: &str,
    redirect_uri: &str,
) -> Result<String> {
    let url = Url::parse_with_params(
        authorize_base,
        &[
            ("client_id", client_id),
            ("scope", scope),
            ("redirect_uri", redirect_uri),
        ],
    )
    .map_err(|e| TransferError::InvalidConfigValueError {
        field: "hubspot.oauth_authorize_url".to_string(),
        value: authorize_base.to_string(),
        reason: e.to_string(),
    })?;
    Ok(url.to_string())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

pub struct HubSpotOAuth {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl HubSpotOAuth {
    pub fn new(
        http: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }
}

#[async_trait]
impl TokenExchanger for HubSpotOAuth {
    async fn exchange(&self, grant: TokenGrant) -> Result<TokenSet> {
        let (grant_type, key, value) = match &grant {
            TokenGrant::AuthorizationCode(code) => ("authorization_code", "code", code.as_str()),
            TokenGrant::RefreshToken(token) => ("refresh_token", "refresh_token", token.as_str()),
        };
        tracing::debug!("🔑 Exchanging {} for access token", grant_type);

        let form = [
            ("grant_type", grant_type),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            (key, value),
        ];

        let response = self.http.post(&self.token_url).form(&form).send().await?;
        let status = response.status();
        let body: TokenResponse = response.json().await.map_err(|e| {
            TransferError::auth(format!("Unreadable token response ({}): {}", status, e))
        })?;

        // 沒有 access_token 一律視為失敗，不論 HTTP 狀態
        let TokenResponse {
            access_token: Some(access_token),
            refresh_token,
            expires_in,
        } = body
        else {
            return Err(TransferError::auth("Failed to retrieve access token"));
        };

        // 換發時若未回傳新的 refresh token，沿用原本的
        let refresh_token = match (refresh_token, &grant) {
            (Some(token), _) => token,
            (None, TokenGrant::RefreshToken(previous)) => previous.clone(),
            (None, TokenGrant::AuthorizationCode(_)) => {
                return Err(TransferError::auth("Token response has no refresh token"))
            }
        };

        Ok(TokenSet {
            access_token,
            refresh_token,
            expires_in: expires_in.unwrap_or(0),
        })
    }
}
