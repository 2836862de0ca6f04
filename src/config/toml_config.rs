use crate::utils::error::{Result, TransferError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub hubspot: HubSpotConfig,
    #[serde(default)]
    pub accounting: AccountingConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSpotConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
    #[serde(default = "default_hubspot_api")]
    pub api_base_url: String,
    #[serde(default = "default_authorize_url")]
    pub oauth_authorize_url: String,
    #[serde(default = "default_token_url")]
    pub oauth_token_url: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountingConfig {
    #[serde(default = "default_accounting_api")]
    pub api_base_url: String,
}

impl Default for AccountingConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_accounting_api(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_hubspot_api() -> String {
    "https://api.hubapi.com".to_string()
}

fn default_authorize_url() -> String {
    "https://app.hubspot.com/oauth/authorize".to_string()
}

fn default_token_url() -> String {
    "https://api.hubapi.com/oauth/v1/token".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_accounting_api() -> String {
    "https://api.accounting.pe/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn scope_separator() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r" |, ?|%20").expect("valid scope separator"))
}

/// 允許以空白、逗號或 `%20` 分隔 scope，統一改成單一空白
pub fn normalize_scope(raw: &str) -> String {
    scope_separator()
        .split(raw.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，`${VAR}` 會替換成環境變數
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        let mut config: AppConfig =
            toml::from_str(&processed).map_err(|e| TransferError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        config.hubspot.scope = normalize_scope(&config.hubspot.scope);
        Ok(config)
    }

    /// 只用環境變數組成配置
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            let value = std::env::var(name).ok();
            validation::validate_required_field(name, &value).cloned()
        };
        let optional =
            |name: &str, default: fn() -> String| std::env::var(name).unwrap_or_else(|_| default());

        Ok(Self {
            hubspot: HubSpotConfig {
                client_id: required("CLIENT_ID")?,
                client_secret: required("CLIENT_SECRET")?,
                redirect_uri: required("REDIRECT_URI")?,
                scope: normalize_scope(&required("SCOPE")?),
                api_base_url: optional("HUBSPOT_API_URL", default_hubspot_api),
                oauth_authorize_url: optional("HUBSPOT_AUTHORIZE_URL", default_authorize_url),
                oauth_token_url: optional("HUBSPOT_TOKEN_URL", default_token_url),
                batch_size: default_batch_size(),
            },
            accounting: AccountingConfig {
                api_base_url: optional("PEA_API_URL", default_accounting_api),
            },
            http: HttpConfig::default(),
        })
    }

    // 找不到的變數保留原樣，交給驗證階段處理
    fn substitute_env_vars(content: &str) -> String {
        validation::env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        let hubspot = &self.hubspot;
        validation::validate_non_empty_string("hubspot.client_id", &hubspot.client_id)?;
        validation::validate_non_empty_string("hubspot.client_secret", &hubspot.client_secret)?;
        validation::validate_non_empty_string("hubspot.scope", &hubspot.scope)?;
        validation::validate_url("hubspot.redirect_uri", &hubspot.redirect_uri)?;
        validation::validate_url("hubspot.api_base_url", &hubspot.api_base_url)?;
        validation::validate_url("hubspot.oauth_authorize_url", &hubspot.oauth_authorize_url)?;
        validation::validate_url("hubspot.oauth_token_url", &hubspot.oauth_token_url)?;
        validation::validate_batch_size("hubspot.batch_size", hubspot.batch_size)?;

        validation::validate_url("accounting.api_base_url", &self.accounting.api_base_url)?;
        validation::validate_range("http.timeout_seconds", self.http.timeout_seconds, 1, 600)?;

        validation::validate_env_resolved("hubspot.client_id", &hubspot.client_id)?;
        validation::validate_env_resolved("hubspot.client_secret", &hubspot.client_secret)?;

        Ok(())
    }
}
