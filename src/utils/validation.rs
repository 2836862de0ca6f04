use crate::adapters::hubspot::MAX_BATCH_SIZE;
use crate::utils::error::{Result, TransferError};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 設定檔中的 `${VAR}` 佔位符
pub(crate) fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> TransferError {
    TransferError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 只接受 http / https，HubSpot 與 PE Accounting 端點都走 HTTP
pub fn validate_url(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(field, value, "URL cannot be empty"));
    }
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL format: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            value,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| TransferError::MissingConfigError {
        field: field.to_string(),
    })
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// HubSpot 批次端點每次最多接受 100 筆
pub fn validate_batch_size(field: &str, value: usize) -> Result<()> {
    validate_range(field, value, 1, MAX_BATCH_SIZE)
}

/// 替換後仍留有 `${VAR}` 代表環境變數沒有設定
pub fn validate_env_resolved(field: &str, value: &str) -> Result<()> {
    match env_var_pattern().captures(value) {
        Some(caps) => Err(invalid(
            field,
            value,
            format!("Environment variable {} is not set", &caps[1]),
        )),
        None => Ok(()),
    }
}
