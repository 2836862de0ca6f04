use std::fmt;
use thiserror::Error;

/// 批次寫入的階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertPhase {
    Create,
    Update,
}

impl fmt::Display for UpsertPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertPhase::Create => write!(f, "create"),
            UpsertPhase::Update => write!(f, "update"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Mapping error for client #{index}: {message}")]
    MappingError { index: usize, message: String },

    #[error("Failed to fetch from {source_name}: {message}")]
    UpstreamFetchError {
        source_name: String,
        message: String,
    },

    #[error("Batch {phase} failed: {message}")]
    UpsertError { phase: UpsertPhase, message: String },

    #[error("Authorization error: {message}")]
    AuthError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Mapping,
    Upstream,
    Upsert,
    Auth,
    Network,
    System,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TransferError {
    pub fn upstream(source_name: &str, message: impl Into<String>) -> Self {
        TransferError::UpstreamFetchError {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        TransferError::AuthError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            TransferError::MappingError { .. } => ErrorCategory::Mapping,
            TransferError::UpstreamFetchError { .. } => ErrorCategory::Upstream,
            TransferError::UpsertError { .. } => ErrorCategory::Upsert,
            TransferError::AuthError { .. } => ErrorCategory::Auth,
            TransferError::ApiError(_) => ErrorCategory::Network,
            TransferError::IoError(_) | TransferError::SerializationError(_) => {
                ErrorCategory::System
            }
            TransferError::ConfigError { .. }
            | TransferError::InvalidConfigValueError { .. }
            | TransferError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Upstream | ErrorCategory::Network | ErrorCategory::Auth => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Mapping | ErrorCategory::Upsert => ErrorSeverity::High,
            ErrorCategory::System | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TransferError::MappingError { .. } => {
                "Check the client records in the accounting system; every client needs a name"
            }
            TransferError::UpstreamFetchError { .. } => {
                "Verify the company id and API key, then start the transfer again"
            }
            TransferError::UpsertError {
                phase: UpsertPhase::Update,
                ..
            } => "New companies may already have been created; re-run the whole transfer",
            TransferError::UpsertError { .. } => {
                "Nothing was written; re-run the whole transfer"
            }
            TransferError::AuthError { .. } => {
                "Authorize again through the OAuth URL (`auth-url`) and pass the new code"
            }
            TransferError::ApiError(_) => "Check network connectivity and the API base URLs",
            TransferError::IoError(_) | TransferError::SerializationError(_) => {
                "Check file permissions and the format of the data involved"
            }
            TransferError::ConfigError { .. }
            | TransferError::InvalidConfigValueError { .. }
            | TransferError::MissingConfigError { .. } => {
                "Fix the configuration file or environment variables"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TransferError::UpsertError { phase, .. } => {
                format!("Writing companies to HubSpot failed during the {} step", phase)
            }
            TransferError::UpstreamFetchError { message, .. } => message.clone(),
            TransferError::AuthError { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_error_names_phase() {
        let err = TransferError::UpsertError {
            phase: UpsertPhase::Update,
            message: "503 Service Unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Batch update failed: 503 Service Unavailable"
        );
        assert_eq!(err.category(), ErrorCategory::Upsert);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_upstream_error_message_is_surfaced() {
        let err = TransferError::upstream("PE Accounting", "Invalid credentials");
        assert_eq!(err.user_friendly_message(), "Invalid credentials");
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = TransferError::MissingConfigError {
            field: "hubspot.client_id".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
