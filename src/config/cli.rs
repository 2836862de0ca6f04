use crate::domain::model::{AccountingCredentials, DomainOverrides, TokenGrant};
use crate::utils::error::{Result, TransferError};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{validate_non_empty_string, Validate};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "pea-to-hs")]
#[command(about = "Transfer PE Accounting clients into HubSpot companies")]
pub struct Cli {
    /// TOML 設定檔；未提供時改讀環境變數
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the HubSpot authorization URL
    AuthUrl,
    /// Fetch clients and upsert them as HubSpot companies
    Transfer(TransferArgs),
}

#[derive(Debug, Clone, Args)]
pub struct TransferArgs {
    #[arg(long, env = "PEA_COMPANY_ID")]
    pub company_id: String,

    #[arg(long, env = "PEA_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// OAuth code from the authorization redirect, takes precedence over a refresh token
    #[arg(long, required_unless_present = "refresh_token")]
    pub code: Option<String>,

    #[arg(long, env = "HUBSPOT_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// Domain override as NAME=DOMAIN, repeatable
    #[arg(long = "domain", value_name = "NAME=DOMAIN")]
    pub domains: Vec<String>,

    /// Map and reconcile only, write nothing
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn log_format(&self) -> LogFormat {
        if self.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

impl TransferArgs {
    pub fn credentials(&self) -> AccountingCredentials {
        AccountingCredentials {
            company_id: self.company_id.clone(),
            api_key: self.api_key.clone(),
        }
    }

    /// `--code` 優先；環境變數中的 refresh token 只在沒有授權碼時使用
    pub fn token_grant(&self) -> Option<TokenGrant> {
        match (&self.code, &self.refresh_token) {
            (Some(code), _) => Some(TokenGrant::AuthorizationCode(code.clone())),
            (None, Some(token)) => Some(TokenGrant::RefreshToken(token.clone())),
            (None, None) => None,
        }
    }

    pub fn domain_overrides(&self) -> Result<DomainOverrides> {
        let mut overrides = DomainOverrides::new();
        for entry in &self.domains {
            let (name, domain) = DomainOverrides::parse_entry(entry).ok_or_else(|| {
                TransferError::InvalidConfigValueError {
                    field: "--domain".to_string(),
                    value: entry.clone(),
                    reason: "Expected NAME=DOMAIN".to_string(),
                }
            })?;
            overrides.insert(name, domain);
        }
        Ok(overrides)
    }
}

impl Validate for TransferArgs {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("--company-id", &self.company_id)?;
        validate_non_empty_string("--api-key", &self.api_key)?;
        self.domain_overrides()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transfer_command() {
        let cli = Cli::try_parse_from([
            "pea-to-hs",
            "--json-logs",
            "transfer",
            "--company-id",
            "42",
            "--api-key",
            "key",
            "--code",
            "abc",
            "--domain",
            "Company One=one.se",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.log_format(), LogFormat::Json);
        let Command::Transfer(args) = cli.command else {
            panic!("expected transfer command");
        };
        assert!(args.dry_run);
        assert_eq!(args.code.as_deref(), Some("abc"));
        assert_eq!(args.credentials().company_id, "42");
        assert_eq!(
            args.domain_overrides().unwrap().get("Company One"),
            Some("one.se")
        );
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_code_wins_over_refresh_token_from_env() {
        std::env::set_var("HUBSPOT_REFRESH_TOKEN", "stored");
        let result = Cli::try_parse_from([
            "pea-to-hs",
            "transfer",
            "--company-id",
            "42",
            "--api-key",
            "key",
            "--code",
            "abc",
        ]);
        std::env::remove_var("HUBSPOT_REFRESH_TOKEN");

        let Command::Transfer(args) = result.unwrap().command else {
            panic!("expected transfer command");
        };
        assert_eq!(args.refresh_token.as_deref(), Some("stored"));
        assert!(matches!(
            args.token_grant(),
            Some(TokenGrant::AuthorizationCode(code)) if code == "abc"
        ));
    }

    #[test]
    fn test_refresh_token_used_without_code() {
        let args = TransferArgs {
            company_id: "42".to_string(),
            api_key: "key".to_string(),
            code: None,
            refresh_token: Some("r".to_string()),
            domains: vec![],
            dry_run: false,
        };
        assert!(matches!(
            args.token_grant(),
            Some(TokenGrant::RefreshToken(token)) if token == "r"
        ));
    }

    #[test]
    fn test_bad_domain_override_fails_validation() {
        let args = TransferArgs {
            company_id: "42".to_string(),
            api_key: "key".to_string(),
            code: Some("abc".to_string()),
            refresh_token: None,
            domains: vec!["missing-separator".to_string()],
            dry_run: false,
        };
        assert!(args.validate().is_err());
    }
}
