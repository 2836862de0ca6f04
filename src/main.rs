use clap::Parser;
use pea_to_hs::adapters::{
    accounting::PeAccountingClient, build_http_client, hubspot::HubSpotConnector,
    oauth::{authorize_url, HubSpotOAuth},
    session::SessionStore,
};
use pea_to_hs::config::{Command, TransferArgs};
use pea_to_hs::domain::model::TokenGrant;
use pea_to_hs::utils::error::ErrorSeverity;
use pea_to_hs::utils::{logger, validation::Validate};
use pea_to_hs::{AppConfig, Cli, Result, TransferEngine};
use std::sync::Arc;

// CLI 只有一個使用者，固定使用同一個 session
const CLI_SESSION: &str = "cli";

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            AppConfig::from_file(path)?
        }
        None => {
            tracing::info!("📁 No config file given, reading environment variables");
            AppConfig::from_env()?
        }
    };
    config.validate()?;
    Ok(config)
}

async fn transfer(config: &AppConfig, args: &TransferArgs) -> Result<()> {
    args.validate()?;

    let http = build_http_client(config.http.timeout_seconds)?;
    let accounting = PeAccountingClient::new(http.clone(), &config.accounting.api_base_url);
    let crm = HubSpotConnector::new(http.clone(), &config.hubspot.api_base_url)
        .with_batch_size(config.hubspot.batch_size);
    let oauth = HubSpotOAuth::new(
        http,
        &config.hubspot.oauth_token_url,
        &config.hubspot.client_id,
        &config.hubspot.client_secret,
        &config.hubspot.redirect_uri,
    );
    let engine = TransferEngine::new(accounting, crm, oauth, Arc::new(SessionStore::new()));

    match args.token_grant() {
        Some(TokenGrant::AuthorizationCode(code)) => engine.authorize(CLI_SESSION, &code).await?,
        Some(TokenGrant::RefreshToken(refresh_token)) => {
            engine
                .sessions()
                .set_refresh_token(CLI_SESSION, &refresh_token)
                .await
        }
        None => return Err(pea_to_hs::TransferError::auth("Not authorized")),
    }

    let credentials = args.credentials();
    let overrides = args.domain_overrides()?;

    if args.dry_run {
        tracing::info!("🔍 Dry run: nothing will be written to HubSpot");
        let preview = engine.preview(CLI_SESSION, &credentials, overrides).await?;

        println!("🆕 {} new companies:", preview.new_companies.len());
        for company in &preview.new_companies {
            println!("   {}", company.name().unwrap_or_default());
        }
        println!("🔄 {} existing companies:", preview.existing_companies.len());
        for company in &preview.existing_companies {
            let id = company.id.as_ref().map(|id| id.as_str()).unwrap_or_default();
            println!("   {} ({})", company.name().unwrap_or_default(), id);
        }
    } else {
        let report = engine.transfer(CLI_SESSION, &credentials, overrides).await?;
        println!("✅ Transfer completed!");
        println!(
            "📊 {} clients: {} created, {} updated",
            report.mapped, report.created, report.updated
        );
    }

    engine.logout(CLI_SESSION).await;
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::AuthUrl => {
            let url = authorize_url(
                &config.hubspot.oauth_authorize_url,
                &config.hubspot.client_id,
                &config.hubspot.scope,
                &config.hubspot.redirect_uri,
            )?;
            println!("{}", url);
            Ok(())
        }
        Command::Transfer(args) => transfer(&config, args).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logger::init_logger(cli.log_format(), cli.verbose);
    tracing::info!("Starting pea-to-hs");
    if cli.verbose {
        tracing::debug!("Config file: {:?}", cli.config);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}
