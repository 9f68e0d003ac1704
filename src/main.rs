use anyhow::Context;
use iugu_gateway::{IuguConfig, IuguProvider, PaymentGateway};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = IuguConfig::from_env().context("failed to load IUGU_* configuration")?;

    tracing::info!("Checking Iugu connectivity");
    tracing::info!("Account: {}", config.account_id);
    tracing::info!("Test mode: {}", config.test_mode);

    let provider = IuguProvider::new(&config)?;

    let triggers = provider.list_triggers().await.context("listing web hooks")?;
    tracing::info!("web_hooks: HTTP {}", triggers.status);
    println!("{}", serde_json::to_string_pretty(&triggers.body)?);

    let tokens = provider.list_api_tokens().await.context("listing API tokens")?;
    tracing::info!("api_tokens: HTTP {}", tokens.status);

    if !triggers.is_success() || !tokens.is_success() {
        anyhow::bail!(
            "Iugu rejected the credentials (web_hooks HTTP {}, api_tokens HTTP {})",
            triggers.status,
            tokens.status
        );
    }

    Ok(())
}
