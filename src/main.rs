use anyhow::Result;
use onboarding_i18n::{config::Config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("onboarding_i18n=info".parse()?),
        )
        .init();

    info!("Starting translation service");

    let config = Config::from_env()?;
    info!(
        "Languages: {} (fallback: {})",
        config.supported_languages.join(", "),
        config.fallback_language
    );

    server::serve(&config).await
}
