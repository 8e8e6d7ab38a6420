use gadgetvault::core::config::Config;
use gadgetvault::core::server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,gadgetvault=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();

    // Log config status (without revealing secrets)
    tracing::info!(
        "Config loaded: database={}, jwt_secret={}, addr={}",
        config.has_database(),
        config.has_jwt_secret(),
        config.server_addr
    );

    if let Err(e) = server::serve(config).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}
