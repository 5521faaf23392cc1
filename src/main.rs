//! prompt-relay binary: wire configuration, registry, provider client, and
//! HTTP server together.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use prompt_relay::config::{Cli, Config};
use prompt_relay::provider::openai::OpenAiClient;
use prompt_relay::registry::Registry;
use prompt_relay::server::access_log::AccessLog;
use prompt_relay::server::limit::RateLimiter;
use prompt_relay::server::routes::{app_state, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` is optional; deployment environments set real variables.
    dotenv::dotenv().ok();

    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "prompt_relay=debug,tower_http=debug"
    } else {
        "prompt_relay=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("prompt-relay v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let config = Config::load(&cli.config)?;

    info!(
        provider = %config.provider.base_url,
        model = %config.provider.model,
        rate_limit = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );

    // Build the operation registry and derived state.
    let registry = Registry::builtin();
    info!(operations = registry.operations().len(), "Registry built");

    let generator = Arc::new(OpenAiClient::new(config.provider.clone()));
    let limiter = RateLimiter::new(config.rate_limit.clone());
    let access_log = AccessLog::open(&config.log.dir).await?;

    let state = app_state(registry, generator, limiter, access_log);

    // Build the HTTP router.
    let app = build_router(state);

    // Start the server.
    let listen_addr = cli.listen.unwrap_or_else(|| config.listen_addr());
    info!(addr = listen_addr, "Starting server");

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
