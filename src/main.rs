use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use azure_chat_proxy::client::azure::AzureOpenAiClient;
use azure_chat_proxy::config::{Cli, Config};
use azure_chat_proxy::server::chat_api::{build_router, AppState};
use azure_chat_proxy::server::health::redact_api_key;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before clap reads the environment.
    dotenv::dotenv().ok();

    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "azure_chat_proxy=debug,tower_http=debug"
    } else {
        "azure_chat_proxy=info,tower_http=info"
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("azure-chat-proxy v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let config = Config::load(&cli.config)?.apply_cli(&cli);
    let config = Arc::new(config);

    info!(
        endpoint = config.azure.endpoint_or_sentinel(),
        deployment = config.azure.deployment_or_sentinel(),
        api_key = redact_api_key(config.azure.api_key.as_deref()),
        api_version = config.azure.api_version,
        timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    let client = AzureOpenAiClient::new(&config)?;

    let state = Arc::new(AppState {
        config: config.clone(),
        client: Arc::new(client),
    });

    // Build the HTTP router.
    let app = build_router(state);

    // Start the server.
    let listen_addr = config.server.listen.clone();
    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("Received terminate signal, starting graceful shutdown"),
    }
}
