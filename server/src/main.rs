use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use drawboard_server::config::{Config, Environment};
use drawboard_server::state::AppState;
use drawboard_server::{router, ServerError};

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    match config.environment {
        Environment::Production => registry.with(fmt::layer().json()).init(),
        Environment::Development => registry.with(fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = Config::parse();
    init_tracing(&config);

    let public_dir = config.public_dir();
    let app = router(AppState::new(), &public_dir, config.cors_layer()?);
    let addr = config.addr();
    tracing::info!(environment = ?config.environment, public_dir = %public_dir.display(), "starting");

    match config.tls() {
        Some((cert, key)) => {
            let tls = RustlsConfig::from_pem_file(cert, key)
                .await
                .map_err(ServerError::Tls)?;
            tracing::info!("Whiteboard running at https://localhost:{}", config.port);
            if config.is_development() {
                tracing::info!("WebSocket endpoint wss://localhost:{}/ws", config.port);
            }
            axum_server::bind_rustls(addr, tls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|source| ServerError::Bind { addr, source })?;
            tracing::info!("Whiteboard running at http://localhost:{}", config.port);
            if config.is_development() {
                tracing::info!("WebSocket endpoint ws://localhost:{}/ws", config.port);
            }
            axum::serve(listener, app).await?;
        }
    }
    Ok(())
}
