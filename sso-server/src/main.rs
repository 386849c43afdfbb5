use anyhow::Context;
use auth_identity::{LoginStateService, SessionTokenService};
use auth_oidc::load_providers;
use clap::{Parser, ValueEnum};
use crypto::SecretCipher;
use database_layer::{DatabasePool, ProviderRepository};
use secrecy::ExposeSecret;
use std::{net::SocketAddr, sync::Arc};
use tracing::{error, info, Level};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use sso_server::{create_app, AppState, SsoConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

/// Multi-tenant SSO gateway
#[derive(Parser, Debug)]
#[command(name = "sso-server")]
#[command(about = "Multi-tenant SSO gateway HTTP server")]
struct Args {
    /// Server bind address
    #[arg(long, env = "SSO_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "SSO_PORT", default_value = "8080")]
    port: u16,

    /// Log output format
    #[arg(long, env = "SSO_LOG_FORMAT", value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads SSO_HOST and friends
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    init_tracing(args.log_format, args.verbose);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting SSO gateway");

    let config = SsoConfig::from_env().context("invalid configuration")?;
    info!(?config, "Configuration loaded");

    let cipher = Arc::new(SecretCipher::from_base64(config.encryption_key.expose_secret())?);
    let sessions = SessionTokenService::new(&config.identity_config())?;
    let login_states = LoginStateService::new(&config.identity_config())?;

    let db = DatabasePool::new(config.database_url.expose_secret(), config.pool_settings())
        .await
        .context("failed to connect to database")?;
    if config.run_migrations {
        db.migrate().await.context("failed to run migrations")?;
    }
    let store = Arc::new(ProviderRepository::from(&db));

    let registry = load_providers(&config.oidc_settings(), store.as_ref(), cipher.as_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Identity provider load failed, refusing to start");
            e
        })?;
    info!(providers = registry.len(), "Identity providers loaded");

    let state = AppState::new(registry, sessions, login_states, cipher, store);
    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!("SSO gateway listening on http://{addr}");
    info!("Health check available at http://{addr}/healthz");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    db.close().await;
    info!("SSO gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn init_tracing(format: LogFormat, verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "sso_server={level},auth_oidc={level},auth_gateway={level},database_layer={level},tower_http=info,sqlx=warn,hyper=info,reqwest=info"
        )
        .into()
    });

    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_level(true),
            )
            .init(),
        // Structured JSON logging for production
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .init(),
    }
}
