use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use forum_api::auth::JwtVerifier;
use forum_api::config::{config, Environment};
use forum_api::database::{DatabaseManager, ForumRepository, MemoryForumRepository, PgForumRepository};
use forum_api::middleware::RateLimiter;
use forum_api::notify::{LogNotifier, Notifier, SmtpNotifier};
use forum_api::{build_router, AppState, ForumSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    init_tracing(config.api.enable_request_logging);
    tracing::info!("Starting Forum API in {:?} mode", config.environment);

    config.validate().context("invalid configuration")?;

    let database = match &config.database.url {
        Some(_) => {
            let manager = DatabaseManager::connect(&config.database).await?;
            manager.health_check().await.context("database is not reachable")?;
            manager.init_schema().await?;
            Some(manager)
        }
        None => None,
    };

    let repository: Arc<dyn ForumRepository> = match &database {
        Some(manager) => Arc::new(PgForumRepository::new(manager.pool().clone())),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage; data is lost on restart");
            Arc::new(MemoryForumRepository::new())
        }
    };

    let notifier: Arc<dyn Notifier> = if config.email.is_configured() {
        Arc::new(SmtpNotifier::from_config(&config.email)?)
    } else {
        tracing::info!("SMTP not configured, notifications will only be logged");
        Arc::new(LogNotifier::new(config.email.action_base_url.clone()))
    };

    let rate_limiter = if config.api.enable_rate_limiting {
        RateLimiter::new()
    } else {
        tracing::warn!("Rate limiting disabled");
        RateLimiter::disabled()
    };

    if config.environment == Environment::Development
        && config.security.jwt_secret == forum_api::config::FALLBACK_JWT_SECRET
    {
        tracing::warn!("JWT_SECRET not set, using the development fallback secret");
    }

    let state = AppState::new(
        repository,
        notifier,
        Arc::new(rate_limiter),
        Arc::new(JwtVerifier::new(&config.security.jwt_secret)),
        ForumSettings::from_config(config),
    );

    let app = build_router(state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Forum API listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(manager) = database {
        manager.close().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(request_logging: bool) {
    let default_filter = if request_logging {
        "forum_api=info,tower_http=info"
    } else {
        "forum_api=info,tower_http=warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
