use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wicket_auth::{ProviderClient, TokenService};
use wicket_proxy::{Forwarder, RouteTable};
use wicket_server::{
    config::ServerConfig,
    cookies::CookiePolicy,
    routes::router,
    state::AppState,
};
use wicket_session::{LoginSink, MemorySessionStore, PgLoginLedger};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from wicket.toml and the environment
    let config = ServerConfig::load().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let cookies = CookiePolicy::new(&config.cookie).expect("invalid cookie configuration");
    let tokens = TokenService::new(&config.tokens).expect("invalid token configuration");

    let timeout = Duration::from_secs(config.upstream_timeout_seconds);

    // One OAuth client per configured provider
    let mut providers = HashMap::new();
    for settings in config.providers.settings() {
        let provider = settings.provider;
        let client = ProviderClient::new(settings, timeout)
            .expect("failed to create provider client");
        tracing::info!(%provider, "configured identity provider");
        providers.insert(provider, client);
    }
    if providers.is_empty() {
        tracing::warn!("no identity providers configured; auth endpoints will answer 404");
    }

    // Immutable route table, validated and specificity-ordered at startup
    let routes = RouteTable::new(config.routes).expect("invalid route table");
    tracing::info!(route_count = routes.len(), "built proxy route table");

    let forwarder = Forwarder::new(timeout).expect("failed to create forwarder");

    // Optional login ledger; absence of a database disables it
    let ledger: Option<Arc<dyn LoginSink>> = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .expect("failed to connect to database");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("failed to run migrations");

            Some(Arc::new(PgLoginLedger::new(pool)))
        }
        None => {
            tracing::info!("no database configured; login ledger disabled");
            None
        }
    };

    let state = Arc::new(AppState::new(
        providers,
        tokens,
        Arc::new(MemorySessionStore::new()),
        ledger,
        routes,
        forwarder,
        cookies,
        config.frontend_base_url,
    ));

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
