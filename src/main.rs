use bankgate::application::manager::ResourceManager;
use bankgate::application::user_service::UserService;
use bankgate::config::ServerConfig;
use bankgate::domain::ports::SessionStore;
use bankgate::infrastructure::in_memory::InMemorySessionStore;
use bankgate::interfaces::http::{AppState, create_router};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_filter).into_diagnostic()?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Fail fast: a repository that cannot be built now never will be.
    let manager = Arc::new(ResourceManager::from_backend(&config.storage_backend()));
    manager.initialize_all().into_diagnostic()?;

    let policy = config.access_policy();
    let users = UserService::new(manager).bind_writes_to_principal(policy.bind_writes_to_principal);

    // Sessions are issued by the external authentication service; this
    // process only reads them, optionally seeded from a file.
    let sessions = match &config.session_file {
        Some(path) => InMemorySessionStore::from_json_file(path).into_diagnostic()?,
        None => {
            tracing::warn!(
                "No --session-file given; session store is empty and gated routes answer 401"
            );
            InMemorySessionStore::new()
        }
    };
    tracing::info!(sessions = sessions.session_count().await, "Session store ready");
    let sessions: Arc<dyn SessionStore> = Arc::new(sessions);

    let app = create_router(AppState::new(Arc::new(users), policy), sessions);

    let listener = TcpListener::bind(config.bind).await.into_diagnostic()?;
    tracing::info!(address = %config.bind, ?policy, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_diagnostic()?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
