use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use airsense_service::{
    api::{self, AppState},
    auth::TokenVerifier,
    config::Config,
    db::{self, PgStore, Store},
    notify::{Dispatcher, WebhookNotifier},
    pipeline,
    readings::ReadingService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Env vars may be set externally, so a missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;
    info!("Database ready");

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    // Trigger evaluation runs detached from the request path
    let notifier = WebhookNotifier::new(config.webhook_timeout)?;
    let dispatcher = Dispatcher::new(Arc::new(notifier));
    let (queue, worker) = pipeline::evaluation_queue(store.clone(), dispatcher);
    let worker = tokio::spawn(worker.run());

    let state = AppState {
        readings: ReadingService::new(store, queue),
        verifier: TokenVerifier::new(&config.token_secret),
    };

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last queue handle, so the worker now drains and stops
    info!("Waiting for pending trigger evaluations");
    if let Err(e) = worker.await {
        error!(error = %e, "Evaluation worker aborted");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
