use anyhow::Context;

use coinshop_api::app::{self, services::AppServices};
use coinshop_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    coinshop_observability::init();

    let config = Config::from_env()?;

    let services = match &config.database_url {
        Some(url) => AppServices::postgres(&config.jwt_secret, url).await?,
        None => {
            tracing::warn!("DATABASE_URL not set; using the in-memory store");
            AppServices::in_memory(&config.jwt_secret)
        }
    };

    let app = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server_port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{}", config.server_port))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server exiting");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
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
}
