mod app;
mod bot;
mod config;
mod db;
mod errors;
mod logging;
mod notes;
mod openapi;
mod state;
mod telegram;

use std::{net::SocketAddr, sync::Arc};

use app::AppParams;
pub use config::Config;
pub use db::{init_db, DB};
pub use errors::{Error, Result};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = Arc::new(Config::from_env()?);

    logging::setup_tracing(config.log_json);

    let db = init_db(&config.database_url).await?;

    let (app, _api) = app::create(AppParams {
        db: db.clone(),
        config: config.clone(),
    })
    .await?;

    let app = logging::add_tracing_layer(app);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

    tracing::info!(
        "listening on http://{}{}",
        listener.local_addr()?,
        config.webhook_path
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db::close_db(db).await?;
    tracing::info!("note database closed");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to listen for SIGTERM");
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

    tracing::info!("shutting down");
}
