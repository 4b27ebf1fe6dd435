use axum::ServiceExt;
use clap::Parser;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

mod blog;
mod config;
mod error;
mod markdown;
mod routes;
mod state;
mod store;
mod telemetry;
mod views;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // the subscriber may not be installed yet
        tracing::error!(error = %err, "fatal error");
        eprintln!("post-admin: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), error::AppError> {
    let cli = config::CliArgs::parse();
    let settings = config::load(&cli)?;
    telemetry::init(&settings.logging)?;

    let store = store::PostStore::open(&settings.store_dir)
        .await
        .map_err(|source| error::AppError::Store {
            path: settings.store_dir.clone(),
            source,
        })?;
    let state = std::sync::Arc::new(state::State::new(store));

    let compression = tower_http::compression::CompressionLayer::new().br(true);

    let app = NormalizePathLayer::trim_trailing_slash().layer(
        axum::Router::new()
            .merge(routes::route())
            .with_state(state)
            .layer(compression)
            .layer(TraceLayer::new_for_http()),
    );

    let listener = tokio::net::TcpListener::bind(settings.listen).await?;
    tracing::info!(
        addr = %settings.listen,
        store = ?settings.store_dir,
        "serving post admin"
    );

    axum::serve(
        listener,
        ServiceExt::<axum::extract::Request>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
