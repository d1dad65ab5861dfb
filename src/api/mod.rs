//! HTTP boundary exposing the interaction pipeline.

pub mod routes;
pub mod types;

use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::pipeline::InteractionService;

#[derive(Clone)]
pub struct AppState {
    pub service: InteractionService,
}

/// Router with every route and middleware attached.
pub fn router(service: InteractionService) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/drugs", get(routes::list_drugs))
        .route("/predict", post(routes::predict))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(AppState { service })
}

pub async fn serve(service: InteractionService, host: String, port: u16) -> Result<()> {
    let router = router(service);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "serving ddi-assistant API");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
