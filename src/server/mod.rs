// ============================================================================
// Module : server
// ============================================================================
// Routeur axum + middlewares :
// - CORS permissif (toutes origines, méthodes, headers, credentials)
// - TraceLayer : une ligne de log par requête HTTP
// - CatchPanicLayer : un panic dans un handler devient un 500, le serveur
//   continue de tourner
// ============================================================================

use std::any::Any;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{http::StatusCode, response::Response, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::api::CandleFetcher;
use crate::error::detail_response;

pub mod routes;

/// État partagé par les handlers (lecture seule)
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<dyn CandleFetcher>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn CandleFetcher>) -> Self {
        Self { fetcher }
    }
}

/// Construit le routeur complet
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/candles", get(routes::get_candles))
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
}

/// CORS ouvert à tous, credentials compris
///
/// Le navigateur refuse `*` avec credentials : on renvoie l'origine, la méthode
/// et les headers de la requête.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Convertit un panic en 500 {"detail": "Data Source Error: ..."}
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown error".to_string()
    };

    error!(panic = %message, "Server Error");
    detail_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Data Source Error: {}", message),
    )
}

/// Sert le routeur jusqu'à Ctrl+C
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let addr = listener.local_addr().context("Adresse d'écoute inconnue")?;
    info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Le serveur HTTP s'est arrêté sur une erreur")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = ?e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

// ============================================================================
// Tests unitaires
// ============================================================================
