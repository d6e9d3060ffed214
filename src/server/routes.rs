// ============================================================================
// Handlers HTTP
// ============================================================================
// GET /health       -> {"status": "ok"}
// GET /api/candles  -> [{"time", "open", "high", "low", "close", "volume"}, ...]
//
// Toute erreur du pipeline est convertie ici en {"detail": "..."} avec le
// statut correspondant. Le handler retourne toujours une réponse.
// ============================================================================

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::error::{detail_response, CandleError};
use crate::server::AppState;
use crate::service::{self, DEFAULT_LIMIT};

/// Paramètres de GET /api/candles
#[derive(Debug, Deserialize)]
pub struct CandlesQuery {
    pub ticker: String,
    pub timeframe: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn get_candles(
    State(state): State<AppState>,
    query: Result<Query<CandlesQuery>, QueryRejection>,
) -> Response {
    // Paramètres manquants ou limit non entier : 422 avant d'appeler le pipeline
    let Query(params) = match query {
        Ok(query) => query,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected query parameters");
            return detail_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let result = service::get_candles(
        state.fetcher.as_ref(),
        &params.ticker,
        &params.timeframe,
        params.limit,
    )
    .await;

    match result {
        Ok(series) => Json(series).into_response(),
        Err(err) => {
            match &err {
                CandleError::DataSource(detail) => {
                    error!(ticker = %params.ticker, detail = %detail, "Server Error")
                }
                _ => warn!(ticker = %params.ticker, error = %err, "Request failed"),
            }
            err.into_response()
        }
    }
}

/// Route inconnue
pub async fn not_found() -> Response {
    detail_response(StatusCode::NOT_FOUND, "Not Found")
}

/// Route connue, méthode non supportée
pub async fn method_not_allowed() -> Response {
    detail_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
