// ============================================================================
// Erreurs du domaine
// ============================================================================
// Chaque erreur levée par le resolver, le fetcher ou le normalizer est
// attrapée à la frontière du handler HTTP et convertie 1:1 en statut HTTP
// avec un message lisible : {"detail": "..."}
// ============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Erreurs possibles du pipeline de chandelles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandleError {
    /// Timeframe inconnu (400)
    ///
    /// `input` est la valeur brute envoyée par le client (non normalisée)
    #[error("Invalid timeframe: {input}. Supported: {}", .supported.join(", "))]
    InvalidTimeframe {
        input: String,
        supported: Vec<&'static str>,
    },

    /// Le fournisseur n'a retourné aucune ligne pour ce ticker (404)
    #[error("No data found for {0}")]
    NoDataFound(String),

    /// Moins de MIN_CANDLES chandelles après normalisation (422)
    #[error("Insufficient historical data for {0}")]
    InsufficientData(String),

    /// Erreur de transport ou de parsing côté fournisseur, ou toute autre erreur (500)
    #[error("Data Source Error: {0}")]
    DataSource(String),
}

impl CandleError {
    /// Raccourci pour construire une erreur de source de données
    pub fn data_source(detail: impl Into<String>) -> Self {
        Self::DataSource(detail.into())
    }

    /// Statut HTTP correspondant à l'erreur
    pub fn status(&self) -> StatusCode {
        match self {
            CandleError::InvalidTimeframe { .. } => StatusCode::BAD_REQUEST,
            CandleError::NoDataFound(_) => StatusCode::NOT_FOUND,
            CandleError::InsufficientData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CandleError::DataSource(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for CandleError {
    fn from(err: reqwest::Error) -> Self {
        CandleError::DataSource(err.to_string())
    }
}

/// Corps JSON d'erreur, identique pour toutes les erreurs de l'API
pub fn detail_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": detail.into() }))).into_response()
}

impl IntoResponse for CandleError {
    fn into_response(self) -> Response {
        detail_response(self.status(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_timeframe_message() {
        let err = CandleError::InvalidTimeframe {
            input: " xyz".to_string(),
            supported: vec!["Y", "Q", "M"],
        };
        assert_eq!(err.to_string(), "Invalid timeframe:  xyz. Supported: Y, Q, M");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            CandleError::NoDataFound("AAPL".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CandleError::InsufficientData("D".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            CandleError::data_source("boom").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            CandleError::NoDataFound("MSFT".into()).to_string(),
            "No data found for MSFT"
        );
        assert_eq!(
            CandleError::InsufficientData("1H".into()).to_string(),
            "Insufficient historical data for 1H"
        );
        assert_eq!(
            CandleError::data_source("timeout").to_string(),
            "Data Source Error: timeout"
        );
    }
}
