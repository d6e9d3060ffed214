// ============================================================================
// API Client : Yahoo Finance
// ============================================================================
// Récupère les chandelles depuis l'API chart de Yahoo Finance :
//   GET /v8/finance/chart/{ticker}?range={period}&interval={interval}
//
// La réponse est convertie en PriceTable (une ligne par timestamp).
// Les prix sont ajustés (dividendes / splits) quand Yahoo fournit la série
// adjclose : open/high/low sont multipliés par adjclose/close, close devient
// adjclose. Le volume n'est pas ajusté.
// ============================================================================

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::api::CandleFetcher;
use crate::error::CandleError;
use crate::models::{HistoryPeriod, PriceRow, PriceTable, ProviderInterval};

/// Yahoo bloque les requêtes sans User-Agent de navigateur
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Code d'erreur Yahoo pour un symbole inconnu ou délisté
const NOT_FOUND_CODE: &str = "Not Found";

// ============================================================================
// Structures pour parser la réponse JSON de Yahoo Finance
// ============================================================================

/// Réponse complète de l'API chart
#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

/// Séries OHLCV (une valeur par timestamp, null si absente)
#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

// ============================================================================
// Client
// ============================================================================

/// Client Yahoo Finance partagé entre toutes les requêtes
///
/// reqwest::Client garde un pool de connexions : on le construit une seule
/// fois au démarrage, le clonage est peu coûteux (Arc interne).
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: Url,
}

impl YahooClient {
    /// Crée le client HTTP
    ///
    /// # Arguments
    /// * `base_url` - racine de l'API (ex: "https://query1.finance.yahoo.com")
    /// * `timeout` - délai maximum d'une requête upstream
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("URL Yahoo Finance invalide : {}", base_url))?;

        if base_url.cannot_be_a_base() {
            anyhow::bail!("URL Yahoo Finance invalide : {}", base_url);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self { client, base_url })
    }

    /// Construit l'URL de l'API chart pour un ticker
    fn chart_url(&self, ticker: &str, interval: ProviderInterval, period: HistoryPeriod) -> Url {
        let mut url = self.base_url.clone();

        // cannot_be_a_base() est vérifié dans new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["v8", "finance", "chart", ticker]);
        }

        url.query_pairs_mut()
            .append_pair("range", period.to_yahoo_string())
            .append_pair("interval", interval.to_yahoo_string())
            .append_pair("includeAdjustedClose", "true")
            .append_pair("events", "div,splits");
        url
    }
}

#[async_trait]
impl CandleFetcher for YahooClient {
    #[instrument(skip(self, interval, period), fields(interval = %interval, period = %period))]
    async fn fetch(
        &self,
        ticker: &str,
        interval: ProviderInterval,
        period: HistoryPeriod,
    ) -> Result<PriceTable, CandleError> {
        let url = self.chart_url(ticker, interval, period);
        debug!(url = %url, "Built Yahoo Finance API URL");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Yahoo répond 404 pour un symbole inconnu : ce n'est pas une panne
        if status == StatusCode::NOT_FOUND {
            warn!("Yahoo Finance does not know this symbol");
            return Ok(PriceTable::default());
        }

        if !status.is_success() {
            error!(status = %status, "Yahoo Finance returned error status");
            let body = response.text().await.unwrap_or_default();

            // Yahoo décrit souvent l'erreur dans chart.error (ex: 400 "Invalid input")
            if let Ok(yahoo_response) = serde_json::from_str::<YahooResponse>(&body) {
                if yahoo_response.chart.error.is_some() {
                    return parse_yahoo_response(yahoo_response);
                }
            }

            return Err(CandleError::data_source(format!(
                "Yahoo Finance returned HTTP {}",
                status
            )));
        }

        let yahoo_response: YahooResponse = response.json().await?;
        let table = parse_yahoo_response(yahoo_response)?;

        info!(rows = table.len(), "Fetched price table");
        Ok(table)
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Convertit la réponse Yahoo en PriceTable
///
/// Seul le premier bloc `quote` est utilisé (un seul ticker par requête).
fn parse_yahoo_response(yahoo_response: YahooResponse) -> Result<PriceTable, CandleError> {
    let chart = yahoo_response.chart;

    if let Some(err) = chart.error {
        if err.code.as_deref() == Some(NOT_FOUND_CODE) {
            debug!(description = ?err.description, "Yahoo Finance reported no data");
            return Ok(PriceTable::default());
        }
        let detail = err
            .description
            .or(err.code)
            .unwrap_or_else(|| "unknown Yahoo Finance error".to_string());
        return Err(CandleError::DataSource(detail));
    }

    let Some(result) = chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceTable::default());
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjcloses = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose);

    let value = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

    let mut rows = Vec::with_capacity(timestamps.len());
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let timestamp = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
            CandleError::data_source(format!("Invalid timestamp from Yahoo Finance: {}", timestamp))
        })?;

        let mut row = PriceRow {
            timestamp,
            open: value(&quote.open, i),
            high: value(&quote.high, i),
            low: value(&quote.low, i),
            close: value(&quote.close, i),
            volume: value(&quote.volume, i),
        };

        if let Some(adjcloses) = &adjcloses {
            adjust_row(&mut row, value(adjcloses, i));
        }

        rows.push(row);
    }

    Ok(PriceTable::new(rows))
}

/// Ajuste une ligne avec la clôture ajustée
///
/// Sans close ou adjclose exploitables, close devient None : la ligne sera
/// écartée par le normalizer.
fn adjust_row(row: &mut PriceRow, adjclose: Option<f64>) {
    match (row.close, adjclose) {
        (Some(close), Some(adj)) if close != 0.0 && close.is_finite() && adj.is_finite() => {
            let ratio = adj / close;
            row.open = row.open.map(|v| v * ratio);
            row.high = row.high.map(|v| v * ratio);
            row.low = row.low.map(|v| v * ratio);
            row.close = Some(adj);
        }
        _ => row.close = None,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
