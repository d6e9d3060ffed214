// ============================================================================
// Pipeline : requête client -> chandelles normalisées
// ============================================================================
// 1. résout le timeframe (intervalle + période)
// 2. délègue le téléchargement au CandleFetcher
// 3. normalise la table en chandelles
// 4. tronque à la limite demandée
//
// Aucun état partagé entre deux requêtes.
// ============================================================================

use tracing::{debug, info};

use crate::api::CandleFetcher;
use crate::error::CandleError;
use crate::models::{CandleSeries, TimeframeKey};

/// Limite par défaut quand le client n'en envoie pas
pub const DEFAULT_LIMIT: i64 = 300;

/// Exécute le pipeline complet pour une requête
///
/// # Erreurs
/// * `InvalidTimeframe` - clé inconnue
/// * `NoDataFound` - le fournisseur n'a retourné aucune ligne
/// * `InsufficientData` - moins de MIN_CANDLES chandelles valides
/// * `DataSource` - erreur de transport ou de parsing
pub async fn get_candles(
    fetcher: &dyn CandleFetcher,
    ticker: &str,
    timeframe: &str,
    limit: i64,
) -> Result<CandleSeries, CandleError> {
    let resolution = TimeframeKey::resolve(timeframe)?;

    info!(
        ticker = %ticker,
        timeframe = %resolution.key,
        interval = %resolution.interval,
        period = %resolution.period,
        "Request"
    );

    let table = fetcher
        .fetch(ticker, resolution.interval, resolution.period)
        .await?;

    if table.is_empty() {
        return Err(CandleError::NoDataFound(ticker.to_string()));
    }

    let series = CandleSeries::from_table(&table, resolution.key)?;
    let total = series.len();
    let series = series.truncate(limit);

    debug!(total, returned = series.len(), limit, "Truncated candle series");
    Ok(series)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::models::{HistoryPeriod, PriceRow, PriceTable, ProviderInterval};

    /// Fetcher de test : renvoie une réponse fixe et mémorise les appels
    pub(crate) struct StubFetcher {
        response: Result<PriceTable, CandleError>,
        pub calls: Mutex<Vec<(String, ProviderInterval, HistoryPeriod)>>,
    }

    impl StubFetcher {
        pub(crate) fn with_rows(n: usize) -> Self {
            Self::with_response(Ok(daily_table(n)))
        }

        pub(crate) fn with_response(response: Result<PriceTable, CandleError>) -> Self {
            Self {
                response,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CandleFetcher for StubFetcher {
        async fn fetch(
            &self,
            ticker: &str,
            interval: ProviderInterval,
            period: HistoryPeriod,
        ) -> Result<PriceTable, CandleError> {
            self.calls
                .lock()
                .unwrap()
                .push((ticker.to_string(), interval, period));
            self.response.clone()
        }
    }

    /// `n` lignes journalières valides à partir du 2024-01-01
    pub(crate) fn daily_table(n: usize) -> PriceTable {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PriceTable::new(
            (0..n)
                .map(|i| {
                    let p = 50.0 + i as f64;
                    PriceRow::new(start + Duration::days(i as i64), p, p + 1.0, p - 1.0, p + 0.5, 1_000.0 + i as f64)
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_pipeline_success() {
        let fetcher = StubFetcher::with_rows(20);
        let series = get_candles(&fetcher, "AAPL", "D", 5).await.unwrap();

        assert_eq!(series.len(), 5);
        let expected: Vec<i64> = daily_table(20).rows[15..]
            .iter()
            .map(|r| r.timestamp.timestamp_millis())
            .collect();
        let times: Vec<i64> = series.candles().iter().map(|c| c.time).collect();
        assert_eq!(times, expected);

        let calls = fetcher.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[("AAPL".to_string(), ProviderInterval::OneDay, HistoryPeriod::TwoYears)]
        );
    }

    #[tokio::test]
    async fn test_pipeline_normalizes_timeframe() {
        let fetcher = StubFetcher::with_rows(12);
        let series = get_candles(&fetcher, "MSFT", " 1h ", DEFAULT_LIMIT).await.unwrap();
        assert_eq!(series.len(), 12);

        let calls = fetcher.calls.lock().unwrap();
        assert_eq!(calls[0].1, ProviderInterval::OneHour);
        assert_eq!(calls[0].2, HistoryPeriod::Days730);
    }

    #[tokio::test]
    async fn test_pipeline_invalid_timeframe_skips_fetch() {
        let fetcher = StubFetcher::with_rows(20);
        let err = get_candles(&fetcher, "AAPL", "XYZ", 5).await.unwrap_err();

        assert!(matches!(err, CandleError::InvalidTimeframe { .. }));
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pipeline_no_data() {
        let fetcher = StubFetcher::with_rows(0);
        let err = get_candles(&fetcher, "NOPE", "W", 5).await.unwrap_err();
        assert_eq!(err, CandleError::NoDataFound("NOPE".to_string()));
    }

    #[tokio::test]
    async fn test_pipeline_insufficient_data() {
        let mut table = daily_table(10);
        table.rows[4].close = None;
        let fetcher = StubFetcher::with_response(Ok(table));

        let err = get_candles(&fetcher, "AAPL", "m", 5).await.unwrap_err();
        assert_eq!(err, CandleError::InsufficientData("M".to_string()));
    }

    #[tokio::test]
    async fn test_pipeline_data_source_error() {
        let fetcher = StubFetcher::with_response(Err(CandleError::data_source("connection reset")));
        let err = get_candles(&fetcher, "AAPL", "D", 5).await.unwrap_err();
        assert_eq!(err.to_string(), "Data Source Error: connection reset");
    }

    #[tokio::test]
    async fn test_pipeline_volume_non_negative() {
        let mut table = daily_table(15);
        table.rows[2].volume = None;
        table.rows[3].volume = Some(f64::NAN);
        let fetcher = StubFetcher::with_response(Ok(table));

        let series = get_candles(&fetcher, "AAPL", "D", DEFAULT_LIMIT).await.unwrap();
        assert_eq!(series.len(), 15);
        assert_eq!(series.candles()[2].volume, 0);
        assert_eq!(series.candles()[3].volume, 0);
        assert!(series.candles().windows(2).all(|w| w[0].time < w[1].time));
    }
}
