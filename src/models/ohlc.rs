// ============================================================================
// Structure : Candle (Open, High, Low, Close, Volume)
// ============================================================================
// Représente une chandelle telle que le graphique du navigateur la consomme :
// {"time": ms epoch, "open", "high", "low", "close", "volume"}
//
// CandleSeries : suite ordonnée de chandelles construite à partir d'une
// PriceTable, puis tronquée à la limite demandée par le client.
// ============================================================================

use serde::Serialize;
use tracing::debug;

use crate::error::CandleError;
use crate::models::{PriceRow, PriceTable, TimeframeKey};

/// Nombre minimum de chandelles pour que le client puisse calculer ses moyennes
pub const MIN_CANDLES: usize = 10;

/// Une chandelle japonaise (candlestick)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    /// Timestamp en millisecondes depuis epoch (UTC)
    pub time: i64,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix le plus haut (High)
    pub high: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix de clôture (Close)
    pub close: f64,

    /// Volume échangé (0 si inconnu)
    pub volume: u64,
}

impl Candle {
    /// Convertit une ligne brute, None si un prix manque
    ///
    /// Le volume absent, NaN ou négatif devient 0.
    pub fn from_row(row: &PriceRow) -> Option<Self> {
        let (open, high, low, close) = row.prices()?;
        let volume = row
            .volume
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
            .unwrap_or(0);

        Some(Self {
            time: row.timestamp.timestamp_millis(),
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Collection de chandelles, triées par timestamp croissant (ordre du fournisseur)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Normalise une PriceTable
    ///
    /// Les lignes avec un prix manquant sont écartées avant la conversion.
    /// Échoue avec InsufficientData s'il reste moins de MIN_CANDLES chandelles.
    pub fn from_table(table: &PriceTable, key: TimeframeKey) -> Result<Self, CandleError> {
        let candles: Vec<Candle> = table.rows.iter().filter_map(Candle::from_row).collect();

        let dropped = table.len() - candles.len();
        debug!(kept = candles.len(), dropped, "Normalized price table");

        if candles.len() < MIN_CANDLES {
            return Err(CandleError::InsufficientData(key.label().to_string()));
        }

        Ok(Self { candles })
    }

    /// Garde les `limit` chandelles les plus récentes
    ///
    /// - len <= limit : série inchangée
    /// - len > limit  : les `limit` dernières, dans l'ordre
    /// - limit <= 0   : série vide
    pub fn truncate(mut self, limit: i64) -> Self {
        if limit <= 0 {
            self.candles.clear();
            return self;
        }

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        if self.candles.len() > limit {
            let start = self.candles.len() - limit;
            self.candles.drain(..start);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
