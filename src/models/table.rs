// ============================================================================
// PriceTable : données brutes renvoyées par un fournisseur
// ============================================================================
// Une ligne par timestamp, colonnes Open/High/Low/Close/Volume.
// Une valeur absente (null / NaN côté fournisseur) est représentée par None :
// c'est le normalizer qui décide quelles lignes garder.
// ============================================================================

use chrono::{DateTime, Utc};

/// Une ligne brute (timestamp + colonnes optionnelles)
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl PriceRow {
    /// Ligne complète (pratique pour les tests et les stubs)
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume: Some(volume),
        }
    }

    /// Retourne les 4 prix si tous sont présents et finis
    pub fn prices(&self) -> Option<(f64, f64, f64, f64)> {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        Some((
            finite(self.open)?,
            finite(self.high)?,
            finite(self.low)?,
            finite(self.close)?,
        ))
    }
}

/// Tableau de lignes, dans l'ordre du fournisseur (timestamps croissants)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    pub rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn new(rows: Vec<PriceRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
