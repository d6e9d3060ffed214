// ============================================================================
// Timeframes : clé client -> intervalle Yahoo + période d'historique
// ============================================================================
// Le client (graphique navigateur) envoie une clé courte (Y, Q, M, W, D, 1H,
// 30M, 15M). On la traduit en deux paramètres Yahoo :
// - interval : granularité des chandelles ("3mo", "1d", "1h", ...)
// - range    : quantité d'historique demandée ("max", "10y", "730d", ...)
//
// La table est une constante : aucun état global mutable.
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::error::CandleError;

/// Clé de timeframe envoyée par le client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimeframeKey {
    /// Année (approximée par des barres de 3 mois)
    Y,
    /// Trimestre
    Q,
    /// Mois
    M,
    /// Semaine
    W,
    /// Jour
    D,
    /// 1 heure
    H1,
    /// 30 minutes
    M30,
    /// 15 minutes
    M15,
}

/// Granularité des chandelles côté Yahoo Finance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProviderInterval {
    ThreeMonths,
    OneMonth,
    OneWeek,
    OneDay,
    OneHour,
    ThirtyMinutes,
    FifteenMinutes,
}

/// Quantité d'historique demandée à Yahoo Finance
///
/// Les intervalles fins sont plafonnés par Yahoo (1h : ~730 jours,
/// intraday < 1h : quelques semaines). Les intervalles larges demandent tout
/// l'historique pour garantir au moins MIN_CANDLES barres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HistoryPeriod {
    Max,
    TenYears,
    TwoYears,
    Days730,
    Days30,
}

/// Résultat de la résolution d'un timeframe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub key: TimeframeKey,
    pub interval: ProviderInterval,
    pub period: HistoryPeriod,
}

/// Table de correspondance, dans l'ordre affiché au client en cas d'erreur
const TIMEFRAME_TABLE: [Resolution; 8] = [
    Resolution { key: TimeframeKey::Y, interval: ProviderInterval::ThreeMonths, period: HistoryPeriod::Max },
    Resolution { key: TimeframeKey::Q, interval: ProviderInterval::ThreeMonths, period: HistoryPeriod::Max },
    Resolution { key: TimeframeKey::M, interval: ProviderInterval::OneMonth, period: HistoryPeriod::Max },
    Resolution { key: TimeframeKey::W, interval: ProviderInterval::OneWeek, period: HistoryPeriod::TenYears },
    Resolution { key: TimeframeKey::D, interval: ProviderInterval::OneDay, period: HistoryPeriod::TwoYears },
    Resolution { key: TimeframeKey::H1, interval: ProviderInterval::OneHour, period: HistoryPeriod::Days730 },
    Resolution { key: TimeframeKey::M30, interval: ProviderInterval::ThirtyMinutes, period: HistoryPeriod::Days30 },
    Resolution { key: TimeframeKey::M15, interval: ProviderInterval::FifteenMinutes, period: HistoryPeriod::Days30 },
];

impl TimeframeKey {
    /// Normalise (trim + majuscules) puis cherche la clé dans la table
    ///
    /// # Exemple
    /// let res = TimeframeKey::resolve(" 1h ")?;
    /// assert_eq!(res.interval.to_yahoo_string(), "1h");
    pub fn resolve(raw: &str) -> Result<Resolution, CandleError> {
        let normalized = raw.trim().to_uppercase();

        TIMEFRAME_TABLE
            .iter()
            .find(|entry| entry.key.label() == normalized)
            .copied()
            .ok_or_else(|| CandleError::InvalidTimeframe {
                input: raw.to_string(),
                supported: Self::supported(),
            })
    }

    /// Libellé de la clé tel que le client l'envoie
    pub fn label(&self) -> &'static str {
        match self {
            TimeframeKey::Y => "Y",
            TimeframeKey::Q => "Q",
            TimeframeKey::M => "M",
            TimeframeKey::W => "W",
            TimeframeKey::D => "D",
            TimeframeKey::H1 => "1H",
            TimeframeKey::M30 => "30M",
            TimeframeKey::M15 => "15M",
        }
    }

    /// Toutes les clés supportées, dans l'ordre de la table
    pub fn supported() -> Vec<&'static str> {
        TIMEFRAME_TABLE.iter().map(|entry| entry.key.label()).collect()
    }
}

impl fmt::Display for TimeframeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ProviderInterval {
    /// Paramètre `interval` de l'API chart Yahoo
    pub fn to_yahoo_string(&self) -> &'static str {
        match self {
            ProviderInterval::ThreeMonths => "3mo",
            ProviderInterval::OneMonth => "1mo",
            ProviderInterval::OneWeek => "1wk",
            ProviderInterval::OneDay => "1d",
            ProviderInterval::OneHour => "1h",
            ProviderInterval::ThirtyMinutes => "30m",
            ProviderInterval::FifteenMinutes => "15m",
        }
    }
}

impl fmt::Display for ProviderInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_yahoo_string())
    }
}

impl HistoryPeriod {
    /// Paramètre `range` de l'API chart Yahoo
    pub fn to_yahoo_string(&self) -> &'static str {
        match self {
            HistoryPeriod::Max => "max",
            HistoryPeriod::TenYears => "10y",
            HistoryPeriod::TwoYears => "2y",
            HistoryPeriod::Days730 => "730d",
            HistoryPeriod::Days30 => "30d",
        }
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_yahoo_string())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED: [(&str, &str, &str); 8] = [
        ("Y", "3mo", "max"),
        ("Q", "3mo", "max"),
        ("M", "1mo", "max"),
        ("W", "1wk", "10y"),
        ("D", "1d", "2y"),
        ("1H", "1h", "730d"),
        ("30M", "30m", "30d"),
        ("15M", "15m", "30d"),
    ];

    #[test]
    fn test_resolve_all_keys() {
        for (key, interval, period) in EXPECTED {
            let variants = [
                key.to_string(),
                key.to_lowercase(),
                format!("  {}\t", key),
                format!(" {} ", key.to_lowercase()),
            ];
            for raw in variants {
                let res = TimeframeKey::resolve(&raw).unwrap();
                assert_eq!(res.key.label(), key);
                assert_eq!(res.interval.to_yahoo_string(), interval, "interval for {:?}", raw);
                assert_eq!(res.period.to_yahoo_string(), period, "period for {:?}", raw);
            }
        }
    }

    #[test]
    fn test_resolve_unknown_key() {
        for raw in ["XYZ", "", "1D", "H1", "60M", "y y"] {
            match TimeframeKey::resolve(raw) {
                Err(CandleError::InvalidTimeframe { input, supported }) => {
                    assert_eq!(input, raw);
                    assert_eq!(supported, vec!["Y", "Q", "M", "W", "D", "1H", "30M", "15M"]);
                }
                other => panic!("expected InvalidTimeframe for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_invalid_keeps_raw_input() {
        let err = TimeframeKey::resolve(" xyz ").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid timeframe:  xyz . Supported: Y, Q, M, W, D, 1H, 30M, 15M"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(TimeframeKey::H1.to_string(), "1H");
        assert_eq!(ProviderInterval::OneWeek.to_string(), "1wk");
        assert_eq!(HistoryPeriod::Days730.to_string(), "730d");
    }
}
