// ============================================================================
// Module : api
// ============================================================================
// Frontière avec le fournisseur de données de marché.
// Le pipeline ne connaît que le trait CandleFetcher : le client Yahoo en est
// l'implémentation de production, les tests injectent un stub.
// ============================================================================

use async_trait::async_trait;

use crate::error::CandleError;
use crate::models::{HistoryPeriod, PriceTable, ProviderInterval};

pub mod yahoo; // Client API Yahoo Finance

pub use yahoo::YahooClient;

/// Source de chandelles brutes
///
/// Retourne une table vide si le fournisseur n'a aucune donnée pour ce ticker.
/// Toute erreur de transport ou de parsing est une `CandleError::DataSource`.
#[async_trait]
pub trait CandleFetcher: Send + Sync {
    async fn fetch(
        &self,
        ticker: &str,
        interval: ProviderInterval,
        period: HistoryPeriod,
    ) -> Result<PriceTable, CandleError>;
}
