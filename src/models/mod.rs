// ============================================================================
// Module : models
// ============================================================================
// Structures de données du proxy :
// - timeframe : table clé client -> (intervalle, période) Yahoo
// - table     : données brutes renvoyées par le fournisseur
// - ohlc      : chandelles normalisées et troncature
// ============================================================================

pub mod ohlc;
pub mod table;
pub mod timeframe;

pub use ohlc::{Candle, CandleSeries, MIN_CANDLES};
pub use table::{PriceRow, PriceTable};
pub use timeframe::{HistoryPeriod, ProviderInterval, Resolution, TimeframeKey};
