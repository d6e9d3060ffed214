// ============================================================================
// CandleProxy - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Frontière fournisseur (Yahoo Finance)
pub mod config;    // Configuration via variables d'environnement
pub mod error;     // Erreurs du domaine et mapping HTTP
pub mod models;    // Structures de données
pub mod server;    // Routeur HTTP
pub mod service;   // Pipeline timeframe -> chandelles
