// ============================================================================
// CandleProxy - point d'entrée
// ============================================================================
// Proxy HTTP entre le graphique du navigateur et Yahoo Finance :
// GET /api/candles?ticker=AAPL&timeframe=D&limit=300
//
// Démarrage :
// 1. logging (stdout + fichier optionnel)
// 2. configuration depuis l'environnement
// 3. client Yahoo partagé
// 4. serveur axum jusqu'à Ctrl+C
// ============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use candleproxy::api::YahooClient;
use candleproxy::config::Config;
use candleproxy::server::{self, AppState};

/// Initialise le logging
///
/// - stdout toujours
/// - fichier à rotation quotidienne si CANDLEPROXY_LOG_DIR est défini
/// - filtre par RUST_LOG (défaut : debug pour candleproxy, info pour le reste)
///
/// Le guard retourné doit vivre jusqu'à la fin du programme pour que les
/// derniers logs fichier soient écrits.
fn init_logging(config: &Config) -> Result<Option<WorkerGuard>> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let (file_layer, guard) = match &config.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)
                .context("Échec de la création du répertoire de logs")?;

            let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "candleproxy.log");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(file_layer)
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "candleproxy=debug,tower_http=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du logging")?;

    info!(log_dir = ?config.log_dir, "Logging initialisé");
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Logging avant tout le reste, mais une erreur ici n'empêche pas de servir
    let _guard = init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {:#}", e);
        None
    });

    info!(?config, "CandleProxy starting up");

    let yahoo = YahooClient::new(&config.yahoo_url, config.upstream_timeout)?;
    let state = AppState::new(Arc::new(yahoo));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Impossible d'écouter sur {}", config.bind_addr()))?;

    let result = server::serve(listener, state).await;

    match &result {
        Ok(_) => info!("Server exited normally"),
        Err(e) => error!(error = ?e, "Server exited with error"),
    }

    result
}
