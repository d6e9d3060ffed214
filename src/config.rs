// ============================================================================
// Configuration
// ============================================================================
// Lue depuis les variables d'environnement au démarrage :
//
//   CANDLEPROXY_HOST          adresse d'écoute        (défaut : 0.0.0.0)
//   CANDLEPROXY_PORT          port d'écoute           (défaut : 8000)
//   CANDLEPROXY_YAHOO_URL     racine de l'API Yahoo   (défaut : query1.finance.yahoo.com)
//   CANDLEPROXY_TIMEOUT_SECS  timeout upstream        (défaut : 30)
//   CANDLEPROXY_LOG_DIR       logs fichier rotatifs   (défaut : désactivé)
//
// Le niveau de log reste contrôlé par RUST_LOG.
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration du processus
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub yahoo_url: String,
    pub upstream_timeout: Duration,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            yahoo_url: DEFAULT_YAHOO_URL.to_string(),
            upstream_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_dir: None,
        }
    }
}

impl Config {
    /// Lit la configuration depuis l'environnement du processus
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lit la configuration depuis une fonction de lookup (testable sans toucher l'env)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("CANDLEPROXY_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("CANDLEPROXY_PORT invalide : {}", raw))?,
            None => defaults.port,
        };

        let upstream_timeout = match get("CANDLEPROXY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("CANDLEPROXY_TIMEOUT_SECS invalide : {}", raw))?,
            ),
            None => defaults.upstream_timeout,
        };

        Ok(Self {
            host: get("CANDLEPROXY_HOST").unwrap_or(defaults.host),
            port,
            yahoo_url: get("CANDLEPROXY_YAHOO_URL").unwrap_or(defaults.yahoo_url),
            upstream_timeout,
            log_dir: get("CANDLEPROXY_LOG_DIR").map(PathBuf::from),
        })
    }

    /// Adresse d'écoute "host:port"
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("CANDLEPROXY_HOST", "127.0.0.1"),
            ("CANDLEPROXY_PORT", "9000"),
            ("CANDLEPROXY_YAHOO_URL", "http://localhost:1234"),
            ("CANDLEPROXY_TIMEOUT_SECS", "5"),
            ("CANDLEPROXY_LOG_DIR", "/tmp/logs"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr(), "127.0.0.1:9000");
        assert_eq!(cfg.yahoo_url, "http://localhost:1234");
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(5));
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let cfg = config(&[("CANDLEPROXY_PORT", " "), ("CANDLEPROXY_LOG_DIR", "")]).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.log_dir, None);
    }

    #[test]
    fn test_invalid_port() {
        let err = config(&[("CANDLEPROXY_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("CANDLEPROXY_PORT"));
    }
}
