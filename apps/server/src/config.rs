use std::net::SocketAddr;

use anyhow::Context;
use finsight_core::SyncConfig;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8088";

/// Server configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Allowed CORS origins; `*` allows any.
    pub cors_allow_origins: Vec<String>,
    pub sync: SyncConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let listen_addr = std::env::var("FINSIGHT_LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .parse()
            .with_context(|| format!("Invalid FINSIGHT_LISTEN_ADDR '{}'", listen_addr))?;

        let cors_allow_origins = std::env::var("FINSIGHT_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let sync = SyncConfig::from_env().context("Invalid market data configuration")?;

        Ok(Self {
            listen_addr,
            cors_allow_origins,
            sync,
        })
    }
}
