//! Server configuration from command-line flags and environment

use clap::Parser;
use std::time::Duration;

/// Authoritative server for the emoji survival world
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[clap(author, version, about)]
pub struct ServerConfig {
    /// Address to bind to
    #[clap(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// Port to listen on
    #[clap(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
    /// Maximum number of concurrent players
    #[clap(short, long, env = "MAX_PLAYERS", default_value_t = 64)]
    pub max_players: usize,
    /// Vitals tick period in milliseconds
    #[clap(long, default_value_t = 1000)]
    pub vitals_interval_ms: u64,
    /// Resource respawn period in seconds
    #[clap(long, default_value_t = 30)]
    pub respawn_interval_secs: u64,
    /// Seed for world generation; random when omitted
    #[clap(long, env = "WORLD_SEED")]
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_players: 64,
            vitals_interval_ms: 1000,
            respawn_interval_secs: 30,
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn vitals_interval(&self) -> Duration {
        Duration::from_millis(self.vitals_interval_ms.max(1))
    }

    pub fn respawn_interval(&self) -> Duration {
        Duration::from_secs(self.respawn_interval_secs.max(1))
    }
}
