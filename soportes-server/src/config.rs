//! Service configuration
//!
//! Resolution priority: CLI flag → environment variable → default.

use clap::Parser;
use std::path::PathBuf;

/// Incident intake & classification service
#[derive(Parser, Debug, Clone)]
#[command(name = "soportes-server", version, about)]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "SOPORTES_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SOPORTES_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Path to the SQLite database file (created on first run)
    #[arg(long, env = "SOPORTES_DB", default_value = "soportes.db")]
    pub database: PathBuf,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
