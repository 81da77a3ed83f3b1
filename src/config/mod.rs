// src/config/mod.rs
// All tunables load from the environment (.env supported), with defaults.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct CurioConfig {
    // ── Database Configuration
    pub database_url: String,
    pub sqlite_max_connections: u32,

    // ── Visit Assignment
    pub visit_retry_attempts: u32,

    // ── Memory Gating
    pub memory_gate_min: i64,

    // ── Message History
    pub history_default_limit: usize,
    pub history_max_limit: usize,

    // ── Logging Configuration
    pub log_level: String,
}

// Handles values with trailing comments and extra whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean_val = val.split('#').next().unwrap_or("").trim();
            match clean_val.parse::<T>() {
                Ok(parsed) => parsed,
                Err(_) => {
                    eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                    default
                }
            }
        }
        Err(_) => default,
    }
}

impl CurioConfig {
    pub fn from_env() -> Self {
        // Load from .env file first if it exists
        let _ = dotenvy::dotenv();

        Self {
            database_url: env_var_or("DATABASE_URL", "sqlite:./curio.db".to_string()),
            sqlite_max_connections: env_var_or("SQLITE_MAX_CONNECTIONS", 5),
            visit_retry_attempts: env_var_or("CURIO_VISIT_RETRY_ATTEMPTS", 3),
            memory_gate_min: env_var_or("CURIO_MEMORY_GATE_MIN", 3),
            history_default_limit: env_var_or("CURIO_HISTORY_DEFAULT_LIMIT", 30),
            history_max_limit: env_var_or("CURIO_HISTORY_MAX_LIMIT", 100),
            log_level: env_var_or("CURIO_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Get database pool configuration
    pub fn database_pool_config(&self) -> (String, u32) {
        (self.database_url.clone(), self.sqlite_max_connections)
    }

    /// Check if debug logging is enabled
    pub fn is_debug(&self) -> bool {
        self.log_level.to_lowercase() == "debug"
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<CurioConfig> = Lazy::new(CurioConfig::from_env);
