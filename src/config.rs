//! Runtime configuration, read from `PHYSCAT_*` environment variables.
//!
//! - `PHYSCAT_DB` - database file (default: platform data dir, `catalog.db`)
//! - `PHYSCAT_API_KEY` - bearer key guarding operator routes; also turns on rate limiting
//! - `PHYSCAT_CORS_ORIGINS` - comma-separated allowed origins (permissive when unset)
//! - `PHYSCAT_RATE_LIMIT` - requests per minute per client (default 100)
//! - `PHYSCAT_URL` - API base url for the CLI's remote mode

use std::path::PathBuf;

use anyhow::Result;

use crate::api::SecurityConfig;

pub const DEFAULT_PORT: u16 = 17020;
pub const DEFAULT_RATE_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: Option<PathBuf>,
    pub api_key: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    pub rate_limit: u32,
    pub server_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            api_key: None,
            cors_origins: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            server_url: default_server_url(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let cors_origins = get("PHYSCAT_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect()
        });

        let rate_limit = get("PHYSCAT_RATE_LIMIT")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_RATE_LIMIT);

        Self {
            db_path: get("PHYSCAT_DB").map(PathBuf::from),
            api_key: get("PHYSCAT_API_KEY"),
            cors_origins,
            rate_limit,
            server_url: get("PHYSCAT_URL").unwrap_or_else(default_server_url),
        }
    }

    /// Configured database path, falling back to the platform data directory.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => crate::db::default_path(),
        }
    }

    pub fn security(&self) -> SecurityConfig {
        SecurityConfig::new(self.api_key.clone(), self.cors_origins.clone(), self.rate_limit)
    }
}

fn default_server_url() -> String {
    format!("http://127.0.0.1:{}/api/v1", DEFAULT_PORT)
}
