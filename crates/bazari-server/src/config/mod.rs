// SPDX-License-Identifier: Apache-2.0

use bazari_orders::TransitionPolicy;
use std::env;
use std::path::PathBuf;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

/// Process-wide configuration, read from the environment exactly once in
/// `main` and passed into the application state. Nothing reads the
/// environment after startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub token_secret: String,
    pub token_ttl_secs: u64,
    pub atomic_history_append: bool,
    pub transition_policy: TransitionPolicy,
    pub google_client_id: Option<String>,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            database_path: PathBuf::from("bazari.sqlite"),
            token_secret: String::new(),
            token_ttl_secs: 3600,
            atomic_history_append: true,
            transition_policy: TransitionPolicy::Unrestricted,
            google_client_id: None,
            max_body_bytes: 64 * 1024,
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_string("BAZARI_BIND_ADDR", &defaults.bind_addr),
            database_path: PathBuf::from(env_string("BAZARI_DATABASE_PATH", "bazari.sqlite")),
            token_secret: env_string("BAZARI_TOKEN_SECRET", ""),
            token_ttl_secs: env_u64("BAZARI_TOKEN_TTL_SECS", defaults.token_ttl_secs),
            atomic_history_append: env_bool("BAZARI_ATOMIC_HISTORY_APPEND", true),
            transition_policy: env_opt("BAZARI_STATUS_TRANSITIONS")
                .and_then(|raw| TransitionPolicy::parse(&raw).ok())
                .unwrap_or(defaults.transition_policy),
            google_client_id: env_opt("BAZARI_GOOGLE_CLIENT_ID"),
            max_body_bytes: env_usize("BAZARI_MAX_BODY_BYTES", defaults.max_body_bytes),
        }
    }
}

/// Rejects configurations the server must not start with.
pub fn validate_startup_config(config: &ServerConfig) -> Result<(), String> {
    if config.token_secret.is_empty() {
        return Err("BAZARI_TOKEN_SECRET must be set to a non-empty value".to_string());
    }
    if config.token_ttl_secs == 0 {
        return Err("BAZARI_TOKEN_TTL_SECS must be greater than zero".to_string());
    }
    if config.max_body_bytes == 0 {
        return Err("BAZARI_MAX_BODY_BYTES must be greater than zero".to_string());
    }
    Ok(())
}
