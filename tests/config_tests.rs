//! Tests for configuration loading from the process environment.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use inventory_agent::config::{AppConfig, Backend};
use inventory_agent::error::InventoryError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 14] = [
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "APP_PASSWORD",
    "INVENTORY_BACKEND",
    "INVENTORY_MODEL",
    "INVENTORY_CSV_PATH",
    "INVENTORY_EXPORT_FILE",
    "INVENTORY_EXPORT_DIR",
    "INVENTORY_MAX_STEPS",
    "INVENTORY_TIMEOUT_SECS",
    "INVENTORY_MEMORY_WINDOW",
    "INVENTORY_CACHE_TTL_SECS",
    "INVENTORY_RULES_PATH",
    "RUST_LOG",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clean_env() -> EnvGuard {
    let guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
    guard
}

#[test]
fn config_reads_credentials_and_tuning_from_env() {
    let _lock = env_lock_guard();
    let _env = clean_env();
    std::env::set_var("OPENAI_API_KEY", "sk-test");
    std::env::set_var("APP_PASSWORD", "meadow");
    std::env::set_var("INVENTORY_CSV_PATH", "/data/stock.csv");
    std::env::set_var("INVENTORY_MAX_STEPS", "4");
    std::env::set_var("INVENTORY_TIMEOUT_SECS", "15");
    std::env::set_var("INVENTORY_CACHE_TTL_SECS", "5");

    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.inventory_path, std::path::PathBuf::from("/data/stock.csv"));
    assert_eq!(config.max_steps, 4);
    assert_eq!(config.request_timeout, Duration::from_secs(15));
    assert_eq!(config.cache_ttl, Some(Duration::from_secs(5)));
    assert!(config.validate().is_ok());

    let gate = config.access_gate();
    assert!(!gate.is_open());
    assert!(gate.check("meadow"));
}

#[test]
fn openai_backend_without_key_fails_at_startup() {
    let _lock = env_lock_guard();
    let _env = clean_env();

    let config = AppConfig::from_env().unwrap();
    let err = config.validate().unwrap_err();

    assert!(matches!(err, InventoryError::Configuration(_)));
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[test]
fn unknown_backend_is_rejected() {
    let _lock = env_lock_guard();
    let _env = clean_env();
    std::env::set_var("INVENTORY_BACKEND", "llama-farm");

    let err = AppConfig::from_env().unwrap_err();

    assert!(err.to_string().contains("INVENTORY_BACKEND"));
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let _lock = env_lock_guard();
    let _env = clean_env();
    std::env::set_var("INVENTORY_BACKEND", "local");
    std::env::set_var("INVENTORY_MODEL", "   ");
    std::env::set_var("APP_PASSWORD", "");

    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.backend, Backend::Local);
    assert_eq!(config.model, "gpt-4o");
    assert!(config.access_gate().is_open());
}
