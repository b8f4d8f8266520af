//! Configuration (layered: CLI flags > environment > `.env` > defaults).

pub mod access;

pub use access::AccessGate;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{InventoryError, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_INVENTORY_PATH: &str = "inventory.csv";
pub const DEFAULT_EXPORT_FILE: &str = "inventory_export.csv";
pub const DEFAULT_MAX_STEPS: usize = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MEMORY_WINDOW: usize = 20;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;

/// Which completion service answers queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Backend {
    #[default]
    #[strum(serialize = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    Local,
}

/// Engine configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Completion-service credential (`OPENAI_API_KEY`).
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Optional password gate (`APP_PASSWORD`).
    pub access_secret: Option<String>,
    pub backend: Backend,
    pub model: String,
    pub inventory_path: PathBuf,
    pub export_file_name: String,
    pub export_dir: PathBuf,
    pub max_steps: usize,
    pub request_timeout: Duration,
    /// `None` keeps every exchange in memory.
    pub memory_window: Option<usize>,
    /// `None` disables the inventory cache.
    pub cache_ttl: Option<Duration>,
    pub rules_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("base_url", &self.base_url)
            .field("access_secret", &self.access_secret.as_ref().map(|_| ".."))
            .field("backend", &self.backend)
            .field("model", &self.model)
            .field("inventory_path", &self.inventory_path)
            .field("export_file_name", &self.export_file_name)
            .field("export_dir", &self.export_dir)
            .field("max_steps", &self.max_steps)
            .field("request_timeout", &self.request_timeout)
            .field("memory_window", &self.memory_window)
            .field("cache_ttl", &self.cache_ttl)
            .field("rules_path", &self.rules_path)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            access_secret: None,
            backend: Backend::default(),
            model: DEFAULT_MODEL.to_string(),
            inventory_path: PathBuf::from(DEFAULT_INVENTORY_PATH),
            export_file_name: DEFAULT_EXPORT_FILE.to_string(),
            export_dir: PathBuf::from("."),
            max_steps: DEFAULT_MAX_STEPS,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            memory_window: Some(DEFAULT_MEMORY_WINDOW),
            cache_ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            rules_path: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        config.api_key = get("OPENAI_API_KEY");
        config.base_url = get("OPENAI_BASE_URL");
        config.access_secret = get("APP_PASSWORD");

        if let Some(backend) = get("INVENTORY_BACKEND") {
            config.backend = backend
                .parse()
                .map_err(|_| InventoryError::Configuration(format!("unknown INVENTORY_BACKEND '{backend}'")))?;
        }
        if let Some(model) = get("INVENTORY_MODEL") {
            config.model = model;
        }
        if let Some(path) = get("INVENTORY_CSV_PATH") {
            config.inventory_path = PathBuf::from(path);
        }
        if let Some(name) = get("INVENTORY_EXPORT_FILE") {
            config.export_file_name = name;
        }
        if let Some(dir) = get("INVENTORY_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }
        if let Some(steps) = get("INVENTORY_MAX_STEPS") {
            config.max_steps = parse_number("INVENTORY_MAX_STEPS", &steps)?;
        }
        if let Some(secs) = get("INVENTORY_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(parse_number("INVENTORY_TIMEOUT_SECS", &secs)?);
        }
        if let Some(window) = get("INVENTORY_MEMORY_WINDOW") {
            let window: usize = parse_number("INVENTORY_MEMORY_WINDOW", &window)?;
            config.memory_window = (window > 0).then_some(window);
        }
        if let Some(ttl) = get("INVENTORY_CACHE_TTL_SECS") {
            let ttl: u64 = parse_number("INVENTORY_CACHE_TTL_SECS", &ttl)?;
            config.cache_ttl = (ttl > 0).then(|| Duration::from_secs(ttl));
        }
        config.rules_path = get("INVENTORY_RULES_PATH").map(PathBuf::from);

        Ok(config)
    }

    /// Startup check: everything the selected backend needs is present.
    pub fn validate(&self) -> Result<()> {
        if self.backend == Backend::OpenAi && self.api_key.is_none() {
            return Err(InventoryError::Configuration(
                "Missing OPENAI_API_KEY (required by the openai backend)".into(),
            ));
        }
        if self.max_steps == 0 {
            return Err(InventoryError::Configuration("max steps must be at least 1".into()));
        }
        if self.export_file_name.trim().is_empty() {
            return Err(InventoryError::Configuration("export file name is empty".into()));
        }
        Ok(())
    }

    pub fn access_gate(&self) -> AccessGate {
        AccessGate::new(self.access_secret.clone())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| InventoryError::Configuration(format!("{key} must be a non-negative integer, got '{value}'")))
}
