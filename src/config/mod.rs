use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_server: ServerConfig,
    pub storage: StorageConfig,
    pub visit: VisitConfig,
    pub cors: CorsConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Counter file, resolved against the working directory when relative
    pub counter_file: PathBuf,
}

/// Settings handed to the presentation layer's session detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitConfig {
    pub session_timeout_secs: u64,
    pub new_visitor_indicator_ms: u64,
    pub local_storage_key: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Path to directory containing the built frontend
    /// If None, only the API is served
    pub static_dir: Option<String>,
}

impl StorageConfig {
    pub const DEFAULT_COUNTER_FILE: &'static str = "visitor-count.json";
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            counter_file: PathBuf::from(Self::DEFAULT_COUNTER_FILE),
        }
    }
}

impl VisitConfig {
    const fn default_session_timeout_secs() -> u64 {
        30 * 60
    }

    const fn default_new_visitor_indicator_ms() -> u64 {
        3000
    }

    pub fn session_timeout_ms(&self) -> u64 {
        self.session_timeout_secs.saturating_mul(1000)
    }
}

impl Default for VisitConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: Self::default_session_timeout_secs(),
            new_visitor_indicator_ms: Self::default_new_visitor_indicator_ms(),
            local_storage_key: "lastVisitTime".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            storage: StorageConfig::default(),
            visit: VisitConfig::default(),
            cors: CorsConfig::default(),
            frontend: FrontendConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("API_PORT must be a valid port number")?;

        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "file".to_string())
            .to_lowercase()
            .as_str()
        {
            "file" => StorageBackend::File,
            "memory" => StorageBackend::Memory,
            other => {
                tracing::warn!(
                    "Unknown STORAGE_BACKEND '{other}', falling back to 'file'. Supported values: file, memory"
                );
                StorageBackend::File
            }
        };

        let counter_file = std::env::var("VISITOR_COUNT_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(StorageConfig::DEFAULT_COUNTER_FILE));

        let session_timeout_secs = env_or("SESSION_TIMEOUT_SECS", VisitConfig::default_session_timeout_secs());
        let new_visitor_indicator_ms = env_or(
            "NEW_VISITOR_INDICATOR_MS",
            VisitConfig::default_new_visitor_indicator_ms(),
        );

        let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| parse_list(&v))
            .unwrap_or_default();

        let frontend_static_dir = std::env::var("FRONTEND_STATIC_DIR").ok();

        Ok(Config {
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            storage: StorageConfig {
                backend,
                counter_file,
            },
            visit: VisitConfig {
                session_timeout_secs,
                new_visitor_indicator_ms,
                ..VisitConfig::default()
            },
            cors: CorsConfig { allowed_origins },
            frontend: FrontendConfig {
                static_dir: frontend_static_dir,
            },
        })
    }
}

/// Parse an optional numeric variable, keeping the default on absence or error
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.counter_file, PathBuf::from("visitor-count.json"));
        assert_eq!(config.visit.session_timeout_ms(), 1_800_000);
        assert_eq!(config.visit.new_visitor_indicator_ms, 3000);
        assert_eq!(config.visit.local_storage_key, "lastVisitTime");
        assert!(config.cors.allowed_origins.is_empty());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list(" https://a.example, ,https://b.example "),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_env_or_falls_back_on_missing_variable() {
        assert_eq!(env_or("CAPTCHA_VISITS_TEST_UNSET_VARIABLE", 42u64), 42);
    }
}
