//! Configuration loader
//!
//! Loads engine configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the required ones are missing, falls back to a config file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `FIELDSYNC_API_BASE_URL` (required): API base URL
//! - `FIELDSYNC_DB_PATH` (required): Database file path
//! - `FIELDSYNC_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `FIELDSYNC_DB_POOL_SIZE`: Connection pool size
//! - `FIELDSYNC_PAGE_SIZE`: Page size for paginated collections
//! - `FIELDSYNC_THROTTLE_SECS`: Minimum interval between runs in seconds
//! - `FIELDSYNC_RETRY_MAX_ATTEMPTS`: HTTP attempts for transport failures
//! - `FIELDSYNC_LOG_LEVEL`: Default log filter
//! - `FIELDSYNC_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `fieldsync.{json,toml}` in the
//! current directory, its two parents, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use fieldsync_domain::{
    ApiConfig, Config, DatabaseConfig, FieldSyncError, LoggingConfig, Result, RetryConfig,
    SyncConfig,
};

/// Load configuration, environment first and then file.
///
/// # Errors
/// Returns `FieldSyncError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `FieldSyncError::Config` if a required variable is missing or a
/// value does not parse.
pub fn load_from_env() -> Result<Config> {
    let base_url = env_var("FIELDSYNC_API_BASE_URL")?;
    let db_path = env_var("FIELDSYNC_DB_PATH")?;

    let api_defaults = ApiConfig::default();
    let db_defaults = DatabaseConfig::default();
    let sync_defaults = SyncConfig::default();
    let retry_defaults = RetryConfig::default();
    let log_defaults = LoggingConfig::default();

    let config = Config {
        api: ApiConfig {
            base_url,
            timeout_secs: env_parse("FIELDSYNC_API_TIMEOUT_SECS", api_defaults.timeout_secs)?,
        },
        database: DatabaseConfig {
            path: db_path,
            pool_size: env_parse("FIELDSYNC_DB_POOL_SIZE", db_defaults.pool_size)?,
        },
        sync: SyncConfig {
            page_size: env_parse("FIELDSYNC_PAGE_SIZE", sync_defaults.page_size)?,
            throttle_window_secs: env_parse(
                "FIELDSYNC_THROTTLE_SECS",
                sync_defaults.throttle_window_secs,
            )?,
        },
        retry: RetryConfig {
            max_attempts: env_parse("FIELDSYNC_RETRY_MAX_ATTEMPTS", retry_defaults.max_attempts)?,
            ..retry_defaults
        },
        logging: LoggingConfig {
            level: std::env::var("FIELDSYNC_LOG_LEVEL").unwrap_or(log_defaults.level),
            json: env_bool("FIELDSYNC_LOG_JSON", log_defaults.json),
        },
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `FieldSyncError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(FieldSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            FieldSyncError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| FieldSyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration text; the format follows the file extension.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config: Config = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| FieldSyncError::Config(format!("Invalid TOML format: {e}")))?,
        "json" => serde_json::from_str(contents)
            .map_err(|e| FieldSyncError::Config(format!("Invalid JSON format: {e}")))?,
        _ => {
            return Err(FieldSyncError::Config(format!("Unsupported config format: {extension}")))
        }
    };

    validate(&config)?;
    Ok(config)
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    roots
        .iter()
        .flat_map(|root| {
            ["config.json", "config.toml", "fieldsync.json", "fieldsync.toml"]
                .into_iter()
                .map(move |name| root.join(name))
        })
        .find(|path| path.exists())
}

fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        return Err(FieldSyncError::Config("api.base_url must not be empty".into()));
    }
    if config.database.path.trim().is_empty() {
        return Err(FieldSyncError::Config("database.path must not be empty".into()));
    }
    if config.sync.page_size == 0 {
        return Err(FieldSyncError::Config("sync.page_size must be at least 1".into()));
    }
    Ok(())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        FieldSyncError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional variable, falling back to `default` when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| FieldSyncError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: &[&str] = &[
        "FIELDSYNC_API_BASE_URL",
        "FIELDSYNC_DB_PATH",
        "FIELDSYNC_API_TIMEOUT_SECS",
        "FIELDSYNC_DB_POOL_SIZE",
        "FIELDSYNC_PAGE_SIZE",
        "FIELDSYNC_THROTTLE_SECS",
        "FIELDSYNC_RETRY_MAX_ATTEMPTS",
        "FIELDSYNC_LOG_LEVEL",
        "FIELDSYNC_LOG_JSON",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn env_with_required_vars_uses_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("FIELDSYNC_API_BASE_URL", "https://crm.example.com/api");
        std::env::set_var("FIELDSYNC_DB_PATH", "/tmp/fieldsync.db");

        let config = load_from_env().expect("config from env");

        assert_eq!(config.api.base_url, "https://crm.example.com/api");
        assert_eq!(config.database.path, "/tmp/fieldsync.db");
        assert_eq!(config.sync.page_size, 25);
        assert_eq!(config.sync.throttle_window_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.logging.level, "info");

        clear_env();
    }

    #[test]
    fn env_overrides_optional_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("FIELDSYNC_API_BASE_URL", "https://crm.example.com/api");
        std::env::set_var("FIELDSYNC_DB_PATH", "/tmp/fieldsync.db");
        std::env::set_var("FIELDSYNC_PAGE_SIZE", "50");
        std::env::set_var("FIELDSYNC_THROTTLE_SECS", "10");
        std::env::set_var("FIELDSYNC_RETRY_MAX_ATTEMPTS", "5");
        std::env::set_var("FIELDSYNC_LOG_LEVEL", "debug");
        std::env::set_var("FIELDSYNC_LOG_JSON", "yes");

        let config = load_from_env().expect("config from env");

        assert_eq!(config.sync.page_size, 50);
        assert_eq!(config.sync.throttle_window_secs, 10);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.initial_backoff_ms, 1_000);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);

        clear_env();
    }

    #[test]
    fn env_missing_required_var_is_config_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("FIELDSYNC_DB_PATH", "/tmp/fieldsync.db");

        let result = load_from_env();
        assert!(matches!(result, Err(FieldSyncError::Config(_))));

        clear_env();
    }

    #[test]
    fn env_invalid_number_is_config_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("FIELDSYNC_API_BASE_URL", "https://crm.example.com/api");
        std::env::set_var("FIELDSYNC_DB_PATH", "/tmp/fieldsync.db");
        std::env::set_var("FIELDSYNC_PAGE_SIZE", "lots");

        match load_from_env() {
            Err(FieldSyncError::Config(msg)) => assert!(msg.contains("FIELDSYNC_PAGE_SIZE")),
            other => panic!("expected config error, got {other:?}"),
        }

        clear_env();
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [api]
            base_url = "https://crm.example.com/api"
            timeout_secs = 10

            [database]
            path = "cache.db"

            [sync]
            page_size = 40
            "#
        )
        .unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.sync.page_size, 40);
        assert_eq!(config.sync.throttle_window_secs, 30);
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                "api": {{"base_url": "https://crm.example.com/api"}},
                "database": {{"path": "cache.db", "pool_size": 2}},
                "logging": {{"level": "warn", "json": true}}
            }}"#
        )
        .unwrap();

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.database.pool_size, 2);
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.json);
    }

    #[test]
    fn rejects_zero_page_size() {
        let result = parse_config(
            r#"
            [api]
            base_url = "https://crm.example.com/api"
            [database]
            path = "cache.db"
            [sync]
            page_size = 0
            "#,
            Path::new("config.toml"),
        );
        assert!(matches!(result, Err(FieldSyncError::Config(_))));
    }

    #[test]
    fn missing_file_is_config_error() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/fieldsync.toml")));
        assert!(matches!(result, Err(FieldSyncError::Config(_))));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let result = parse_config("api: {}", Path::new("config.yaml"));
        match result {
            Err(FieldSyncError::Config(msg)) => assert!(msg.contains("yaml")),
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
