//! Configuration loader for Parley.
//!
//! Reads an optional TOML file into [`AppConfig`], then applies `PARLEY_*`
//! environment overrides. Falls back to defaults when the file is missing
//! or malformed.

use std::path::Path;

use parley_types::config::AppConfig;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "PARLEY_";

/// Load configuration from `path` (if any) and the process environment.
pub async fn load_config(path: Option<&Path>) -> AppConfig {
    let mut config = match path {
        Some(path) => load_config_file(path).await,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Load `path` as TOML.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config_file(path: &Path) -> AppConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    }
}

/// Override config fields from `PARLEY_<SECTION>_<KEY>` variables.
///
/// `lookup` resolves a variable name; production passes `std::env::var`.
/// Unparsable numeric values are ignored with a warning.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let var = |key: &str| lookup(&format!("{ENV_PREFIX}{key}"));

    if let Some(path) = var("LOG_PATH") {
        config.log.path = path;
    }
    if let Some(filter) = var("LOG_FILTER") {
        config.log.filter = filter;
    }
    if let Some(path) = var("SQLITE_PATH") {
        config.sqlite.path = path;
    }
    if let Some(host) = var("SERVER_HOST") {
        config.server.host = host;
    }
    if let Some(port) = var("SERVER_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(err) => tracing::warn!("Ignoring {ENV_PREFIX}SERVER_PORT={port}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_file_missing_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config_file(&tmp.path().join("config.toml")).await;
        assert_eq!(config, AppConfig::default());
    }

    #[tokio::test]
    async fn load_config_file_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(
            &config_path,
            r#"
[log]
path = "/var/log/parley.log"

[sqlite]
path = "parley.db"
max_readers = 4

[server]
port = 9100
request_timeout_secs = 5
"#,
        )
        .await
        .unwrap();

        let config = load_config_file(&config_path).await;
        assert_eq!(config.log.path, "/var/log/parley.log");
        assert_eq!(config.sqlite.path, "parley.db");
        assert_eq!(config.sqlite.max_readers, 4);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.request_timeout_secs, 5);
    }

    #[tokio::test]
    async fn load_config_file_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(&config_path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config_file(&config_path).await;
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn env_overrides_replace_fields() {
        let env = HashMap::from([
            ("PARLEY_SQLITE_PATH", "/tmp/parley.db"),
            ("PARLEY_SERVER_PORT", "8081"),
            ("PARLEY_LOG_PATH", "parley.log"),
        ]);
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.sqlite.path, "/tmp/parley.db");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.log.path, "parley.log");
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn env_override_with_bad_port_is_ignored() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == "PARLEY_SERVER_PORT").then(|| "not-a-port".to_string())
        });
        assert_eq!(config.server.port, 9000);
    }
}
