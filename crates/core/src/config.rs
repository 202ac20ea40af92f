//! Runtime configuration for the catalog service and the operator CLI.
//!
//! Layers, lowest to highest: built-in defaults, `racar.toml` (or
//! `config/racar.toml`), `RACAR_*` environment variables, then
//! [`ConfigOverrides`] supplied by the caller.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Files checked, in order, when no explicit path is given.
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["racar.toml", "config/racar.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Which document store backs the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_backend: Option<StoreBackend>,
    pub database_url: Option<String>,
    pub server_port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Read this file instead of checking [`CONFIG_FILE_CANDIDATES`].
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("config file references unset environment variable `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("config file has a `${{` without a closing `}}`")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                backend: StoreBackend::Sqlite,
                url: "sqlite://racar.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl StoreBackend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::Validation(format!(
                "unsupported database backend `{other}` (expected sqlite|memory)"
            ))),
        }
    }
}

impl LogFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = Self::locate_file(options.config_path.as_deref()) {
            config.merge_file(read_file(&path)?);
        }
        config.merge_env()?;
        config.merge_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// The config file `load` would read, if any exists.
    pub fn locate_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
        match explicit_path {
            Some(path) => path.exists().then(|| path.to_path_buf()),
            None => CONFIG_FILE_CANDIDATES.iter().map(PathBuf::from).find(|path| path.exists()),
        }
    }

    fn merge_file(&mut self, file: FileConfig) {
        let FileConfig { database, server, logging } = file;

        set(&mut self.database.backend, database.backend);
        set(&mut self.database.url, database.url);
        set(&mut self.database.max_connections, database.max_connections);
        set(&mut self.database.timeout_secs, database.timeout_secs);

        set(&mut self.server.bind_address, server.bind_address);
        set(&mut self.server.port, server.port);
        set(&mut self.server.graceful_shutdown_secs, server.graceful_shutdown_secs);

        set(&mut self.logging.level, logging.level);
        set(&mut self.logging.format, logging.format);
    }

    fn merge_env(&mut self) -> Result<(), ConfigError> {
        set(&mut self.database.backend, env_value(&["RACAR_DATABASE_BACKEND"])?);
        set(&mut self.database.url, env_value(&["RACAR_DATABASE_URL"])?);
        set(&mut self.database.max_connections, env_value(&["RACAR_DATABASE_MAX_CONNECTIONS"])?);
        set(&mut self.database.timeout_secs, env_value(&["RACAR_DATABASE_TIMEOUT_SECS"])?);

        set(&mut self.server.bind_address, env_value(&["RACAR_SERVER_BIND_ADDRESS"])?);
        set(&mut self.server.port, env_value(&["RACAR_SERVER_PORT"])?);
        set(
            &mut self.server.graceful_shutdown_secs,
            env_value(&["RACAR_SERVER_GRACEFUL_SHUTDOWN_SECS"])?,
        );

        set(&mut self.logging.level, env_value(&["RACAR_LOGGING_LEVEL", "RACAR_LOG_LEVEL"])?);
        set(&mut self.logging.format, env_value(&["RACAR_LOGGING_FORMAT", "RACAR_LOG_FORMAT"])?);
        Ok(())
    }

    fn merge_overrides(&mut self, overrides: ConfigOverrides) {
        set(&mut self.database.backend, overrides.database_backend);
        set(&mut self.database.url, overrides.database_url);
        set(&mut self.server.port, overrides.server_port);
        set(&mut self.logging.level, overrides.log_level);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.server.validate()?;
        self.logging.validate()
    }
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        // the memory backend never opens the URL
        if self.backend == StoreBackend::Sqlite {
            let url = self.url.trim();
            if !(url.starts_with("sqlite:") || url == ":memory:") {
                return invalid(
                    "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)",
                );
            }
        }
        if self.max_connections == 0 {
            return invalid("database.max_connections must be greater than zero");
        }
        if !(1..=300).contains(&self.timeout_secs) {
            return invalid("database.timeout_secs must be in range 1..=300");
        }
        Ok(())
    }
}

impl ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return invalid("server.port must be greater than zero");
        }
        if self.bind_address.trim().is_empty() {
            return invalid("server.bind_address must not be empty");
        }
        if self.graceful_shutdown_secs == 0 {
            return invalid("server.graceful_shutdown_secs must be greater than zero");
        }
        Ok(())
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => invalid("logging.level must be one of trace|debug|info|warn|error"),
        }
    }
}

fn invalid(message: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Validation(message.to_string()))
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// First non-blank variable among `keys`, parsed. Later keys are aliases.
fn env_value<T: FromStr>(keys: &[&str]) -> Result<Option<T>, ConfigError> {
    let Some((key, raw)) = keys
        .iter()
        .find_map(|key| env::var(key).ok().filter(|raw| !raw.trim().is_empty()).map(|raw| (*key, raw)))
    else {
        return Ok(None);
    };

    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidEnvOverride { key: key.to_string(), value: raw })
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str(&expand_env_refs(&raw)?)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces every `${NAME}` with the value of environment variable `NAME`.
fn expand_env_refs(raw: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some((before, after)) = rest.split_once("${") {
        expanded.push_str(before);
        let (name, tail) = after.split_once('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let value = env::var(name)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: name.to_string() })?;
        expanded.push_str(&value);
        rest = tail;
    }
    expanded.push_str(rest);

    Ok(expanded)
}

/// On-disk shape: every key optional, unknown sections rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    database: DatabaseFile,
    server: ServerFile,
    logging: LoggingFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DatabaseFile {
    backend: Option<StoreBackend>,
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ServerFile {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LoggingFile {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use super::{
        expand_env_refs, AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat,
        StoreBackend,
    };

    const RACAR_KEYS: &[&str] = &[
        "RACAR_DATABASE_BACKEND",
        "RACAR_DATABASE_URL",
        "RACAR_DATABASE_MAX_CONNECTIONS",
        "RACAR_DATABASE_TIMEOUT_SECS",
        "RACAR_SERVER_BIND_ADDRESS",
        "RACAR_SERVER_PORT",
        "RACAR_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "RACAR_LOGGING_LEVEL",
        "RACAR_LOGGING_FORMAT",
        "RACAR_LOG_LEVEL",
        "RACAR_LOG_FORMAT",
    ];

    /// Runs `test` with exactly `vars` set among the RACAR_* keys, restoring
    /// the previous environment afterwards.
    fn with_env<R>(vars: &[(&str, &str)], test: impl FnOnce() -> R) -> R {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        let _guard = LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|p| p.into_inner());

        let mut keys: Vec<&str> = RACAR_KEYS.to_vec();
        keys.extend(vars.iter().map(|(key, _)| *key));
        let saved = keys.iter().map(|key| (key.to_string(), env::var(key).ok())).collect::<Vec<_>>();
        for (key, _) in &saved {
            env::remove_var(key);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }

        let outcome = test();

        for (key, value) in saved {
            match value {
                Some(value) => env::set_var(&key, value),
                None => env::remove_var(&key),
            }
        }
        outcome
    }

    fn write_file(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("racar.toml");
        fs::write(&path, contents).expect("write config file");
        path
    }

    fn from_file(path: PathBuf) -> LoadOptions {
        LoadOptions { config_path: Some(path), ..LoadOptions::default() }
    }

    #[test]
    fn defaults_select_sqlite_on_port_8080() {
        let config = with_env(&[], || AppConfig::load(LoadOptions::default())).expect("defaults");

        assert_eq!(config.database.backend, StoreBackend::Sqlite);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn file_values_expand_environment_references() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "[database]\nurl = \"${RACAR_TEST_CATALOG_URL}\"\n");

        let config = with_env(&[("RACAR_TEST_CATALOG_URL", "sqlite://catalogo.db")], || {
            AppConfig::load(from_file(path))
        })
        .expect("load");

        assert_eq!(config.database.url, "sqlite://catalogo.db");
    }

    #[test]
    fn broken_references_are_reported() {
        assert!(matches!(
            expand_env_refs("url = \"${RACAR_TEST_UNCLOSED\""),
            Err(ConfigError::UnterminatedInterpolation)
        ));
        let missing = with_env(&[], || expand_env_refs("url = \"${RACAR_TEST_NEVER_SET}\""));
        assert!(matches!(
            missing,
            Err(ConfigError::MissingEnvInterpolation { ref var }) if var == "RACAR_TEST_NEVER_SET"
        ));
        assert_eq!(expand_env_refs("plain = \"$HOME\"").expect("no references"), "plain = \"$HOME\"");
    }

    #[test]
    fn env_beats_file_and_overrides_beat_env() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(
            &dir,
            "[database]\nurl = \"sqlite://archivo.db\"\n\n[server]\nport = 7070\nbind_address = \"0.0.0.0\"\n\n[logging]\nlevel = \"warn\"\n",
        );

        let config = with_env(
            &[("RACAR_DATABASE_URL", "sqlite://entorno.db"), ("RACAR_SERVER_PORT", "9090")],
            || {
                AppConfig::load(LoadOptions {
                    config_path: Some(path),
                    overrides: ConfigOverrides {
                        database_url: Some("sqlite://override.db".to_string()),
                        log_level: Some("debug".to_string()),
                        ..ConfigOverrides::default()
                    },
                })
            },
        )
        .expect("load");

        assert_eq!(config.database.url, "sqlite://override.db");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_address, "0.0.0.0");
    }

    #[test]
    fn backend_can_come_from_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "[database]\nbackend = \"memory\"\nurl = \"unused\"\n");

        let config = with_env(&[], || AppConfig::load(from_file(path))).expect("load");

        assert_eq!(config.database.backend, StoreBackend::Memory);
    }

    #[test]
    fn unknown_file_keys_are_parse_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_file(&dir, "[database]\nbakend = \"memory\"\n");

        let result = with_env(&[], || AppConfig::load(from_file(path)));

        assert!(matches!(result, Err(ConfigError::ParseFile { .. })));
    }

    #[test]
    fn logging_aliases_apply_when_the_long_keys_are_unset() {
        let config = with_env(&[("RACAR_LOG_LEVEL", "warn"), ("RACAR_LOG_FORMAT", "pretty")], || {
            AppConfig::load(LoadOptions::default())
        })
        .expect("load");

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn memory_backend_ignores_the_database_url() {
        let config = with_env(&[], || {
            AppConfig::load(LoadOptions {
                overrides: ConfigOverrides {
                    database_backend: Some(StoreBackend::Memory),
                    database_url: Some("unused".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
        })
        .expect("load");

        assert_eq!(config.database.backend, StoreBackend::Memory);
    }

    #[test]
    fn non_sqlite_url_fails_validation() {
        let result = with_env(&[("RACAR_DATABASE_URL", "postgres://elsewhere")], || {
            AppConfig::load(LoadOptions::default())
        });

        assert!(matches!(result, Err(ConfigError::Validation(ref message)) if message.contains("database.url")));
    }

    #[test]
    fn unparsable_env_values_name_the_variable() {
        let port = with_env(&[("RACAR_SERVER_PORT", "eighty")], || AppConfig::load(LoadOptions::default()));
        let backend =
            with_env(&[("RACAR_DATABASE_BACKEND", "postgres")], || AppConfig::load(LoadOptions::default()));

        assert!(matches!(port, Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "RACAR_SERVER_PORT"));
        assert!(matches!(
            backend,
            Err(ConfigError::InvalidEnvOverride { ref key, ref value }) if key == "RACAR_DATABASE_BACKEND" && value == "postgres"
        ));
    }
}
