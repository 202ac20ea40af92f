use std::env;
use std::fs;
use std::path::Path;

use racar_core::config::AppConfig;
use serde::Serialize;
use toml::Value;

use super::{load_config, CommandResult};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

/// Prints the effective configuration as a JSON outcome whose `details`
/// list every key with its value and source. Invalid configuration exits 2.
pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = AppConfig::locate_file(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: [(&str, String, &[&str]); 9] = [
        ("database.backend", config.database.backend.as_str().to_string(), &["RACAR_DATABASE_BACKEND"]),
        ("database.url", config.database.url.clone(), &["RACAR_DATABASE_URL"]),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["RACAR_DATABASE_MAX_CONNECTIONS"],
        ),
        ("database.timeout_secs", config.database.timeout_secs.to_string(), &["RACAR_DATABASE_TIMEOUT_SECS"]),
        ("server.bind_address", config.server.bind_address.clone(), &["RACAR_SERVER_BIND_ADDRESS"]),
        ("server.port", config.server.port.to_string(), &["RACAR_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["RACAR_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        ("logging.level", config.logging.level.clone(), &["RACAR_LOGGING_LEVEL", "RACAR_LOG_LEVEL"]),
        (
            "logging.format",
            config.logging.format.as_str().to_string(),
            &["RACAR_LOGGING_FORMAT", "RACAR_LOG_FORMAT"],
        ),
    ];

    let entries = fields
        .into_iter()
        .map(|(key, value, env_keys)| ConfigEntry {
            key,
            value,
            source: field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref()),
        })
        .collect::<Vec<_>>();

    match serde_json::to_value(&entries) {
        Ok(details) => CommandResult::success_with_details(
            "config",
            "effective config (source precedence: env > file > default)",
            details,
        ),
        Err(error) => CommandResult::failure(
            "config",
            "serialization",
            format!("failed to render configuration: {error}"),
            3,
        ),
    }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
