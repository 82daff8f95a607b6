pub mod completions;
pub mod import;
pub mod store;
pub mod task;

use geomanager_remote::config::default_config_path;
use geomanager_remote::{ImporterManager, RestConfig, RestError};
use std::path::Path;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;
pub const EXIT_REMOTE_ERROR: u8 = 3;

const DEFAULT_USER: &str = "admin";
const DEFAULT_PASSWORD: &str = "geoserver";

/// Endpoint flags from the command line.
#[derive(Debug, Clone, Default)]
pub struct Connection {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Connection {
    /// Resolve against `~/.config/geomanager/rest.json`.
    pub fn resolve(&self) -> Result<RestConfig, String> {
        match default_config_path() {
            Ok(path) => self.resolve_from(Some(&path)),
            Err(e) if self.url.is_none() => Err(format!("{e} (no --url given)")),
            Err(_) => self.resolve_from(None),
        }
    }

    /// Each flag overrides the matching field of the config file.
    ///
    /// Without `--url` the config file is required. With `--url` a missing
    /// file falls back to the default credentials.
    pub fn resolve_from(&self, config_path: Option<&Path>) -> Result<RestConfig, String> {
        let stored = match config_path {
            Some(path) if self.url.is_none() || path.is_file() => {
                let loaded = RestConfig::load(path).map_err(|e| {
                    if self.url.is_some() {
                        e.to_string()
                    } else {
                        format!("{e} (no --url given)")
                    }
                })?;
                Some(loaded)
            }
            _ => None,
        };
        let mut config = match (stored, &self.url) {
            (Some(mut config), Some(url)) => {
                config.url = url.trim_end_matches('/').to_owned();
                config
            }
            (Some(config), None) => config,
            (None, Some(url)) => RestConfig::new(url, DEFAULT_USER, DEFAULT_PASSWORD),
            (None, None) => {
                let e = RestError::Config("no config file".to_owned());
                return Err(format!("{e} (no --url given)"));
            }
        };
        if let Some(user) = &self.user {
            config.username.clone_from(user);
        }
        if let Some(password) = &self.password {
            config.password.clone_from(password);
        }
        Ok(config)
    }
}

pub fn make_importer(conn: &Connection) -> Result<ImporterManager, String> {
    Ok(ImporterManager::new(conn.resolve()?))
}

pub fn remote_err(e: RestError) -> String {
    match e {
        RestError::Config(_) => e.to_string(),
        other => format!("remote error: {other}"),
    }
}

pub fn json_pretty(value: &serde_json::Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// Read a JSON document from disk, rejecting malformed content before it is sent.
pub fn read_json_file(path: &Path) -> Result<String, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str::<serde_json::Value>(&text)
        .map_err(|e| format!("{} is not valid JSON: {e}", path.display()))?;
    Ok(text)
}
