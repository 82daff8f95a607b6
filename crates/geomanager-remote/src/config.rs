use crate::RestError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// GeoServer endpoint and basic-auth credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestConfig {
    /// Server root, e.g. `http://localhost:8080/geoserver`.
    pub url: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl RestConfig {
    pub fn new(url: &str, username: &str, password: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_owned(),
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }

    /// Load config from `~/.config/geomanager/rest.json`.
    pub fn load_default() -> Result<Self, RestError> {
        let path = default_config_path()?;
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, RestError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RestError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| RestError::Config(format!("invalid rest config: {e}")))?;
        Ok(Self::new(&config.url, &config.username, &config.password))
    }

    pub fn save(&self, path: &Path) -> Result<(), RestError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| RestError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn default_config_path() -> Result<PathBuf, RestError> {
    let home = std::env::var("HOME").map_err(|_| RestError::Config("HOME not set".to_owned()))?;
    Ok(PathBuf::from(home).join(".config/geomanager/rest.json"))
}
