//! REST client for the GeoServer importer extension.
//!
//! The importer is driven through a handful of resources under
//! `{base}/rest/imports`: import contexts addressed by integer id, tasks inside
//! them, and the `layer` and `transforms` sub-resources of a task. This crate
//! provides endpoint configuration, a [`RestTransport`] abstraction with a
//! blocking HTTP implementation, the [`ImporterManager`] that walks those
//! resources, and helpers to prepare archive uploads.

pub mod archive;
pub mod config;
pub mod http;
pub mod importer;

pub use archive::{create_work_dir, unpack, ArchiveExpander, TarExpander};
pub use config::RestConfig;
pub use http::HttpTransport;
pub use importer::{task_state, ImportId, ImporterManager, TaskId};

use serde_json::Value;
use std::path::Path;
use thiserror::Error;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain";
pub const CONTENT_TYPE_ZIP: &str = "application/zip";

#[derive(Debug, Error)]
pub enum RestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("HTTP {code} for {url}")]
    Status { code: u16, url: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("response is missing field '{0}'")]
    MissingField(String),
    #[error("rest config error: {0}")]
    Config(String),
}

/// HTTP/JSON transport used by the managers.
///
/// Credentials are a property of the transport and travel with every call.
/// Response bodies are returned as text; callers decide how to parse them.
pub trait RestTransport: Send + Sync {
    /// GET `url` and parse the body as JSON.
    fn get_json(&self, url: &str) -> Result<Value, RestError>;

    fn post(&self, url: &str, body: &[u8], content_type: &str) -> Result<String, RestError>;

    fn put(&self, url: &str, body: &[u8], content_type: &str) -> Result<String, RestError>;

    fn delete(&self, url: &str) -> Result<(), RestError>;

    /// POST every regular file at the top level of `dir` as one multipart form.
    fn post_multipart_form(&self, url: &str, dir: &Path) -> Result<String, RestError>;

    fn post_json(&self, url: &str, json: &str) -> Result<String, RestError> {
        self.post(url, json.as_bytes(), CONTENT_TYPE_JSON)
    }

    fn put_json(&self, url: &str, json: &str) -> Result<String, RestError> {
        self.put(url, json.as_bytes(), CONTENT_TYPE_JSON)
    }

    fn put_file(&self, url: &str, path: &Path, content_type: &str) -> Result<String, RestError> {
        let data = std::fs::read(path)?;
        self.put(url, &data, content_type)
    }

    fn parse_json(&self, text: &str) -> Result<Value, RestError> {
        serde_json::from_str(text).map_err(|e| RestError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message() {
        let err = RestError::Status {
            code: 500,
            url: "http://gs/rest/imports".to_owned(),
        };
        assert_eq!(err.to_string(), "HTTP 500 for http://gs/rest/imports");
    }

    #[test]
    fn missing_field_message() {
        assert_eq!(
            RestError::MissingField("import.id".to_owned()).to_string(),
            "response is missing field 'import.id'"
        );
    }
}
