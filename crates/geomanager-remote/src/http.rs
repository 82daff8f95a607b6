use crate::{RestConfig, RestError, RestTransport};
use base64::Engine as _;
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

type HttpResult = Result<ureq::http::Response<ureq::Body>, ureq::Error>;

/// Blocking HTTP transport with basic authentication.
///
/// Every request carries `Authorization: Basic base64(user:password)`.
/// A 404 maps to [`RestError::NotFound`], any other status >= 400 to
/// [`RestError::Status`].
pub struct HttpTransport {
    config: RestConfig,
    agent: ureq::Agent,
    authorization: String,
}

impl HttpTransport {
    pub fn new(config: RestConfig) -> Self {
        let agent = ureq::Agent::new_with_defaults();
        let authorization = basic_auth(&config.username, &config.password);
        Self {
            config,
            agent,
            authorization,
        }
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn send(&self, method: &str, url: &str, body: &[u8], content_type: &str) -> HttpResult {
        let req = match method {
            "PUT" => self.agent.put(url),
            _ => self.agent.post(url),
        };
        req.header("Authorization", &self.authorization)
            .header("Content-Type", content_type)
            .send(body)
    }
}

fn basic_auth(username: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {token}")
}

fn check_status(url: &str, result: HttpResult) -> Result<ureq::http::Response<ureq::Body>, RestError> {
    let resp = match result {
        Ok(r) => r,
        Err(ureq::Error::StatusCode(404)) => {
            return Err(RestError::NotFound(url.to_owned()));
        }
        Err(ureq::Error::StatusCode(code)) => {
            return Err(RestError::Status {
                code,
                url: url.to_owned(),
            });
        }
        Err(e) => {
            return Err(RestError::Http(e.to_string()));
        }
    };

    let code = resp.status().as_u16();
    if code == 404 {
        return Err(RestError::NotFound(url.to_owned()));
    }
    if code >= 400 {
        return Err(RestError::Status {
            code,
            url: url.to_owned(),
        });
    }
    Ok(resp)
}

fn read_text(url: &str, result: HttpResult) -> Result<String, RestError> {
    let resp = check_status(url, result)?;
    let mut reader = resp.into_body().into_reader();
    let mut body = Vec::new();
    reader
        .read_to_end(&mut body)
        .map_err(|e| RestError::Http(e.to_string()))?;
    String::from_utf8(body).map_err(|e| RestError::Http(e.to_string()))
}

/// Build a `multipart/form-data` body from the top-level files of `dir`.
///
/// Returns the content type (with boundary) and the encoded body. Files are
/// sorted by name; each becomes one part named after the file.
pub fn multipart_form(dir: &Path) -> Result<(String, Vec<u8>), RestError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let boundary = boundary_for(dir, &files)?;
    let mut body = Vec::new();
    for path in &files {
        let name = path
            .file_name()
            .map(|n| quoted_param(&n.to_string_lossy()))
            .unwrap_or_default();
        write!(
            body,
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )?;
        body.extend_from_slice(&fs::read(path)?);
        body.extend_from_slice(b"\r\n");
    }
    write!(body, "--{boundary}--\r\n")?;

    Ok((format!("multipart/form-data; boundary={boundary}"), body))
}

/// Escape a value for a quoted `Content-Disposition` parameter.
///
/// `\` and `"` are backslash-escaped; line breaks cannot appear in a header
/// and are percent-encoded.
fn quoted_param(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '"' => {
                out.push('\\');
                out.push(c);
            }
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            _ => out.push(c),
        }
    }
    out
}

fn boundary_for(dir: &Path, files: &[PathBuf]) -> Result<String, RestError> {
    let mut hasher = blake3::Hasher::new();
    hasher.update(dir.to_string_lossy().as_bytes());
    for path in files {
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update(&fs::metadata(path)?.len().to_le_bytes());
    }
    let hex = hasher.finalize().to_hex();
    Ok(format!("geomanager-{}", &hex.as_str()[..32]))
}

impl RestTransport for HttpTransport {
    fn get_json(&self, url: &str) -> Result<Value, RestError> {
        tracing::debug!("GET {url}");
        let result = self
            .agent
            .get(url)
            .header("Authorization", &self.authorization)
            .header("Accept", crate::CONTENT_TYPE_JSON)
            .call();
        let text = read_text(url, result)?;
        self.parse_json(&text)
    }

    fn post(&self, url: &str, body: &[u8], content_type: &str) -> Result<String, RestError> {
        tracing::debug!("POST {url} ({} bytes, {content_type})", body.len());
        read_text(url, self.send("POST", url, body, content_type))
    }

    fn put(&self, url: &str, body: &[u8], content_type: &str) -> Result<String, RestError> {
        tracing::debug!("PUT {url} ({} bytes, {content_type})", body.len());
        read_text(url, self.send("PUT", url, body, content_type))
    }

    fn delete(&self, url: &str) -> Result<(), RestError> {
        tracing::debug!("DELETE {url}");
        let result = self
            .agent
            .delete(url)
            .header("Authorization", &self.authorization)
            .call();
        check_status(url, result)?;
        Ok(())
    }

    fn post_multipart_form(&self, url: &str, dir: &Path) -> Result<String, RestError> {
        let (content_type, body) = multipart_form(dir)?;
        self.post(url, &body, &content_type)
    }
}
