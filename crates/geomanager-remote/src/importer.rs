use crate::archive::{create_work_dir, ensure_archive, unpack, ArchiveExpander};
use crate::{
    HttpTransport, RestConfig, RestError, RestTransport, CONTENT_TYPE_TEXT, CONTENT_TYPE_ZIP,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub type ImportId = u64;
pub type TaskId = u64;

/// Client for the importer REST resources.
///
/// Resource layout under `{base}/rest/imports`:
/// - `/{import}`                          — import context (`?exec=true` starts it)
/// - `/{import}/tasks`                    — multipart upload of a directory
/// - `/{import}/tasks/{file}`             — upload of a single archive
/// - `/{import}/tasks/{task}`             — task detail and update
/// - `/{import}/tasks/{task}/layer`       — layer properties of a task
/// - `/{import}/tasks/{task}/transforms`  — transform chain of a task
///
/// Ids are only ever taken from server responses.
pub struct ImporterManager<T: RestTransport = HttpTransport> {
    base_url: String,
    transport: T,
}

impl ImporterManager<HttpTransport> {
    pub fn new(config: RestConfig) -> Self {
        let base_url = config.url.trim_end_matches('/').to_owned();
        Self {
            base_url,
            transport: HttpTransport::new(config),
        }
    }
}

impl<T: RestTransport> ImporterManager<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `{base}/rest/imports`
    pub fn imports_url(&self) -> String {
        format!("{}/rest/imports", self.base_url)
    }

    fn import_url(&self, import_id: ImportId) -> String {
        format!("{}/{import_id}", self.imports_url())
    }

    fn task_url(&self, import_id: ImportId, task_id: TaskId) -> String {
        format!("{}/tasks/{task_id}", self.import_url(import_id))
    }

    /// The `import` object of an import context.
    pub fn get_import(&self, import_id: ImportId) -> Result<Value, RestError> {
        let json = self.transport.get_json(&self.import_url(import_id))?;
        take_object(json, "import")
    }

    /// The `imports` array of the collection.
    pub fn list_imports(&self) -> Result<Vec<Value>, RestError> {
        let json = self.transport.get_json(&self.imports_url())?;
        match json {
            Value::Object(mut map) => match map.remove("imports") {
                Some(Value::Array(items)) => Ok(items),
                _ => Err(RestError::MissingField("imports".to_owned())),
            },
            _ => Err(RestError::MissingField("imports".to_owned())),
        }
    }

    /// The fully expanded `task` object.
    pub fn get_task(&self, import_id: ImportId, task_id: TaskId) -> Result<Value, RestError> {
        let url = format!("{}?expand=all", self.task_url(import_id, task_id));
        let json = self.transport.get_json(&url)?;
        take_object(json, "task")
    }

    /// Create an import context, optionally with a JSON definition, and
    /// return its id.
    ///
    /// Without a body an empty `text/plain` POST is sent.
    pub fn create_import(&self, body: Option<&str>) -> Result<ImportId, RestError> {
        let url = self.imports_url();
        let resp = match body {
            None => self.transport.post(&url, b"", CONTENT_TYPE_TEXT)?,
            Some(json) => self.transport.post_json(&url, json)?,
        };
        let id = self.parse_id(&resp, "import")?;
        tracing::info!("created import {id}");
        Ok(id)
    }

    /// Run a READY import.
    pub fn start_import(&self, import_id: ImportId) -> Result<(), RestError> {
        let url = format!("{}?exec=true", self.import_url(import_id));
        self.transport.post(&url, b"", CONTENT_TYPE_TEXT)?;
        tracing::info!("started import {import_id}");
        Ok(())
    }

    pub fn delete_import(&self, import_id: ImportId) -> Result<(), RestError> {
        self.transport.delete(&self.import_url(import_id))
    }

    /// Upload every file of an already expanded directory as a new task.
    pub fn attach_task_from_directory(
        &self,
        import_id: ImportId,
        dir: &Path,
    ) -> Result<TaskId, RestError> {
        let url = format!("{}/tasks", self.import_url(import_id));
        let resp = self.transport.post_multipart_form(&url, dir)?;
        let id = self.parse_id(&resp, "task")?;
        tracing::info!("attached task {id} to import {import_id} from {}", dir.display());
        Ok(id)
    }

    /// Expand `archive` into a new work directory under `work_parent` and
    /// attach its contents as a task.
    ///
    /// The archive is deleted once expanded. On success the work directory is
    /// returned alongside the task id and is left for the caller to remove; on
    /// failure it is removed before the error is returned.
    pub fn attach_task_from_archive(
        &self,
        import_id: ImportId,
        archive: &Path,
        work_parent: &Path,
        expander: &dyn ArchiveExpander,
    ) -> Result<(TaskId, PathBuf), RestError> {
        ensure_archive(archive)?;
        let work_dir = create_work_dir(work_parent)?;
        let attached = unpack(archive, &work_dir, expander)
            .and_then(|dir| self.attach_task_from_directory(import_id, &dir));
        match attached {
            Ok(task_id) => Ok((task_id, work_dir)),
            Err(e) => {
                if let Err(cleanup) = std::fs::remove_dir_all(&work_dir) {
                    tracing::warn!("failed to remove {}: {cleanup}", work_dir.display());
                }
                Err(e)
            }
        }
    }

    /// Upload a single zip file; its file name becomes the resource name.
    pub fn attach_task_file(&self, import_id: ImportId, path: &Path) -> Result<TaskId, RestError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                RestError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                ))
            })?;
        let url = format!("{}/tasks/{file_name}", self.import_url(import_id));
        let resp = self.transport.put_file(&url, path, CONTENT_TYPE_ZIP)?;
        let id = self.parse_id(&resp, "task")?;
        tracing::info!("attached task {id} to import {import_id} from {file_name}");
        Ok(id)
    }

    /// Merge `json` into the task, e.g. `{"task": {"layer": {"srs": "EPSG:4326"}}}`.
    pub fn update_task(&self, import_id: ImportId, task_id: TaskId, json: &str) -> Result<(), RestError> {
        self.transport
            .put_json(&self.task_url(import_id, task_id), json)?;
        Ok(())
    }

    /// Merge `json` into the layer of a task, e.g. `{"title": "Archsites"}`.
    pub fn update_task_layer(
        &self,
        import_id: ImportId,
        task_id: TaskId,
        json: &str,
    ) -> Result<(), RestError> {
        let url = format!("{}/layer", self.task_url(import_id, task_id));
        self.transport.put_json(&url, json)?;
        Ok(())
    }

    /// Append a transform to the task's transform chain.
    pub fn add_task_transform(
        &self,
        import_id: ImportId,
        task_id: TaskId,
        json: &str,
    ) -> Result<(), RestError> {
        let url = format!("{}/transforms", self.task_url(import_id, task_id));
        self.transport.post_json(&url, json)?;
        Ok(())
    }

    fn parse_id(&self, response: &str, root: &str) -> Result<u64, RestError> {
        let json = self.transport.parse_json(response)?;
        json.get(root)
            .and_then(|obj| obj.get("id"))
            .and_then(Value::as_u64)
            .ok_or_else(|| RestError::MissingField(format!("{root}.id")))
    }
}

/// The `state` string of a task object, e.g. `"NO_CRS"` or `"READY"`.
pub fn task_state(task: &Value) -> Option<&str> {
    task.get("state").and_then(Value::as_str)
}

fn take_object(json: Value, field: &str) -> Result<Value, RestError> {
    match json {
        Value::Object(mut map) => match map.remove(field) {
            Some(obj @ Value::Object(_)) => Ok(obj),
            _ => Err(RestError::MissingField(field.to_owned())),
        },
        _ => Err(RestError::MissingField(field.to_owned())),
    }
}
