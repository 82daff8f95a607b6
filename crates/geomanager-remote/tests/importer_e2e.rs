//! Importer workflow tests against an in-process scripted server.
//!
//! A `tiny_http` server on a random port plays the importer: it hands out
//! import and task ids, reports `NO_CRS` until an SRS is supplied and records
//! whether the import was executed. The real `HttpTransport` talks to it.

use geomanager_remote::{task_state, ImporterManager, RestConfig, RestError};
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

const AUTH: &str = "Basic YWRtaW46Z2Vvc2VydmVy";

#[derive(Debug, Default)]
struct ImporterState {
    srs: Option<String>,
    started: bool,
    layer_title: Option<String>,
    transforms: Vec<serde_json::Value>,
    multipart_parts: usize,
}

struct ScriptedImporter {
    url: String,
    state: Arc<Mutex<ImporterState>>,
    server: Arc<Server>,
    _handle: std::thread::JoinHandle<()>,
}

impl ScriptedImporter {
    fn start() -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("failed to bind test server"));
        let port = server.server_addr().to_ip().expect("not an IP addr").port();
        let url = format!("http://127.0.0.1:{port}/geoserver");

        let state = Arc::new(Mutex::new(ImporterState::default()));
        let srv = Arc::clone(&server);
        let st = Arc::clone(&state);
        let handle = std::thread::spawn(move || {
            for request in srv.incoming_requests() {
                handle(&st, request);
            }
        });

        Self {
            url,
            state,
            server,
            _handle: handle,
        }
    }

    fn manager(&self) -> ImporterManager {
        ImporterManager::new(RestConfig::new(&self.url, "admin", "geoserver"))
    }
}

impl Drop for ScriptedImporter {
    fn drop(&mut self) {
        self.server.unblock();
    }
}

fn header<'a>(req: &'a Request, name: &'static str) -> Option<&'a str> {
    req.headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str())
}

fn respond_json(req: Request, code: u16, json: &str) {
    let header = Header::from_bytes("Content-Type", "application/json").expect("valid header");
    let _ = req.respond(
        Response::from_string(json)
            .with_header(header)
            .with_status_code(StatusCode(code)),
    );
}

fn task_json(state: &ImporterState) -> String {
    match &state.srs {
        None => r#"{"task":{"id":2,"state":"NO_CRS","layer":{"name":"archsites"}}}"#.to_owned(),
        Some(srs) => serde_json::json!({
            "task": {
                "id": 2,
                "state": "READY",
                "layer": {
                    "name": "archsites",
                    "title": state.layer_title.clone().unwrap_or_else(|| "archsites".to_owned()),
                    "srs": srs,
                    "style": {"name": "gs_archsites"}
                },
                "transformChain": {"transforms": state.transforms}
            }
        })
        .to_string(),
    }
}

fn handle(state: &Mutex<ImporterState>, mut req: Request) {
    if header(&req, "Authorization") != Some(AUTH) {
        let _ = req.respond(Response::empty(401));
        return;
    }

    let method = req.method().clone();
    let url = req.url().to_owned();
    let mut body = Vec::new();
    let _ = req.as_reader().read_to_end(&mut body);
    let mut st = state.lock().unwrap();

    match (&method, url.as_str()) {
        (Method::Post, "/geoserver/rest/imports") => {
            respond_json(req, 201, r#"{"import":{"id":1,"state":"PENDING"}}"#);
        }
        (Method::Get, "/geoserver/rest/imports") => {
            respond_json(req, 200, r#"{"imports":[{"id":1,"state":"PENDING"}]}"#);
        }
        (Method::Get, "/geoserver/rest/imports/1") => {
            let import_state = if st.started { "COMPLETE" } else { "PENDING" };
            respond_json(
                req,
                200,
                &format!(r#"{{"import":{{"id":1,"state":"{import_state}"}}}}"#),
            );
        }
        (Method::Post, "/geoserver/rest/imports/1?exec=true") => {
            st.started = true;
            let _ = req.respond(Response::empty(204));
        }
        (Method::Delete, "/geoserver/rest/imports/1") => {
            let _ = req.respond(Response::empty(204));
        }
        (Method::Put, "/geoserver/rest/imports/1/tasks/archsites_no_crs.zip") => {
            if header(&req, "Content-Type") == Some("application/zip") && !body.is_empty() {
                respond_json(req, 201, r#"{"task":{"id":2,"state":"NO_CRS"}}"#);
            } else {
                let _ = req.respond(Response::empty(415));
            }
        }
        (Method::Post, "/geoserver/rest/imports/1/tasks") => {
            let is_multipart = header(&req, "Content-Type")
                .is_some_and(|ct| ct.starts_with("multipart/form-data; boundary="));
            if is_multipart {
                st.multipart_parts = String::from_utf8_lossy(&body)
                    .matches("Content-Disposition: form-data")
                    .count();
                respond_json(req, 201, r#"{"task":{"id":3,"state":"READY"}}"#);
            } else {
                let _ = req.respond(Response::empty(415));
            }
        }
        (Method::Get, "/geoserver/rest/imports/1/tasks/2?expand=all") => {
            respond_json(req, 200, &task_json(&st));
        }
        (Method::Put, "/geoserver/rest/imports/1/tasks/2") => {
            let update: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
            if let Some(srs) = update["task"]["layer"]["srs"].as_str() {
                st.srs = Some(srs.to_owned());
            }
            let _ = req.respond(Response::empty(204));
        }
        (Method::Put, "/geoserver/rest/imports/1/tasks/2/layer") => {
            let update: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
            st.layer_title = update["title"].as_str().map(str::to_owned);
            let _ = req.respond(Response::empty(204));
        }
        (Method::Post, "/geoserver/rest/imports/1/tasks/2/transforms") => {
            let transform: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
            st.transforms.push(transform);
            respond_json(req, 201, "{}");
        }
        _ => {
            let _ = req.respond(Response::from_string("not found").with_status_code(StatusCode(404)));
        }
    }
}

#[test]
fn import_workflow_from_zip_to_execution() {
    let server = ScriptedImporter::start();
    let importer = server.manager();
    let dir = tempfile::tempdir().unwrap();
    let zip = dir.path().join("archsites_no_crs.zip");
    std::fs::write(&zip, b"PK\x03\x04archsites").unwrap();

    let import_id = importer.create_import(None).unwrap();
    assert_eq!(import_id, 1);

    let task_id = importer.attach_task_file(import_id, &zip).unwrap();
    assert_eq!(task_id, 2);

    let task = importer.get_task(import_id, task_id).unwrap();
    assert_eq!(task_state(&task), Some("NO_CRS"));

    importer
        .update_task(
            import_id,
            task_id,
            r#"{"task":{"layer":{"srs":"EPSG:4326"}}}"#,
        )
        .unwrap();

    let task = importer.get_task(import_id, task_id).unwrap();
    assert_eq!(task_state(&task), Some("READY"));
    assert_eq!(task["layer"]["style"]["name"], "gs_archsites");
    assert_eq!(task["layer"]["srs"], "EPSG:4326");

    importer.start_import(import_id).unwrap();
    assert!(server.state.lock().unwrap().started);

    let import = importer.get_import(import_id).unwrap();
    assert_eq!(import["state"], "COMPLETE");
}

#[test]
fn create_import_with_definition() {
    let server = ScriptedImporter::start();
    let importer = server.manager();
    let body = r#"{"import":{"data":{"type":"mosaic","time":{"mode":"auto"}}}}"#;
    assert_eq!(importer.create_import(Some(body)).unwrap(), 1);
}

#[test]
fn layer_and_transform_updates_show_up_in_task() {
    let server = ScriptedImporter::start();
    let importer = server.manager();

    importer
        .update_task(1, 2, r#"{"task":{"layer":{"srs":"EPSG:32615"}}}"#)
        .unwrap();
    importer
        .update_task_layer(1, 2, r#"{"title":"Archsites","abstract":"Archeological Sites"}"#)
        .unwrap();
    importer
        .add_task_transform(1, 2, r#"{"type":"AttributeRemapTransform","field":"cat","target":"java.lang.Integer"}"#)
        .unwrap();

    let task = importer.get_task(1, 2).unwrap();
    assert_eq!(task["layer"]["title"], "Archsites");
    assert_eq!(
        task["transformChain"]["transforms"][0]["type"],
        "AttributeRemapTransform"
    );
}

#[test]
fn attach_directory_as_multipart_form() {
    let server = ScriptedImporter::start();
    let importer = server.manager();
    let dir = tempfile::tempdir().unwrap();
    for ext in ["shp", "shx", "dbf", "prj"] {
        std::fs::write(dir.path().join(format!("archsites.{ext}")), ext.as_bytes()).unwrap();
    }

    let task_id = importer.attach_task_from_directory(1, dir.path()).unwrap();
    assert_eq!(task_id, 3);
    assert_eq!(server.state.lock().unwrap().multipart_parts, 4);
}

#[test]
fn list_and_delete_imports() {
    let server = ScriptedImporter::start();
    let importer = server.manager();
    let imports = importer.list_imports().unwrap();
    assert_eq!(imports[0]["id"], 1);
    importer.delete_import(1).unwrap();
}

#[test]
fn unknown_import_is_not_found() {
    let server = ScriptedImporter::start();
    let importer = server.manager();
    assert!(matches!(importer.get_import(42), Err(RestError::NotFound(_))));
}

#[test]
fn wrong_credentials_are_rejected() {
    let server = ScriptedImporter::start();
    let importer = ImporterManager::new(RestConfig::new(&server.url, "admin", "wrong"));
    match importer.create_import(None) {
        Err(RestError::Status { code, .. }) => assert_eq!(code, 401),
        other => panic!("unexpected result: {other:?}"),
    }
}
