use super::{json_pretty, make_importer, read_json_file, remote_err, Connection, EXIT_SUCCESS};
use geomanager_remote::{task_state, TarExpander};
use std::path::Path;

pub fn get(conn: &Connection, import_id: u64, task_id: u64, json: bool) -> Result<u8, String> {
    let importer = make_importer(conn)?;
    let task = importer.get_task(import_id, task_id).map_err(remote_err)?;

    if json {
        println!("{}", json_pretty(&task)?);
    } else {
        println!(
            "task {import_id}/{task_id}: {}",
            task_state(&task).unwrap_or("unknown")
        );
        if let Some(style) = task["layer"]["style"]["name"].as_str() {
            println!("  style: {style}");
        }
        if let Some(srs) = task["layer"]["srs"].as_str() {
            println!("  srs:   {srs}");
        }
    }
    Ok(EXIT_SUCCESS)
}

fn print_attached(import_id: u64, task_id: u64, json: bool) -> Result<(), String> {
    if json {
        println!(
            "{}",
            json_pretty(&serde_json::json!({ "import": import_id, "task": task_id }))?
        );
    } else {
        println!("attached task {task_id} to import {import_id}");
    }
    Ok(())
}

pub fn attach_file(conn: &Connection, import_id: u64, file: &Path, json: bool) -> Result<u8, String> {
    let importer = make_importer(conn)?;
    let task_id = importer
        .attach_task_file(import_id, file)
        .map_err(remote_err)?;
    print_attached(import_id, task_id, json)?;
    Ok(EXIT_SUCCESS)
}

pub fn attach_dir(conn: &Connection, import_id: u64, dir: &Path, json: bool) -> Result<u8, String> {
    if !dir.is_dir() {
        return Err(format!("{} is not a directory", dir.display()));
    }
    let importer = make_importer(conn)?;
    let task_id = importer
        .attach_task_from_directory(import_id, dir)
        .map_err(remote_err)?;
    print_attached(import_id, task_id, json)?;
    Ok(EXIT_SUCCESS)
}

pub fn attach_archive(
    conn: &Connection,
    import_id: u64,
    archive: &Path,
    work_parent: &Path,
    json: bool,
) -> Result<u8, String> {
    let importer = make_importer(conn)?;
    let (task_id, work_dir) = importer
        .attach_task_from_archive(import_id, archive, work_parent, &TarExpander)
        .map_err(remote_err)?;
    print_attached(import_id, task_id, json)?;
    if !json {
        println!("expanded files kept in {}", work_dir.display());
    }
    Ok(EXIT_SUCCESS)
}

fn print_updated(import_id: u64, task_id: u64, what: &str, json: bool) -> Result<(), String> {
    if json {
        println!(
            "{}",
            json_pretty(&serde_json::json!({ "import": import_id, "task": task_id, "updated": what }))?
        );
    } else {
        println!("updated {what} of task {import_id}/{task_id}");
    }
    Ok(())
}

/// Body for a task update that only assigns an SRS to the layer.
pub fn srs_update_body(srs: &str) -> String {
    serde_json::json!({ "task": { "layer": { "srs": srs } } }).to_string()
}

pub fn update(
    conn: &Connection,
    import_id: u64,
    task_id: u64,
    srs: Option<&str>,
    body: Option<&Path>,
    json: bool,
) -> Result<u8, String> {
    let update = match (srs, body) {
        (Some(srs), _) => srs_update_body(srs),
        (None, Some(path)) => read_json_file(path)?,
        (None, None) => return Err("either --srs or --body is required".to_owned()),
    };
    let importer = make_importer(conn)?;
    importer
        .update_task(import_id, task_id, &update)
        .map_err(remote_err)?;
    print_updated(import_id, task_id, "task", json)?;
    Ok(EXIT_SUCCESS)
}

pub fn layer(
    conn: &Connection,
    import_id: u64,
    task_id: u64,
    file: &Path,
    json: bool,
) -> Result<u8, String> {
    let body = read_json_file(file)?;
    let importer = make_importer(conn)?;
    importer
        .update_task_layer(import_id, task_id, &body)
        .map_err(remote_err)?;
    print_updated(import_id, task_id, "layer", json)?;
    Ok(EXIT_SUCCESS)
}

pub fn transform(
    conn: &Connection,
    import_id: u64,
    task_id: u64,
    file: &Path,
    json: bool,
) -> Result<u8, String> {
    let body = read_json_file(file)?;
    let importer = make_importer(conn)?;
    importer
        .add_task_transform(import_id, task_id, &body)
        .map_err(remote_err)?;
    print_updated(import_id, task_id, "transforms", json)?;
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srs_update_body_shape() {
        let body: serde_json::Value = serde_json::from_str(&srs_update_body("EPSG:4326")).unwrap();
        assert_eq!(body["task"]["layer"]["srs"], "EPSG:4326");
    }
}
