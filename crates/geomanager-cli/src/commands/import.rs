use super::{json_pretty, make_importer, read_json_file, remote_err, Connection, EXIT_SUCCESS};
use std::path::Path;

pub fn create(conn: &Connection, body: Option<&Path>, json: bool) -> Result<u8, String> {
    let importer = make_importer(conn)?;
    let definition = body.map(read_json_file).transpose()?;
    let id = importer
        .create_import(definition.as_deref())
        .map_err(remote_err)?;

    if json {
        println!("{}", json_pretty(&serde_json::json!({ "import": id }))?);
    } else {
        println!("created import {id}");
    }
    Ok(EXIT_SUCCESS)
}

pub fn get(conn: &Connection, import_id: u64, json: bool) -> Result<u8, String> {
    let importer = make_importer(conn)?;
    let import = importer.get_import(import_id).map_err(remote_err)?;

    if json {
        println!("{}", json_pretty(&import)?);
    } else {
        let state = import["state"].as_str().unwrap_or("unknown");
        println!("import {import_id}: {state}");
    }
    Ok(EXIT_SUCCESS)
}

pub fn list(conn: &Connection, json: bool) -> Result<u8, String> {
    let importer = make_importer(conn)?;
    let imports = importer.list_imports().map_err(remote_err)?;

    if json {
        println!("{}", json_pretty(&serde_json::Value::Array(imports))?);
    } else if imports.is_empty() {
        println!("no imports");
    } else {
        for import in &imports {
            println!(
                "{}\t{}",
                import["id"],
                import["state"].as_str().unwrap_or("unknown")
            );
        }
    }
    Ok(EXIT_SUCCESS)
}

pub fn start(conn: &Connection, import_id: u64, json: bool) -> Result<u8, String> {
    let importer = make_importer(conn)?;
    importer.start_import(import_id).map_err(remote_err)?;

    if json {
        println!(
            "{}",
            json_pretty(&serde_json::json!({ "import": import_id, "started": true }))?
        );
    } else {
        println!("started import {import_id}");
    }
    Ok(EXIT_SUCCESS)
}

pub fn delete(conn: &Connection, import_id: u64, json: bool) -> Result<u8, String> {
    let importer = make_importer(conn)?;
    importer.delete_import(import_id).map_err(remote_err)?;

    if json {
        println!(
            "{}",
            json_pretty(&serde_json::json!({ "import": import_id, "deleted": true }))?
        );
    } else {
        println!("deleted import {import_id}");
    }
    Ok(EXIT_SUCCESS)
}
