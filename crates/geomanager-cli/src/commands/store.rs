use super::{json_pretty, EXIT_SUCCESS};
use geomanager_encoder::{
    EncoderError, GeoPackageEncoder, PostGisEncoder, RestDataStore, StoreEncoder,
};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreKind {
    Postgis,
    Geopackage,
}

/// Optional connection settings for `store encode`.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub schema: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub description: Option<String>,
}

fn invalid(e: EncoderError) -> String {
    format!("invalid store: {e}")
}

pub fn build(
    kind: StoreKind,
    name: &str,
    database: &str,
    opts: &ConnectionOptions,
) -> Result<Box<dyn StoreEncoder>, String> {
    let mut encoder: Box<dyn StoreEncoder> = match kind {
        StoreKind::Postgis => {
            let mut enc = PostGisEncoder::new(name, database).map_err(invalid)?;
            if let Some(host) = &opts.host {
                enc.set_host(host);
            }
            if let Some(port) = opts.port {
                enc.set_port(port);
            }
            if let Some(schema) = &opts.schema {
                enc.set_schema(schema);
            }
            if let Some(user) = &opts.user {
                enc.set_user(user);
            }
            if let Some(password) = &opts.password {
                enc.set_password(password);
            }
            Box::new(enc)
        }
        StoreKind::Geopackage => {
            if opts.host.is_some()
                || opts.port.is_some()
                || opts.schema.is_some()
                || opts.password.is_some()
            {
                return Err(format!(
                    "invalid store: {} only accepts --db-user",
                    GeoPackageEncoder::TYPE
                ));
            }
            let mut enc = GeoPackageEncoder::new(name, database).map_err(invalid)?;
            if let Some(user) = &opts.user {
                enc.set_user(user);
            }
            Box::new(enc)
        }
    };
    if let Some(description) = &opts.description {
        encoder.set_description(description);
    }
    Ok(encoder)
}

pub fn encode(
    kind: StoreKind,
    name: &str,
    database: &str,
    opts: &ConnectionOptions,
) -> Result<u8, String> {
    let encoder = build(kind, name, database, opts)?;
    println!("{}", encoder.to_json().map_err(invalid)?);
    Ok(EXIT_SUCCESS)
}

pub fn check(kind: StoreKind, file: &Path, json: bool) -> Result<u8, String> {
    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let store = RestDataStore::from_json(&text).map_err(invalid)?;
    let encoder: Box<dyn StoreEncoder> = match kind {
        StoreKind::Postgis => Box::new(PostGisEncoder::from_store(&store).map_err(invalid)?),
        StoreKind::Geopackage => Box::new(GeoPackageEncoder::from_store(&store).map_err(invalid)?),
    };

    let params = encoder.connection_parameters();
    if json {
        let payload = serde_json::json!({
            "name": encoder.name(),
            "type": encoder.valid_type(),
            "valid": true,
            "parameters": params.len(),
        });
        println!("{}", json_pretty(&payload)?);
    } else {
        println!(
            "{} store '{}' is valid ({} parameters)",
            encoder.valid_type(),
            encoder.name(),
            params.len()
        );
    }
    Ok(EXIT_SUCCESS)
}
