use crate::{EncoderError, ParameterStore};
use serde::{Deserialize, Serialize};

/// Connection parameter holding the database name (or file path for GeoPackage).
pub const DATABASE_KEY: &str = "database";

/// Connection parameter holding the backend discriminator.
pub const DBTYPE_KEY: &str = "dbtype";

/// A datastore as decoded from the server's REST representation.
///
/// Wire form: `{"dataStore": {"name": ..., "type": ..., "connectionParameters": {"entry": [...]}}}`.
/// Unknown fields (workspace links, feature type lists) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestDataStore {
    pub name: String,
    #[serde(rename = "type", default)]
    pub store_type: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "connectionParameters", default)]
    pub connection_parameters: ParameterStore,
}

fn default_enabled() -> bool {
    true
}

#[derive(Deserialize)]
struct RestDataStoreDocument {
    #[serde(rename = "dataStore")]
    data_store: RestDataStore,
}

impl RestDataStore {
    /// Decode a `{"dataStore": {...}}` document.
    pub fn from_json(text: &str) -> Result<Self, EncoderError> {
        let doc: RestDataStoreDocument = serde_json::from_str(text)
            .map_err(|e| EncoderError::Serialization(format!("invalid datastore: {e}")))?;
        Ok(doc.data_store)
    }

    pub fn store_type(&self) -> &str {
        &self.store_type
    }

    pub fn connection_parameters(&self) -> &ParameterStore {
        &self.connection_parameters
    }
}

/// State shared by every datastore encoder: identity, flags and parameters.
///
/// Only the variant constructors create one, which keeps the mandatory-field
/// checks in a single place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreEncoder {
    name: String,
    store_type: &'static str,
    enabled: bool,
    description: Option<String>,
    params: ParameterStore,
}

#[derive(Serialize)]
struct DataStoreBody<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    store_type: &'a str,
    enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(rename = "connectionParameters")]
    connection_parameters: &'a ParameterStore,
}

#[derive(Serialize)]
struct DataStoreDocument<'a> {
    #[serde(rename = "dataStore")]
    data_store: DataStoreBody<'a>,
}

impl DatastoreEncoder {
    /// Fresh encoder: name and database are checked, defaults are left to the variant.
    pub(crate) fn fresh(
        name: &str,
        store_type: &'static str,
        dbtype: &str,
        database: &str,
    ) -> Result<Self, EncoderError> {
        ensure_valid_name(name)?;
        ensure_valid_database(Some(database))?;
        let mut params = ParameterStore::new();
        params.set(DBTYPE_KEY, dbtype);
        params.set(DATABASE_KEY, database);
        Ok(Self {
            name: name.to_owned(),
            store_type,
            enabled: true,
            description: None,
            params,
        })
    }

    /// Rebuild from a server representation. The stored parameters are taken
    /// verbatim; no defaults are applied.
    pub(crate) fn from_store(
        store: &RestDataStore,
        expected_type: &'static str,
    ) -> Result<Self, EncoderError> {
        ensure_valid_name(&store.name)?;
        ensure_valid_type(&store.store_type, expected_type)?;
        ensure_valid_database(store.connection_parameters.get(DATABASE_KEY))?;
        tracing::debug!(
            "rebuilt {expected_type} datastore '{}' with {} parameters",
            store.name,
            store.connection_parameters.len()
        );
        Ok(Self {
            name: store.name.clone(),
            store_type: expected_type,
            enabled: store.enabled,
            description: store.description.clone(),
            params: store.connection_parameters.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store_type(&self) -> &'static str {
        self.store_type
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub(crate) fn params_mut(&mut self) -> &mut ParameterStore {
        &mut self.params
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_owned());
    }

    pub fn to_value(&self) -> Result<serde_json::Value, EncoderError> {
        serde_json::to_value(self.document()).map_err(|e| EncoderError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, EncoderError> {
        serde_json::to_string_pretty(&self.document())
            .map_err(|e| EncoderError::Serialization(e.to_string()))
    }

    fn document(&self) -> DataStoreDocument<'_> {
        DataStoreDocument {
            data_store: DataStoreBody {
                name: &self.name,
                store_type: self.store_type,
                enabled: self.enabled,
                description: self.description.as_deref(),
                connection_parameters: &self.params,
            },
        }
    }
}

/// Capability shared by the concrete datastore encoders.
///
/// Implementors supply their expected type literal and access to the shared
/// [`DatastoreEncoder`]; everything else comes for free.
pub trait StoreEncoder {
    /// The `type` literal this encoder produces and accepts.
    fn valid_type(&self) -> &'static str;

    fn datastore(&self) -> &DatastoreEncoder;

    fn datastore_mut(&mut self) -> &mut DatastoreEncoder;

    fn name(&self) -> &str {
        self.datastore().name()
    }

    fn connection_parameters(&self) -> &ParameterStore {
        self.datastore().params()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.datastore_mut().set_enabled(enabled);
    }

    fn set_description(&mut self, description: &str) {
        self.datastore_mut().set_description(description);
    }

    fn to_json(&self) -> Result<String, EncoderError> {
        self.datastore().to_json()
    }
}

fn ensure_valid_name(name: &str) -> Result<(), EncoderError> {
    if name.trim().is_empty() {
        return Err(EncoderError::InvalidName);
    }
    Ok(())
}

fn ensure_valid_type(actual: &str, expected: &'static str) -> Result<(), EncoderError> {
    if actual != expected {
        return Err(EncoderError::TypeMismatch {
            expected,
            actual: actual.to_owned(),
        });
    }
    Ok(())
}

fn ensure_valid_database(database: Option<&str>) -> Result<(), EncoderError> {
    match database {
        Some(db) if !db.is_empty() => Ok(()),
        _ => Err(EncoderError::InvalidDatabase),
    }
}
