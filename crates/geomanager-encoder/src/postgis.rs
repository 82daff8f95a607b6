use crate::datastore::DATABASE_KEY;
use crate::{DatastoreEncoder, EncoderError, RestDataStore, StoreEncoder, DBTYPE_KEY};

/// Encoder for a `PostGIS` datastore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostGisEncoder {
    inner: DatastoreEncoder,
}

impl PostGisEncoder {
    pub const TYPE: &'static str = "PostGIS";

    pub const DEFAULT_DB_TYPE: &'static str = "postgis";
    pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    pub const DEFAULT_FETCH_SIZE: u32 = 1000;
    pub const DEFAULT_CONNECTION_TIMEOUT: u32 = 20;
    pub const DEFAULT_LOOSE_BBOX: bool = true;
    pub const DEFAULT_PREPARED_STATEMENTS: bool = true;
    pub const DEFAULT_MAX_OPEN_PREPARED_STATEMENTS: u32 = 50;
    pub const DEFAULT_ESTIMATED_EXTENDS: bool = true;
    pub const DEFAULT_VALIDATE_CONNECTIONS: bool = true;
    pub const DEFAULT_TEST_WHILE_IDLE: bool = true;
    pub const DEFAULT_BATCH_INSERT_SIZE: u32 = 1;
    pub const DEFAULT_EVICTOR_RUN_PERIODICITY: u32 = 300;
    pub const DEFAULT_MAX_CONNECTION_IDLE_TIME: u32 = 300;
    pub const DEFAULT_EVICTOR_TESTS_PER_RUN: u32 = 3;
    pub const DEFAULT_ON_THE_FLY_GEOM_SIMPLIFICATION: bool = true;

    /// Create a PostGIS datastore with the default pool and statement settings.
    pub fn new(name: &str, database: &str) -> Result<Self, EncoderError> {
        let inner = DatastoreEncoder::fresh(name, Self::TYPE, Self::DEFAULT_DB_TYPE, database)?;
        let mut enc = Self { inner };

        enc.set_min_connections(Self::DEFAULT_MIN_CONNECTIONS);
        enc.set_max_connections(Self::DEFAULT_MAX_CONNECTIONS);
        enc.set_fetch_size(Self::DEFAULT_FETCH_SIZE);
        enc.set_connection_timeout(Self::DEFAULT_CONNECTION_TIMEOUT);
        enc.set_loose_bbox(Self::DEFAULT_LOOSE_BBOX);
        enc.set_prepared_statements(Self::DEFAULT_PREPARED_STATEMENTS);
        enc.set_max_open_prepared_statements(Self::DEFAULT_MAX_OPEN_PREPARED_STATEMENTS);
        enc.set_estimated_extends(Self::DEFAULT_ESTIMATED_EXTENDS);
        enc.set_batch_insert_size(Self::DEFAULT_BATCH_INSERT_SIZE);
        enc.set_validate_connections(Self::DEFAULT_VALIDATE_CONNECTIONS);
        enc.set_test_while_idle(Self::DEFAULT_TEST_WHILE_IDLE);
        enc.set_evictor_run_periodicity(Self::DEFAULT_EVICTOR_RUN_PERIODICITY);
        enc.set_max_connection_idle_time(Self::DEFAULT_MAX_CONNECTION_IDLE_TIME);
        enc.set_evictor_tests_per_run(Self::DEFAULT_EVICTOR_TESTS_PER_RUN);
        enc.set_support_on_the_fly_geometry_simplification(
            Self::DEFAULT_ON_THE_FLY_GEOM_SIMPLIFICATION,
        );
        Ok(enc)
    }

    /// Rebuild an encoder from a store read back from the server.
    pub fn from_store(store: &RestDataStore) -> Result<Self, EncoderError> {
        Ok(Self {
            inner: DatastoreEncoder::from_store(store, Self::TYPE)?,
        })
    }

    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.inner.params_mut().set(key, value);
    }

    pub fn set_host(&mut self, host: &str) {
        self.set("host", host);
    }

    pub fn set_port(&mut self, port: u16) {
        self.set("port", port.to_string());
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        self.set("namespace", namespace);
    }

    pub fn set_database(&mut self, database: &str) {
        self.set(DATABASE_KEY, database);
    }

    pub fn set_schema(&mut self, schema: &str) {
        self.set("schema", schema);
    }

    pub fn set_user(&mut self, user: &str) {
        self.set("user", user);
    }

    /// Stored under `passwd`, the key the server expects.
    pub fn set_password(&mut self, password: &str) {
        self.set("passwd", password);
    }

    pub fn set_database_type(&mut self, dbtype: &str) {
        self.set(DBTYPE_KEY, dbtype);
    }

    pub fn set_jndi_reference_name(&mut self, name: &str) {
        self.set("jndiReferenceName", name);
    }

    pub fn set_expose_primary_keys(&mut self, expose: bool) {
        self.set("Expose primary keys", expose.to_string());
    }

    pub fn set_max_connections(&mut self, max: u32) {
        self.set("max connections", max.to_string());
    }

    pub fn set_min_connections(&mut self, min: u32) {
        self.set("min connections", min.to_string());
    }

    pub fn set_fetch_size(&mut self, size: u32) {
        self.set("fetch size", size.to_string());
    }

    pub fn set_connection_timeout(&mut self, seconds: u32) {
        self.set("Connection timeout", seconds.to_string());
    }

    pub fn set_validate_connections(&mut self, validate: bool) {
        self.set("validate connections", validate.to_string());
    }

    pub fn set_primary_key_metadata_table(&mut self, table: &str) {
        self.set("Primary key metadata table", table);
    }

    pub fn set_loose_bbox(&mut self, loose: bool) {
        self.set("Loose bbox", loose.to_string());
    }

    pub fn set_prepared_statements(&mut self, enabled: bool) {
        self.set("preparedStatements", enabled.to_string());
    }

    pub fn set_max_open_prepared_statements(&mut self, max: u32) {
        self.set("Max open prepared statements", max.to_string());
    }

    pub fn set_estimated_extends(&mut self, estimated: bool) {
        self.set("Estimated extends", estimated.to_string());
    }

    pub fn set_test_while_idle(&mut self, test: bool) {
        self.set("Test while idle", test.to_string());
    }

    pub fn set_batch_insert_size(&mut self, size: u32) {
        self.set("Batch insert size", size.to_string());
    }

    pub fn set_evictor_run_periodicity(&mut self, seconds: u32) {
        self.set("Evictor run periodicity", seconds.to_string());
    }

    pub fn set_max_connection_idle_time(&mut self, seconds: u32) {
        self.set("Max connection idle time", seconds.to_string());
    }

    pub fn set_evictor_tests_per_run(&mut self, tests: u32) {
        self.set("Evictor tests per run", tests.to_string());
    }

    pub fn set_support_on_the_fly_geometry_simplification(&mut self, enabled: bool) {
        self.set("Support on the fly geometry simplification", enabled.to_string());
    }

    pub fn set_encode_functions(&mut self, enabled: bool) {
        self.set("encode functions", enabled.to_string());
    }
}

impl StoreEncoder for PostGisEncoder {
    fn valid_type(&self) -> &'static str {
        Self::TYPE
    }

    fn datastore(&self) -> &DatastoreEncoder {
        &self.inner
    }

    fn datastore_mut(&mut self) -> &mut DatastoreEncoder {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParameterStore;

    const DEFAULTS: [(&str, &str); 15] = [
        ("min connections", "1"),
        ("max connections", "10"),
        ("fetch size", "1000"),
        ("Connection timeout", "20"),
        ("Loose bbox", "true"),
        ("preparedStatements", "true"),
        ("Max open prepared statements", "50"),
        ("Estimated extends", "true"),
        ("validate connections", "true"),
        ("Test while idle", "true"),
        ("Batch insert size", "1"),
        ("Evictor run periodicity", "300"),
        ("Max connection idle time", "300"),
        ("Evictor tests per run", "3"),
        ("Support on the fly geometry simplification", "true"),
    ];

    #[test]
    fn new_seeds_all_defaults() {
        let enc = PostGisEncoder::new("roads", "gis").unwrap();
        let params = enc.connection_parameters();
        assert_eq!(params.get("dbtype"), Some("postgis"));
        assert_eq!(params.get("database"), Some("gis"));
        for (key, value) in DEFAULTS {
            assert_eq!(params.get(key), Some(value), "default for '{key}'");
        }
        assert_eq!(params.len(), DEFAULTS.len() + 2);
        assert_eq!(enc.valid_type(), "PostGIS");
        assert_eq!(enc.name(), "roads");
    }

    #[test]
    fn new_rejects_empty_database() {
        assert!(matches!(
            PostGisEncoder::new("roads", ""),
            Err(EncoderError::InvalidDatabase)
        ));
    }

    #[test]
    fn setters_overwrite() {
        let mut enc = PostGisEncoder::new("roads", "gis").unwrap();
        enc.set_host("db1");
        enc.set_host("db2");
        enc.set_port(5432);
        enc.set_max_connections(25);
        enc.set_loose_bbox(false);
        let params = enc.connection_parameters();
        assert_eq!(params.get("host"), Some("db2"));
        assert_eq!(params.get("port"), Some("5432"));
        assert_eq!(params.get("max connections"), Some("25"));
        assert_eq!(params.get("Loose bbox"), Some("false"));
    }

    #[test]
    fn password_uses_passwd_key() {
        let mut enc = PostGisEncoder::new("roads", "gis").unwrap();
        enc.set_password("secret");
        assert_eq!(enc.connection_parameters().get("passwd"), Some("secret"));
        assert!(!enc.connection_parameters().contains("password"));
    }

    #[test]
    fn from_store_skips_defaults() {
        let mut params = ParameterStore::new();
        params.set("database", "gis");
        params.set("host", "db.local");
        let store = RestDataStore {
            name: "roads".to_owned(),
            store_type: "PostGIS".to_owned(),
            enabled: true,
            description: None,
            connection_parameters: params,
        };
        let enc = PostGisEncoder::from_store(&store).unwrap();
        assert_eq!(enc.connection_parameters().len(), 2);
        assert!(!enc.connection_parameters().contains("fetch size"));
    }

    #[test]
    fn from_store_rejects_geopackage_type() {
        let mut params = ParameterStore::new();
        params.set("database", "file:data.gpkg");
        let store = RestDataStore {
            name: "tiles".to_owned(),
            store_type: "GeoPackage".to_owned(),
            enabled: true,
            description: None,
            connection_parameters: params,
        };
        assert!(matches!(
            PostGisEncoder::from_store(&store),
            Err(EncoderError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn json_roundtrip_through_server_form() {
        let mut enc = PostGisEncoder::new("roads", "gis").unwrap();
        enc.set_schema("public");
        let json = enc.to_json().unwrap();
        let store = RestDataStore::from_json(&json).unwrap();
        let rebuilt = PostGisEncoder::from_store(&store).unwrap();
        assert_eq!(rebuilt, enc);
    }
}
