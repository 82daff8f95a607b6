use crate::datastore::DATABASE_KEY;
use crate::{DatastoreEncoder, EncoderError, RestDataStore, StoreEncoder, DBTYPE_KEY};

/// Encoder for a `GeoPackage` datastore. `database` is the package file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoPackageEncoder {
    inner: DatastoreEncoder,
}

impl GeoPackageEncoder {
    pub const TYPE: &'static str = "GeoPackage";

    pub const DEFAULT_DB_TYPE: &'static str = "geopkg";

    pub fn new(name: &str, database: &str) -> Result<Self, EncoderError> {
        Ok(Self {
            inner: DatastoreEncoder::fresh(name, Self::TYPE, Self::DEFAULT_DB_TYPE, database)?,
        })
    }

    pub fn from_store(store: &RestDataStore) -> Result<Self, EncoderError> {
        Ok(Self {
            inner: DatastoreEncoder::from_store(store, Self::TYPE)?,
        })
    }

    pub fn set_database(&mut self, database: &str) {
        self.inner.params_mut().set(DATABASE_KEY, database);
    }

    pub fn set_user(&mut self, user: &str) {
        self.inner.params_mut().set("user", user);
    }

    pub fn set_database_type(&mut self, dbtype: &str) {
        self.inner.params_mut().set(DBTYPE_KEY, dbtype);
    }
}

impl StoreEncoder for GeoPackageEncoder {
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
