//! Datastore encoders for the GeoServer REST management API.
//!
//! A [`ParameterStore`] holds the ordered connection parameters of a store. The
//! concrete encoders ([`PostGisEncoder`], [`GeoPackageEncoder`]) seed backend
//! defaults into it and expose typed setters, while [`DatastoreEncoder`] carries
//! the shared identity and validation. Existing stores read from the server are
//! decoded into [`RestDataStore`] and can be turned back into an encoder.

pub mod datastore;
pub mod geopackage;
pub mod params;
pub mod postgis;

pub use datastore::{DatastoreEncoder, RestDataStore, StoreEncoder, DATABASE_KEY, DBTYPE_KEY};
pub use geopackage::GeoPackageEncoder;
pub use params::ParameterStore;
pub use postgis::PostGisEncoder;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("store name cannot be null or empty")]
    InvalidName,
    #[error("store type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },
    #[error("store database cannot be null or empty")]
    InvalidDatabase,
    #[error("serialization error: {0}")]
    Serialization(String),
}
