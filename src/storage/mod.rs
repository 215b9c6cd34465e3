pub mod connection;
pub mod entity;
pub mod error;
pub mod feature_catalog;
pub mod repository;

pub use connection::establish_connection;
pub use error::StorageError;
pub use feature_catalog::FeatureCatalog;
pub use repository::{FeatureRepository, NewFeature, TokenRepository};
