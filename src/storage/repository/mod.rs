pub mod feature_repo;
pub mod token_repo;

pub use feature_repo::{FeatureRepository, NewFeature};
pub use token_repo::TokenRepository;
