pub mod catalog;
pub mod discovery;
pub mod engine;
pub mod explanation;
pub mod interactions;
pub mod profiles;
pub mod scoring;
pub mod snapshot;

pub use catalog::{CatalogError, CatalogIndex};
pub use discovery::Season;
pub use engine::RecommenderEngine;
pub use profiles::ProfileUpdate;
pub use scoring::{RecommendOptions, Recommendation};
pub use snapshot::{Snapshot, SnapshotError};
