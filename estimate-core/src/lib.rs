pub mod calculations;
pub mod db;
pub mod export;
pub mod input;
pub mod models;
pub mod store;

pub use db::repository::{EstimateRepository, RepositoryError};
pub use export::{EstimateExporter, ExportError};
pub use models::*;
pub use store::{EstimateStore, StoreError};
