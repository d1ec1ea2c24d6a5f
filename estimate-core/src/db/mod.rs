pub mod factory;
pub mod memory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use memory::{InMemoryEstimateRepository, MemoryRepositoryFactory};
pub use repository::{EstimateRepository, RepositoryError};
