use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Estimate, EstimateFormData, FormError};
use crate::store::StoreError;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("estimate {0} not found")]
    NotFound(Uuid),

    #[error("invalid estimate: {0}")]
    InvalidForm(#[from] FormError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::InvalidForm(e) => Self::InvalidForm(e),
        }
    }
}

/// Storage seam for estimates.
///
/// Every backend prices through [`Estimate`]'s constructors, so totals and
/// timestamps follow the same rules whichever backend is active. Each
/// mutation is applied atomically with respect to the others.
#[async_trait]
pub trait EstimateRepository: Send + Sync {
    async fn create_estimate(
        &self,
        form: EstimateFormData,
    ) -> Result<Estimate, RepositoryError>;

    async fn get_estimate(
        &self,
        id: Uuid,
    ) -> Result<Estimate, RepositoryError>;

    async fn update_estimate(
        &self,
        id: Uuid,
        form: EstimateFormData,
    ) -> Result<Estimate, RepositoryError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete_estimate(
        &self,
        id: Uuid,
    ) -> Result<bool, RepositoryError>;

    async fn duplicate_estimate(
        &self,
        id: Uuid,
    ) -> Result<Estimate, RepositoryError>;

    /// Newest first.
    async fn list_estimates(&self) -> Result<Vec<Estimate>, RepositoryError>;

    /// Case-insensitive project name search, newest first.
    async fn search_estimates(
        &self,
        query: &str,
    ) -> Result<Vec<Estimate>, RepositoryError>;
}
