//! `memory` backend: the [`EstimateStore`] behind an async lock.
//!
//! Reads share the lock; every mutation holds the write lock for its whole
//! run, so no reader ever sees a half-applied change. Data lives as long as
//! the process.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::factory::{DbConfig, RepositoryFactory};
use super::repository::{EstimateRepository, RepositoryError};
use crate::models::{Estimate, EstimateFormData};
use crate::store::EstimateStore;

#[derive(Debug, Default, Clone)]
pub struct InMemoryEstimateRepository {
    store: Arc<RwLock<EstimateStore>>,
}

impl InMemoryEstimateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: EstimateStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }
}

#[async_trait]
impl EstimateRepository for InMemoryEstimateRepository {
    async fn create_estimate(
        &self,
        form: EstimateFormData,
    ) -> Result<Estimate, RepositoryError> {
        Ok(self.store.write().await.create(form)?)
    }

    async fn get_estimate(
        &self,
        id: Uuid,
    ) -> Result<Estimate, RepositoryError> {
        self.store
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn update_estimate(
        &self,
        id: Uuid,
        form: EstimateFormData,
    ) -> Result<Estimate, RepositoryError> {
        Ok(self.store.write().await.update(id, form)?)
    }

    async fn delete_estimate(
        &self,
        id: Uuid,
    ) -> Result<bool, RepositoryError> {
        Ok(self.store.write().await.delete(id))
    }

    async fn duplicate_estimate(
        &self,
        id: Uuid,
    ) -> Result<Estimate, RepositoryError> {
        Ok(self.store.write().await.duplicate(id)?)
    }

    async fn list_estimates(&self) -> Result<Vec<Estimate>, RepositoryError> {
        Ok(self.store.read().await.list().to_vec())
    }

    async fn search_estimates(
        &self,
        query: &str,
    ) -> Result<Vec<Estimate>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .find_by_project_name(query)
            .into_iter()
            .cloned()
            .collect())
    }
}

/// [`RepositoryFactory`] for the `"memory"` backend. Each `create` call
/// returns an empty, independent repository.
pub struct MemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn EstimateRepository>, RepositoryError> {
        Ok(Box::new(InMemoryEstimateRepository::new()))
    }
}
