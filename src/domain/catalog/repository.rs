//! Service catalog repository interface

use async_trait::async_trait;

use super::model::Service;
use crate::domain::{DomainError, DomainResult};

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Service>>;

    /// All services, ordered by id
    async fn find_all(&self) -> DomainResult<Vec<Service>>;

    /// Services matching `ids`; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Service>>;

    /// Insert a new service, assigning its id
    async fn save(&self, service: Service) -> DomainResult<Service>;

    async fn update(&self, service: Service) -> DomainResult<()>;

    /// Resolve every id, in request order. Fails with `NotFound` naming the
    /// first id that does not exist.
    async fn get_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Service>> {
        let found = self.find_by_ids(ids).await?;
        ids.iter()
            .map(|id| {
                found
                    .iter()
                    .find(|s| s.id == *id)
                    .cloned()
                    .ok_or_else(|| DomainError::NotFound {
                        entity: "Service",
                        field: "id",
                        value: id.to_string(),
                    })
            })
            .collect()
    }
}
