//! SeaORM implementation of ServiceRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::calendar::WeekdaySet;
use crate::domain::catalog::{Service, ServiceRepository};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::service;

pub struct SeaOrmServiceRepository {
    db: DatabaseConnection,
}

impl SeaOrmServiceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: service::Model) -> DomainResult<Service> {
    Ok(Service {
        id: m.id,
        name: m.name,
        duration_minutes: m.duration_minutes,
        enabled: m.enabled,
        offered_weekdays: WeekdaySet::from_csv(&m.offered_weekdays)?,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn models_to_domain(models: Vec<service::Model>) -> DomainResult<Vec<Service>> {
    models.into_iter().map(model_to_domain).collect()
}

// ── ServiceRepository impl ──────────────────────────────────────

#[async_trait]
impl ServiceRepository for SeaOrmServiceRepository {
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Service>> {
        service::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<Service>> {
        let models = service::Entity::find()
            .order_by_asc(service::Column::Id)
            .all(&self.db)
            .await?;
        models_to_domain(models)
    }

    async fn find_by_ids(&self, ids: &[i32]) -> DomainResult<Vec<Service>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = service::Entity::find()
            .filter(service::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(service::Column::Id)
            .all(&self.db)
            .await?;
        models_to_domain(models)
    }

    async fn save(&self, s: Service) -> DomainResult<Service> {
        debug!("Saving service: {}", s.name);

        let model = service::ActiveModel {
            id: NotSet,
            name: Set(s.name),
            duration_minutes: Set(s.duration_minutes),
            enabled: Set(s.enabled),
            offered_weekdays: Set(s.offered_weekdays.to_csv()),
            created_at: Set(s.created_at),
            updated_at: Set(s.updated_at),
        };
        let inserted = model.insert(&self.db).await?;
        model_to_domain(inserted)
    }

    async fn update(&self, s: Service) -> DomainResult<()> {
        debug!("Updating service: {}", s.id);

        let existing = service::Entity::find_by_id(s.id).one(&self.db).await?;
        let Some(existing) = existing else {
            return Err(DomainError::NotFound {
                entity: "Service",
                field: "id",
                value: s.id.to_string(),
            });
        };

        let mut active: service::ActiveModel = existing.into();
        active.name = Set(s.name);
        active.duration_minutes = Set(s.duration_minutes);
        active.enabled = Set(s.enabled);
        active.offered_weekdays = Set(s.offered_weekdays.to_csv());
        active.updated_at = Set(s.updated_at);
        active.update(&self.db).await?;
        Ok(())
    }
}
