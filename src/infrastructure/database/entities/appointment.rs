//! Appointment header entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub client_id: i32,
    pub start_at: DateTimeUtc,
    pub end_at: DateTimeUtc,
    pub duration_minutes: i32,

    /// Business-local calendar date of `start_at`, `YYYY-MM-DD`
    pub day: String,

    /// pending, confirmed, completed, cancelled
    pub status: String,

    pub notes: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::appointment_service::Entity")]
    AppointmentServices,
}

impl Related<super::appointment_service::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AppointmentServices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
