//! Business calendar entity (single row, id = 1)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "business_calendar")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub opening_time: Time,
    pub closing_time: Time,

    /// Comma separated lowercase English weekday names, Monday first
    pub open_weekdays: String,

    pub step_minutes: i32,

    /// IANA timezone name
    pub timezone: String,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
