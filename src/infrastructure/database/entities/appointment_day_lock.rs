//! Per-date lock row
//!
//! Booking writes upsert the row of their date first thing in the
//! transaction, which serializes writers of the same date.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appointment_day_locks")]
pub struct Model {
    /// `YYYY-MM-DD`
    #[sea_orm(primary_key, auto_increment = false)]
    pub day: String,

    pub locked_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
