//! Create appointment_services table

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_services::Services;
use super::m20240101_000003_create_appointments::Appointments;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppointmentServices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppointmentServices::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AppointmentServices::AppointmentId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppointmentServices::ServiceId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AppointmentServices::DurationMinutes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_services_appointment")
                            .from(AppointmentServices::Table, AppointmentServices::AppointmentId)
                            .to(Appointments::Table, Appointments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_services_service")
                            .from(AppointmentServices::Table, AppointmentServices::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appointment_services_appointment")
                    .table(AppointmentServices::Table)
                    .col(AppointmentServices::AppointmentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppointmentServices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AppointmentServices {
    Table,
    Id,
    AppointmentId,
    ServiceId,
    DurationMinutes,
}
