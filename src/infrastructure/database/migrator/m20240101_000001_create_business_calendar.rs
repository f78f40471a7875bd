//! Create business_calendar table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BusinessCalendar::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BusinessCalendar::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BusinessCalendar::OpeningTime).time().not_null())
                    .col(ColumnDef::new(BusinessCalendar::ClosingTime).time().not_null())
                    .col(
                        ColumnDef::new(BusinessCalendar::OpenWeekdays)
                            .string()
                            .not_null()
                            .default("monday,tuesday,wednesday,thursday,friday"),
                    )
                    .col(
                        ColumnDef::new(BusinessCalendar::StepMinutes)
                            .integer()
                            .not_null()
                            .default(30),
                    )
                    .col(
                        ColumnDef::new(BusinessCalendar::Timezone)
                            .string()
                            .not_null()
                            .default("UTC"),
                    )
                    .col(
                        ColumnDef::new(BusinessCalendar::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BusinessCalendar::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum BusinessCalendar {
    Table,
    Id,
    OpeningTime,
    ClosingTime,
    OpenWeekdays,
    StepMinutes,
    Timezone,
    UpdatedAt,
}
