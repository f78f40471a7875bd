//! SeaORM implementation of CalendarConfigRepository

use async_trait::async_trait;
use chrono::Utc;
use chrono_tz::Tz;
use log::debug;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::domain::calendar::{BusinessCalendar, CalendarConfigRepository, WeekdaySet};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::business_calendar;

/// The calendar lives in a single row.
const CALENDAR_ROW_ID: i32 = 1;

pub struct SeaOrmCalendarRepository {
    db: DatabaseConnection,
}

impl SeaOrmCalendarRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: business_calendar::Model) -> DomainResult<BusinessCalendar> {
    let timezone: Tz = m.timezone.parse().map_err(|_| {
        DomainError::Configuration(format!("unknown business timezone '{}'", m.timezone))
    })?;
    Ok(BusinessCalendar {
        opening_time: m.opening_time,
        closing_time: m.closing_time,
        open_weekdays: WeekdaySet::from_csv(&m.open_weekdays)?,
        step_minutes: m.step_minutes,
        timezone,
    })
}

#[async_trait]
impl CalendarConfigRepository for SeaOrmCalendarRepository {
    async fn find(&self) -> DomainResult<Option<BusinessCalendar>> {
        business_calendar::Entity::find_by_id(CALENDAR_ROW_ID)
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn save(&self, calendar: BusinessCalendar) -> DomainResult<()> {
        calendar.validate()?;
        debug!(
            "Saving business calendar: {}-{} {}",
            calendar.opening_time, calendar.closing_time, calendar.open_weekdays
        );

        let model = business_calendar::ActiveModel {
            id: Set(CALENDAR_ROW_ID),
            opening_time: Set(calendar.opening_time),
            closing_time: Set(calendar.closing_time),
            open_weekdays: Set(calendar.open_weekdays.to_csv()),
            step_minutes: Set(calendar.step_minutes),
            timezone: Set(calendar.timezone.name().to_string()),
            updated_at: Set(Utc::now()),
        };

        business_calendar::Entity::insert(model)
            .on_conflict(
                OnConflict::column(business_calendar::Column::Id)
                    .update_columns([
                        business_calendar::Column::OpeningTime,
                        business_calendar::Column::ClosingTime,
                        business_calendar::Column::OpenWeekdays,
                        business_calendar::Column::StepMinutes,
                        business_calendar::Column::Timezone,
                        business_calendar::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}
