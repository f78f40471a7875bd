use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    /// The business calendar has not been configured yet.
    #[error("Configuration: {0}")]
    Configuration(String),

    /// Raised by the store when a blocking appointment already occupies
    /// part of the requested range.
    #[error("Overlaps appointment {appointment_id} ({start} - {end})")]
    Overlap {
        appointment_id: i32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Stock: {0}")]
    Stock(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl DomainError {
    pub fn calendar_missing() -> Self {
        DomainError::Configuration("business calendar is not configured".to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "not_found",
            DomainError::Validation(_) => "validation",
            DomainError::Configuration(_) => "configuration",
            DomainError::Overlap { .. } => "overlap",
            DomainError::Stock(_) => "stock",
            DomainError::Database(_) => "database",
        }
    }

    /// The request was refused on its merits; the service itself is fine.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            DomainError::Validation(_) | DomainError::NotFound { .. } | DomainError::Overlap { .. }
        )
    }

    /// Whether this error is likely transient (e.g. SQLite writer lock held
    /// by another connection) and the operation may succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            DomainError::Database(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("database is locked")
                    || msg.contains("busy")
                    || msg.contains("could not serialize")
                    || msg.contains("deadlock")
            }
            _ => false,
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_database_is_transient() {
        let err = DomainError::Database("error returned from database: database is locked".into());
        assert!(err.is_transient());
    }

    #[test]
    fn validation_is_not_transient() {
        assert!(!DomainError::validation("closed on sunday").is_transient());
        assert!(!DomainError::calendar_missing().is_transient());
    }

    #[test]
    fn overlap_is_a_rejection_but_configuration_is_not() {
        let overlap = DomainError::Overlap {
            appointment_id: 1,
            start: Utc::now(),
            end: Utc::now(),
        };
        assert!(overlap.is_rejection());
        assert_eq!(overlap.kind(), "overlap");

        let missing = DomainError::calendar_missing();
        assert!(!missing.is_rejection());
        assert_eq!(missing.kind(), "configuration");
        assert!(!DomainError::Database("disk full".into()).is_rejection());
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = DomainError::NotFound {
            entity: "Service",
            field: "id",
            value: "7".into(),
        };
        assert_eq!(err.to_string(), "Not found: Service with id=7");
    }
}
