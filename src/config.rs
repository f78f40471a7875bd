//! Configuration module
//!
//! `AppConfig` is read from a TOML file. Every section and field has a
//! default, so a missing file or a partial file both work. `DATABASE_URL`
//! overrides `database.url`.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! url = "sqlite://./salon.db?mode=rwc"
//!
//! [logging]
//! level = "info"
//! json = false
//!
//! [business]
//! timezone = "America/Argentina/Buenos_Aires"
//! opening_time = "09:00"
//! closing_time = "18:00"
//! open_weekdays = ["lunes", "martes", "miércoles", "jueves", "viernes"]
//! step_minutes = 30
//!
//! [booking]
//! retry_attempts = 3
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{BusinessCalendar, WeekdaySet};
use crate::infrastructure::DatabaseConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid [business] section: {0}")]
    Business(String),
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub logging: LoggingConfig,
    pub business: BusinessConfig,
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
    /// Keep everything in process memory instead of opening `url`
    pub in_memory: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_connections: db.max_connections,
            in_memory: false,
        }
    }
}

impl DatabaseSection {
    pub fn connection(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Business calendar used to seed an empty store. The calendar is only
/// seeded when every hour field is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessConfig {
    pub timezone: String,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub open_weekdays: Vec<String>,
    pub step_minutes: i32,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            opening_time: None,
            closing_time: None,
            open_weekdays: Vec::new(),
            step_minutes: 30,
        }
    }
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| ConfigError::Business(format!("{} '{}' is not HH:MM", field, value)))
}

impl BusinessConfig {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse()
            .map_err(|_| ConfigError::Business(format!("unknown timezone '{}'", self.timezone)))
    }

    /// Calendar described by this section, if it describes one.
    pub fn seed_calendar(&self) -> Result<Option<BusinessCalendar>, ConfigError> {
        let (Some(opening), Some(closing)) = (&self.opening_time, &self.closing_time) else {
            return Ok(None);
        };

        let open_weekdays = WeekdaySet::from_names(&self.open_weekdays)
            .map_err(|e| ConfigError::Business(e.to_string()))?;
        let calendar = BusinessCalendar {
            opening_time: parse_time("opening_time", opening)?,
            closing_time: parse_time("closing_time", closing)?,
            open_weekdays,
            step_minutes: self.step_minutes,
            timezone: self.timezone()?,
        };
        calendar
            .validate()
            .map_err(|e| ConfigError::Business(e.to_string()))?;
        Ok(Some(calendar))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Attempts for a booking write that hits a locked database
    pub retry_attempts: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self { retry_attempts: 3 }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// `<user config dir>/salon-booking/config.toml`, or `./config.toml` when
/// the platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("salon-booking").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.address(), "0.0.0.0:8080");
        assert_eq!(config.booking.retry_attempts, 3);
        assert!(config.business.seed_calendar().unwrap().is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [server]
            port = 9090

            [logging]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn business_section_builds_seed_calendar() {
        let config = AppConfig::from_toml(
            r#"
            [business]
            timezone = "America/Argentina/Buenos_Aires"
            opening_time = "10:00"
            closing_time = "19:30"
            open_weekdays = ["martes", "sábado"]
            step_minutes = 15
            "#,
        )
        .unwrap();

        let calendar = config.business.seed_calendar().unwrap().unwrap();
        assert_eq!(calendar.step_minutes, 15);
        assert!(calendar.open_weekdays.contains(Weekday::Sat));
        assert!(!calendar.open_weekdays.contains(Weekday::Mon));
        assert_eq!(calendar.closing_time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    }

    #[test]
    fn inverted_business_hours_are_rejected() {
        let config = AppConfig::from_toml(
            r#"
            [business]
            opening_time = "19:00"
            closing_time = "10:00"
            open_weekdays = ["monday"]
            "#,
        )
        .unwrap();
        assert!(matches!(config.business.seed_calendar(), Err(ConfigError::Business(_))));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let config = AppConfig::from_toml("[business]\ntimezone = \"Nowhere/Land\"").unwrap();
        assert!(config.business.timezone().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("salon-booking-does-not-exist.toml");
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn default_path_points_at_config_toml() {
        assert_eq!(default_config_path().file_name().and_then(|n| n.to_str()), Some("config.toml"));
    }
}
