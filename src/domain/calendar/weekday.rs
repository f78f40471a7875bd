//! Canonical weekday vocabulary
//!
//! Staff enter weekday names in whatever spelling their locale uses
//! ("Miércoles", "sabado", "Monday"). Everything is folded to the canonical
//! lowercase English form before it is stored or compared.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Canonical lowercase name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

fn fold_accents(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        other => other,
    }
}

/// Parse a weekday name into its canonical value.
///
/// Accepts English names and abbreviations plus the Spanish names, with or
/// without accents and in any case.
pub fn canonical_weekday(name: &str) -> Option<Weekday> {
    let folded: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(fold_accents)
        .collect();

    let localized = match folded.as_str() {
        "lunes" => Some(Weekday::Mon),
        "martes" => Some(Weekday::Tue),
        "miercoles" => Some(Weekday::Wed),
        "jueves" => Some(Weekday::Thu),
        "viernes" => Some(Weekday::Fri),
        "sabado" => Some(Weekday::Sat),
        "domingo" => Some(Weekday::Sun),
        _ => None,
    };

    localized.or_else(|| folded.parse::<Weekday>().ok())
}

/// A set of weekdays, iterated Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Self(0b111_1111)
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_DAYS.into_iter().filter(move |d| self.contains(*d))
    }

    /// Build a set from free-form names, rejecting anything unrecognised.
    pub fn from_names<I, S>(names: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::empty();
        for name in names {
            let name = name.as_ref();
            if name.trim().is_empty() {
                continue;
            }
            let day = canonical_weekday(name)
                .ok_or_else(|| DomainError::validation(format!("unknown weekday '{}'", name)))?;
            set.insert(day);
        }
        Ok(set)
    }

    /// Parse the comma separated storage form.
    pub fn from_csv(value: &str) -> Result<Self, DomainError> {
        Self::from_names(value.split(','))
    }

    /// Comma separated canonical names, Monday first.
    pub fn to_csv(&self) -> String {
        self.names().join(",")
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(|d| weekday_name(d).to_string()).collect()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
        let mut set = Self::empty();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_csv())
    }
}

impl From<WeekdaySet> for Vec<String> {
    fn from(set: WeekdaySet) -> Self {
        set.names()
    }
}

impl TryFrom<Vec<String>> for WeekdaySet {
    type Error = DomainError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_names(names)
    }
}
