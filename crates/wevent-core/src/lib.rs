//! Core domain model for Wevent: catalog events, filter keys and date parsing.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CRATE_NAME: &str = "wevent-core";

pub const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub category: String,
    pub title: String,
    pub description: String,
    /// Localized date, e.g. `"15 октября 2025"`.
    pub date: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Event {
    pub fn category_key(&self) -> CategoryKey {
        CategoryKey::from_label(&self.category)
    }

    pub fn location_key(&self) -> LocationKey {
        LocationKey::from_label(&self.location)
    }

    pub fn parsed_date(&self) -> Result<NaiveDate, DateParseError> {
        parse_event_date(&self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Conference,
    Exhibition,
    Workshop,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Conference,
        EventType::Exhibition,
        EventType::Workshop,
        EventType::Other,
    ];

    pub fn key(self) -> &'static str {
        match self {
            EventType::Conference => "conference",
            EventType::Exhibition => "exhibition",
            EventType::Workshop => "workshop",
            EventType::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventType::Conference => "Конференция",
            EventType::Exhibition => "Выставка",
            EventType::Workshop => "Мастерская",
            EventType::Other => "Другое",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for EventType {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| KeyParseError {
                kind: "event type",
                value: s.to_string(),
            })
    }
}

/// Result of mapping a raw catalog category. The mapping is total: labels
/// outside the table become `Unmapped` and never satisfy an active type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKey {
    Known(EventType),
    Unmapped,
}

impl CategoryKey {
    pub fn from_label(label: &str) -> Self {
        EventType::ALL
            .into_iter()
            .find(|t| t.label() == label)
            .map_or(CategoryKey::Unmapped, CategoryKey::Known)
    }

    pub fn event_type(self) -> Option<EventType> {
        match self {
            CategoryKey::Known(t) => Some(t),
            CategoryKey::Unmapped => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationKey {
    Tambov,
    Moscow,
    OtherLocation,
}

impl LocationKey {
    pub const ALL: [LocationKey; 3] = [
        LocationKey::Tambov,
        LocationKey::Moscow,
        LocationKey::OtherLocation,
    ];

    pub fn from_label(label: &str) -> Self {
        match label {
            "Тамбов" => LocationKey::Tambov,
            "Москва" => LocationKey::Moscow,
            _ => LocationKey::OtherLocation,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            LocationKey::Tambov => "tambov",
            LocationKey::Moscow => "moscow",
            LocationKey::OtherLocation => "otherLocation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LocationKey::Tambov => "Тамбов",
            LocationKey::Moscow => "Москва",
            LocationKey::OtherLocation => "Другое",
        }
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LocationKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocationKey::ALL
            .into_iter()
            .find(|l| l.key() == s)
            .ok_or_else(|| KeyParseError {
                kind: "location",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} key {value:?}")]
pub struct KeyParseError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("expected \"<day> <month> <year>\", got {raw:?}")]
    Shape { raw: String },
    #[error("day is not a number in {raw:?}")]
    Day { raw: String },
    #[error("unknown month name {month:?} in {raw:?}")]
    UnknownMonth { raw: String, month: String },
    #[error("year is not a number in {raw:?}")]
    Year { raw: String },
    #[error("{raw:?} is not a calendar date")]
    OutOfRange { raw: String },
}

/// Parse `"<day> <genitive-month> <year>"` into a calendar date.
///
/// Day and year are the leading integers of their parts (`"15,"` reads as 15);
/// the month name is matched case-insensitively.
pub fn parse_event_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let parts = raw.split_whitespace().collect::<Vec<_>>();
    let [day, month, year] = parts.as_slice() else {
        return Err(DateParseError::Shape { raw: raw.to_string() });
    };

    let day = leading_int(day).ok_or_else(|| DateParseError::Day { raw: raw.to_string() })?;
    let month_lower = month.to_lowercase();
    let month0 = MONTHS_GENITIVE
        .iter()
        .position(|m| *m == month_lower)
        .ok_or_else(|| DateParseError::UnknownMonth {
            raw: raw.to_string(),
            month: month.to_string(),
        })?;
    let year = leading_int(year).ok_or_else(|| DateParseError::Year { raw: raw.to_string() })?;

    let day = u32::try_from(day).map_err(|_| DateParseError::OutOfRange { raw: raw.to_string() })?;
    NaiveDate::from_ymd_opt(year, month0 as u32 + 1, day)
        .ok_or_else(|| DateParseError::OutOfRange { raw: raw.to_string() })
}

pub fn format_event_date(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!(
        "{} {} {}",
        date.day(),
        MONTHS_GENITIVE[date.month0() as usize],
        date.year()
    )
}

fn leading_int(part: &str) -> Option<i32> {
    let digits = part
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, c)| &part[..idx + c.len_utf8()])?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn event(category: &str, location: &str) -> Event {
        Event {
            category: category.to_string(),
            title: "t".into(),
            description: "d".into(),
            date: "1 января 2025".into(),
            location: location.to_string(),
            image_url: None,
        }
    }

    #[test]
    fn parses_genitive_dates() {
        let d = parse_event_date("15 октября 2025").unwrap();
        assert_eq!((d.year(), d.month0(), d.day()), (2025, 9, 15));

        let d = parse_event_date("1 января 2030").unwrap();
        assert_eq!((d.year(), d.month0(), d.day()), (2030, 0, 1));
    }

    #[test]
    fn month_names_are_case_insensitive() {
        let d = parse_event_date("22 МАЯ 2025").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 5, 22).unwrap());
    }

    #[test]
    fn day_and_year_use_leading_digits() {
        let d = parse_event_date("5, сентября 2025г").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 9, 5).unwrap());
    }

    #[test]
    fn malformed_dates_are_errors() {
        assert!(matches!(
            parse_event_date("15 octobre 2025"),
            Err(DateParseError::UnknownMonth { month, .. }) if month == "octobre"
        ));
        assert!(matches!(parse_event_date("x октября 2025"), Err(DateParseError::Day { .. })));
        assert!(matches!(parse_event_date("15 октября"), Err(DateParseError::Shape { .. })));
        assert!(matches!(parse_event_date("15 октября y"), Err(DateParseError::Year { .. })));
        assert!(matches!(
            parse_event_date("31 февраля 2025"),
            Err(DateParseError::OutOfRange { .. })
        ));
    }

    #[test]
    fn formatted_dates_parse_back() {
        let d = NaiveDate::from_ymd_opt(2026, 2, 12).unwrap();
        assert_eq!(format_event_date(d), "12 февраля 2026");
        assert_eq!(parse_event_date(&format_event_date(d)).unwrap(), d);
    }

    #[test]
    fn category_mapping_is_total() {
        assert_eq!(event("Выставка", "x").category_key(), CategoryKey::Known(EventType::Exhibition));
        assert_eq!(event("Мастерская", "x").category_key(), CategoryKey::Known(EventType::Workshop));
        assert_eq!(event("Хакатон", "x").category_key(), CategoryKey::Unmapped);
        assert_eq!(event("Хакатон", "x").category_key().event_type(), None);
    }

    #[test]
    fn unknown_locations_bucket_into_other() {
        assert_eq!(event("Другое", "Тамбов").location_key(), LocationKey::Tambov);
        assert_eq!(event("Другое", "Москва").location_key(), LocationKey::Moscow);
        assert_eq!(event("Другое", "Казань").location_key(), LocationKey::OtherLocation);
    }

    #[test]
    fn keys_round_trip_through_from_str() {
        assert_eq!("workshop".parse::<EventType>().unwrap(), EventType::Workshop);
        assert_eq!("otherLocation".parse::<LocationKey>().unwrap(), LocationKey::OtherLocation);
        assert!("party".parse::<EventType>().is_err());
    }

    #[test]
    fn event_deserializes_from_catalog_json() {
        let json = r#"{"category":"Конференция","title":"A","description":"B",
            "date":"15 октября 2025","location":"Москва","imageUrl":"cover.png"}"#;
        let e: Event = serde_json::from_str(json).unwrap();
        assert_eq!(e.image_url.as_deref(), Some("cover.png"));
        assert_eq!(e.location_key(), LocationKey::Moscow);
    }
}
