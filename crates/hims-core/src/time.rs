//! Time helpers shared by the domain types.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::{CoreError, Result};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> Result<Date> {
    Date::parse(s, DATE_FORMAT)
        .map_err(|e| CoreError::invalid_date(format!("Failed to parse date '{s}': {e}")))
}

pub fn format_date(date: Date) -> String {
    // Formatting a Date with a year/month/day description cannot fail
    date.format(DATE_FORMAT).unwrap_or_default()
}

/// Serde adapter for `Date` as `YYYY-MM-DD`.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Date;

        pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(d) => serializer.serialize_some(&super::super::format_date(*d)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = Option::<String>::deserialize(deserializer)?;
            s.map(|s| super::super::parse_date(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    #[test]
    fn test_parse_and_format_date() {
        let date = parse_date("2026-03-09").unwrap();
        assert_eq!(date.year(), 2026);
        assert_eq!(date.month(), Month::March);
        assert_eq!(date.day(), 9);
        assert_eq!(format_date(date), "2026-03-09");
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        let err = parse_date("09/03/2026").unwrap_err();
        assert!(err.to_string().contains("09/03/2026"));
    }

    #[test]
    fn test_iso_date_serde() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Holder {
            #[serde(with = "iso_date")]
            day: Date,
            #[serde(with = "iso_date::option", default)]
            maybe: Option<Date>,
        }

        let holder: Holder = serde_json::from_str(r#"{"day":"2025-12-31","maybe":null}"#).unwrap();
        assert_eq!(holder.day.year(), 2025);
        assert!(holder.maybe.is_none());

        let json = serde_json::to_value(&holder).unwrap();
        assert_eq!(json["day"], "2025-12-31");
        assert!(json["maybe"].is_null());
    }
}
