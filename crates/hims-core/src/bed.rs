use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::macros::string_enum;

string_enum! {
    /// Availability of a bed.
    ///
    /// `Available` and `Occupied` are driven by the admission workflow;
    /// `Maintenance` and `Reserved` are set by ward management.
    pub enum BedStatus: "bed status" {
        Available => "available",
        Occupied => "occupied",
        Maintenance => "maintenance",
        Reserved => "reserved",
    }
}

impl BedStatus {
    /// Statuses ward management may set directly.
    pub fn is_administrative(&self) -> bool {
        !matches!(self, BedStatus::Occupied)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bed {
    pub id: Uuid,
    /// Human label, unique within the hospital (e.g. `C-204-B`).
    pub number: String,
    pub floor: i32,
    pub room: String,
    /// Service or ward the bed belongs to.
    pub service: String,
    pub status: BedStatus,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Bed {
    pub fn is_available(&self) -> bool {
        self.active && self.status == BedStatus::Available
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBed {
    pub number: String,
    pub floor: i32,
    pub room: String,
    pub service: String,
}

impl NewBed {
    pub fn validate(&self) -> Result<()> {
        if self.number.trim().is_empty() {
            return Err(CoreError::invalid_field("number", "must not be blank"));
        }
        if self.room.trim().is_empty() {
            return Err(CoreError::invalid_field("room", "must not be blank"));
        }
        if self.service.trim().is_empty() {
            return Err(CoreError::invalid_field("service", "must not be blank"));
        }
        if !(-5..=200).contains(&self.floor) {
            return Err(CoreError::invalid_field("floor", "out of range"));
        }
        Ok(())
    }

    pub fn into_bed(self, id: Uuid, now: OffsetDateTime) -> Bed {
        Bed {
            id,
            number: self.number.trim().to_string(),
            floor: self.floor,
            room: self.room.trim().to_string(),
            service: self.service.trim().to_string(),
            status: BedStatus::Available,
            active: true,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn new_bed() -> NewBed {
        NewBed {
            number: "C-204-B".into(),
            floor: 2,
            room: "204".into(),
            service: "cardiology".into(),
        }
    }

    #[test]
    fn test_new_bed_starts_available() {
        let bed = new_bed().into_bed(Uuid::new_v4(), datetime!(2026-01-01 00:00 UTC));
        assert_eq!(bed.status, BedStatus::Available);
        assert!(bed.is_available());
    }

    #[test]
    fn test_inactive_bed_is_not_available() {
        let mut bed = new_bed().into_bed(Uuid::new_v4(), datetime!(2026-01-01 00:00 UTC));
        bed.active = false;
        assert!(!bed.is_available());
    }

    #[test]
    fn test_administrative_statuses() {
        assert!(BedStatus::Maintenance.is_administrative());
        assert!(BedStatus::Available.is_administrative());
        assert!(!BedStatus::Occupied.is_administrative());
    }

    #[test]
    fn test_validate() {
        assert!(new_bed().validate().is_ok());
        let mut bed = new_bed();
        bed.service = "".into();
        assert!(bed.validate().is_err());
    }
}
