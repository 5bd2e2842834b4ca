use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::macros::string_enum;
use crate::time::iso_date;

string_enum! {
    pub enum AdmissionType: "admission type" {
        Emergency => "emergency",
        Scheduled => "scheduled",
        Transfer => "transfer",
    }
}

string_enum! {
    /// Lifecycle of an admission episode. `Discharged` is terminal.
    pub enum AdmissionStatus: "admission status" {
        Ongoing => "ongoing",
        Discharged => "discharged",
    }
}

/// Width of the zero-padded per-year sequence.
pub const SEQUENCE_WIDTH: usize = 4;
const MAX_SEQUENCE: u32 = 9_999;

/// Human-readable admission number: `<YEAR><4-digit sequence>`, e.g. `20260042`.
///
/// The sequence restarts at `0001` every calendar year.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AdmissionNumber {
    year: i32,
    sequence: u32,
}

impl AdmissionNumber {
    pub fn new(year: i32, sequence: u32) -> Result<Self> {
        if !(1000..=9999).contains(&year) {
            return Err(CoreError::invalid_admission_number(format!(
                "year {year} is not four digits"
            )));
        }
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(CoreError::invalid_admission_number(format!(
                "sequence {sequence} out of range"
            )));
        }
        Ok(Self { year, sequence })
    }

    pub fn first_of_year(year: i32) -> Result<Self> {
        Self::new(year, 1)
    }

    /// Next number for `year`, given the highest number already issued.
    ///
    /// A `highest` from an earlier year restarts the sequence.
    pub fn next(year: i32, highest: Option<&AdmissionNumber>) -> Result<Self> {
        match highest {
            Some(last) if last.year == year => {
                if last.sequence >= MAX_SEQUENCE {
                    return Err(CoreError::SequenceExhausted { year });
                }
                Self::new(year, last.sequence + 1)
            }
            _ => Self::first_of_year(year),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The `LIKE` prefix matching every number issued in `year`.
    pub fn year_prefix(year: i32) -> String {
        format!("{year}")
    }
}

impl fmt::Display for AdmissionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            self.year,
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

impl FromStr for AdmissionNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != 4 + SEQUENCE_WIDTH || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::invalid_admission_number(s));
        }
        let year: i32 = s[..4]
            .parse()
            .map_err(|_| CoreError::invalid_admission_number(s))?;
        let sequence: u32 = s[4..]
            .parse()
            .map_err(|_| CoreError::invalid_admission_number(s))?;
        Self::new(year, sequence)
    }
}

impl TryFrom<String> for AdmissionNumber {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AdmissionNumber> for String {
    fn from(value: AdmissionNumber) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    pub id: Uuid,
    pub admission_number: AdmissionNumber,
    pub patient_id: Uuid,
    /// Attending physician.
    pub physician_id: Uuid,
    /// Registrar who recorded the admission.
    pub registered_by: Uuid,
    /// Current bed while ongoing; kept after discharge as the last bed held.
    pub bed_id: Option<Uuid>,
    pub admission_type: AdmissionType,
    pub reason: String,
    pub entry_diagnosis: String,
    pub status: AdmissionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub admitted_at: OffsetDateTime,
    #[serde(with = "iso_date::option", default)]
    pub expected_discharge: Option<Date>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub discharged_at: Option<OffsetDateTime>,
}

impl Admission {
    pub fn is_ongoing(&self) -> bool {
        self.status == AdmissionStatus::Ongoing
    }
}

/// Row data for inserting a freshly validated admission.
#[derive(Debug, Clone)]
pub struct NewAdmission {
    pub id: Uuid,
    pub admission_number: AdmissionNumber,
    pub patient_id: Uuid,
    pub physician_id: Uuid,
    pub registered_by: Uuid,
    pub bed_id: Option<Uuid>,
    pub admission_type: AdmissionType,
    pub reason: String,
    pub entry_diagnosis: String,
    pub admitted_at: OffsetDateTime,
    pub expected_discharge: Option<Date>,
    pub remarks: Option<String>,
}

impl NewAdmission {
    pub fn into_admission(self) -> Admission {
        Admission {
            id: self.id,
            admission_number: self.admission_number,
            patient_id: self.patient_id,
            physician_id: self.physician_id,
            registered_by: self.registered_by,
            bed_id: self.bed_id,
            admission_type: self.admission_type,
            reason: self.reason,
            entry_diagnosis: self.entry_diagnosis,
            status: AdmissionStatus::Ongoing,
            admitted_at: self.admitted_at,
            expected_discharge: self.expected_discharge,
            remarks: self.remarks,
            discharged_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_is_zero_padded() {
        let n = AdmissionNumber::new(2026, 7).unwrap();
        assert_eq!(n.to_string(), "20260007");
        assert_eq!(n.to_string().len(), 8);
    }

    #[test]
    fn test_parse() {
        let n: AdmissionNumber = "20251234".parse().unwrap();
        assert_eq!(n.year(), 2025);
        assert_eq!(n.sequence(), 1234);

        assert!("2025123".parse::<AdmissionNumber>().is_err());
        assert!("2025A234".parse::<AdmissionNumber>().is_err());
        assert!("20250000".parse::<AdmissionNumber>().is_err());
    }

    #[test]
    fn test_next_increments_within_year() {
        let first = AdmissionNumber::next(2026, None).unwrap();
        assert_eq!(first.to_string(), "20260001");

        let mut previous = first;
        for _ in 0..25 {
            let next = AdmissionNumber::next(2026, Some(&previous)).unwrap();
            assert!(next > previous);
            assert!(next.to_string() > previous.to_string());
            previous = next;
        }
        assert_eq!(previous.to_string(), "20260026");
    }

    #[test]
    fn test_next_resets_on_new_year() {
        let last_of_2025: AdmissionNumber = "20250873".parse().unwrap();
        let next = AdmissionNumber::next(2026, Some(&last_of_2025)).unwrap();
        assert_eq!(next.to_string(), "20260001");
    }

    #[test]
    fn test_next_exhausted() {
        let last: AdmissionNumber = "20269999".parse().unwrap();
        let err = AdmissionNumber::next(2026, Some(&last)).unwrap_err();
        assert!(matches!(err, CoreError::SequenceExhausted { year: 2026 }));
    }

    #[test]
    fn test_serde_as_string() {
        let n = AdmissionNumber::new(2026, 42).unwrap();
        assert_eq!(serde_json::to_value(&n).unwrap(), "20260042");
        let back: AdmissionNumber = serde_json::from_str("\"20260042\"").unwrap();
        assert_eq!(back, n);
        assert!(serde_json::from_str::<AdmissionNumber>("\"bogus\"").is_err());
    }

    #[test]
    fn test_year_prefix() {
        assert_eq!(AdmissionNumber::year_prefix(2026), "2026");
    }
}
