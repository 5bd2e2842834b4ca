use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::macros::string_enum;
use crate::time::iso_date;

string_enum! {
    /// Where the patient currently stands with respect to hospitalisation.
    ///
    /// Only the admission workflow moves a patient out of `Ambulatory`.
    #[derive(Default)]
    pub enum PatientStatus: "patient status" {
        #[default]
        Ambulatory => "ambulatory",
        Admitted => "admitted",
        Discharged => "discharged",
    }
}

string_enum! {
    pub enum Sex: "sex" {
        Female => "female",
        Male => "male",
        Other => "other",
        Unknown => "unknown",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub medical_record_number: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "iso_date")]
    pub date_of_birth: Date,
    pub sex: Sex,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
    pub status: PatientStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration data for a new patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    /// Generated on registration when absent.
    #[serde(default)]
    pub medical_record_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(with = "iso_date")]
    pub date_of_birth: Date,
    pub sex: Sex,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub medical_history: Option<String>,
}

const BLOOD_GROUPS: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

impl NewPatient {
    /// Field-level checks applied before a patient record is persisted.
    pub fn validate(&self, today: Date) -> Result<()> {
        if self.first_name.trim().is_empty() {
            return Err(CoreError::invalid_field("first_name", "must not be blank"));
        }
        if self.last_name.trim().is_empty() {
            return Err(CoreError::invalid_field("last_name", "must not be blank"));
        }
        if self.date_of_birth > today {
            return Err(CoreError::invalid_field(
                "date_of_birth",
                "must not be in the future",
            ));
        }
        if let Some(ref group) = self.blood_group
            && !BLOOD_GROUPS.contains(&group.as_str())
        {
            return Err(CoreError::invalid_field(
                "blood_group",
                format!("'{group}' is not one of {BLOOD_GROUPS:?}"),
            ));
        }
        if let Some(ref mrn) = self.medical_record_number
            && mrn.trim().is_empty()
        {
            return Err(CoreError::invalid_field(
                "medical_record_number",
                "must not be blank when provided",
            ));
        }
        Ok(())
    }

    /// Builds the stored record, generating the medical record number if needed.
    pub fn into_patient(self, id: Uuid, now: OffsetDateTime) -> Patient {
        Patient {
            id,
            medical_record_number: self
                .medical_record_number
                .unwrap_or_else(generate_medical_record_number),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            date_of_birth: self.date_of_birth,
            sex: self.sex,
            phone: self.phone,
            address: self.address,
            blood_group: self.blood_group,
            allergies: self.allergies,
            medical_history: self.medical_history,
            status: PatientStatus::Ambulatory,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Generates a medical record number of the form `MRN-1A2B3C4D`.
pub fn generate_medical_record_number() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("MRN-{}", simple[..8].to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use time::macros::{date, datetime};

    fn registration() -> NewPatient {
        NewPatient {
            medical_record_number: None,
            first_name: " Amina ".into(),
            last_name: "Diallo".into(),
            date_of_birth: date!(1990 - 04 - 12),
            sex: Sex::Female,
            phone: None,
            address: None,
            blood_group: Some("O+".into()),
            allergies: None,
            medical_history: None,
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PatientStatus::default(), PatientStatus::Ambulatory);
        assert_eq!(PatientStatus::Admitted.as_str(), "admitted");
        assert_eq!(
            PatientStatus::from_str("discharged").unwrap(),
            PatientStatus::Discharged
        );
        assert!(PatientStatus::from_str("dead").is_err());
        assert_eq!(
            serde_json::to_value(PatientStatus::Ambulatory).unwrap(),
            "ambulatory"
        );
    }

    #[test]
    fn test_validate_accepts_registration() {
        assert!(registration().validate(date!(2026 - 01 - 01)).is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_and_future() {
        let mut p = registration();
        p.first_name = "   ".into();
        assert!(p.validate(date!(2026 - 01 - 01)).is_err());

        let mut p = registration();
        p.date_of_birth = date!(2027 - 01 - 01);
        let err = p.validate(date!(2026 - 01 - 01)).unwrap_err();
        assert!(err.to_string().contains("date_of_birth"));

        let mut p = registration();
        p.blood_group = Some("C+".into());
        assert!(p.validate(date!(2026 - 01 - 01)).is_err());
    }

    #[test]
    fn test_into_patient_generates_mrn_and_trims() {
        let now = datetime!(2026-01-01 08:00 UTC);
        let patient = registration().into_patient(Uuid::new_v4(), now);
        assert!(patient.medical_record_number.starts_with("MRN-"));
        assert_eq!(patient.medical_record_number.len(), 12);
        assert_eq!(patient.first_name, "Amina");
        assert_eq!(patient.status, PatientStatus::Ambulatory);
        assert_eq!(patient.full_name(), "Amina Diallo");
    }
}
