mod macros;

pub mod admission;
pub mod bed;
pub mod error;
pub mod patient;
pub mod staff;
pub mod time;

pub use admission::{Admission, AdmissionNumber, AdmissionStatus, AdmissionType, NewAdmission};
pub use bed::{Bed, BedStatus, NewBed};
pub use error::{CoreError, ErrorCategory, Result};
pub use patient::{NewPatient, Patient, PatientStatus, Sex, generate_medical_record_number};
pub use staff::{NewStaff, Staff, StaffCredentials, StaffRole};
pub use crate::time::{now_utc, parse_date, today_utc};
