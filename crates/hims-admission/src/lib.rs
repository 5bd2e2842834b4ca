//! # hims-admission
//!
//! The admission and bed assignment workflow.
//!
//! [`AdmissionService`] orchestrates three operations across the patient,
//! staff and bed stores of a `HospitalStorage` backend:
//!
//! - [`AdmissionService::create_admission`]: opens an admission, claims an
//!   optional bed and marks the patient admitted.
//! - [`AdmissionService::assign_bed`]: moves an ongoing admission to another
//!   bed.
//! - [`AdmissionService::close_admission`]: discharges the admission and
//!   releases its bed.
//!
//! ```ignore
//! use hims_admission::{AdmissionService, CreateAdmission};
//!
//! let service = AdmissionService::new(storage);
//! let admission = service.create_admission(request).await?;
//! service.assign_bed(admission.id, bed_id).await?;
//! service.close_admission(admission.id).await?;
//! ```

mod clock;
mod error;
mod request;
mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AdmissionError, ErrorCategory};
pub use request::CreateAdmission;
pub use service::{AdmissionResult, AdmissionService};
