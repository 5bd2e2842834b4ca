use hims_core::AdmissionType;
use time::Date;
use uuid::Uuid;

use crate::error::AdmissionError;

/// Input to [`AdmissionService::create_admission`](crate::AdmissionService::create_admission).
#[derive(Debug, Clone)]
pub struct CreateAdmission {
    pub patient_id: Uuid,
    /// Attending physician.
    pub physician_id: Uuid,
    /// Registrar recording the admission.
    pub registered_by: Uuid,
    pub admission_type: AdmissionType,
    pub reason: String,
    pub entry_diagnosis: String,
    pub bed_id: Option<Uuid>,
    pub expected_discharge: Option<Date>,
    pub remarks: Option<String>,
}

impl CreateAdmission {
    /// Field checks that need no store access.
    pub(crate) fn validate(&self, today: Date) -> Result<(), AdmissionError> {
        if self.reason.trim().is_empty() {
            return Err(AdmissionError::validation("reason must not be blank"));
        }
        if self.entry_diagnosis.trim().is_empty() {
            return Err(AdmissionError::validation(
                "entry diagnosis must not be blank",
            ));
        }
        if let Some(expected) = self.expected_discharge
            && expected < today
        {
            return Err(AdmissionError::validation(format!(
                "expected discharge {expected} is in the past"
            )));
        }
        Ok(())
    }
}
