use anyhow::{Context, Result};
use colored::Colorize;
use hims_core::time::format_date;

use crate::cli::{AdmissionsArgs, AdmitArgs, AssignBedArgs, DischargeArgs, OutputFormat};
use crate::client::{AdmitRequest, HimsClient};
use crate::output::{print_admission, print_admissions, print_success};

pub async fn list(client: &HimsClient, args: &AdmissionsArgs, format: OutputFormat) -> Result<()> {
    let admissions = match args.patient {
        Some(patient) => client.patient_admissions(patient).await?,
        None => client.ongoing_admissions().await?,
    };
    print_admissions(&admissions, format)
}

pub async fn admit(client: &HimsClient, args: &AdmitArgs, format: OutputFormat) -> Result<()> {
    let expected_discharge = args
        .expected_discharge
        .as_deref()
        .map(|d| {
            hims_core::parse_date(d)
                .map(format_date)
                .with_context(|| format!("Invalid --expected-discharge: {d}"))
        })
        .transpose()?;

    let admission = client
        .admit(&AdmitRequest {
            patient_id: args.patient,
            physician_id: args.physician,
            admission_type: args.admission_type,
            reason: args.reason.clone(),
            entry_diagnosis: args.diagnosis.clone(),
            bed_id: args.bed,
            expected_discharge,
            remarks: args.remarks.clone(),
        })
        .await?;
    print_success(&format!(
        "Admitted as {}",
        admission.admission_number.to_string().cyan()
    ));
    print_admission(&admission, format)
}

pub async fn assign_bed(client: &HimsClient, args: &AssignBedArgs, format: OutputFormat) -> Result<()> {
    let admission = client.assign_bed(args.admission, args.bed).await?;
    print_success(&format!(
        "Admission {} moved to bed {}",
        admission.admission_number.to_string().cyan(),
        args.bed.to_string().cyan()
    ));
    print_admission(&admission, format)
}

pub async fn discharge(client: &HimsClient, args: &DischargeArgs, format: OutputFormat) -> Result<()> {
    let admission = client.discharge(args.admission).await?;
    print_success(&format!(
        "Admission {} closed",
        admission.admission_number.to_string().cyan()
    ));
    print_admission(&admission, format)
}
