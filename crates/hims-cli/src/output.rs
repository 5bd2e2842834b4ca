use anyhow::Result;
use colored::Colorize;
use hims_core::{Admission, Bed};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_beds(beds: &[Bed], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(beds),
        OutputFormat::Table if beds.is_empty() => {
            println!("No beds found.");
            Ok(())
        }
        OutputFormat::Table => {
            println!("{}", beds_table(beds));
            Ok(())
        }
    }
}

pub fn print_admissions(admissions: &[Admission], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(admissions),
        OutputFormat::Table if admissions.is_empty() => {
            println!("No admissions found.");
            Ok(())
        }
        OutputFormat::Table => {
            println!("{}", admissions_table(admissions));
            Ok(())
        }
    }
}

/// Single admission after a workflow command.
pub fn print_admission(admission: &Admission, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(admission),
        OutputFormat::Table => {
            println!("{}", admissions_table(std::slice::from_ref(admission)));
            Ok(())
        }
    }
}

fn beds_table(beds: &[Bed]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Number", "Service", "Floor", "Room", "Status", "Active"]);
    for bed in beds {
        builder.push_record([
            bed.id.to_string(),
            bed.number.clone(),
            bed.service.clone(),
            bed.floor.to_string(),
            bed.room.clone(),
            bed.status.to_string(),
            if bed.active { "yes" } else { "no" }.to_string(),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

fn admissions_table(admissions: &[Admission]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Number", "ID", "Patient", "Bed", "Type", "Status", "Admitted"]);
    for admission in admissions {
        builder.push_record([
            admission.admission_number.to_string(),
            admission.id.to_string(),
            admission.patient_id.to_string(),
            admission
                .bed_id
                .map(|b| b.to_string())
                .unwrap_or_else(|| "-".into()),
            admission.admission_type.to_string(),
            admission.status.to_string(),
            admission.admitted_at.date().to_string(),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hims_core::{AdmissionNumber, AdmissionStatus, AdmissionType, BedStatus};
    use time::macros::datetime;
    use uuid::Uuid;

    #[test]
    fn test_beds_table() {
        let bed = Bed {
            id: Uuid::new_v4(),
            number: "C-204-B".into(),
            floor: 2,
            room: "204".into(),
            service: "cardiology".into(),
            status: BedStatus::Maintenance,
            active: false,
            created_at: datetime!(2026-03-01 10:00 UTC),
        };
        let table = beds_table(&[bed]);
        assert!(table.contains("C-204-B"));
        assert!(table.contains("maintenance"));
        assert!(table.contains("no"));
    }

    #[test]
    fn test_admissions_table_without_bed() {
        let admission = Admission {
            id: Uuid::new_v4(),
            admission_number: AdmissionNumber::new(2026, 42).unwrap(),
            patient_id: Uuid::new_v4(),
            physician_id: Uuid::new_v4(),
            registered_by: Uuid::new_v4(),
            bed_id: None,
            admission_type: AdmissionType::Scheduled,
            reason: "hip replacement".into(),
            entry_diagnosis: "arthrosis".into(),
            status: AdmissionStatus::Ongoing,
            admitted_at: datetime!(2026-03-01 10:00 UTC),
            expected_discharge: None,
            remarks: None,
            discharged_at: None,
        };
        let table = admissions_table(&[admission]);
        assert!(table.contains("20260042"));
        assert!(table.contains("scheduled"));
        assert!(table.contains("2026-03-01"));
    }
}
