//! Row decoding for the hospital tables.
//!
//! Enumerations are stored as their snake_case codes and parsed back through
//! `FromStr`, so a row with an unknown code surfaces as `InvalidRecord`.

use std::str::FromStr;

use hims_core::{Admission, AdmissionNumber, Bed, Patient, Staff, StaffCredentials};
use hims_storage::StorageError;
use sqlx_core::row::Row;
use sqlx_postgres::PgRow;

use crate::error::query_error;

pub(crate) const PATIENT_COLUMNS: &str = "id, medical_record_number, first_name, last_name, \
     date_of_birth, sex, phone, address, blood_group, allergies, medical_history, status, \
     created_at, updated_at";

pub(crate) const STAFF_COLUMNS: &str =
    "id, username, display_name, email, role, active, password_hash, created_at";

pub(crate) const BED_COLUMNS: &str = "id, number, floor, room, service, status, active, created_at";

pub(crate) const ADMISSION_COLUMNS: &str = "id, admission_number, patient_id, physician_id, \
     registered_by, bed_id, admission_type, reason, entry_diagnosis, status, admitted_at, \
     expected_discharge, remarks, discharged_at";

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StorageError>
where
    T: sqlx_core::decode::Decode<'r, sqlx_postgres::Postgres>
        + sqlx_core::types::Type<sqlx_postgres::Postgres>,
{
    row.try_get(column).map_err(query_error)
}

fn parse<T>(row: &PgRow, column: &str) -> Result<T, StorageError>
where
    T: FromStr<Err = hims_core::CoreError>,
{
    let raw: String = get(row, column)?;
    Ok(raw.parse()?)
}

pub(crate) fn patient_from_row(row: &PgRow) -> Result<Patient, StorageError> {
    Ok(Patient {
        id: get(row, "id")?,
        medical_record_number: get(row, "medical_record_number")?,
        first_name: get(row, "first_name")?,
        last_name: get(row, "last_name")?,
        date_of_birth: get(row, "date_of_birth")?,
        sex: parse(row, "sex")?,
        phone: get(row, "phone")?,
        address: get(row, "address")?,
        blood_group: get(row, "blood_group")?,
        allergies: get(row, "allergies")?,
        medical_history: get(row, "medical_history")?,
        status: parse(row, "status")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub(crate) fn credentials_from_row(row: &PgRow) -> Result<StaffCredentials, StorageError> {
    Ok(StaffCredentials {
        staff: staff_from_row(row)?,
        password_hash: get(row, "password_hash")?,
    })
}

pub(crate) fn staff_from_row(row: &PgRow) -> Result<Staff, StorageError> {
    Ok(Staff {
        id: get(row, "id")?,
        username: get(row, "username")?,
        display_name: get(row, "display_name")?,
        email: get(row, "email")?,
        role: parse(row, "role")?,
        active: get(row, "active")?,
        created_at: get(row, "created_at")?,
    })
}

pub(crate) fn bed_from_row(row: &PgRow) -> Result<Bed, StorageError> {
    Ok(Bed {
        id: get(row, "id")?,
        number: get(row, "number")?,
        floor: get(row, "floor")?,
        room: get(row, "room")?,
        service: get(row, "service")?,
        status: parse(row, "status")?,
        active: get(row, "active")?,
        created_at: get(row, "created_at")?,
    })
}

pub(crate) fn admission_from_row(row: &PgRow) -> Result<Admission, StorageError> {
    Ok(Admission {
        id: get(row, "id")?,
        admission_number: parse::<AdmissionNumber>(row, "admission_number")?,
        patient_id: get(row, "patient_id")?,
        physician_id: get(row, "physician_id")?,
        registered_by: get(row, "registered_by")?,
        bed_id: get(row, "bed_id")?,
        admission_type: parse(row, "admission_type")?,
        reason: get(row, "reason")?,
        entry_diagnosis: get(row, "entry_diagnosis")?,
        status: parse(row, "status")?,
        admitted_at: get(row, "admitted_at")?,
        expected_discharge: get(row, "expected_discharge")?,
        remarks: get(row, "remarks")?,
        discharged_at: get(row, "discharged_at")?,
    })
}
