//! Admission table queries.

use async_trait::async_trait;
use hims_core::{Admission, AdmissionNumber, NewAdmission};
use hims_storage::{AdmissionStore, StorageError};
use sqlx_core::executor::Executor;
use sqlx_core::query::query;
use sqlx_core::row::Row;
use sqlx_postgres::{PgPool, Postgres};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{map_query_error, query_error};
use crate::rows::{ADMISSION_COLUMNS, admission_from_row};

/// Unique index allowing a single ongoing admission per patient.
const ONGOING_PATIENT_INDEX: &str = "uq_admissions_ongoing_patient";
/// Unique index allowing a single ongoing admission per bed.
const ONGOING_BED_INDEX: &str = "uq_admissions_ongoing_bed";

pub(crate) async fn find_for_update<'e, E>(
    executor: E,
    id: Uuid,
) -> Result<Option<Admission>, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT {ADMISSION_COLUMNS} FROM admissions WHERE id = $1 FOR UPDATE");
    query(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(query_error)?
        .as_ref()
        .map(admission_from_row)
        .transpose()
}

pub(crate) async fn has_ongoing<'e, E>(executor: E, patient_id: Uuid) -> Result<bool, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = query(
        "SELECT EXISTS (SELECT 1 FROM admissions WHERE patient_id = $1 AND status = 'ongoing')",
    )
    .bind(patient_id)
    .fetch_one(executor)
    .await
    .map_err(query_error)?;
    row.try_get::<bool, _>(0).map_err(query_error)
}

pub(crate) async fn highest_number<'e, E>(
    executor: E,
    year: i32,
) -> Result<Option<AdmissionNumber>, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let row = query("SELECT MAX(admission_number) FROM admissions WHERE admission_number LIKE $1")
        .bind(format!("{}%", AdmissionNumber::year_prefix(year)))
        .fetch_one(executor)
        .await
        .map_err(query_error)?;
    let highest: Option<String> = row.try_get(0).map_err(query_error)?;
    Ok(highest
        .map(|raw| raw.parse::<AdmissionNumber>())
        .transpose()?)
}

pub(crate) async fn insert<'e, E>(
    executor: E,
    new: &NewAdmission,
) -> Result<Admission, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let admission = new.clone().into_admission();
    let sql = format!(
        r#"
        INSERT INTO admissions ({ADMISSION_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING {ADMISSION_COLUMNS}
        "#
    );
    let row = query(&sql)
        .bind(admission.id)
        .bind(admission.admission_number.to_string())
        .bind(admission.patient_id)
        .bind(admission.physician_id)
        .bind(admission.registered_by)
        .bind(admission.bed_id)
        .bind(admission.admission_type.as_str())
        .bind(&admission.reason)
        .bind(&admission.entry_diagnosis)
        .bind(admission.status.as_str())
        .bind(admission.admitted_at)
        .bind(admission.expected_discharge)
        .bind(&admission.remarks)
        .bind(admission.discharged_at)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            map_query_error(e, |constraint| match constraint {
                Some(ONGOING_PATIENT_INDEX) => format!(
                    "patient {} already has an ongoing admission",
                    admission.patient_id
                ),
                Some(ONGOING_BED_INDEX) => "bed is already assigned to an ongoing admission".into(),
                _ => format!(
                    "admission number {} is taken",
                    admission.admission_number
                ),
            })
        })?;
    admission_from_row(&row)
}

pub(crate) async fn link_bed<'e, E>(
    executor: E,
    admission_id: Uuid,
    bed_id: Uuid,
) -> Result<bool, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result =
        query("UPDATE admissions SET bed_id = $2 WHERE id = $1 AND status = 'ongoing'")
            .bind(admission_id)
            .bind(bed_id)
            .execute(executor)
            .await
            .map_err(|e| map_query_error(e, |_| format!("bed {bed_id} is already assigned")))?;
    Ok(result.rows_affected() == 1)
}

pub(crate) async fn close<'e, E>(
    executor: E,
    admission_id: Uuid,
    discharged_at: OffsetDateTime,
) -> Result<Option<Admission>, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        UPDATE admissions SET status = 'discharged', discharged_at = $2
        WHERE id = $1 AND status = 'ongoing'
        RETURNING {ADMISSION_COLUMNS}
        "#
    );
    query(&sql)
        .bind(admission_id)
        .bind(discharged_at)
        .fetch_optional(executor)
        .await
        .map_err(query_error)?
        .as_ref()
        .map(admission_from_row)
        .transpose()
}

/// PostgreSQL-backed [`AdmissionStore`].
#[derive(Debug, Clone)]
pub struct PostgresAdmissionStore {
    pool: PgPool,
}

impl PostgresAdmissionStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdmissionStore for PostgresAdmissionStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admission>, StorageError> {
        let sql = format!("SELECT {ADMISSION_COLUMNS} FROM admissions WHERE id = $1");
        query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?
            .as_ref()
            .map(admission_from_row)
            .transpose()
    }

    async fn list_ongoing(&self) -> Result<Vec<Admission>, StorageError> {
        let sql = format!(
            "SELECT {ADMISSION_COLUMNS} FROM admissions WHERE status = 'ongoing' \
             ORDER BY admitted_at, admission_number"
        );
        let rows = query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        rows.iter().map(admission_from_row).collect()
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Admission>, StorageError> {
        let sql = format!(
            "SELECT {ADMISSION_COLUMNS} FROM admissions WHERE patient_id = $1 \
             ORDER BY admitted_at DESC, admission_number DESC"
        );
        let rows = query(&sql)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        rows.iter().map(admission_from_row).collect()
    }
}
