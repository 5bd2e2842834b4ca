//! Patient table queries.

use async_trait::async_trait;
use hims_core::{Patient, PatientStatus};
use hims_storage::{Page, PatientFilter, PatientStore, StorageError};
use sqlx_core::executor::Executor;
use sqlx_core::query::query;
use sqlx_postgres::{PgPool, Postgres};
use uuid::Uuid;

use crate::error::{map_query_error, query_error};
use crate::rows::{PATIENT_COLUMNS, patient_from_row};

pub(crate) async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Patient>, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1");
    query(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(query_error)?
        .as_ref()
        .map(patient_from_row)
        .transpose()
}

pub(crate) async fn find_for_update<'e, E>(
    executor: E,
    id: Uuid,
) -> Result<Option<Patient>, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1 FOR UPDATE");
    query(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(query_error)?
        .as_ref()
        .map(patient_from_row)
        .transpose()
}

pub(crate) async fn set_status<'e, E>(
    executor: E,
    id: Uuid,
    status: PatientStatus,
) -> Result<bool, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = query("UPDATE patients SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(executor)
        .await
        .map_err(query_error)?;
    Ok(result.rows_affected() == 1)
}

/// PostgreSQL-backed [`PatientStore`].
#[derive(Debug, Clone)]
pub struct PostgresPatientStore {
    pool: PgPool,
}

impl PostgresPatientStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientStore for PostgresPatientStore {
    async fn create(&self, patient: &Patient) -> Result<Patient, StorageError> {
        let sql = format!(
            r#"
            INSERT INTO patients ({PATIENT_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {PATIENT_COLUMNS}
            "#
        );
        let row = query(&sql)
            .bind(patient.id)
            .bind(&patient.medical_record_number)
            .bind(&patient.first_name)
            .bind(&patient.last_name)
            .bind(patient.date_of_birth)
            .bind(patient.sex.as_str())
            .bind(&patient.phone)
            .bind(&patient.address)
            .bind(&patient.blood_group)
            .bind(&patient.allergies)
            .bind(&patient.medical_history)
            .bind(patient.status.as_str())
            .bind(patient.created_at)
            .bind(patient.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_query_error(e, |_| {
                    format!(
                        "medical record number '{}' is taken",
                        patient.medical_record_number
                    )
                })
            })?;
        patient_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, StorageError> {
        find_by_id(&self.pool, id).await
    }

    async fn list(
        &self,
        filter: &PatientFilter,
        page: Page,
    ) -> Result<Vec<Patient>, StorageError> {
        let sql = format!(
            r#"
            SELECT {PATIENT_COLUMNS} FROM patients
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL
                   OR first_name ILIKE '%' || $2 || '%'
                   OR last_name ILIKE '%' || $2 || '%')
            ORDER BY last_name, first_name, id
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = query(&sql)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.name.as_deref())
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        rows.iter().map(patient_from_row).collect()
    }

    async fn set_status(&self, id: Uuid, status: PatientStatus) -> Result<bool, StorageError> {
        set_status(&self.pool, id, status).await
    }
}
