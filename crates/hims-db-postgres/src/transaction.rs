//! PostgreSQL transaction implementation.
//!
//! Every workflow mutation runs inside one database transaction. Bed claims
//! are conditional updates. Patient, bed and admission rows read by the
//! workflow are locked with `SELECT ... FOR UPDATE`. Admission number
//! generation is serialized per year with a transaction-scoped advisory lock.

use async_trait::async_trait;
use hims_core::{Admission, AdmissionNumber, Bed, NewAdmission, Patient, PatientStatus};
use hims_storage::{StorageError, Transaction};
use sqlx_core::query::query;
use sqlx_postgres::{PgConnection, PgTransaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::query_error;
use crate::{admissions, beds, patients};

/// Advisory lock class for admission number generation; the year is the
/// second key.
const ADMISSION_NUMBER_LOCK: i32 = 0x4144_4d4e;

/// PostgreSQL transaction wrapper.
///
/// The transaction rolls back on drop if not explicitly committed.
pub struct PostgresTransaction {
    /// Taken on commit/rollback.
    tx: Option<PgTransaction<'static>>,
}

impl PostgresTransaction {
    pub fn new(tx: PgTransaction<'static>) -> Self {
        Self { tx: Some(tx) }
    }

    fn conn(&mut self) -> Result<&mut PgConnection, StorageError> {
        self.tx.as_deref_mut().ok_or_else(|| {
            StorageError::transaction_error(
                "Transaction already completed (committed or rolled back)",
            )
        })
    }
}

#[async_trait]
impl Transaction for PostgresTransaction {
    async fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await.map_err(|e| {
                StorageError::transaction_error(format!("Failed to commit transaction: {e}"))
            })?;
            tracing::debug!("Transaction committed");
        }
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), StorageError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await.map_err(|e| {
                StorageError::transaction_error(format!("Failed to rollback transaction: {e}"))
            })?;
            tracing::debug!("Transaction rolled back");
        }
        Ok(())
    }

    async fn find_patient(&mut self, id: Uuid) -> Result<Option<Patient>, StorageError> {
        patients::find_for_update(self.conn()?, id).await
    }

    async fn find_bed(&mut self, id: Uuid) -> Result<Option<Bed>, StorageError> {
        beds::find_for_update(self.conn()?, id).await
    }

    async fn find_admission(&mut self, id: Uuid) -> Result<Option<Admission>, StorageError> {
        admissions::find_for_update(self.conn()?, id).await
    }

    async fn has_ongoing_admission(&mut self, patient_id: Uuid) -> Result<bool, StorageError> {
        admissions::has_ongoing(self.conn()?, patient_id).await
    }

    async fn highest_admission_number(
        &mut self,
        year: i32,
    ) -> Result<Option<AdmissionNumber>, StorageError> {
        let conn = self.conn()?;
        query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(ADMISSION_NUMBER_LOCK)
            .bind(year)
            .execute(&mut *conn)
            .await
            .map_err(query_error)?;
        admissions::highest_number(conn, year).await
    }

    async fn insert_admission(
        &mut self,
        admission: &NewAdmission,
    ) -> Result<Admission, StorageError> {
        admissions::insert(self.conn()?, admission).await
    }

    async fn occupy_bed(&mut self, bed_id: Uuid) -> Result<bool, StorageError> {
        beds::occupy(self.conn()?, bed_id).await
    }

    async fn release_bed(&mut self, bed_id: Uuid) -> Result<bool, StorageError> {
        beds::release(self.conn()?, bed_id).await
    }

    async fn link_bed(&mut self, admission_id: Uuid, bed_id: Uuid) -> Result<bool, StorageError> {
        admissions::link_bed(self.conn()?, admission_id, bed_id).await
    }

    async fn close_admission(
        &mut self,
        admission_id: Uuid,
        discharged_at: OffsetDateTime,
    ) -> Result<Option<Admission>, StorageError> {
        admissions::close(self.conn()?, admission_id, discharged_at).await
    }

    async fn set_patient_status(
        &mut self,
        patient_id: Uuid,
        status: PatientStatus,
    ) -> Result<bool, StorageError> {
        patients::set_status(self.conn()?, patient_id, status).await
    }
}

impl Drop for PostgresTransaction {
    fn drop(&mut self) {
        if self.tx.is_some() {
            // sqlx issues the ROLLBACK when the inner transaction drops
            tracing::debug!("PostgresTransaction dropped without commit - rolling back");
        }
    }
}
