//! PostgreSQL implementation of the `HospitalStorage` trait.

use async_trait::async_trait;
use sqlx_core::query::query;
use sqlx_postgres::PgPool;

use hims_storage::{
    AdmissionStore, BedStore, HospitalStorage, PatientStore, StaffStore, StorageError,
    Transaction,
};

use crate::admissions::PostgresAdmissionStore;
use crate::beds::PostgresBedStore;
use crate::config::PostgresConfig;
use crate::error::query_error;
use crate::migrations;
use crate::patients::PostgresPatientStore;
use crate::pool;
use crate::staff::PostgresStaffStore;
use crate::transaction::PostgresTransaction;

/// PostgreSQL storage backend for hospital records.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
    patients: PostgresPatientStore,
    staff: PostgresStaffStore,
    beds: PostgresBedStore,
    admissions: PostgresAdmissionStore,
}

impl PostgresStorage {
    /// Creates a new `PostgresStorage` with the given configuration.
    ///
    /// This will:
    /// 1. Create a connection pool
    /// 2. Run migrations (if configured)
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created
    /// or if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;

        if config.run_migrations {
            migrations::run(&pool).await?;
        }

        Ok(Self::from_pool(pool))
    }

    /// Creates a new `PostgresStorage` from an existing connection pool.
    ///
    /// Migrations are not run automatically when using this constructor.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            patients: PostgresPatientStore::new(pool.clone()),
            staff: PostgresStaffStore::new(pool.clone()),
            beds: PostgresBedStore::new(pool.clone()),
            admissions: PostgresAdmissionStore::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl HospitalStorage for PostgresStorage {
    fn patients(&self) -> &dyn PatientStore {
        &self.patients
    }

    fn staff(&self) -> &dyn StaffStore {
        &self.staff
    }

    fn beds(&self) -> &dyn BedStore {
        &self.beds
    }

    fn admissions(&self) -> &dyn AdmissionStore {
        &self.admissions
    }

    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, StorageError> {
        let tx = self.pool.begin().await.map_err(|e| {
            StorageError::transaction_error(format!("Failed to begin transaction: {e}"))
        })?;
        Ok(Box::new(PostgresTransaction::new(tx)))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
