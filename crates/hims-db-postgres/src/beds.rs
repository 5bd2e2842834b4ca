//! Bed table queries.

use async_trait::async_trait;
use hims_core::{Bed, BedStatus};
use hims_storage::{BedFilter, BedStore, Page, StorageError};
use sqlx_core::executor::Executor;
use sqlx_core::query::query;
use sqlx_postgres::{PgPool, PgRow, Postgres};
use uuid::Uuid;

use crate::error::{map_query_error, query_error};
use crate::rows::{BED_COLUMNS, bed_from_row};

pub(crate) async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Bed>, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT {BED_COLUMNS} FROM beds WHERE id = $1");
    query(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(query_error)?
        .as_ref()
        .map(bed_from_row)
        .transpose()
}

/// Row-locking read used inside admission transactions.
pub(crate) async fn find_for_update<'e, E>(
    executor: E,
    id: Uuid,
) -> Result<Option<Bed>, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT {BED_COLUMNS} FROM beds WHERE id = $1 FOR UPDATE");
    query(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(query_error)?
        .as_ref()
        .map(bed_from_row)
        .transpose()
}

/// Conditional `available → occupied`.
pub(crate) async fn occupy<'e, E>(executor: E, id: Uuid) -> Result<bool, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = query(
        "UPDATE beds SET status = 'occupied' WHERE id = $1 AND status = 'available' AND active",
    )
    .bind(id)
    .execute(executor)
    .await
    .map_err(query_error)?;
    Ok(result.rows_affected() == 1)
}

/// Conditional `occupied → available`.
pub(crate) async fn release<'e, E>(executor: E, id: Uuid) -> Result<bool, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result =
        query("UPDATE beds SET status = 'available' WHERE id = $1 AND status = 'occupied'")
            .bind(id)
            .execute(executor)
            .await
            .map_err(query_error)?;
    Ok(result.rows_affected() == 1)
}

/// PostgreSQL-backed [`BedStore`].
#[derive(Debug, Clone)]
pub struct PostgresBedStore {
    pool: PgPool,
}

impl PostgresBedStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolves an administrative update guarded by `status <> 'occupied'`.
    ///
    /// No returned row means the bed is either missing or occupied.
    async fn idle_update_outcome(
        &self,
        id: Uuid,
        updated: Option<PgRow>,
    ) -> Result<Option<Bed>, StorageError> {
        if let Some(row) = updated {
            return Ok(Some(bed_from_row(&row)?));
        }
        match find_by_id(&self.pool, id).await? {
            Some(bed) => Err(StorageError::conflict(format!(
                "bed {} is occupied",
                bed.number
            ))),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BedStore for PostgresBedStore {
    async fn create(&self, bed: &Bed) -> Result<Bed, StorageError> {
        let sql = format!(
            r#"
            INSERT INTO beds ({BED_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {BED_COLUMNS}
            "#
        );
        let row = query(&sql)
            .bind(bed.id)
            .bind(&bed.number)
            .bind(bed.floor)
            .bind(&bed.room)
            .bind(&bed.service)
            .bind(bed.status.as_str())
            .bind(bed.active)
            .bind(bed.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_query_error(e, |_| format!("bed number '{}' is taken", bed.number)))?;
        bed_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bed>, StorageError> {
        find_by_id(&self.pool, id).await
    }

    async fn list(&self, filter: &BedFilter, page: Page) -> Result<Vec<Bed>, StorageError> {
        let sql = format!(
            r#"
            SELECT {BED_COLUMNS} FROM beds
            WHERE ($1::text IS NULL OR lower(service) = lower($1))
              AND ($2::text IS NULL OR status = $2)
              AND (NOT $3 OR (status = 'available' AND active))
            ORDER BY service, number
            LIMIT $4 OFFSET $5
            "#
        );
        let rows = query(&sql)
            .bind(filter.service.as_deref())
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.available_only)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        rows.iter().map(bed_from_row).collect()
    }

    async fn is_available(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(find_by_id(&self.pool, id)
            .await?
            .is_some_and(|bed| bed.is_available()))
    }

    async fn set_status(&self, id: Uuid, status: BedStatus) -> Result<Option<Bed>, StorageError> {
        if !status.is_administrative() {
            return Err(StorageError::invalid_record(
                "beds become occupied only through an admission",
            ));
        }
        let sql = format!(
            "UPDATE beds SET status = $2 WHERE id = $1 AND status <> 'occupied' \
             RETURNING {BED_COLUMNS}"
        );
        let updated = query(&sql)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        self.idle_update_outcome(id, updated).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Bed>, StorageError> {
        let sql = format!(
            "UPDATE beds SET active = $2 WHERE id = $1 AND status <> 'occupied' \
             RETURNING {BED_COLUMNS}"
        );
        let updated = query(&sql)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;
        self.idle_update_outcome(id, updated).await
    }
}
