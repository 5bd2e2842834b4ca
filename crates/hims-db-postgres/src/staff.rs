//! Staff table queries.

use async_trait::async_trait;
use hims_core::{Staff, StaffCredentials};
use hims_storage::{Page, StaffFilter, StaffStore, StorageError};
use sqlx_core::query::query;
use sqlx_postgres::PgPool;
use uuid::Uuid;

use crate::error::{map_query_error, query_error};
use crate::rows::{STAFF_COLUMNS, credentials_from_row, staff_from_row};

/// PostgreSQL-backed [`StaffStore`].
#[derive(Debug, Clone)]
pub struct PostgresStaffStore {
    pool: PgPool,
}

impl PostgresStaffStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffStore for PostgresStaffStore {
    async fn create(&self, credentials: &StaffCredentials) -> Result<Staff, StorageError> {
        let staff = &credentials.staff;
        let sql = format!(
            r#"
            INSERT INTO staff ({STAFF_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {STAFF_COLUMNS}
            "#
        );
        let row = query(&sql)
            .bind(staff.id)
            .bind(&staff.username)
            .bind(&staff.display_name)
            .bind(&staff.email)
            .bind(staff.role.as_str())
            .bind(staff.active)
            .bind(&credentials.password_hash)
            .bind(staff.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_query_error(e, |_| format!("username '{}' is taken", staff.username))
            })?;
        staff_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Staff>, StorageError> {
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff WHERE id = $1");
        query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?
            .as_ref()
            .map(staff_from_row)
            .transpose()
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StaffCredentials>, StorageError> {
        let sql = format!("SELECT {STAFF_COLUMNS} FROM staff WHERE username = $1");
        query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?
            .as_ref()
            .map(credentials_from_row)
            .transpose()
    }

    async fn list(&self, filter: &StaffFilter, page: Page) -> Result<Vec<Staff>, StorageError> {
        let sql = format!(
            r#"
            SELECT {STAFF_COLUMNS} FROM staff
            WHERE ($1::text IS NULL OR role = $1)
              AND ($2::boolean IS NULL OR active = $2)
            ORDER BY username
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = query(&sql)
            .bind(filter.role.map(|r| r.as_str()))
            .bind(filter.active)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        rows.iter().map(staff_from_row).collect()
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<Option<Staff>, StorageError> {
        let sql = format!("UPDATE staff SET active = $2 WHERE id = $1 RETURNING {STAFF_COLUMNS}");
        query(&sql)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?
            .as_ref()
            .map(staff_from_row)
            .transpose()
    }
}
