use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::{
    connection::DatabasePool,
    models::{NewProviderRecord, ProviderRecord},
    DatabaseError, DatabaseResult as DbResult,
};

/// Storage of identity-provider records.
///
/// Every tenant-facing lookup is scoped by `(tenant_id, id)` so one tenant can
/// never read or modify another tenant's providers.
#[async_trait]
pub trait ProviderStore: Send + Sync {
    /// All enabled records across every tenant, ordered by id
    async fn list_enabled(&self) -> DbResult<Vec<ProviderRecord>>;

    /// All records belonging to a tenant, enabled or not
    async fn list_by_tenant(&self, tenant_id: i64) -> DbResult<Vec<ProviderRecord>>;

    /// Fetch one record, or [`DatabaseError::NotFound`]
    async fn get(&self, tenant_id: i64, id: i64) -> DbResult<ProviderRecord>;

    /// Insert a record and return its id
    async fn create(&self, record: &NewProviderRecord) -> DbResult<i64>;

    /// Replace the writable fields of an existing record
    async fn update(&self, id: i64, record: &NewProviderRecord) -> DbResult<()>;

    async fn delete(&self, tenant_id: i64, id: i64) -> DbResult<()>;

    /// Cheap liveness probe
    async fn ping(&self) -> DbResult<()>;
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, tenant_id, type, metadata_url, client_id, client_secret_enc,
           enabled, created_at, updated_at
    FROM identity_providers
"#;

/// PostgreSQL-backed [`ProviderStore`]
#[derive(Clone, Debug)]
pub struct ProviderRepository {
    pool: Pool<Postgres>,
}

impl ProviderRepository {
    /// Create a new provider repository
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

impl From<&DatabasePool> for ProviderRepository {
    fn from(db: &DatabasePool) -> Self {
        Self::new(db.pool().clone())
    }
}

#[async_trait]
impl ProviderStore for ProviderRepository {
    async fn list_enabled(&self) -> DbResult<Vec<ProviderRecord>> {
        let records = sqlx::query_as::<_, ProviderRecord>(&format!(
            "{SELECT_COLUMNS} WHERE enabled = TRUE ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = records.len(), "Loaded enabled identity providers");
        Ok(records)
    }

    async fn list_by_tenant(&self, tenant_id: i64) -> DbResult<Vec<ProviderRecord>> {
        let records = sqlx::query_as::<_, ProviderRecord>(&format!(
            "{SELECT_COLUMNS} WHERE tenant_id = $1 ORDER BY id"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn get(&self, tenant_id: i64, id: i64) -> DbResult<ProviderRecord> {
        sqlx::query_as::<_, ProviderRecord>(&format!(
            "{SELECT_COLUMNS} WHERE tenant_id = $1 AND id = $2"
        ))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    async fn create(&self, record: &NewProviderRecord) -> DbResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO identity_providers
                (tenant_id, type, metadata_url, client_id, client_secret_enc, enabled)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(record.tenant_id)
        .bind(&record.provider_type)
        .bind(&record.metadata_url)
        .bind(&record.client_id)
        .bind(&record.client_secret_enc)
        .bind(record.enabled)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update(&self, id: i64, record: &NewProviderRecord) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE identity_providers
            SET type = $1, metadata_url = $2, client_id = $3,
                client_secret_enc = $4, enabled = $5, updated_at = NOW()
            WHERE tenant_id = $6 AND id = $7
            "#,
        )
        .bind(&record.provider_type)
        .bind(&record.metadata_url)
        .bind(&record.client_id)
        .bind(&record.client_secret_enc)
        .bind(record.enabled)
        .bind(record.tenant_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, tenant_id: i64, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM identity_providers WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
