use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::{
    models::{NewProviderRecord, ProviderRecord},
    repository::ProviderStore,
    DatabaseError, DatabaseResult as DbResult,
};

/// In-process [`ProviderStore`] for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryProviderStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    records: BTreeMap<i64, ProviderRecord>,
}

impl InMemoryProviderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, keeping their ids
    pub fn with_records(records: impl IntoIterator<Item = ProviderRecord>) -> Self {
        let mut inner = Inner::default();
        for record in records {
            inner.next_id = inner.next_id.max(record.id);
            inner.records.insert(record.id, record);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }
}

#[async_trait]
impl ProviderStore for InMemoryProviderStore {
    async fn list_enabled(&self) -> DbResult<Vec<ProviderRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.records.values().filter(|r| r.enabled).cloned().collect())
    }

    async fn list_by_tenant(&self, tenant_id: i64) -> DbResult<Vec<ProviderRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn get(&self, tenant_id: i64, id: i64) -> DbResult<ProviderRecord> {
        let inner = self.inner.read().await;
        inner
            .records
            .get(&id)
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .ok_or(DatabaseError::NotFound)
    }

    async fn create(&self, record: &NewProviderRecord) -> DbResult<i64> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        let now = Utc::now();

        inner.records.insert(
            id,
            ProviderRecord {
                id,
                tenant_id: record.tenant_id,
                provider_type: record.provider_type.clone(),
                metadata_url: record.metadata_url.clone(),
                client_id: record.client_id.clone(),
                client_secret_enc: record.client_secret_enc.clone(),
                enabled: record.enabled,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update(&self, id: i64, record: &NewProviderRecord) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let existing = inner
            .records
            .get_mut(&id)
            .filter(|r| r.tenant_id == record.tenant_id)
            .ok_or(DatabaseError::NotFound)?;

        existing.provider_type.clone_from(&record.provider_type);
        existing.metadata_url.clone_from(&record.metadata_url);
        existing.client_id.clone_from(&record.client_id);
        existing.client_secret_enc.clone_from(&record.client_secret_enc);
        existing.enabled = record.enabled;
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, tenant_id: i64, id: i64) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .records
            .get(&id)
            .is_some_and(|r| r.tenant_id == tenant_id);
        if !owned {
            return Err(DatabaseError::NotFound);
        }
        inner.records.remove(&id);
        Ok(())
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}
