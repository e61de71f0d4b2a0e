use crate::domain::billing::WriteBatch;
use crate::domain::room::RoomNo;
use crate::domain::tenant::{Tenant, TenantUpdate};
use crate::{CoreError, TenantStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory implementation of the TenantStore port for testing and single-executable mode.
/// A single lock covers the whole map, so a batch is applied and observed as one step.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTenantStore {
    // Store: Tenant ID -> Tenant document
    tenants: Arc<RwLock<HashMap<String, Tenant>>>,
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_version(tenant: &Tenant, expected_version: u64) -> Result<(), CoreError> {
    if tenant.version != expected_version {
        return Err(CoreError::Concurrency {
            expected: expected_version,
            actual: tenant.version,
        });
    }
    Ok(())
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn insert(&self, tenant: Tenant) -> Result<(), CoreError> {
        let mut tenants = self.tenants.write().await;
        if tenants.contains_key(&tenant.id) {
            return Err(CoreError::AlreadyExists(tenant.id));
        }
        tenants.insert(tenant.id.clone(), tenant);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Tenant>, CoreError> {
        Ok(self.tenants.read().await.get(id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Tenant>, CoreError> {
        Ok(self
            .tenants
            .read()
            .await
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_by_room(
        &self,
        owner_id: &str,
        room_no: &RoomNo,
    ) -> Result<Vec<Tenant>, CoreError> {
        Ok(self
            .tenants
            .read()
            .await
            .values()
            .filter(|t| t.owner_id == owner_id && &t.room_no == room_no)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: &str,
        expected_version: u64,
        update: &TenantUpdate,
    ) -> Result<Tenant, CoreError> {
        let mut tenants = self.tenants.write().await;
        let tenant = tenants
            .get_mut(id)
            .ok_or_else(|| CoreError::NotFound(format!("Tenant {}", id)))?;
        check_version(tenant, expected_version)?;
        tenant.apply(update);
        Ok(tenant.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        match self.tenants.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound(format!("Tenant {}", id))),
        }
    }

    async fn commit(&self, batch: &WriteBatch) -> Result<(), CoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut tenants = self.tenants.write().await;

        // Validate every write before touching anything
        for write in batch.writes() {
            let tenant = tenants
                .get(&write.tenant_id)
                .ok_or_else(|| CoreError::NotFound(format!("Tenant {}", write.tenant_id)))?;
            check_version(tenant, write.expected_version)?;
        }

        for write in batch.writes() {
            if let Some(tenant) = tenants.get_mut(&write.tenant_id) {
                tenant.apply(&write.update);
            }
        }
        debug!("Committed batch of {} tenant writes", batch.len());
        Ok(())
    }
}
