use crate::domain::billing::{BillingPeriod, WriteBatch};
use crate::domain::room::RoomNo;
use crate::domain::tenant::{Tenant, TenantUpdate};
use crate::{CoreError, TenantStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use tracing::debug;

const TENANT_COLUMNS: &str = "id, owner_id, name, phone, room_no, rent_amount, electricity_share, \
     water_share, key_money_amount, is_key_money_paid, last_paid_month, last_paid_at, joined_at, version";

pub(crate) fn db_failure(e: sqlx::Error) -> CoreError {
    CoreError::RemoteFailure(Box::new(e))
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

// Row shape of the `tenants` table
#[derive(sqlx::FromRow, Debug)]
struct TenantRow {
    id: String,
    owner_id: String,
    name: String,
    phone: String,
    room_no: String,
    rent_amount: f64,
    electricity_share: f64,
    water_share: f64,
    key_money_amount: f64,
    is_key_money_paid: bool,
    last_paid_month: Option<String>,
    last_paid_at: Option<DateTime<Utc>>,
    joined_at: DateTime<Utc>,
    version: i64,
}

impl TryFrom<TenantRow> for Tenant {
    type Error = CoreError;

    fn try_from(row: TenantRow) -> Result<Self, Self::Error> {
        let last_paid_month = row
            .last_paid_month
            .as_deref()
            .map(str::parse::<BillingPeriod>)
            .transpose()
            .map_err(|e| CoreError::Internal(format!("Corrupt tenant row {}: {}", row.id, e)))?;
        Ok(Tenant {
            owner_id: row.owner_id,
            name: row.name,
            phone: row.phone,
            room_no: RoomNo::from_stored(row.room_no),
            rent_amount: row.rent_amount,
            electricity_share: row.electricity_share,
            water_share: row.water_share,
            key_money_amount: row.key_money_amount,
            is_key_money_paid: row.is_key_money_paid,
            last_paid_month,
            last_paid_at: row.last_paid_at,
            joined_at: row.joined_at,
            version: row.version as u64,
            id: row.id,
        })
    }
}

fn into_tenants(rows: Vec<TenantRow>) -> Result<Vec<Tenant>, CoreError> {
    rows.into_iter().map(Tenant::try_from).collect()
}

/// PostgreSQL implementation of the TenantStore port using sqlx.
/// Versioned writes lock their rows with `SELECT .. FOR UPDATE` inside a transaction.
#[derive(Debug, Clone)]
pub struct PostgresTenantStore {
    pool: PgPool,
}

impl PostgresTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write_back(
        tx: &mut Transaction<'_, Postgres>,
        tenant: &Tenant,
    ) -> Result<(), CoreError> {
        sqlx::query(
            "UPDATE tenants SET name = $2, phone = $3, room_no = $4, rent_amount = $5, \
             electricity_share = $6, water_share = $7, key_money_amount = $8, \
             is_key_money_paid = $9, last_paid_month = $10, last_paid_at = $11, version = $12 \
             WHERE id = $1",
        )
        .bind(&tenant.id)
        .bind(&tenant.name)
        .bind(&tenant.phone)
        .bind(tenant.room_no.as_str())
        .bind(tenant.rent_amount)
        .bind(tenant.electricity_share)
        .bind(tenant.water_share)
        .bind(tenant.key_money_amount)
        .bind(tenant.is_key_money_paid)
        .bind(tenant.last_paid_month.map(|p| p.to_string()))
        .bind(tenant.last_paid_at)
        .bind(tenant.version as i64)
        .execute(&mut **tx)
        .await
        .map_err(db_failure)?;
        Ok(())
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
impl TenantStore for PostgresTenantStore {
    async fn insert(&self, tenant: Tenant) -> Result<(), CoreError> {
        sqlx::query(&format!(
            "INSERT INTO tenants ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
            TENANT_COLUMNS
        ))
        .bind(&tenant.id)
        .bind(&tenant.owner_id)
        .bind(&tenant.name)
        .bind(&tenant.phone)
        .bind(tenant.room_no.as_str())
        .bind(tenant.rent_amount)
        .bind(tenant.electricity_share)
        .bind(tenant.water_share)
        .bind(tenant.key_money_amount)
        .bind(tenant.is_key_money_paid)
        .bind(tenant.last_paid_month.map(|p| p.to_string()))
        .bind(tenant.last_paid_at)
        .bind(tenant.joined_at)
        .bind(tenant.version as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::AlreadyExists(tenant.id.clone())
            } else {
                db_failure(e)
            }
        })?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Tenant>, CoreError> {
        let row: Option<TenantRow> =
            sqlx::query_as(&format!("SELECT {} FROM tenants WHERE id = $1", TENANT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_failure)?;
        row.map(Tenant::try_from).transpose()
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Tenant>, CoreError> {
        let rows: Vec<TenantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tenants WHERE owner_id = $1",
            TENANT_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_failure)?;
        into_tenants(rows)
    }

    async fn list_by_room(
        &self,
        owner_id: &str,
        room_no: &RoomNo,
    ) -> Result<Vec<Tenant>, CoreError> {
        let rows: Vec<TenantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tenants WHERE owner_id = $1 AND room_no = $2",
            TENANT_COLUMNS
        ))
        .bind(owner_id)
        .bind(room_no.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_failure)?;
        into_tenants(rows)
    }

    async fn update(
        &self,
        id: &str,
        expected_version: u64,
        update: &TenantUpdate,
    ) -> Result<Tenant, CoreError> {
        let mut tx = self.pool.begin().await.map_err(db_failure)?;

        let row: Option<TenantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tenants WHERE id = $1 FOR UPDATE",
            TENANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_failure)?;

        let mut tenant = match row {
            Some(row) => Tenant::try_from(row)?,
            None => return Err(CoreError::NotFound(format!("Tenant {}", id))),
        };
        check_version(&tenant, expected_version)?;
        tenant.apply(update);
        Self::write_back(&mut tx, &tenant).await?;

        tx.commit().await.map_err(db_failure)?;
        Ok(tenant)
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_failure)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Tenant {}", id)));
        }
        Ok(())
    }

    async fn commit(&self, batch: &WriteBatch) -> Result<(), CoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        let ids: Vec<String> = batch.writes().iter().map(|w| w.tenant_id.clone()).collect();

        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.pool.begin().await.map_err(db_failure)?;

        // Lock in a stable order so concurrent batches cannot deadlock
        let rows: Vec<TenantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tenants WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            TENANT_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_failure)?;

        let mut locked: HashMap<String, Tenant> = into_tenants(rows)?
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();

        for write in batch.writes() {
            let tenant = locked
                .get_mut(&write.tenant_id)
                .ok_or_else(|| CoreError::NotFound(format!("Tenant {}", write.tenant_id)))?;
            check_version(tenant, write.expected_version)?;
            tenant.apply(&write.update);
            Self::write_back(&mut tx, tenant).await?;
        }

        tx.commit().await.map_err(db_failure)?;
        debug!("Committed batch of {} tenant writes", batch.len());
        Ok(())
    }
}
