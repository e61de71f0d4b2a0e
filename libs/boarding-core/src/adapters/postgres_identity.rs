use crate::adapters::in_memory_identity::{hash_blocking, verify_blocking};
use crate::adapters::postgres_tenant_store::{db_failure, is_unique_violation};
use crate::domain::account::{Account, Registration, validate_display_name};
use crate::{CoreError, IdentityProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

#[derive(sqlx::FromRow, Debug)]
struct LandlordRow {
    user_id: String,
    email: String,
    display_name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<LandlordRow> for Account {
    fn from(row: LandlordRow) -> Self {
        Account {
            user_id: row.user_id,
            email: row.email,
            display_name: row.display_name,
            created_at: row.created_at,
        }
    }
}

/// Identity provider backed by the `landlords` table.
#[derive(Debug, Clone)]
pub struct PostgresIdentityProvider {
    pool: PgPool,
}

impl PostgresIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityProvider for PostgresIdentityProvider {
    async fn sign_up(&self, registration: &Registration) -> Result<Account, CoreError> {
        let registration = registration.normalized()?;
        let password_hash = hash_blocking(registration.password.clone()).await?;
        let user_id = Uuid::new_v4().to_string();

        let row: LandlordRow = sqlx::query_as(
            "INSERT INTO landlords (user_id, email, display_name, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING user_id, email, display_name, password_hash, created_at",
        )
        .bind(&user_id)
        .bind(&registration.email)
        .bind(&registration.full_name)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::AlreadyExists(registration.email.clone())
            } else {
                db_failure(e)
            }
        })?;
        info!(user_id = %row.user_id, "Registered landlord account");
        Ok(row.into())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, CoreError> {
        let row: Option<LandlordRow> = sqlx::query_as(
            "SELECT user_id, email, display_name, password_hash, created_at \
             FROM landlords WHERE email = $1",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_failure)?;

        let Some(row) = row else {
            return Err(CoreError::InvalidCredentials);
        };
        if verify_blocking(password.to_string(), row.password_hash.clone()).await? {
            Ok(row.into())
        } else {
            Err(CoreError::InvalidCredentials)
        }
    }

    async fn get_account(&self, user_id: &str) -> Result<Option<Account>, CoreError> {
        let row: Option<LandlordRow> = sqlx::query_as(
            "SELECT user_id, email, display_name, password_hash, created_at \
             FROM landlords WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_failure)?;
        Ok(row.map(Account::from))
    }

    async fn update_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<Account, CoreError> {
        let display_name = validate_display_name(display_name)?;
        let row: Option<LandlordRow> = sqlx::query_as(
            "UPDATE landlords SET display_name = $2 WHERE user_id = $1 \
             RETURNING user_id, email, display_name, password_hash, created_at",
        )
        .bind(user_id)
        .bind(&display_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_failure)?;
        row.map(Account::from)
            .ok_or_else(|| CoreError::NotFound(format!("Account {}", user_id)))
    }
}
