use crate::domain::account::{
    Account, Registration, hash_password, validate_display_name, verify_password,
};
use crate::{CoreError, IdentityProvider};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Credential {
    account: Account,
    password_hash: String,
}

/// In-memory identity provider for single-executable mode and tests.
/// Passwords are hashed with argon2 off the async runtime.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityProvider {
    // email -> credential
    by_email: Arc<DashMap<String, Credential>>,
    // user id -> email
    emails: Arc<DashMap<String, String>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

pub(crate) async fn hash_blocking(password: String) -> Result<String, CoreError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CoreError::Internal(format!("Hashing task failed: {}", e)))?
}

pub(crate) async fn verify_blocking(password: String, hash: String) -> Result<bool, CoreError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| CoreError::Internal(format!("Verification task failed: {}", e)))?
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_up(&self, registration: &Registration) -> Result<Account, CoreError> {
        let registration = registration.normalized()?;
        if self.by_email.contains_key(&registration.email) {
            return Err(CoreError::AlreadyExists(registration.email));
        }
        let password_hash = hash_blocking(registration.password.clone()).await?;

        let account = Account {
            user_id: Uuid::new_v4().to_string(),
            email: registration.email.clone(),
            display_name: registration.full_name,
            created_at: Utc::now(),
        };
        // Re-check under the entry lock; hashing ran without it.
        match self.by_email.entry(registration.email.clone()) {
            Entry::Occupied(_) => return Err(CoreError::AlreadyExists(registration.email)),
            Entry::Vacant(slot) => {
                slot.insert(Credential {
                    account: account.clone(),
                    password_hash,
                });
            }
        }
        self.emails
            .insert(account.user_id.clone(), account.email.clone());
        info!(user_id = %account.user_id, "Registered landlord account");
        Ok(account)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, CoreError> {
        let email = email.trim().to_lowercase();
        let credential = match self.by_email.get(&email) {
            Some(entry) => entry.value().clone(),
            None => return Err(CoreError::InvalidCredentials),
        };
        if verify_blocking(password.to_string(), credential.password_hash).await? {
            Ok(credential.account)
        } else {
            Err(CoreError::InvalidCredentials)
        }
    }

    async fn get_account(&self, user_id: &str) -> Result<Option<Account>, CoreError> {
        let Some(email) = self.emails.get(user_id).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        Ok(self.by_email.get(&email).map(|c| c.account.clone()))
    }

    async fn update_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<Account, CoreError> {
        let display_name = validate_display_name(display_name)?;
        let email = self
            .emails
            .get(user_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| CoreError::NotFound(format!("Account {}", user_id)))?;
        let mut credential = self
            .by_email
            .get_mut(&email)
            .ok_or_else(|| CoreError::NotFound(format!("Account {}", user_id)))?;
        credential.account.display_name = display_name;
        Ok(credential.account.clone())
    }
}
