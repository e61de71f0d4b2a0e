use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use std::{error::Error as StdError, fmt::Debug, future::Future};

// Declare modules
pub mod adapters;
pub mod domain;

use domain::account::{Account, Registration};
use domain::billing::{BillingPeriod, WriteBatch};
use domain::room::RoomNo;
use domain::session::RequestContext;
use domain::tenant::{Tenant, TenantUpdate};

// Common error type for the core library and every port behind it
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("No tenants found in {0}")]
    NoTenantsInRoom(String),
    #[error("Cannot add bills! {tenant_name} has already paid for this month")]
    AlreadyPaidConflict {
        tenant_id: String,
        tenant_name: String,
    },
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Concurrency conflict: Expected version {expected}, found {actual}")]
    Concurrency { expected: u64, actual: u64 },
    #[error("Remote failure: {0}")]
    RemoteFailure(#[from] Box<dyn StdError + Send + Sync>),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable, machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::InvalidAmount(_) => "invalid_amount",
            CoreError::NoTenantsInRoom(_) => "no_tenants_in_room",
            CoreError::AlreadyPaidConflict { .. } => "already_paid",
            CoreError::NotAuthenticated => "not_authenticated",
            CoreError::InvalidCredentials => "invalid_credentials",
            CoreError::NotFound(_) => "not_found",
            CoreError::AlreadyExists(_) => "already_exists",
            CoreError::Validation(_) => "validation",
            CoreError::Concurrency { .. } => "conflict",
            CoreError::RemoteFailure(_) => "remote_failure",
            CoreError::Configuration(_) => "configuration",
            CoreError::Internal(_) => "internal",
        }
    }
}

// Marker trait for commands; each command names what a successful run returns
pub trait Command: Send + Sync + 'static {
    type Output: Send;
}

// Port for handling commands. The caller's session travels in the context
// rather than in any process-wide state.
pub trait CommandHandler<C: Command>: Send + Sync {
    fn handle(
        &self,
        ctx: &RequestContext,
        command: C,
    ) -> impl Future<Output = Result<C::Output, CoreError>> + Send;
}

// Port for the tenant document store (payment ledger + tenant directory)
#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Insert a brand-new tenant document. Fails with `AlreadyExists` on id clash.
    async fn insert(&self, tenant: Tenant) -> Result<(), CoreError>;

    async fn get(&self, id: &str) -> Result<Option<Tenant>, CoreError>;

    /// All tenants created by a landlord, in no particular order.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Tenant>, CoreError>;

    /// All tenants of a landlord currently assigned to `room_no`.
    async fn list_by_room(&self, owner_id: &str, room_no: &RoomNo)
        -> Result<Vec<Tenant>, CoreError>;

    /// Apply a field update to one document, guarded by its current version.
    /// Returns the document as stored after the update.
    async fn update(
        &self,
        id: &str,
        expected_version: u64,
        update: &TenantUpdate,
    ) -> Result<Tenant, CoreError>;

    async fn delete(&self, id: &str) -> Result<(), CoreError>;

    /// Apply every write in the batch, or none of them.
    async fn commit(&self, batch: &WriteBatch) -> Result<(), CoreError>;
}

// Port for the external identity provider (email/password accounts)
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, registration: &Registration) -> Result<Account, CoreError>;

    /// Fails with `InvalidCredentials` for an unknown email or wrong password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, CoreError>;

    async fn get_account(&self, user_id: &str) -> Result<Option<Account>, CoreError>;

    async fn update_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<Account, CoreError>;
}

// Port for caching data (sessions live here)
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError>;
    async fn set(&self, key: &str, value: &[u8], ttl_seconds: Option<u64>)
        -> Result<(), CoreError>;
    async fn delete(&self, key: &str) -> Result<(), CoreError>;
}

// Port for wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// The billing period the landlord is currently in, by local calendar.
    fn current_period(&self) -> BillingPeriod {
        BillingPeriod::from_date(self.now().with_timezone(&Local).date_naive())
    }
}
