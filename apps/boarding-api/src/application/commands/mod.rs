pub mod clear_payment;
pub mod create_tenant;
pub mod delete_tenant;
pub mod distribute_bills;
pub mod login;
pub mod logout;
pub mod mark_paid;
pub mod register;
pub mod update_profile;
pub mod update_tenant;

pub use clear_payment::{ClearPaymentHandler, ClearTenantPayment};
pub use create_tenant::{CreateTenant, CreateTenantHandler};
pub use delete_tenant::{DeleteTenant, DeleteTenantHandler};
pub use distribute_bills::{DistributeBills, DistributeBillsHandler};
pub use login::{Login, LoginHandler};
pub use logout::{Logout, LogoutHandler};
pub use mark_paid::{MarkPaidHandler, MarkTenantPaid};
pub use register::{Register, RegisterHandler};
pub use update_profile::{UpdateDisplayName, UpdateProfileHandler};
pub use update_tenant::{UpdateTenant, UpdateTenantHandler};

use boarding_core::{CoreError, TenantStore, domain::tenant::Tenant};

/// Load a tenant that belongs to `owner_id`. Someone else's tenant is reported
/// as missing so ids cannot be probed across landlords.
pub(crate) async fn load_owned_tenant(
    store: &dyn TenantStore,
    owner_id: &str,
    tenant_id: &str,
) -> Result<Tenant, CoreError> {
    match store.get(tenant_id).await? {
        Some(tenant) if tenant.owner_id == owner_id => Ok(tenant),
        _ => Err(CoreError::NotFound(format!("Tenant {}", tenant_id))),
    }
}
