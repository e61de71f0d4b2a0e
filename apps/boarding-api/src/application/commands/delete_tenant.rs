use crate::AppState;
use crate::application::ApplicationError;
use crate::application::commands::load_owned_tenant;
use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use boarding_core::{
    Command, CommandHandler, CoreError, TenantStore, domain::session::RequestContext,
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DeleteTenant {
    pub tenant_id: String,
}

impl Command for DeleteTenant {
    type Output = ();
}

pub struct DeleteTenantHandler {
    tenant_store: Arc<dyn TenantStore>,
}

impl DeleteTenantHandler {
    pub fn new(tenant_store: Arc<dyn TenantStore>) -> Self {
        Self { tenant_store }
    }
}

impl CommandHandler<DeleteTenant> for DeleteTenantHandler {
    async fn handle(&self, ctx: &RequestContext, command: DeleteTenant) -> Result<(), CoreError> {
        let owner_id = ctx.owner_id()?;
        let tenant =
            load_owned_tenant(self.tenant_store.as_ref(), owner_id, &command.tenant_id).await?;
        // Shares already assigned to room-mates stay as they are.
        self.tenant_store.delete(&tenant.id).await?;
        info!(tenant_id = %tenant.id, "Tenant deleted");
        Ok(())
    }
}

pub async fn handle_delete_tenant_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(tenant_id): Path<String>,
) -> Result<StatusCode, ApplicationError> {
    let handler = DeleteTenantHandler::new(state.tenant_store.clone());
    handler.handle(&ctx, DeleteTenant { tenant_id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
