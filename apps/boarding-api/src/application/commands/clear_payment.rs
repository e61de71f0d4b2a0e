use crate::AppState;
use crate::application::ApplicationError;
use crate::application::commands::load_owned_tenant;
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use boarding_core::{
    Clock, Command, CommandHandler, CoreError, TenantStore,
    domain::session::RequestContext,
    domain::summary::TenantView,
    domain::tenant::TenantUpdate,
};
use std::sync::Arc;
use tracing::info;

/// Undo a recorded payment so the tenant's room can be billed again.
#[derive(Debug, Clone)]
pub struct ClearTenantPayment {
    pub tenant_id: String,
}

impl Command for ClearTenantPayment {
    type Output = TenantView;
}

pub struct ClearPaymentHandler {
    tenant_store: Arc<dyn TenantStore>,
    clock: Arc<dyn Clock>,
}

impl ClearPaymentHandler {
    pub fn new(tenant_store: Arc<dyn TenantStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tenant_store,
            clock,
        }
    }
}

impl CommandHandler<ClearTenantPayment> for ClearPaymentHandler {
    async fn handle(
        &self,
        ctx: &RequestContext,
        command: ClearTenantPayment,
    ) -> Result<TenantView, CoreError> {
        let owner_id = ctx.owner_id()?;
        let tenant =
            load_owned_tenant(self.tenant_store.as_ref(), owner_id, &command.tenant_id).await?;

        let updated = self
            .tenant_store
            .update(&tenant.id, tenant.version, &TenantUpdate::clear_payment())
            .await?;

        info!(tenant_id = %updated.id, "Tenant payment cleared");
        Ok(TenantView::new(updated, self.clock.current_period()))
    }
}

pub async fn handle_clear_payment_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, ApplicationError> {
    let handler = ClearPaymentHandler::new(state.tenant_store.clone(), state.clock.clone());
    let view = handler.handle(&ctx, ClearTenantPayment { tenant_id }).await?;
    Ok(Json(view))
}
