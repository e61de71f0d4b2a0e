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

/// Record that a tenant has paid for the current billing period.
#[derive(Debug, Clone)]
pub struct MarkTenantPaid {
    pub tenant_id: String,
}

impl Command for MarkTenantPaid {
    type Output = TenantView;
}

pub struct MarkPaidHandler {
    tenant_store: Arc<dyn TenantStore>,
    clock: Arc<dyn Clock>,
}

impl MarkPaidHandler {
    pub fn new(tenant_store: Arc<dyn TenantStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tenant_store,
            clock,
        }
    }
}

impl CommandHandler<MarkTenantPaid> for MarkPaidHandler {
    async fn handle(
        &self,
        ctx: &RequestContext,
        command: MarkTenantPaid,
    ) -> Result<TenantView, CoreError> {
        let owner_id = ctx.owner_id()?;
        let tenant =
            load_owned_tenant(self.tenant_store.as_ref(), owner_id, &command.tenant_id).await?;

        let now = self.clock.now();
        let period = self.clock.current_period();
        let updated = self
            .tenant_store
            .update(&tenant.id, tenant.version, &TenantUpdate::mark_paid(period, now))
            .await?;

        info!(tenant_id = %updated.id, period = %period, "Tenant marked as paid");
        Ok(TenantView::new(updated, period))
    }
}

pub async fn handle_mark_paid_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, ApplicationError> {
    let handler = MarkPaidHandler::new(state.tenant_store.clone(), state.clock.clone());
    let view = handler.handle(&ctx, MarkTenantPaid { tenant_id }).await?;
    Ok(Json(view))
}
