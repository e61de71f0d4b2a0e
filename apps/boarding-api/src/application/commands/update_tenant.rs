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
    domain::room::RoomCatalog,
    domain::session::RequestContext,
    domain::summary::TenantView,
    domain::tenant::{Tenant, TenantPatch},
};
use std::sync::Arc;
use tracing::info;

/// Edit a tenant's directory fields. Shares and payment state are untouched.
#[derive(Debug, Clone)]
pub struct UpdateTenant {
    pub tenant_id: String,
    pub patch: TenantPatch,
}

impl Command for UpdateTenant {
    type Output = Tenant;
}

pub struct UpdateTenantHandler {
    tenant_store: Arc<dyn TenantStore>,
    rooms: Arc<RoomCatalog>,
}

impl UpdateTenantHandler {
    pub fn new(tenant_store: Arc<dyn TenantStore>, rooms: Arc<RoomCatalog>) -> Self {
        Self {
            tenant_store,
            rooms,
        }
    }
}

impl CommandHandler<UpdateTenant> for UpdateTenantHandler {
    async fn handle(
        &self,
        ctx: &RequestContext,
        command: UpdateTenant,
    ) -> Result<Tenant, CoreError> {
        let owner_id = ctx.owner_id()?;
        let update = command.patch.into_update(&self.rooms)?;
        let tenant =
            load_owned_tenant(self.tenant_store.as_ref(), owner_id, &command.tenant_id).await?;

        let updated = self
            .tenant_store
            .update(&tenant.id, tenant.version, &update)
            .await?;
        info!(tenant_id = %updated.id, version = updated.version, "Tenant updated");
        Ok(updated)
    }
}

pub async fn handle_update_tenant_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(tenant_id): Path<String>,
    Json(patch): Json<TenantPatch>,
) -> Result<impl IntoResponse, ApplicationError> {
    let handler = UpdateTenantHandler::new(state.tenant_store.clone(), state.rooms.clone());
    let tenant = handler.handle(&ctx, UpdateTenant { tenant_id, patch }).await?;
    Ok(Json(TenantView::new(tenant, state.clock.current_period())))
}
