use crate::AppState;
use crate::application::ApplicationError;
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use boarding_core::{
    Clock, Command, CommandHandler, CoreError, TenantStore,
    domain::room::RoomCatalog,
    domain::session::RequestContext,
    domain::summary::TenantView,
    domain::tenant::{NewTenant, Tenant},
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CreateTenant(pub NewTenant);

impl Command for CreateTenant {
    type Output = Tenant;
}

pub struct CreateTenantHandler {
    tenant_store: Arc<dyn TenantStore>,
    clock: Arc<dyn Clock>,
    rooms: Arc<RoomCatalog>,
}

impl CreateTenantHandler {
    pub fn new(
        tenant_store: Arc<dyn TenantStore>,
        clock: Arc<dyn Clock>,
        rooms: Arc<RoomCatalog>,
    ) -> Self {
        Self {
            tenant_store,
            clock,
            rooms,
        }
    }
}

impl CommandHandler<CreateTenant> for CreateTenantHandler {
    async fn handle(
        &self,
        ctx: &RequestContext,
        command: CreateTenant,
    ) -> Result<Tenant, CoreError> {
        let owner_id = ctx.owner_id()?;
        let tenant = Tenant::create(
            Uuid::new_v4().to_string(),
            owner_id,
            command.0,
            &self.rooms,
            self.clock.now(),
        )?;
        self.tenant_store.insert(tenant.clone()).await?;
        info!(tenant_id = %tenant.id, room_no = %tenant.room_no, "Tenant created");
        Ok(tenant)
    }
}

pub async fn handle_create_tenant_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<NewTenant>,
) -> Result<impl IntoResponse, ApplicationError> {
    let handler = CreateTenantHandler::new(
        state.tenant_store.clone(),
        state.clock.clone(),
        state.rooms.clone(),
    );
    let tenant = handler.handle(&ctx, CreateTenant(payload)).await?;
    let view = TenantView::new(tenant, state.clock.current_period());
    Ok((StatusCode::CREATED, Json(view)))
}
