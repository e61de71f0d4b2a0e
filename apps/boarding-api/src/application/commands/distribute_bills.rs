use crate::AppState;
use crate::application::ApplicationError;
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use boarding_core::{
    Clock, Command, CommandHandler, CoreError, TenantStore,
    domain::billing::{BillSplit, UtilityTotals, plan_distribution},
    domain::room::RoomCatalog,
    domain::session::RequestContext,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Split a room's utility bills evenly across its current tenants.
/// Totals stay loosely typed until the handler validates them, so text input
/// surfaces as `InvalidAmount` rather than a decoding failure.
#[derive(Debug, Clone)]
pub struct DistributeBills {
    pub room_no: String,
    pub total_electricity: Value,
    pub total_water: Value,
}

impl Command for DistributeBills {
    type Output = BillSplit;
}

pub struct DistributeBillsHandler {
    tenant_store: Arc<dyn TenantStore>,
    clock: Arc<dyn Clock>,
    rooms: Arc<RoomCatalog>,
}

impl DistributeBillsHandler {
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

impl CommandHandler<DistributeBills> for DistributeBillsHandler {
    async fn handle(
        &self,
        ctx: &RequestContext,
        command: DistributeBills,
    ) -> Result<BillSplit, CoreError> {
        let owner_id = ctx.owner_id()?;
        let totals = UtilityTotals::from_json(&command.total_electricity, &command.total_water)?;
        let room_no = self.rooms.parse(&command.room_no)?;

        let occupants = self.tenant_store.list_by_room(owner_id, &room_no).await?;
        let period = self.clock.current_period();
        let plan = plan_distribution(&room_no, totals, &occupants, period)?;

        self.tenant_store.commit(&plan.batch).await?;
        info!(
            room_no = %room_no,
            period = %period,
            tenants = plan.split.tenant_count,
            "Distributed utility bills"
        );
        Ok(plan.split)
    }
}

// --- DTO for the HTTP Request ---

#[derive(Deserialize, Debug)]
pub struct DistributeBillsRequest {
    #[serde(default)]
    total_electricity: Value,
    #[serde(default)]
    total_water: Value,
}

// --- Axum Route Handler ---

pub async fn handle_distribute_bills_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(room_no): Path<String>,
    Json(payload): Json<DistributeBillsRequest>,
) -> Result<impl IntoResponse, ApplicationError> {
    let handler = DistributeBillsHandler::new(
        state.tenant_store.clone(),
        state.clock.clone(),
        state.rooms.clone(),
    );
    let command = DistributeBills {
        room_no,
        total_electricity: payload.total_electricity,
        total_water: payload.total_water,
    };
    let split = handler.handle(&ctx, command).await?;
    Ok(Json(split))
}
