use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use boarding_core::{
    Clock, CoreError, IdentityProvider, TenantStore,
    domain::account::Account,
    domain::room::RoomCatalog,
    domain::session::RequestContext,
    domain::summary::{DashboardSummary, RoomSummary, TenantView, matches_search, summarize_rooms},
    domain::tenant::Tenant,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use super::ApplicationError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TenantSearch {
    pub search: Option<String>,
}

/// Read side of the tenant directory, always scoped to the caller.
pub struct TenantQueries {
    tenant_store: Arc<dyn TenantStore>,
    clock: Arc<dyn Clock>,
    rooms: Arc<RoomCatalog>,
}

fn sorted_views(mut tenants: Vec<Tenant>, clock: &dyn Clock) -> Vec<TenantView> {
    tenants.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    let period = clock.current_period();
    tenants
        .into_iter()
        .map(|t| TenantView::new(t, period))
        .collect()
}

impl TenantQueries {
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

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.tenant_store.clone(),
            state.clock.clone(),
            state.rooms.clone(),
        )
    }

    pub async fn list_tenants(
        &self,
        ctx: &RequestContext,
        search: Option<&str>,
    ) -> Result<Vec<TenantView>, CoreError> {
        let owner_id = ctx.owner_id()?;
        let mut tenants = self.tenant_store.list_by_owner(owner_id).await?;
        if let Some(search) = search {
            tenants.retain(|t| matches_search(t, search));
        }
        debug!(count = tenants.len(), "Listed tenants");
        Ok(sorted_views(tenants, self.clock.as_ref()))
    }

    pub async fn get_tenant(
        &self,
        ctx: &RequestContext,
        tenant_id: &str,
    ) -> Result<TenantView, CoreError> {
        let owner_id = ctx.owner_id()?;
        let tenant =
            super::commands::load_owned_tenant(self.tenant_store.as_ref(), owner_id, tenant_id)
                .await?;
        Ok(TenantView::new(tenant, self.clock.current_period()))
    }

    pub async fn list_room_tenants(
        &self,
        ctx: &RequestContext,
        room_no: &str,
    ) -> Result<Vec<TenantView>, CoreError> {
        let owner_id = ctx.owner_id()?;
        let room_no = self.rooms.parse(room_no)?;
        let tenants = self.tenant_store.list_by_room(owner_id, &room_no).await?;
        Ok(sorted_views(tenants, self.clock.as_ref()))
    }

    pub async fn list_rooms(&self, ctx: &RequestContext) -> Result<Vec<RoomSummary>, CoreError> {
        let owner_id = ctx.owner_id()?;
        let tenants = self.tenant_store.list_by_owner(owner_id).await?;
        Ok(summarize_rooms(
            &self.rooms,
            &tenants,
            self.clock.current_period(),
        ))
    }

    pub async fn dashboard(&self, ctx: &RequestContext) -> Result<DashboardSummary, CoreError> {
        let owner_id = ctx.owner_id()?;
        let tenants = self.tenant_store.list_by_owner(owner_id).await?;
        Ok(DashboardSummary::from_tenants(
            &tenants,
            self.clock.current_period(),
        ))
    }
}

pub async fn profile(
    identity: &dyn IdentityProvider,
    ctx: &RequestContext,
) -> Result<Account, CoreError> {
    let owner_id = ctx.owner_id()?;
    identity
        .get_account(owner_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Account {}", owner_id)))
}

// GET /api/tenants?search=
pub async fn handle_list_tenants(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Query(params): Query<TenantSearch>,
) -> Result<Json<Vec<TenantView>>, ApplicationError> {
    let views = TenantQueries::from_state(&state)
        .list_tenants(&ctx, params.search.as_deref())
        .await?;
    Ok(Json(views))
}

// GET /api/tenants/{id}
pub async fn handle_get_tenant(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(tenant_id): Path<String>,
) -> Result<Json<TenantView>, ApplicationError> {
    let view = TenantQueries::from_state(&state)
        .get_tenant(&ctx, &tenant_id)
        .await?;
    Ok(Json(view))
}

// GET /api/rooms/{room_no}/tenants
pub async fn handle_list_room_tenants(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(room_no): Path<String>,
) -> Result<Json<Vec<TenantView>>, ApplicationError> {
    let views = TenantQueries::from_state(&state)
        .list_room_tenants(&ctx, &room_no)
        .await?;
    Ok(Json(views))
}

// GET /api/rooms
pub async fn handle_list_rooms(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<RoomSummary>>, ApplicationError> {
    let rooms = TenantQueries::from_state(&state).list_rooms(&ctx).await?;
    Ok(Json(rooms))
}

// GET /api/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<DashboardSummary>, ApplicationError> {
    let summary = TenantQueries::from_state(&state).dashboard(&ctx).await?;
    Ok(Json(summary))
}

// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Account>, ApplicationError> {
    let account = profile(state.identity.as_ref(), &ctx).await?;
    Ok(Json(account))
}
