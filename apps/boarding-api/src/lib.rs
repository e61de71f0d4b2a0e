use axum::{
    Json, Router,
    middleware,
    routing::{get, post},
};
use boarding_core::{
    Cache, Clock, IdentityProvider, TenantStore,
    adapters::{InMemoryCache, InMemoryIdentityProvider, InMemoryTenantStore},
    domain::room::RoomCatalog,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod application;
pub mod config;

use application::{
    commands::{
        clear_payment::handle_clear_payment_request, create_tenant::handle_create_tenant_request,
        delete_tenant::handle_delete_tenant_request,
        distribute_bills::handle_distribute_bills_request, login::handle_login_request,
        logout::handle_logout_request, mark_paid::handle_mark_paid_request,
        register::handle_register_request, update_profile::handle_update_profile_request,
        update_tenant::handle_update_tenant_request,
    },
    middleware::resolve_session,
    query::{
        handle_dashboard, handle_get_profile, handle_get_tenant, handle_list_room_tenants,
        handle_list_rooms, handle_list_tenants,
    },
};

// Holds shared dependencies
#[derive(Clone)]
pub struct AppState {
    pub tenant_store: Arc<dyn TenantStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: Arc<dyn Cache>,
    pub clock: Arc<dyn Clock>,
    pub rooms: Arc<RoomCatalog>,
    pub session_ttl_seconds: u64,
}

impl AppState {
    /// State wired to the in-memory adapters. Used when no database is configured and by tests.
    pub fn in_memory(rooms: RoomCatalog, clock: Arc<dyn Clock>, session_ttl_seconds: u64) -> Self {
        Self {
            tenant_store: Arc::new(InMemoryTenantStore::new()),
            identity: Arc::new(InMemoryIdentityProvider::new()),
            sessions: Arc::new(InMemoryCache::new(10_000, session_ttl_seconds)),
            clock,
            rooms: Arc::new(rooms),
            session_ttl_seconds,
        }
    }
}

pub fn create_app(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/register", post(handle_register_request))
        .route("/auth/login", post(handle_login_request))
        .route("/auth/logout", post(handle_logout_request))
        .route(
            "/profile",
            get(handle_get_profile).put(handle_update_profile_request),
        )
        .route(
            "/tenants",
            get(handle_list_tenants).post(handle_create_tenant_request),
        )
        .route(
            "/tenants/{id}",
            get(handle_get_tenant)
                .patch(handle_update_tenant_request)
                .delete(handle_delete_tenant_request),
        )
        .route(
            "/tenants/{id}/payments",
            post(handle_mark_paid_request).delete(handle_clear_payment_request),
        )
        .route("/rooms", get(handle_list_rooms))
        .route("/rooms/{room_no}/tenants", get(handle_list_room_tenants))
        .route("/rooms/{room_no}/bills", post(handle_distribute_bills_request))
        .route("/dashboard", get(handle_dashboard))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            resolve_session,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
