use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use boarding_core::domain::session::{RequestContext, Session, session_cache_key};
use tracing::{debug, warn};

use super::ApplicationError;
use crate::AppState;

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the bearer token (if any) into a [`RequestContext`] and attach it to
/// the request. Unknown tokens yield an anonymous context; handlers that need a
/// session reject it themselves.
pub async fn resolve_session(
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = match bearer_token(&req) {
        Some(token) => match app_state.sessions.get(&session_cache_key(token)).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Session>(&bytes) {
                Ok(session) => {
                    debug!(user_id = %session.user_id, "Session resolved");
                    RequestContext::authenticated(session)
                }
                Err(e) => {
                    warn!("Discarding unreadable cached session: {}", e);
                    RequestContext::anonymous()
                }
            },
            Ok(None) => {
                debug!("Bearer token has no live session");
                RequestContext::anonymous()
            }
            Err(e) => return ApplicationError::from(e).into_response(),
        },
        None => RequestContext::anonymous(),
    };

    req.extensions_mut().insert(ctx);
    next.run(req).await
}
