use crate::AppState;
use crate::application::ApplicationError;
use axum::{Extension, extract::State, http::StatusCode};
use boarding_core::{
    Cache, Command, CommandHandler, CoreError, domain::session::RequestContext,
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct Logout;

impl Command for Logout {
    type Output = ();
}

pub struct LogoutHandler {
    sessions: Arc<dyn Cache>,
}

impl LogoutHandler {
    pub fn new(sessions: Arc<dyn Cache>) -> Self {
        Self { sessions }
    }
}

impl CommandHandler<Logout> for LogoutHandler {
    async fn handle(&self, ctx: &RequestContext, _command: Logout) -> Result<(), CoreError> {
        let session = ctx.session()?;
        self.sessions.delete(&session.cache_key()).await?;
        info!(user_id = %session.user_id, "Landlord signed out");
        Ok(())
    }
}

pub async fn handle_logout_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<StatusCode, ApplicationError> {
    LogoutHandler::new(state.sessions.clone())
        .handle(&ctx, Logout)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::test_support::ctx_for;
    use boarding_core::adapters::InMemoryCache;

    #[tokio::test]
    async fn logout_drops_cached_session() {
        let cache = InMemoryCache::default();
        let ctx = ctx_for("owner-1");
        let key = ctx.session().unwrap().cache_key();
        cache.set(&key, b"{}", None).await.unwrap();

        LogoutHandler::new(Arc::new(cache.clone()))
            .handle(&ctx, Logout)
            .await
            .unwrap();

        assert_eq!(cache.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn logout_without_session_fails() {
        let result = LogoutHandler::new(Arc::new(InMemoryCache::default()))
            .handle(&RequestContext::anonymous(), Logout)
            .await;
        assert!(matches!(result, Err(CoreError::NotAuthenticated)));
    }
}
