use crate::AppState;
use crate::application::ApplicationError;
use axum::{Extension, Json, extract::State, response::IntoResponse};
use boarding_core::{
    Cache, Clock, Command, CommandHandler, CoreError, IdentityProvider,
    domain::session::{RequestContext, Session},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl Command for Login {
    type Output = Session;
}

pub struct LoginHandler {
    identity: Arc<dyn IdentityProvider>,
    sessions: Arc<dyn Cache>,
    clock: Arc<dyn Clock>,
    session_ttl_seconds: u64,
}

impl LoginHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        sessions: Arc<dyn Cache>,
        clock: Arc<dyn Clock>,
        session_ttl_seconds: u64,
    ) -> Self {
        Self {
            identity,
            sessions,
            clock,
            session_ttl_seconds,
        }
    }
}

/// Write a session into the cache under its token.
pub(crate) async fn store_session(
    sessions: &dyn Cache,
    session: &Session,
    ttl_seconds: u64,
) -> Result<(), CoreError> {
    let bytes = serde_json::to_vec(session)
        .map_err(|e| CoreError::Internal(format!("Failed to encode session: {}", e)))?;
    sessions
        .set(&session.cache_key(), &bytes, Some(ttl_seconds))
        .await
}

impl CommandHandler<Login> for LoginHandler {
    async fn handle(&self, _ctx: &RequestContext, command: Login) -> Result<Session, CoreError> {
        if command.email.trim().is_empty() || command.password.is_empty() {
            return Err(CoreError::Validation("Email and password are required".into()));
        }
        let account = self
            .identity
            .sign_in(&command.email, &command.password)
            .await?;

        let session = Session::issue(&account, Uuid::new_v4().to_string(), self.clock.now());
        store_session(self.sessions.as_ref(), &session, self.session_ttl_seconds).await?;

        info!(user_id = %account.user_id, "Landlord signed in");
        Ok(session)
    }
}

pub async fn handle_login_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<Login>,
) -> Result<impl IntoResponse, ApplicationError> {
    let handler = LoginHandler::new(
        state.identity.clone(),
        state.sessions.clone(),
        state.clock.clone(),
        state.session_ttl_seconds,
    );
    let session = handler.handle(&ctx, payload).await?;
    Ok(Json(session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::test_support::clock;
    use boarding_core::adapters::{InMemoryCache, InMemoryIdentityProvider};
    use boarding_core::domain::account::Registration;

    async fn setup() -> (LoginHandler, InMemoryCache) {
        let identity = InMemoryIdentityProvider::new();
        identity
            .sign_up(&Registration {
                full_name: "Nimal".into(),
                email: "nimal@example.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        let cache = InMemoryCache::default();
        let handler = LoginHandler::new(Arc::new(identity), Arc::new(cache.clone()), clock(), 60);
        (handler, cache)
    }

    #[tokio::test]
    async fn login_caches_session_under_token() {
        let (handler, cache) = setup().await;

        let session = handler
            .handle(
                &RequestContext::anonymous(),
                Login {
                    email: "Nimal@example.com".into(),
                    password: "secret1".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(session.display_name, "Nimal");
        let bytes = cache.get(&session.cache_key()).await.unwrap().unwrap();
        let cached: Session = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(cached, session);
    }

    #[tokio::test]
    async fn wrong_password_issues_nothing() {
        let (handler, _cache) = setup().await;
        let result = handler
            .handle(
                &RequestContext::anonymous(),
                Login {
                    email: "nimal@example.com".into(),
                    password: "nope-nope".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(CoreError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn blank_fields_are_validation_errors() {
        let (handler, _cache) = setup().await;
        let result = handler
            .handle(
                &RequestContext::anonymous(),
                Login {
                    email: " ".into(),
                    password: "".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
