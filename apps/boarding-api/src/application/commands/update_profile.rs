use crate::AppState;
use crate::application::ApplicationError;
use crate::application::commands::login::store_session;
use axum::{Extension, Json, extract::State, response::IntoResponse};
use boarding_core::{
    Cache, Command, CommandHandler, CoreError, IdentityProvider,
    domain::account::Account,
    domain::session::{RequestContext, Session},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDisplayName {
    pub display_name: String,
}

impl Command for UpdateDisplayName {
    type Output = Account;
}

pub struct UpdateProfileHandler {
    identity: Arc<dyn IdentityProvider>,
    sessions: Arc<dyn Cache>,
    session_ttl_seconds: u64,
}

impl UpdateProfileHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        sessions: Arc<dyn Cache>,
        session_ttl_seconds: u64,
    ) -> Self {
        Self {
            identity,
            sessions,
            session_ttl_seconds,
        }
    }
}

impl CommandHandler<UpdateDisplayName> for UpdateProfileHandler {
    async fn handle(
        &self,
        ctx: &RequestContext,
        command: UpdateDisplayName,
    ) -> Result<Account, CoreError> {
        let session = ctx.session()?;
        let account = self
            .identity
            .update_display_name(&session.user_id, &command.display_name)
            .await?;

        // Keep the cached session in step with the account
        let refreshed = Session {
            display_name: account.display_name.clone(),
            ..session.clone()
        };
        store_session(self.sessions.as_ref(), &refreshed, self.session_ttl_seconds).await?;

        info!(user_id = %account.user_id, "Display name updated");
        Ok(account)
    }
}

pub async fn handle_update_profile_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<UpdateDisplayName>,
) -> Result<impl IntoResponse, ApplicationError> {
    let handler = UpdateProfileHandler::new(
        state.identity.clone(),
        state.sessions.clone(),
        state.session_ttl_seconds,
    );
    let account = handler.handle(&ctx, payload).await?;
    Ok(Json(account))
}
