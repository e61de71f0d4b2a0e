use crate::AppState;
use crate::application::ApplicationError;
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use boarding_core::{
    Command, CommandHandler, CoreError, IdentityProvider,
    domain::account::{Account, Registration},
    domain::session::RequestContext,
};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Register(pub Registration);

impl Command for Register {
    type Output = Account;
}

pub struct RegisterHandler {
    identity: Arc<dyn IdentityProvider>,
}

impl RegisterHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }
}

impl CommandHandler<Register> for RegisterHandler {
    // Registration is open to anonymous callers.
    async fn handle(
        &self,
        _ctx: &RequestContext,
        command: Register,
    ) -> Result<Account, CoreError> {
        let registration = command.0.normalized()?;
        self.identity.sign_up(&registration).await
    }
}

pub async fn handle_register_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<Registration>,
) -> Result<impl IntoResponse, ApplicationError> {
    let handler = RegisterHandler::new(state.identity.clone());
    let account = handler.handle(&ctx, Register(payload)).await?;
    Ok((StatusCode::CREATED, Json(account)))
}
