use crate::CoreError;
use crate::domain::account::Account;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SESSION_KEY_PREFIX: &str = "session:";

/// A signed-in landlord, as cached under its bearer token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    pub fn issue(account: &Account, token: String, issued_at: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id: account.user_id.clone(),
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            issued_at,
        }
    }

    pub fn cache_key(&self) -> String {
        session_cache_key(&self.token)
    }
}

pub fn session_cache_key(token: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, token)
}

/// Per-request caller context. Every operation receives one explicitly.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    session: Option<Session>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { session: None }
    }

    pub fn authenticated(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// The caller's session, or `NotAuthenticated`.
    pub fn session(&self) -> Result<&Session, CoreError> {
        self.session.as_ref().ok_or(CoreError::NotAuthenticated)
    }

    /// Landlord id of the caller, or `NotAuthenticated`.
    pub fn owner_id(&self) -> Result<&str, CoreError> {
        self.session().map(|s| s.user_id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account {
            user_id: "user-1".into(),
            email: "owner@example.com".into(),
            display_name: "Owner".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_context_is_not_authenticated() {
        let ctx = RequestContext::anonymous();
        assert!(!ctx.is_authenticated());
        assert!(matches!(ctx.session(), Err(CoreError::NotAuthenticated)));
        assert!(matches!(ctx.owner_id(), Err(CoreError::NotAuthenticated)));
    }

    #[test]
    fn authenticated_context_exposes_owner() {
        let session = Session::issue(&account(), "tok".into(), Utc::now());
        let ctx = RequestContext::authenticated(session);
        assert_eq!(ctx.owner_id().unwrap(), "user-1");
        assert_eq!(ctx.session().unwrap().cache_key(), "session:tok");
    }
}
