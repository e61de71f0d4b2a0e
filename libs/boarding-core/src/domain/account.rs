use crate::CoreError;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 6;

/// A landlord account as known to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    /// Trimmed, lower-cased copy ready for storage. Fails on missing fields,
    /// a malformed email or a short password.
    pub fn normalized(&self) -> Result<Registration, CoreError> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(CoreError::Validation("Full name cannot be empty".into()));
        }
        let email = normalize_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(Registration {
            full_name: full_name.to_string(),
            email,
            password: self.password.clone(),
        })
    }
}

pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(CoreError::Validation(format!("Invalid email: {}", email))),
    }
}

pub fn validate_display_name(display_name: &str) -> Result<String, CoreError> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(CoreError::Validation("Display name cannot be empty".into()));
    }
    Ok(display_name.to_string())
}

pub fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, CoreError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| CoreError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(name: &str, email: &str, password: &str) -> Registration {
        Registration {
            full_name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn normalized_trims_and_lowercases() {
        let reg = registration(" Nimal Silva ", " Nimal@Example.COM ", "secret1")
            .normalized()
            .unwrap();
        assert_eq!(reg.full_name, "Nimal Silva");
        assert_eq!(reg.email, "nimal@example.com");
    }

    #[test]
    fn normalized_rejects_incomplete_registration() {
        assert!(registration("", "a@b.com", "secret1").normalized().is_err());
        assert!(registration("A", "not-an-email", "secret1").normalized().is_err());
        assert!(registration("A", "@b.com", "secret1").normalized().is_err());
        assert!(registration("A", "a@b.com", "12345").normalized().is_err());
    }

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_internal_error() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(CoreError::Internal(_))
        ));
    }
}
