use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand_core::OsRng;
use tracing::info;

use lateshow_db::Database;
use lateshow_types::models::UserId;

use crate::error::ApiError;

/// Users and their Argon2id password hashes.
///
/// Hashing is deliberately slow; call these methods from a blocking task.
pub struct CredentialStore {
    db: Arc<Database>,
    /// Verified against when the username is unknown, so a miss costs the
    /// same as a wrong password.
    dummy_hash: String,
}

impl CredentialStore {
    pub fn new(db: Arc<Database>) -> anyhow::Result<Self> {
        let dummy_hash = hash_password("lateshow-dummy-password")?;
        Ok(Self { db, dummy_hash })
    }

    pub fn register(&self, username: &str, password: &str) -> Result<UserId, ApiError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ApiError::InvalidInput("Username and password required".into()));
        }

        let password_hash = hash_password(password)?;

        let user_id = self
            .db
            .create_user(username, &password_hash)?
            .ok_or(ApiError::DuplicateUsername)?;

        info!("Registered user {} ({})", username, user_id);
        Ok(user_id)
    }

    pub fn verify(&self, username: &str, password: &str) -> Result<UserId, ApiError> {
        let Some(user) = self.db.get_user_by_username(username)? else {
            // Burn the same Argon2 work as a real check before failing.
            let _ = check_password(&self.dummy_hash, password);
            return Err(ApiError::InvalidCredentials);
        };

        if !check_password(&user.password_hash, password)? {
            return Err(ApiError::InvalidCredentials);
        }

        Ok(user.id)
    }
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// Argon2 compares the derived digest in constant time.
fn check_password(stored_hash: &str, password: &str) -> anyhow::Result<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("Stored password hash is corrupt: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
