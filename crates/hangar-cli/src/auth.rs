//! Password hashing and registration policy.
//!
//! The store only compares digests; producing them is done here, on the
//! caller's side.

use anyhow::{bail, Result};
use hangar_store::Session;
use sha2::{Digest, Sha256};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Hex SHA-256 of the password, as stored in the users collection.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Check a new password against the registration rules.
pub fn check_new_password(password: &str, confirm: Option<&str>) -> Result<()> {
    if let Some(confirm) = confirm {
        if confirm != password {
            bail!("Passwords do not match");
        }
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {MIN_PASSWORD_LEN} characters long");
    }
    Ok(())
}

/// Register a user after checking the password rules.
pub async fn register(
    session: &Session,
    username: &str,
    password: &str,
    confirm: Option<&str>,
) -> Result<()> {
    check_new_password(password, confirm)?;
    if session.user_exists(username).await? {
        bail!("Username already exists");
    }
    session.add_user(username, &hash_password(password)).await?;
    Ok(())
}

/// True when the username exists and the password hashes to the stored digest.
pub async fn login(session: &Session, username: &str, password: &str) -> Result<bool> {
    Ok(session
        .check_credentials(username, &hash_password(password))
        .await?)
}
