//! Domain service for the two-step login flow and session-holder operations.
//!
//! Login happens in two hops: `verify_credentials` checks the password and
//! hands back a short-lived signed token; `login` exchanges that token for a
//! fully resolved [`Identity`], which the transport layer stores in the cookie
//! session. Splitting the steps keeps the expensive identity resolution
//! (role privileges, farmer company links) off the throttled password path.

use async_trait::async_trait;

use crate::models::Identity;
use crate::services::dto::UserRow;
use crate::services::error::DomainError;

/// Minimum length plus at-least-one-letter and at-least-one-digit; applied to
/// every password accepted by the system.
pub fn validate_password_strength(password: &str) -> Result<(), DomainError> {
    let long_enough = password.chars().count() >= 8;
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_letter && has_digit {
        Ok(())
    } else {
        Err(DomainError::Validation(
            "Password must be at least 8 characters and contain letters and digits".to_string(),
        ))
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Checks a username/password pair and issues the short-lived login hop
    /// token carrying the user's UUID.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] on a wrong password, an unknown or
    ///   deactivated account, or an exhausted attempt budget. The message does
    ///   not distinguish the first three cases.
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<String, DomainError>;

    /// Exchanges a hop token for the caller's resolved identity. Farmer
    /// company links and role privileges are resolved here, once per login.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Token`] if the hop token is expired or invalid
    /// - [`DomainError::Authentication`] if the account vanished or was
    ///   deactivated between the two steps
    async fn login(&self, hop_token: &str) -> Result<Identity, DomainError>;

    /// Changes the caller's own password after re-checking the current one.
    async fn change_password(
        &self,
        identity: &Identity,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError>;

    /// The caller's own account record, with its role attached.
    async fn current_user(&self, identity: &Identity) -> Result<UserRow, DomainError>;
}
