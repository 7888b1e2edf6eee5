//! `SeaORM` implementation of [`AuthService`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::constants::registration;
use crate::db::{Store, parse_privileges};
use crate::models::{CallerClass, Identity};
use crate::services::auth_service::{AuthService, validate_password_strength};
use crate::services::dto::{RoleRef, UserRow};
use crate::services::envelope::Envelope;
use crate::services::error::DomainError;
use crate::services::policy::WILDCARD_PRIVILEGE;
use crate::services::rate_limit::LoginThrottle;

const BAD_CREDENTIALS: &str = "Invalid username or password";

pub struct SeaOrmAuthService {
    store: Arc<Store>,
    envelope: Arc<Envelope>,
    throttle: Arc<LoginThrottle>,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Arc<Store>,
        envelope: Arc<Envelope>,
        throttle: Arc<LoginThrottle>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            store,
            envelope,
            throttle,
            security,
        }
    }

    /// Resolves the visibility class for a freshly authenticated user.
    /// Wildcard privilege holders are unrestricted regardless of their
    /// registration type; farmers get their company links resolved here.
    async fn resolve_class(
        &self,
        user: &crate::entities::users::Model,
        privileges: &[String],
    ) -> Result<CallerClass, DomainError> {
        if privileges.iter().any(|p| p == WILDCARD_PRIVILEGE) {
            return Ok(CallerClass::Root);
        }

        if user.registration_type == registration::FARMER {
            let company_uuids = self.store.company_uuids_for_ic(&user.ic_number).await?;
            return Ok(CallerClass::Farmer {
                ic_number: user.ic_number.clone(),
                company_uuids,
            });
        }

        Ok(CallerClass::Officer {
            district: user.district.clone(),
            control_post: user.control_post.clone(),
            enforcement_only: user.enforcement_only,
        })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<String, DomainError> {
        self.throttle.check(username)?;

        let user = self.store.get_user_by_username(username).await?;

        let Some(user) = user.filter(|u| u.active) else {
            self.throttle.record_failure(username);
            warn!(username, "Login attempt for unknown or inactive account");
            return Err(DomainError::Validation(BAD_CREDENTIALS.to_string()));
        };

        if !self.store.verify_user_password(username, password).await? {
            self.throttle.record_failure(username);
            warn!(username, "Login attempt with wrong password");
            return Err(DomainError::Validation(BAD_CREDENTIALS.to_string()));
        }

        self.throttle.clear(username);
        self.envelope.sign_hop(&user.uuid)
    }

    async fn login(&self, hop_token: &str) -> Result<Identity, DomainError> {
        let user_uuid = self.envelope.verify_hop(hop_token)?;

        let user = self
            .store
            .get_user_by_uuid(&user_uuid)
            .await?
            .filter(|u| u.active)
            .ok_or(DomainError::Authentication)?;

        let privileges = match self.store.get_role_by_uuid(&user.role_uuid).await? {
            Some(role) => parse_privileges(&role.privileges),
            None => {
                warn!(username = %user.username, "User holds a deleted role; no privileges");
                Vec::new()
            }
        };

        let class = self.resolve_class(&user, &privileges).await?;

        info!(username = %user.username, "Login");

        Ok(Identity {
            user_uuid: user.uuid,
            username: user.username,
            privileges,
            class,
        })
    }

    async fn change_password(
        &self,
        identity: &Identity,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        validate_password_strength(new_password)?;

        if !self
            .store
            .verify_user_password(&identity.username, current_password)
            .await?
        {
            return Err(DomainError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(
                &identity.username,
                new_password,
                &self.security,
                &identity.actor(),
            )
            .await?;

        info!(username = %identity.username, "Password changed");
        Ok(())
    }

    async fn current_user(&self, identity: &Identity) -> Result<UserRow, DomainError> {
        let user = self
            .store
            .get_user_by_uuid(&identity.user_uuid)
            .await?
            .ok_or(DomainError::Authentication)?;

        let role_uuid = user.role_uuid.clone();
        let mut row = UserRow::from(user);
        if let Some(role) = self.store.get_role_by_uuid(&role_uuid).await? {
            row.role = RoleRef::from(&role);
        }

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("abcde123").is_ok());
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("onlyletters").is_err());
        assert!(validate_password_strength("12345678").is_err());
    }
}
