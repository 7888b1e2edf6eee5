//! Domain service for user and role administration plus audit log reads.
//!
//! User and role mutations are themselves audited. Deleting a role does not
//! cascade-delete its holders; they are deactivated so their records and
//! attribution survive.

use async_trait::async_trait;

use crate::models::Identity;
use crate::services::dto::{AuditPage, CreateUserInput, RoleInput, RoleRow, TokenizedPage,
    UpdateUserInput, UserRow};
use crate::services::error::DomainError;

#[async_trait]
pub trait AdminService: Send + Sync {
    /// Lists a page of user accounts as a signed envelope, with each user's
    /// role attached. District officers see users of their district only.
    async fn list_users(
        &self,
        identity: &Identity,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<TokenizedPage, DomainError>;

    /// # Errors
    ///
    /// - [`DomainError::Validation`] on a weak password, a taken username, or
    ///   an unknown registration type
    /// - [`DomainError::Integrity`] when the referenced role does not exist
    async fn create_user(
        &self,
        identity: &Identity,
        input: CreateUserInput,
    ) -> Result<UserRow, DomainError>;

    /// Updates an account's role and assignment fields. Username and password
    /// are not updatable through this path.
    async fn update_user(
        &self,
        identity: &Identity,
        uuid: &str,
        input: UpdateUserInput,
    ) -> Result<UserRow, DomainError>;

    /// Soft-deletes an account and deactivates it. Callers cannot delete
    /// their own account.
    async fn delete_user(&self, identity: &Identity, uuid: &str) -> Result<bool, DomainError>;

    /// Roles are a small lookup table; the full live set is returned without
    /// pagination or tokenization.
    async fn list_roles(&self, identity: &Identity) -> Result<Vec<RoleRow>, DomainError>;

    async fn create_role(
        &self,
        identity: &Identity,
        input: RoleInput,
    ) -> Result<RoleRow, DomainError>;

    async fn update_role(
        &self,
        identity: &Identity,
        uuid: &str,
        input: RoleInput,
    ) -> Result<RoleRow, DomainError>;

    /// Soft-deletes a role and deactivates every account still holding it.
    async fn delete_role(&self, identity: &Identity, uuid: &str) -> Result<bool, DomainError>;

    /// Pages through the append-only audit trail, newest first.
    async fn list_audit(
        &self,
        identity: &Identity,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<AuditPage, DomainError>;
}
