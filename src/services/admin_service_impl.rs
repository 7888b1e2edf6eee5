//! `SeaORM` implementation of [`AdminService`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::constants::registration;
use crate::db::relations::attach_relation;
use crate::db::{AuditAction, NewRole, NewUser, RoleChanges, Store, UserChanges};
use crate::entities::users;
use crate::models::{Identity, PageParams, listing::parse_filters};
use crate::services::admin_service::AdminService;
use crate::services::auth_service::validate_password_strength;
use crate::services::dto::{AuditPage, AuditRow, CreateUserInput, RoleInput, RoleRef, RoleRow,
    TokenizedPage, UpdateUserInput, UserRow, tokenize};
use crate::services::envelope::Envelope;
use crate::services::error::DomainError;
use crate::services::policy::{Action, Resource, authorize};
use crate::services::scope::{Scope, scope_for};

pub struct SeaOrmAdminService {
    store: Arc<Store>,
    envelope: Arc<Envelope>,
    security: SecurityConfig,
}

impl SeaOrmAdminService {
    #[must_use]
    pub fn new(store: Arc<Store>, envelope: Arc<Envelope>, security: SecurityConfig) -> Self {
        Self {
            store,
            envelope,
            security,
        }
    }

    fn validate_registration_type(registration_type: &str) -> Result<(), DomainError> {
        if registration_type == registration::OFFICER
            || registration_type == registration::FARMER
        {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "Unknown registration type: {registration_type}"
            )))
        }
    }

    async fn require_role(&self, role_uuid: &str) -> Result<(), DomainError> {
        self.store
            .get_role_by_uuid(role_uuid)
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::Integrity("Role not found".to_string()))
    }

    /// Mirrors the listing predicate: district-scoped callers only see, and
    /// therefore only mutate, accounts in their own district. An account
    /// outside that boundary behaves as absent.
    fn scope_permits(scope: &Scope, user: &users::Model) -> bool {
        match scope {
            Scope::Post { district, .. } => user.district == *district,
            Scope::Unrestricted | Scope::Companies(_) => true,
        }
    }

    async fn visible_user(
        &self,
        identity: &Identity,
        uuid: &str,
    ) -> Result<users::Model, DomainError> {
        self.store
            .get_user_by_uuid(uuid)
            .await?
            .filter(|u| Self::scope_permits(&scope_for(identity, None), u))
            .ok_or_else(|| DomainError::Integrity("User not found".to_string()))
    }

    async fn attach_roles(&self, rows: &mut [UserRow]) -> Result<(), DomainError> {
        attach_relation(
            rows,
            |r| Some(r.role_uuid.clone()),
            |uuids| async move {
                self.store
                    .get_roles_by_uuids(&uuids)
                    .await
                    .map_err(DomainError::from)
            },
            |r, role| r.role = role.map(RoleRef::from).unwrap_or_default(),
        )
        .await
    }

    async fn audit<T: serde::Serialize>(
        &self,
        resource: Resource,
        action: AuditAction,
        entity_uuid: &str,
        snapshot: &T,
        identity: &Identity,
    ) -> Result<(), DomainError> {
        let snapshot = serde_json::to_value(snapshot)
            .map_err(|e| DomainError::Internal(format!("Failed to snapshot record: {e}")))?;
        self.store
            .append_audit(
                &resource.to_string(),
                entity_uuid,
                action,
                &snapshot,
                &identity.actor(),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl AdminService for SeaOrmAdminService {
    async fn list_users(
        &self,
        identity: &Identity,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<TokenizedPage, DomainError> {
        authorize(identity, Resource::User, Action::Read)?;

        let filters = parse_filters(filters)?;
        let page = PageParams::new(page_index, page_size);
        let scope = scope_for(identity, None);

        let (models, count) = self.store.list_users(&scope, &filters, page).await?;

        let mut rows: Vec<UserRow> = models.into_iter().map(UserRow::from).collect();
        self.attach_roles(&mut rows).await?;

        tokenize(&self.envelope, &rows, count)
    }

    async fn create_user(
        &self,
        identity: &Identity,
        input: CreateUserInput,
    ) -> Result<UserRow, DomainError> {
        authorize(identity, Resource::User, Action::Create)?;

        if input.username.trim().is_empty() {
            return Err(DomainError::Validation("Username is required".to_string()));
        }
        validate_password_strength(&input.password)?;
        Self::validate_registration_type(&input.registration_type)?;
        self.require_role(&input.role_uuid).await?;

        if self.store.username_exists(&input.username).await? {
            return Err(DomainError::Validation(
                "Username already exists".to_string(),
            ));
        }

        let created = self
            .store
            .create_user(
                NewUser {
                    username: input.username,
                    password: input.password,
                    role_uuid: input.role_uuid,
                    registration_type: input.registration_type,
                    ic_number: input.ic_number,
                    district: input.district,
                    control_post: input.control_post,
                    enforcement_only: input.enforcement_only,
                },
                &self.security,
                &identity.actor(),
            )
            .await?;

        let mut rows = vec![UserRow::from(created)];
        self.attach_roles(&mut rows).await?;
        let row = rows.remove(0);

        self.audit(Resource::User, AuditAction::Create, &row.uuid, &row, identity)
            .await?;
        info!(username = %row.username, "User account created");
        Ok(row)
    }

    async fn update_user(
        &self,
        identity: &Identity,
        uuid: &str,
        input: UpdateUserInput,
    ) -> Result<UserRow, DomainError> {
        authorize(identity, Resource::User, Action::Update)?;
        self.visible_user(identity, uuid).await?;

        Self::validate_registration_type(&input.registration_type)?;
        self.require_role(&input.role_uuid).await?;

        let updated = self
            .store
            .update_user(
                uuid,
                UserChanges {
                    role_uuid: input.role_uuid,
                    registration_type: input.registration_type,
                    ic_number: input.ic_number,
                    district: input.district,
                    control_post: input.control_post,
                    enforcement_only: input.enforcement_only,
                    active: input.active,
                },
                &identity.actor(),
            )
            .await?
            .ok_or_else(|| DomainError::Integrity("User not found".to_string()))?;

        let mut rows = vec![UserRow::from(updated)];
        self.attach_roles(&mut rows).await?;
        let row = rows.remove(0);

        self.audit(Resource::User, AuditAction::Update, &row.uuid, &row, identity)
            .await?;
        Ok(row)
    }

    async fn delete_user(&self, identity: &Identity, uuid: &str) -> Result<bool, DomainError> {
        authorize(identity, Resource::User, Action::Delete)?;

        if uuid == identity.user_uuid {
            return Err(DomainError::Validation(
                "You cannot delete your own account".to_string(),
            ));
        }

        self.visible_user(identity, uuid).await?;

        let snapshot = self
            .store
            .soft_delete_user(uuid, &identity.actor())
            .await?
            .ok_or_else(|| DomainError::Integrity("User not found".to_string()))?;

        let row = UserRow::from(snapshot);
        self.audit(Resource::User, AuditAction::Delete, &row.uuid, &row, identity)
            .await?;
        info!(username = %row.username, "User account deleted");
        Ok(true)
    }

    async fn list_roles(&self, identity: &Identity) -> Result<Vec<RoleRow>, DomainError> {
        authorize(identity, Resource::Role, Action::Read)?;

        let models = self.store.list_roles().await?;
        Ok(models.into_iter().map(RoleRow::from).collect())
    }

    async fn create_role(
        &self,
        identity: &Identity,
        input: RoleInput,
    ) -> Result<RoleRow, DomainError> {
        authorize(identity, Resource::Role, Action::Create)?;

        if input.name.trim().is_empty() {
            return Err(DomainError::Validation("Role name is required".to_string()));
        }
        if self.store.get_role_by_name(&input.name).await?.is_some() {
            return Err(DomainError::Validation(
                "Role name already exists".to_string(),
            ));
        }

        let created = self
            .store
            .create_role(
                NewRole {
                    name: input.name,
                    privileges: input.privileges,
                },
                &identity.actor(),
            )
            .await?;

        let row = RoleRow::from(created);
        self.audit(Resource::Role, AuditAction::Create, &row.uuid, &row, identity)
            .await?;
        info!(name = %row.name, "Role created");
        Ok(row)
    }

    async fn update_role(
        &self,
        identity: &Identity,
        uuid: &str,
        input: RoleInput,
    ) -> Result<RoleRow, DomainError> {
        authorize(identity, Resource::Role, Action::Update)?;

        if input.name.trim().is_empty() {
            return Err(DomainError::Validation("Role name is required".to_string()));
        }

        let updated = self
            .store
            .update_role(
                uuid,
                RoleChanges {
                    name: input.name,
                    privileges: input.privileges,
                },
                &identity.actor(),
            )
            .await?
            .ok_or_else(|| DomainError::Integrity("Role not found".to_string()))?;

        let row = RoleRow::from(updated);
        self.audit(Resource::Role, AuditAction::Update, &row.uuid, &row, identity)
            .await?;
        Ok(row)
    }

    async fn delete_role(&self, identity: &Identity, uuid: &str) -> Result<bool, DomainError> {
        authorize(identity, Resource::Role, Action::Delete)?;

        let snapshot = self
            .store
            .soft_delete_role(uuid, &identity.actor())
            .await?
            .ok_or_else(|| DomainError::Integrity("Role not found".to_string()))?;

        let deactivated = self
            .store
            .deactivate_users_by_role(uuid, &identity.actor())
            .await?;

        let row = RoleRow::from(snapshot);
        self.audit(Resource::Role, AuditAction::Delete, &row.uuid, &row, identity)
            .await?;
        info!(name = %row.name, deactivated, "Role deleted; holders deactivated");
        Ok(true)
    }

    async fn list_audit(
        &self,
        identity: &Identity,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<AuditPage, DomainError> {
        authorize(identity, Resource::AuditLog, Action::Read)?;

        let filters = parse_filters(filters)?;
        let page = PageParams::new(page_index, page_size);

        let (models, count) = self.store.list_audit(&filters, page).await?;
        Ok(AuditPage {
            count,
            rows: models.into_iter().map(AuditRow::from).collect(),
        })
    }
}
