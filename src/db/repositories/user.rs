use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;
use crate::models::{Actor, ColumnFilter, PageParams, listing::filter_value};
use crate::services::scope::Scope;

pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role_uuid: String,
    pub registration_type: String,
    pub ic_number: String,
    pub district: String,
    pub control_post: String,
    pub enforcement_only: bool,
}

pub struct UserChanges {
    pub role_uuid: String,
    pub registration_type: String,
    pub ic_number: String,
    pub district: String,
    pub control_post: String,
    pub enforcement_only: bool,
    pub active: bool,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user by username")
    }

    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Uuid.eq(uuid))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user by uuid")
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.conn)
            .await
            .context("Failed to check username")?;
        Ok(count > 0)
    }

    fn filtered(scope: &Scope, filters: &[ColumnFilter]) -> Select<users::Entity> {
        let mut query = users::Entity::find().filter(users::Column::DeletedAt.is_null());

        // Farmer sessions never reach user administration; only the district
        // restriction applies here.
        if let Scope::Post { district, .. } = scope {
            query = query.filter(users::Column::District.eq(district));
        }

        if let Some(username) = filter_value(filters, "username") {
            query = query.filter(users::Column::Username.contains(username));
        }
        if let Some(district) = filter_value(filters, "district") {
            query = query.filter(users::Column::District.contains(district));
        }

        query
    }

    pub async fn list(
        &self,
        scope: &Scope,
        filters: &[ColumnFilter],
        page: PageParams,
    ) -> Result<(Vec<users::Model>, u64)> {
        let paginator = Self::filtered(scope, filters)
            .order_by_desc(users::Column::Id)
            .paginate(&self.conn, page.page_size);

        let count = paginator
            .num_items()
            .await
            .context("Failed to count users")?;
        let rows = paginator
            .fetch_page(page.page_index)
            .await
            .context("Failed to fetch user page")?;

        Ok((rows, count))
    }

    /// Verify password for a user.
    /// Note: This uses `spawn_blocking` because Argon2 hashing is CPU-intensive
    /// and would block the async runtime if run directly.
    pub async fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(false);
        };

        let password_hash = user.password_hash;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    pub async fn insert(
        &self,
        new: NewUser,
        config: &SecurityConfig,
        actor: &Actor,
    ) -> Result<users::Model> {
        let password = new.password;
        let config_owned = config.clone();
        let password_hash =
            task::spawn_blocking(move || hash_password(&password, Some(&config_owned)))
                .await
                .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(new.username),
            password_hash: Set(password_hash),
            role_uuid: Set(new.role_uuid),
            registration_type: Set(new.registration_type),
            ic_number: Set(new.ic_number),
            district: Set(new.district),
            control_post: Set(new.control_post),
            enforcement_only: Set(new.enforcement_only),
            active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            deleted_at: Set(None),
            created_by_uuid: Set(actor.uuid.clone()),
            created_by_username: Set(actor.username.clone()),
            updated_by_uuid: Set(actor.uuid.clone()),
            updated_by_username: Set(actor.username.clone()),
            deleted_by_uuid: Set(None),
            deleted_by_username: Set(None),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")
    }

    /// Username and password are deliberately not updatable through this
    /// path; password changes go through `update_password`.
    pub async fn update(
        &self,
        uuid: &str,
        changes: UserChanges,
        actor: &Actor,
    ) -> Result<Option<users::Model>> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = existing.into();
        active.role_uuid = Set(changes.role_uuid);
        active.registration_type = Set(changes.registration_type);
        active.ic_number = Set(changes.ic_number);
        active.district = Set(changes.district);
        active.control_post = Set(changes.control_post);
        active.enforcement_only = Set(changes.enforcement_only);
        active.active = Set(changes.active);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.updated_by_uuid = Set(actor.uuid.clone());
        active.updated_by_username = Set(actor.username.clone());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update user")?;

        Ok(Some(updated))
    }

    pub async fn update_password(
        &self,
        username: &str,
        new_password: &str,
        config: &SecurityConfig,
        actor: &Actor,
    ) -> Result<()> {
        let user = self
            .get_by_username(username)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found: {username}"))?;

        let password = new_password.to_string();
        let config_owned = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, Some(&config_owned)))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.updated_by_uuid = Set(actor.uuid.clone());
        active.updated_by_username = Set(actor.username.clone());
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn soft_delete(&self, uuid: &str, actor: &Actor) -> Result<Option<users::Model>> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(None);
        };

        let snapshot = existing.clone();

        let mut active: users::ActiveModel = existing.into();
        active.active = Set(false);
        active.deleted_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.deleted_by_uuid = Set(Some(actor.uuid.clone()));
        active.deleted_by_username = Set(Some(actor.username.clone()));

        active
            .update(&self.conn)
            .await
            .context("Failed to soft-delete user")?;

        Ok(Some(snapshot))
    }

    /// Deleting a role strands its users; they are deactivated rather than
    /// deleted so their records and attribution survive.
    pub async fn deactivate_by_role(&self, role_uuid: &str, actor: &Actor) -> Result<u64> {
        let holders = users::Entity::find()
            .filter(users::Column::RoleUuid.eq(role_uuid))
            .filter(users::Column::DeletedAt.is_null())
            .all(&self.conn)
            .await
            .context("Failed to query role holders")?;

        let count = holders.len() as u64;
        let now = chrono::Utc::now().to_rfc3339();

        for user in holders {
            let mut active: users::ActiveModel = user.into();
            active.active = Set(false);
            active.updated_at = Set(now.clone());
            active.updated_by_uuid = Set(actor.uuid.clone());
            active.updated_by_username = Set(actor.username.clone());
            active
                .update(&self.conn)
                .await
                .context("Failed to deactivate role holder")?;
        }

        Ok(count)
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
