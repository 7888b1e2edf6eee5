use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set};

use crate::db::relations::UuidKeyed;
use crate::entities::roles;
use crate::models::Actor;

impl UuidKeyed for roles::Model {
    fn uuid_key(&self) -> &str {
        &self.uuid
    }
}

pub struct NewRole {
    pub name: String,
    pub privileges: Vec<String>,
}

pub struct RoleChanges {
    pub name: String,
    pub privileges: Vec<String>,
}

/// Decodes the JSON privilege list stored on a role row. Unreadable data
/// degrades to no privileges rather than a panic.
#[must_use]
pub fn parse_privileges(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub struct RoleRepository {
    conn: DatabaseConnection,
}

impl RoleRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_all(&self) -> Result<Vec<roles::Model>> {
        roles::Entity::find()
            .filter(roles::Column::DeletedAt.is_null())
            .order_by_asc(roles::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list roles")
    }

    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<roles::Model>> {
        roles::Entity::find()
            .filter(roles::Column::Uuid.eq(uuid))
            .filter(roles::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query role by uuid")
    }

    pub async fn get_by_uuids(&self, uuids: &[String]) -> Result<Vec<roles::Model>> {
        if uuids.is_empty() {
            return Ok(Vec::new());
        }
        roles::Entity::find()
            .filter(roles::Column::Uuid.is_in(uuids.iter().cloned()))
            .filter(roles::Column::DeletedAt.is_null())
            .all(&self.conn)
            .await
            .context("Failed to query roles by uuids")
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<roles::Model>> {
        roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .filter(roles::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query role by name")
    }

    pub async fn insert(&self, new: NewRole, actor: &Actor) -> Result<roles::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let privileges = serde_json::to_string(&new.privileges)
            .context("Failed to encode role privileges")?;

        let active = roles::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(new.name),
            privileges: Set(privileges),
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
            .context("Failed to insert role")
    }

    pub async fn update(
        &self,
        uuid: &str,
        changes: RoleChanges,
        actor: &Actor,
    ) -> Result<Option<roles::Model>> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(None);
        };

        let privileges = serde_json::to_string(&changes.privileges)
            .context("Failed to encode role privileges")?;

        let mut active: roles::ActiveModel = existing.into();
        active.name = Set(changes.name);
        active.privileges = Set(privileges);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.updated_by_uuid = Set(actor.uuid.clone());
        active.updated_by_username = Set(actor.username.clone());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update role")?;

        Ok(Some(updated))
    }

    pub async fn soft_delete(&self, uuid: &str, actor: &Actor) -> Result<Option<roles::Model>> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(None);
        };

        let snapshot = existing.clone();

        let mut active: roles::ActiveModel = existing.into();
        active.deleted_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.deleted_by_uuid = Set(Some(actor.uuid.clone()));
        active.deleted_by_username = Set(Some(actor.username.clone()));

        active
            .update(&self.conn)
            .await
            .context("Failed to soft-delete role")?;

        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_privileges() {
        assert_eq!(
            parse_privileges(r#"["Catalogue:Read","*"]"#),
            vec!["Catalogue:Read".to_string(), "*".to_string()]
        );
        assert!(parse_privileges("garbage").is_empty());
    }
}
