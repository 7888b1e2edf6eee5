use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::db::relations::UuidKeyed;
use crate::entities::farm_areas;
use crate::models::Actor;

impl UuidKeyed for farm_areas::Model {
    fn uuid_key(&self) -> &str {
        &self.uuid
    }
}

pub struct FarmAreaRepository {
    conn: DatabaseConnection,
}

impl FarmAreaRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_uuids(&self, uuids: &[String]) -> Result<Vec<farm_areas::Model>> {
        if uuids.is_empty() {
            return Ok(Vec::new());
        }

        farm_areas::Entity::find()
            .filter(farm_areas::Column::Uuid.is_in(uuids.iter().cloned()))
            .filter(farm_areas::Column::DeletedAt.is_null())
            .all(&self.conn)
            .await
            .context("Failed to batch-query farm areas")
    }

    pub async fn insert(&self, name: &str, district: &str, actor: &Actor) -> Result<farm_areas::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = farm_areas::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            district: Set(district.to_string()),
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
            .context("Failed to insert farm area")
    }
}
