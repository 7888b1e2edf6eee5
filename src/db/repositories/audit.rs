use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set};

use crate::entities::audit_logs;
use crate::models::{Actor, ColumnFilter, PageParams, listing::filter_value};

/// Mutation action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

pub struct AuditRepository {
    conn: DatabaseConnection,
}

impl AuditRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Appends one immutable entry. There is no update or delete counterpart;
    /// the trail only grows.
    pub async fn append(
        &self,
        entity: &str,
        entity_uuid: &str,
        action: AuditAction,
        snapshot: &serde_json::Value,
        actor: &Actor,
    ) -> Result<()> {
        let entry = audit_logs::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4().to_string()),
            entity: Set(entity.to_string()),
            entity_uuid: Set(entity_uuid.to_string()),
            action: Set(action.as_str().to_string()),
            snapshot: Set(snapshot.to_string()),
            actor_uuid: Set(actor.uuid.clone()),
            actor_username: Set(actor.username.clone()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        entry
            .insert(&self.conn)
            .await
            .context("Failed to append audit entry")?;

        Ok(())
    }

    pub async fn list(
        &self,
        filters: &[ColumnFilter],
        page: PageParams,
    ) -> Result<(Vec<audit_logs::Model>, u64)> {
        let mut query = audit_logs::Entity::find();

        if let Some(entity) = filter_value(filters, "entity") {
            query = query.filter(audit_logs::Column::Entity.eq(entity));
        }
        if let Some(entity_uuid) = filter_value(filters, "entityUuid") {
            query = query.filter(audit_logs::Column::EntityUuid.eq(entity_uuid));
        }
        if let Some(action) = filter_value(filters, "action") {
            query = query.filter(audit_logs::Column::Action.eq(action));
        }
        if let Some(actor) = filter_value(filters, "actorUsername") {
            query = query.filter(audit_logs::Column::ActorUsername.contains(actor));
        }

        let paginator = query
            .order_by_desc(audit_logs::Column::Id)
            .paginate(&self.conn, page.page_size);

        let count = paginator
            .num_items()
            .await
            .context("Failed to count audit entries")?;
        let rows = paginator
            .fetch_page(page.page_index)
            .await
            .context("Failed to fetch audit page")?;

        Ok((rows, count))
    }
}
