use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set};

use crate::entities::catalogues;
use crate::models::{Actor, ColumnFilter, PageParams, listing::filter_value};

pub struct NewCatalogue {
    pub product_name: String,
    pub category: String,
    pub unit: String,
    pub description: String,
}

/// Whitelisted business columns for update. Server-owned fields (`id`,
/// `uuid`, timestamps, actor snapshots) are not representable here, so a
/// client can never overwrite them.
pub struct CatalogueChanges {
    pub product_name: String,
    pub category: String,
    pub unit: String,
    pub description: String,
}

pub struct CatalogueRepository {
    conn: DatabaseConnection,
}

impl CatalogueRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn filtered(filters: &[ColumnFilter]) -> Select<catalogues::Entity> {
        let mut query =
            catalogues::Entity::find().filter(catalogues::Column::DeletedAt.is_null());

        if let Some(name) = filter_value(filters, "productName") {
            query = query.filter(catalogues::Column::ProductName.contains(name));
        }
        if let Some(category) = filter_value(filters, "category") {
            query = query.filter(catalogues::Column::Category.contains(category));
        }

        query
    }

    pub async fn list(
        &self,
        filters: &[ColumnFilter],
        page: PageParams,
    ) -> Result<(Vec<catalogues::Model>, u64)> {
        let paginator = Self::filtered(filters)
            .order_by_desc(catalogues::Column::Id)
            .paginate(&self.conn, page.page_size);

        let count = paginator
            .num_items()
            .await
            .context("Failed to count catalogues")?;
        let rows = paginator
            .fetch_page(page.page_index)
            .await
            .context("Failed to fetch catalogue page")?;

        Ok((rows, count))
    }

    /// Unpaginated listing for export.
    pub async fn list_all(&self, filters: &[ColumnFilter]) -> Result<Vec<catalogues::Model>> {
        Self::filtered(filters)
            .order_by_desc(catalogues::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to fetch catalogues for export")
    }

    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<catalogues::Model>> {
        catalogues::Entity::find()
            .filter(catalogues::Column::Uuid.eq(uuid))
            .filter(catalogues::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query catalogue by uuid")
    }

    pub async fn insert(&self, new: NewCatalogue, actor: &Actor) -> Result<catalogues::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = catalogues::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4().to_string()),
            product_name: Set(new.product_name),
            category: Set(new.category),
            unit: Set(new.unit),
            description: Set(new.description),
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
            .context("Failed to insert catalogue")
    }

    /// Returns `None` when the record does not exist (or is soft-deleted).
    /// Last-write-wins on concurrent updates; there is no optimistic lock.
    pub async fn update(
        &self,
        uuid: &str,
        changes: CatalogueChanges,
        actor: &Actor,
    ) -> Result<Option<catalogues::Model>> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(None);
        };

        let mut active: catalogues::ActiveModel = existing.into();
        active.product_name = Set(changes.product_name);
        active.category = Set(changes.category);
        active.unit = Set(changes.unit);
        active.description = Set(changes.description);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.updated_by_uuid = Set(actor.uuid.clone());
        active.updated_by_username = Set(actor.username.clone());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update catalogue")?;

        Ok(Some(updated))
    }

    /// Soft delete; returns the pre-delete snapshot for the audit trail.
    pub async fn soft_delete(
        &self,
        uuid: &str,
        actor: &Actor,
    ) -> Result<Option<catalogues::Model>> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(None);
        };

        let snapshot = existing.clone();

        let mut active: catalogues::ActiveModel = existing.into();
        active.deleted_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.deleted_by_uuid = Set(Some(actor.uuid.clone()));
        active.deleted_by_username = Set(Some(actor.username.clone()));

        active
            .update(&self.conn)
            .await
            .context("Failed to soft-delete catalogue")?;

        Ok(Some(snapshot))
    }
}
