use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set};

use crate::entities::vegetable_productions;
use crate::models::{Actor, ColumnFilter, PageParams, listing::filter_value};
use crate::services::scope::Scope;

pub struct NewProduction {
    pub company_uuid: String,
    pub farm_area_uuid: String,
    pub vegetable_name: String,
    pub quantity_kg: f64,
    pub harvest_date: String,
    pub district: String,
}

pub struct ProductionChanges {
    pub company_uuid: String,
    pub farm_area_uuid: String,
    pub vegetable_name: String,
    pub quantity_kg: f64,
    pub harvest_date: String,
    pub district: String,
}

pub struct ProductionRepository {
    conn: DatabaseConnection,
}

impl ProductionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn filtered(
        scope: &Scope,
        filters: &[ColumnFilter],
        company_uuids: Option<&[String]>,
    ) -> Select<vegetable_productions::Entity> {
        let mut query = vegetable_productions::Entity::find()
            .filter(vegetable_productions::Column::DeletedAt.is_null());

        match scope {
            Scope::Unrestricted => {}
            Scope::Companies(uuids) => {
                query = query
                    .filter(vegetable_productions::Column::CompanyUuid.is_in(uuids.iter().cloned()));
            }
            Scope::Post { district, .. } => {
                query = query.filter(vegetable_productions::Column::District.eq(district));
            }
        }

        // Pre-resolved company-name filter (UUID-in predicate).
        if let Some(uuids) = company_uuids {
            query = query
                .filter(vegetable_productions::Column::CompanyUuid.is_in(uuids.iter().cloned()));
        }

        if let Some(name) = filter_value(filters, "vegetableName") {
            query = query.filter(vegetable_productions::Column::VegetableName.contains(name));
        }
        if let Some(district) = filter_value(filters, "district") {
            query = query.filter(vegetable_productions::Column::District.contains(district));
        }

        query
    }

    pub async fn list(
        &self,
        scope: &Scope,
        filters: &[ColumnFilter],
        company_uuids: Option<&[String]>,
        page: PageParams,
    ) -> Result<(Vec<vegetable_productions::Model>, u64)> {
        let paginator = Self::filtered(scope, filters, company_uuids)
            .order_by_desc(vegetable_productions::Column::Id)
            .paginate(&self.conn, page.page_size);

        let count = paginator
            .num_items()
            .await
            .context("Failed to count production records")?;
        let rows = paginator
            .fetch_page(page.page_index)
            .await
            .context("Failed to fetch production page")?;

        Ok((rows, count))
    }

    pub async fn list_all(
        &self,
        scope: &Scope,
        filters: &[ColumnFilter],
        company_uuids: Option<&[String]>,
    ) -> Result<Vec<vegetable_productions::Model>> {
        Self::filtered(scope, filters, company_uuids)
            .order_by_desc(vegetable_productions::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to fetch production records for export")
    }

    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<vegetable_productions::Model>> {
        vegetable_productions::Entity::find()
            .filter(vegetable_productions::Column::Uuid.eq(uuid))
            .filter(vegetable_productions::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query production record by uuid")
    }

    pub async fn insert(
        &self,
        new: NewProduction,
        actor: &Actor,
    ) -> Result<vegetable_productions::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = vegetable_productions::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4().to_string()),
            company_uuid: Set(new.company_uuid),
            farm_area_uuid: Set(new.farm_area_uuid),
            vegetable_name: Set(new.vegetable_name),
            quantity_kg: Set(new.quantity_kg),
            harvest_date: Set(new.harvest_date),
            district: Set(new.district),
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
            .context("Failed to insert production record")
    }

    pub async fn update(
        &self,
        uuid: &str,
        changes: ProductionChanges,
        actor: &Actor,
    ) -> Result<Option<vegetable_productions::Model>> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(None);
        };

        let mut active: vegetable_productions::ActiveModel = existing.into();
        active.company_uuid = Set(changes.company_uuid);
        active.farm_area_uuid = Set(changes.farm_area_uuid);
        active.vegetable_name = Set(changes.vegetable_name);
        active.quantity_kg = Set(changes.quantity_kg);
        active.harvest_date = Set(changes.harvest_date);
        active.district = Set(changes.district);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.updated_by_uuid = Set(actor.uuid.clone());
        active.updated_by_username = Set(actor.username.clone());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update production record")?;

        Ok(Some(updated))
    }

    pub async fn soft_delete(
        &self,
        uuid: &str,
        actor: &Actor,
    ) -> Result<Option<vegetable_productions::Model>> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(None);
        };

        let snapshot = existing.clone();

        let mut active: vegetable_productions::ActiveModel = existing.into();
        active.deleted_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.deleted_by_uuid = Set(Some(actor.uuid.clone()));
        active.deleted_by_username = Set(Some(actor.username.clone()));

        active
            .update(&self.conn)
            .await
            .context("Failed to soft-delete production record")?;

        Ok(Some(snapshot))
    }
}
