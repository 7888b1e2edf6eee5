use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Select, Set};

use crate::constants::ALL_POINTS_OF_ENTRY;
use crate::entities::biosecurity_imports;
use crate::models::{Actor, ColumnFilter, PageParams, listing::filter_value};
use crate::services::scope::Scope;

pub struct NewBiosecurityImport {
    pub company_uuid: String,
    pub permit_number: String,
    pub country_of_origin: String,
    pub product_name: String,
    pub point_of_entry: String,
    pub district: String,
    pub quantity: f64,
    pub arrival_date: String,
}

pub struct BiosecurityImportChanges {
    pub company_uuid: String,
    pub permit_number: String,
    pub country_of_origin: String,
    pub product_name: String,
    pub point_of_entry: String,
    pub district: String,
    pub quantity: f64,
    pub arrival_date: String,
}

pub struct BiosecurityRepository {
    conn: DatabaseConnection,
}

impl BiosecurityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn filtered(
        scope: &Scope,
        point_of_entry: Option<&str>,
        filters: &[ColumnFilter],
        company_uuids: Option<&[String]>,
    ) -> Select<biosecurity_imports::Entity> {
        let mut query = biosecurity_imports::Entity::find()
            .filter(biosecurity_imports::Column::DeletedAt.is_null());

        match scope {
            Scope::Unrestricted => {}
            Scope::Companies(uuids) => {
                query = query
                    .filter(biosecurity_imports::Column::CompanyUuid.is_in(uuids.iter().cloned()));
            }
            Scope::Post {
                district,
                control_post,
            } => {
                query = query.filter(biosecurity_imports::Column::District.eq(district));
                if !control_post.is_empty() {
                    query = query
                        .filter(biosecurity_imports::Column::PointOfEntry.eq(control_post));
                }
            }
        }

        // An explicit point of entry narrows further; the "All" sentinel was
        // already consumed by the scope derivation.
        if let Some(poe) = point_of_entry
            && poe != ALL_POINTS_OF_ENTRY
            && !poe.trim().is_empty()
        {
            query = query.filter(biosecurity_imports::Column::PointOfEntry.eq(poe));
        }

        if let Some(uuids) = company_uuids {
            query = query
                .filter(biosecurity_imports::Column::CompanyUuid.is_in(uuids.iter().cloned()));
        }

        if let Some(permit) = filter_value(filters, "permitNumber") {
            query = query.filter(biosecurity_imports::Column::PermitNumber.contains(permit));
        }
        if let Some(country) = filter_value(filters, "country") {
            query = query.filter(biosecurity_imports::Column::CountryOfOrigin.contains(country));
        }
        if let Some(product) = filter_value(filters, "productName") {
            query = query.filter(biosecurity_imports::Column::ProductName.contains(product));
        }

        query
    }

    pub async fn list(
        &self,
        scope: &Scope,
        point_of_entry: Option<&str>,
        filters: &[ColumnFilter],
        company_uuids: Option<&[String]>,
        page: PageParams,
    ) -> Result<(Vec<biosecurity_imports::Model>, u64)> {
        let paginator = Self::filtered(scope, point_of_entry, filters, company_uuids)
            .order_by_desc(biosecurity_imports::Column::Id)
            .paginate(&self.conn, page.page_size);

        let count = paginator
            .num_items()
            .await
            .context("Failed to count biosecurity imports")?;
        let rows = paginator
            .fetch_page(page.page_index)
            .await
            .context("Failed to fetch biosecurity import page")?;

        Ok((rows, count))
    }

    pub async fn list_all(
        &self,
        scope: &Scope,
        point_of_entry: Option<&str>,
        filters: &[ColumnFilter],
        company_uuids: Option<&[String]>,
    ) -> Result<Vec<biosecurity_imports::Model>> {
        Self::filtered(scope, point_of_entry, filters, company_uuids)
            .order_by_desc(biosecurity_imports::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to fetch biosecurity imports for export")
    }

    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<biosecurity_imports::Model>> {
        biosecurity_imports::Entity::find()
            .filter(biosecurity_imports::Column::Uuid.eq(uuid))
            .filter(biosecurity_imports::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .context("Failed to query biosecurity import by uuid")
    }

    pub async fn insert(
        &self,
        new: NewBiosecurityImport,
        actor: &Actor,
    ) -> Result<biosecurity_imports::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = biosecurity_imports::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4().to_string()),
            company_uuid: Set(new.company_uuid),
            permit_number: Set(new.permit_number),
            country_of_origin: Set(new.country_of_origin),
            product_name: Set(new.product_name),
            point_of_entry: Set(new.point_of_entry),
            district: Set(new.district),
            quantity: Set(new.quantity),
            arrival_date: Set(new.arrival_date),
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
            .context("Failed to insert biosecurity import")
    }

    pub async fn update(
        &self,
        uuid: &str,
        changes: BiosecurityImportChanges,
        actor: &Actor,
    ) -> Result<Option<biosecurity_imports::Model>> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(None);
        };

        let mut active: biosecurity_imports::ActiveModel = existing.into();
        active.company_uuid = Set(changes.company_uuid);
        active.permit_number = Set(changes.permit_number);
        active.country_of_origin = Set(changes.country_of_origin);
        active.product_name = Set(changes.product_name);
        active.point_of_entry = Set(changes.point_of_entry);
        active.district = Set(changes.district);
        active.quantity = Set(changes.quantity);
        active.arrival_date = Set(changes.arrival_date);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.updated_by_uuid = Set(actor.uuid.clone());
        active.updated_by_username = Set(actor.username.clone());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update biosecurity import")?;

        Ok(Some(updated))
    }

    pub async fn soft_delete(
        &self,
        uuid: &str,
        actor: &Actor,
    ) -> Result<Option<biosecurity_imports::Model>> {
        let Some(existing) = self.get_by_uuid(uuid).await? else {
            return Ok(None);
        };

        let snapshot = existing.clone();

        let mut active: biosecurity_imports::ActiveModel = existing.into();
        active.deleted_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.deleted_by_uuid = Set(Some(actor.uuid.clone()));
        active.deleted_by_username = Set(Some(actor.username.clone()));

        active
            .update(&self.conn)
            .await
            .context("Failed to soft-delete biosecurity import")?;

        Ok(Some(snapshot))
    }
}
