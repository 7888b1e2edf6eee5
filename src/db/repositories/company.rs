use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::db::relations::UuidKeyed;
use crate::entities::{companies, farmer_companies};
use crate::models::Actor;

impl UuidKeyed for companies::Model {
    fn uuid_key(&self) -> &str {
        &self.uuid
    }
}

pub struct NewCompany {
    pub registration_number: String,
    pub name: String,
    pub district: String,
}

pub struct CompanyRepository {
    conn: DatabaseConnection,
}

impl CompanyRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Batch lookup for the denormalizer; filtered to not-deleted.
    pub async fn get_by_uuids(&self, uuids: &[String]) -> Result<Vec<companies::Model>> {
        if uuids.is_empty() {
            return Ok(Vec::new());
        }

        companies::Entity::find()
            .filter(companies::Column::Uuid.is_in(uuids.iter().cloned()))
            .filter(companies::Column::DeletedAt.is_null())
            .all(&self.conn)
            .await
            .context("Failed to batch-query companies")
    }

    /// Pre-resolves a company-name text filter into a UUID-in predicate for
    /// the owning table's query.
    pub async fn find_uuids_by_name(&self, name_fragment: &str) -> Result<Vec<String>> {
        let rows = companies::Entity::find()
            .filter(companies::Column::Name.contains(name_fragment))
            .filter(companies::Column::DeletedAt.is_null())
            .all(&self.conn)
            .await
            .context("Failed to query companies by name")?;

        Ok(rows.into_iter().map(|c| c.uuid).collect())
    }

    /// Reverse lookup from a farmer's IC number to the companies they
    /// control. A farmer may hold several registrations.
    pub async fn uuids_for_ic(&self, ic_number: &str) -> Result<Vec<String>> {
        let links = farmer_companies::Entity::find()
            .filter(farmer_companies::Column::IcNumber.eq(ic_number))
            .filter(farmer_companies::Column::DeletedAt.is_null())
            .all(&self.conn)
            .await
            .context("Failed to query farmer company links")?;

        Ok(links.into_iter().map(|l| l.company_uuid).collect())
    }

    pub async fn insert(&self, company: NewCompany, actor: &Actor) -> Result<companies::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = companies::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4().to_string()),
            registration_number: Set(company.registration_number),
            name: Set(company.name),
            district: Set(company.district),
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
            .context("Failed to insert company")
    }

    pub async fn link_farmer(&self, ic_number: &str, company_uuid: &str) -> Result<()> {
        let link = farmer_companies::ActiveModel {
            uuid: Set(uuid::Uuid::new_v4().to_string()),
            ic_number: Set(ic_number.to_string()),
            company_uuid: Set(company_uuid.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            deleted_at: Set(None),
            ..Default::default()
        };

        link.insert(&self.conn)
            .await
            .context("Failed to link farmer to company")?;

        Ok(())
    }
}
