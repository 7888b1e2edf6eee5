//! `SeaORM` implementation of [`ProductionService`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::constants::export::VEGETABLE_PRODUCTION_FILENAME;
use crate::db::relations::attach_relation;
use crate::db::{AuditAction, NewProduction, ProductionChanges, Store};
use crate::entities::vegetable_productions;
use crate::models::{ColumnFilter, Identity, PageParams, listing::filter_value,
    listing::parse_filters};
use crate::services::dto::{CompanyRef, ExportFile, FarmAreaRef, ProductionInput, ProductionRow,
    TokenizedPage, tokenize};
use crate::services::envelope::Envelope;
use crate::services::error::DomainError;
use crate::services::exporter::Exporter;
use crate::services::policy::{Action, Resource, authorize};
use crate::services::production_service::ProductionService;
use crate::services::scope::{Scope, scope_for};

const MISSING_REFERENCES: &str = "Please fill the company name and farm area fields";

const EXPORT_HEADERS: &[&str] = &[
    "Company",
    "Farm Area",
    "Vegetable",
    "Quantity (kg)",
    "Harvest Date",
    "District",
    "Created At",
    "Created By",
];

pub struct SeaOrmProductionService {
    store: Arc<Store>,
    envelope: Arc<Envelope>,
    exporter: Arc<Exporter>,
}

impl SeaOrmProductionService {
    #[must_use]
    pub fn new(store: Arc<Store>, envelope: Arc<Envelope>, exporter: Arc<Exporter>) -> Self {
        Self {
            store,
            envelope,
            exporter,
        }
    }

    fn validate(input: &ProductionInput) -> Result<(), DomainError> {
        if input.company_uuid.trim().is_empty() || input.farm_area_uuid.trim().is_empty() {
            return Err(DomainError::Validation(MISSING_REFERENCES.to_string()));
        }
        if input.quantity_kg < 0.0 {
            return Err(DomainError::Validation(
                "Quantity must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves a `companyName` grid filter into concrete company UUIDs.
    /// `Ok(None)` means no such filter; an empty vector means the name matched
    /// nothing and the listing can short-circuit to an empty result.
    async fn resolve_company_filter(
        &self,
        filters: &[ColumnFilter],
    ) -> Result<Option<Vec<String>>, DomainError> {
        match filter_value(filters, "companyName") {
            None => Ok(None),
            Some(name) => Ok(Some(self.store.find_company_uuids_by_name(name).await?)),
        }
    }

    async fn denormalize(&self, rows: &mut [ProductionRow]) -> Result<(), DomainError> {
        attach_relation(
            rows,
            |r| Some(r.company_uuid.clone()),
            |uuids| async move {
                self.store
                    .get_companies_by_uuids(&uuids)
                    .await
                    .map_err(DomainError::from)
            },
            |r, company| r.company = company.map(CompanyRef::from).unwrap_or_default(),
        )
        .await?;

        attach_relation(
            rows,
            |r| Some(r.farm_area_uuid.clone()),
            |uuids| async move {
                self.store
                    .get_farm_areas_by_uuids(&uuids)
                    .await
                    .map_err(DomainError::from)
            },
            |r, area| r.farm_area = area.map(FarmAreaRef::from).unwrap_or_default(),
        )
        .await?;

        Ok(())
    }

    /// Company-scoped callers may only write records owned by their own
    /// companies; the target `company_uuid` is checked on create and update
    /// alike so a record cannot be re-pointed across the boundary.
    fn require_own_company(identity: &Identity, company_uuid: &str) -> Result<(), DomainError> {
        if let Scope::Companies(uuids) = scope_for(identity, None)
            && !uuids.iter().any(|u| u == company_uuid)
        {
            return Err(DomainError::Validation(
                "You can only manage records for your own companies".to_string(),
            ));
        }
        Ok(())
    }

    /// A record outside the caller's visibility behaves as absent; existence
    /// is not revealed across scope boundaries.
    fn scope_permits(scope: &Scope, record: &vegetable_productions::Model) -> bool {
        match scope {
            Scope::Unrestricted => true,
            Scope::Companies(uuids) => uuids.contains(&record.company_uuid),
            Scope::Post { district, .. } => record.district == *district,
        }
    }

    async fn visible_record(
        &self,
        identity: &Identity,
        uuid: &str,
    ) -> Result<vegetable_productions::Model, DomainError> {
        let record = self
            .store
            .get_production_by_uuid(uuid)
            .await?
            .filter(|r| Self::scope_permits(&scope_for(identity, None), r))
            .ok_or_else(|| {
                DomainError::Integrity("Vegetable production record not found".to_string())
            })?;
        Ok(record)
    }

    async fn audit(
        &self,
        action: AuditAction,
        row: &ProductionRow,
        identity: &Identity,
    ) -> Result<(), DomainError> {
        let snapshot = serde_json::to_value(row)
            .map_err(|e| DomainError::Internal(format!("Failed to snapshot production: {e}")))?;
        self.store
            .append_audit(
                &Resource::VegetableProduction.to_string(),
                &row.uuid,
                action,
                &snapshot,
                &identity.actor(),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProductionService for SeaOrmProductionService {
    async fn list(
        &self,
        identity: &Identity,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<TokenizedPage, DomainError> {
        authorize(identity, Resource::VegetableProduction, Action::Read)?;

        let filters = parse_filters(filters)?;
        let page = PageParams::new(page_index, page_size);
        let scope = scope_for(identity, None);

        let company_uuids = self.resolve_company_filter(&filters).await?;
        if matches!(company_uuids.as_deref(), Some([])) {
            return tokenize::<ProductionRow>(&self.envelope, &[], 0);
        }

        let (models, count) = self
            .store
            .list_productions(&scope, &filters, company_uuids.as_deref(), page)
            .await?;

        let mut rows: Vec<ProductionRow> = models.into_iter().map(ProductionRow::from).collect();
        self.denormalize(&mut rows).await?;

        tokenize(&self.envelope, &rows, count)
    }

    async fn create(
        &self,
        identity: &Identity,
        input: ProductionInput,
    ) -> Result<ProductionRow, DomainError> {
        authorize(identity, Resource::VegetableProduction, Action::Create)?;
        Self::validate(&input)?;
        Self::require_own_company(identity, &input.company_uuid)?;

        let created = self
            .store
            .create_production(
                NewProduction {
                    company_uuid: input.company_uuid,
                    farm_area_uuid: input.farm_area_uuid,
                    vegetable_name: input.vegetable_name,
                    quantity_kg: input.quantity_kg,
                    harvest_date: input.harvest_date,
                    district: input.district,
                },
                &identity.actor(),
            )
            .await?;

        let mut rows = vec![ProductionRow::from(created)];
        self.denormalize(&mut rows).await?;
        let row = rows.remove(0);

        self.audit(AuditAction::Create, &row, identity).await?;
        info!(uuid = %row.uuid, "Vegetable production record created");
        Ok(row)
    }

    async fn update(
        &self,
        identity: &Identity,
        uuid: &str,
        input: ProductionInput,
    ) -> Result<ProductionRow, DomainError> {
        authorize(identity, Resource::VegetableProduction, Action::Update)?;
        Self::validate(&input)?;
        Self::require_own_company(identity, &input.company_uuid)?;
        self.visible_record(identity, uuid).await?;

        let updated = self
            .store
            .update_production(
                uuid,
                ProductionChanges {
                    company_uuid: input.company_uuid,
                    farm_area_uuid: input.farm_area_uuid,
                    vegetable_name: input.vegetable_name,
                    quantity_kg: input.quantity_kg,
                    harvest_date: input.harvest_date,
                    district: input.district,
                },
                &identity.actor(),
            )
            .await?
            .ok_or_else(|| {
                DomainError::Integrity("Vegetable production record not found".to_string())
            })?;

        let mut rows = vec![ProductionRow::from(updated)];
        self.denormalize(&mut rows).await?;
        let row = rows.remove(0);

        self.audit(AuditAction::Update, &row, identity).await?;
        Ok(row)
    }

    async fn delete(&self, identity: &Identity, uuid: &str) -> Result<bool, DomainError> {
        authorize(identity, Resource::VegetableProduction, Action::Delete)?;
        self.visible_record(identity, uuid).await?;

        let snapshot = self
            .store
            .soft_delete_production(uuid, &identity.actor())
            .await?
            .ok_or_else(|| {
                DomainError::Integrity("Vegetable production record not found".to_string())
            })?;

        let row = ProductionRow::from(snapshot);
        self.audit(AuditAction::Delete, &row, identity).await?;
        info!(uuid, "Vegetable production record deleted");
        Ok(true)
    }

    async fn export(
        &self,
        identity: &Identity,
        filters: Option<&str>,
    ) -> Result<ExportFile, DomainError> {
        authorize(identity, Resource::VegetableProduction, Action::Export)?;

        let filters = parse_filters(filters)?;
        let scope = scope_for(identity, None);

        let company_uuids = self.resolve_company_filter(&filters).await?;
        let models = if matches!(company_uuids.as_deref(), Some([])) {
            Vec::new()
        } else {
            self.store
                .list_all_productions(&scope, &filters, company_uuids.as_deref())
                .await?
        };

        let mut rows: Vec<ProductionRow> = models.into_iter().map(ProductionRow::from).collect();
        self.denormalize(&mut rows).await?;

        let cells: Vec<Vec<String>> = rows
            .into_iter()
            .map(|r| {
                vec![
                    r.company.name,
                    r.farm_area.name,
                    r.vegetable_name,
                    r.quantity_kg.to_string(),
                    r.harvest_date,
                    r.district,
                    r.created_at,
                    r.created_by_username,
                ]
            })
            .collect();

        let payload = self
            .exporter
            .build(VEGETABLE_PRODUCTION_FILENAME, EXPORT_HEADERS, &cells)?;
        Ok(ExportFile::from(payload))
    }
}
