//! `SeaORM` implementation of [`BiosecurityService`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::constants::export::BIOSECURITY_IMPORT_FILENAME;
use crate::db::relations::attach_relation;
use crate::db::{AuditAction, BiosecurityImportChanges, NewBiosecurityImport, Store};
use crate::entities::biosecurity_imports;
use crate::models::{ColumnFilter, Identity, PageParams, listing::filter_value,
    listing::parse_filters};
use crate::services::biosecurity_service::BiosecurityService;
use crate::services::dto::{BiosecurityImportInput, BiosecurityRow, CompanyRef, ExportFile,
    TokenizedPage, tokenize};
use crate::services::envelope::Envelope;
use crate::services::error::DomainError;
use crate::services::exporter::Exporter;
use crate::services::policy::{Action, Resource, authorize};
use crate::services::scope::{Scope, scope_for};

const EXPORT_HEADERS: &[&str] = &[
    "Company",
    "Permit Number",
    "Country of Origin",
    "Product",
    "Point of Entry",
    "District",
    "Quantity",
    "Arrival Date",
    "Created At",
    "Created By",
];

pub struct SeaOrmBiosecurityService {
    store: Arc<Store>,
    envelope: Arc<Envelope>,
    exporter: Arc<Exporter>,
}

impl SeaOrmBiosecurityService {
    #[must_use]
    pub fn new(store: Arc<Store>, envelope: Arc<Envelope>, exporter: Arc<Exporter>) -> Self {
        Self {
            store,
            envelope,
            exporter,
        }
    }

    fn validate(input: &BiosecurityImportInput) -> Result<(), DomainError> {
        if input.company_uuid.trim().is_empty() {
            return Err(DomainError::Validation(
                "Please fill the company name field".to_string(),
            ));
        }
        if input.permit_number.trim().is_empty() {
            return Err(DomainError::Validation(
                "Permit number is required".to_string(),
            ));
        }
        if input.quantity < 0.0 {
            return Err(DomainError::Validation(
                "Quantity must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    async fn resolve_company_filter(
        &self,
        filters: &[ColumnFilter],
    ) -> Result<Option<Vec<String>>, DomainError> {
        match filter_value(filters, "companyName") {
            None => Ok(None),
            Some(name) => Ok(Some(self.store.find_company_uuids_by_name(name).await?)),
        }
    }

    async fn denormalize(&self, rows: &mut [BiosecurityRow]) -> Result<(), DomainError> {
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
        .await
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

    fn scope_permits(scope: &Scope, record: &biosecurity_imports::Model) -> bool {
        match scope {
            Scope::Unrestricted => true,
            Scope::Companies(uuids) => uuids.contains(&record.company_uuid),
            Scope::Post {
                district,
                control_post,
            } => {
                record.district == *district
                    && (control_post.is_empty() || record.point_of_entry == *control_post)
            }
        }
    }

    async fn visible_record(
        &self,
        identity: &Identity,
        uuid: &str,
    ) -> Result<biosecurity_imports::Model, DomainError> {
        self.store
            .get_biosecurity_by_uuid(uuid)
            .await?
            .filter(|r| Self::scope_permits(&scope_for(identity, None), r))
            .ok_or_else(|| {
                DomainError::Integrity("Biosecurity import record not found".to_string())
            })
    }

    async fn audit(
        &self,
        action: AuditAction,
        row: &BiosecurityRow,
        identity: &Identity,
    ) -> Result<(), DomainError> {
        let snapshot = serde_json::to_value(row).map_err(|e| {
            DomainError::Internal(format!("Failed to snapshot biosecurity import: {e}"))
        })?;
        self.store
            .append_audit(
                &Resource::BiosecurityImport.to_string(),
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
impl BiosecurityService for SeaOrmBiosecurityService {
    async fn list(
        &self,
        identity: &Identity,
        point_of_entry: Option<&str>,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<TokenizedPage, DomainError> {
        authorize(identity, Resource::BiosecurityImport, Action::Read)?;

        let filters = parse_filters(filters)?;
        let page = PageParams::new(page_index, page_size);
        let scope = scope_for(identity, point_of_entry);

        let company_uuids = self.resolve_company_filter(&filters).await?;
        if matches!(company_uuids.as_deref(), Some([])) {
            return tokenize::<BiosecurityRow>(&self.envelope, &[], 0);
        }

        let (models, count) = self
            .store
            .list_biosecurity_imports(
                &scope,
                point_of_entry,
                &filters,
                company_uuids.as_deref(),
                page,
            )
            .await?;

        let mut rows: Vec<BiosecurityRow> = models.into_iter().map(BiosecurityRow::from).collect();
        self.denormalize(&mut rows).await?;

        tokenize(&self.envelope, &rows, count)
    }

    async fn create(
        &self,
        identity: &Identity,
        input: BiosecurityImportInput,
    ) -> Result<BiosecurityRow, DomainError> {
        authorize(identity, Resource::BiosecurityImport, Action::Create)?;
        Self::validate(&input)?;
        Self::require_own_company(identity, &input.company_uuid)?;

        let created = self
            .store
            .create_biosecurity(
                NewBiosecurityImport {
                    company_uuid: input.company_uuid,
                    permit_number: input.permit_number,
                    country_of_origin: input.country_of_origin,
                    product_name: input.product_name,
                    point_of_entry: input.point_of_entry,
                    district: input.district,
                    quantity: input.quantity,
                    arrival_date: input.arrival_date,
                },
                &identity.actor(),
            )
            .await?;

        let mut rows = vec![BiosecurityRow::from(created)];
        self.denormalize(&mut rows).await?;
        let row = rows.remove(0);

        self.audit(AuditAction::Create, &row, identity).await?;
        info!(uuid = %row.uuid, "Biosecurity import record created");
        Ok(row)
    }

    async fn update(
        &self,
        identity: &Identity,
        uuid: &str,
        input: BiosecurityImportInput,
    ) -> Result<BiosecurityRow, DomainError> {
        authorize(identity, Resource::BiosecurityImport, Action::Update)?;
        Self::validate(&input)?;
        Self::require_own_company(identity, &input.company_uuid)?;
        self.visible_record(identity, uuid).await?;

        let updated = self
            .store
            .update_biosecurity(
                uuid,
                BiosecurityImportChanges {
                    company_uuid: input.company_uuid,
                    permit_number: input.permit_number,
                    country_of_origin: input.country_of_origin,
                    product_name: input.product_name,
                    point_of_entry: input.point_of_entry,
                    district: input.district,
                    quantity: input.quantity,
                    arrival_date: input.arrival_date,
                },
                &identity.actor(),
            )
            .await?
            .ok_or_else(|| {
                DomainError::Integrity("Biosecurity import record not found".to_string())
            })?;

        let mut rows = vec![BiosecurityRow::from(updated)];
        self.denormalize(&mut rows).await?;
        let row = rows.remove(0);

        self.audit(AuditAction::Update, &row, identity).await?;
        Ok(row)
    }

    async fn delete(&self, identity: &Identity, uuid: &str) -> Result<bool, DomainError> {
        authorize(identity, Resource::BiosecurityImport, Action::Delete)?;
        self.visible_record(identity, uuid).await?;

        let snapshot = self
            .store
            .soft_delete_biosecurity(uuid, &identity.actor())
            .await?
            .ok_or_else(|| {
                DomainError::Integrity("Biosecurity import record not found".to_string())
            })?;

        let row = BiosecurityRow::from(snapshot);
        self.audit(AuditAction::Delete, &row, identity).await?;
        info!(uuid, "Biosecurity import record deleted");
        Ok(true)
    }

    async fn export(
        &self,
        identity: &Identity,
        point_of_entry: Option<&str>,
        filters: Option<&str>,
    ) -> Result<ExportFile, DomainError> {
        authorize(identity, Resource::BiosecurityImport, Action::Export)?;

        let filters = parse_filters(filters)?;
        let scope = scope_for(identity, point_of_entry);

        let company_uuids = self.resolve_company_filter(&filters).await?;
        let models = if matches!(company_uuids.as_deref(), Some([])) {
            Vec::new()
        } else {
            self.store
                .list_all_biosecurity_imports(
                    &scope,
                    point_of_entry,
                    &filters,
                    company_uuids.as_deref(),
                )
                .await?
        };

        let mut rows: Vec<BiosecurityRow> = models.into_iter().map(BiosecurityRow::from).collect();
        self.denormalize(&mut rows).await?;

        let cells: Vec<Vec<String>> = rows
            .into_iter()
            .map(|r| {
                vec![
                    r.company.name,
                    r.permit_number,
                    r.country_of_origin,
                    r.product_name,
                    r.point_of_entry,
                    r.district,
                    r.quantity.to_string(),
                    r.arrival_date,
                    r.created_at,
                    r.created_by_username,
                ]
            })
            .collect();

        let payload = self
            .exporter
            .build(BIOSECURITY_IMPORT_FILENAME, EXPORT_HEADERS, &cells)?;
        Ok(ExportFile::from(payload))
    }
}
