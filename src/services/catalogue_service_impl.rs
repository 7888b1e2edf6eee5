//! `SeaORM` implementation of [`CatalogueService`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::constants::export::CATALOGUE_FILENAME;
use crate::db::{AuditAction, CatalogueChanges, NewCatalogue, Store};
use crate::models::{Identity, PageParams, listing::parse_filters};
use crate::services::catalogue_service::CatalogueService;
use crate::services::dto::{CatalogueInput, CatalogueRow, ExportFile, TokenizedPage, tokenize};
use crate::services::envelope::Envelope;
use crate::services::error::DomainError;
use crate::services::exporter::Exporter;
use crate::services::policy::{Action, Resource, authorize};

const EXPORT_HEADERS: &[&str] = &[
    "Product Name",
    "Category",
    "Unit",
    "Description",
    "Created At",
    "Created By",
];

pub struct SeaOrmCatalogueService {
    store: Arc<Store>,
    envelope: Arc<Envelope>,
    exporter: Arc<Exporter>,
}

impl SeaOrmCatalogueService {
    #[must_use]
    pub fn new(store: Arc<Store>, envelope: Arc<Envelope>, exporter: Arc<Exporter>) -> Self {
        Self {
            store,
            envelope,
            exporter,
        }
    }

    fn validate(input: &CatalogueInput) -> Result<(), DomainError> {
        if input.product_name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Product name is required".to_string(),
            ));
        }
        Ok(())
    }

    async fn audit(
        &self,
        action: AuditAction,
        row: &CatalogueRow,
        identity: &Identity,
    ) -> Result<(), DomainError> {
        let snapshot = serde_json::to_value(row)
            .map_err(|e| DomainError::Internal(format!("Failed to snapshot catalogue: {e}")))?;
        self.store
            .append_audit(
                &Resource::Catalogue.to_string(),
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
impl CatalogueService for SeaOrmCatalogueService {
    async fn list(
        &self,
        identity: &Identity,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<TokenizedPage, DomainError> {
        authorize(identity, Resource::Catalogue, Action::Read)?;

        let filters = parse_filters(filters)?;
        let page = PageParams::new(page_index, page_size);
        let (models, count) = self.store.list_catalogues(&filters, page).await?;

        let rows: Vec<CatalogueRow> = models.into_iter().map(CatalogueRow::from).collect();
        tokenize(&self.envelope, &rows, count)
    }

    async fn list_rows(
        &self,
        identity: &Identity,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<Vec<CatalogueRow>, DomainError> {
        authorize(identity, Resource::Catalogue, Action::Read)?;

        let filters = parse_filters(filters)?;
        let page = PageParams::new(page_index, page_size);
        let (models, _count) = self.store.list_catalogues(&filters, page).await?;

        Ok(models.into_iter().map(CatalogueRow::from).collect())
    }

    async fn create(
        &self,
        identity: &Identity,
        input: CatalogueInput,
    ) -> Result<CatalogueRow, DomainError> {
        authorize(identity, Resource::Catalogue, Action::Create)?;
        Self::validate(&input)?;

        let created = self
            .store
            .create_catalogue(
                NewCatalogue {
                    product_name: input.product_name,
                    category: input.category,
                    unit: input.unit,
                    description: input.description,
                },
                &identity.actor(),
            )
            .await?;

        let row = CatalogueRow::from(created);
        self.audit(AuditAction::Create, &row, identity).await?;
        info!(uuid = %row.uuid, "Catalogue entry created");
        Ok(row)
    }

    async fn update(
        &self,
        identity: &Identity,
        uuid: &str,
        input: CatalogueInput,
    ) -> Result<CatalogueRow, DomainError> {
        authorize(identity, Resource::Catalogue, Action::Update)?;
        Self::validate(&input)?;

        let updated = self
            .store
            .update_catalogue(
                uuid,
                CatalogueChanges {
                    product_name: input.product_name,
                    category: input.category,
                    unit: input.unit,
                    description: input.description,
                },
                &identity.actor(),
            )
            .await?
            .ok_or_else(|| {
                DomainError::Integrity("Catalogue entry not found".to_string())
            })?;

        let row = CatalogueRow::from(updated);
        self.audit(AuditAction::Update, &row, identity).await?;
        Ok(row)
    }

    async fn delete(&self, identity: &Identity, uuid: &str) -> Result<bool, DomainError> {
        authorize(identity, Resource::Catalogue, Action::Delete)?;

        let snapshot = self
            .store
            .soft_delete_catalogue(uuid, &identity.actor())
            .await?
            .ok_or_else(|| {
                DomainError::Integrity("Catalogue entry not found".to_string())
            })?;

        let row = CatalogueRow::from(snapshot);
        self.audit(AuditAction::Delete, &row, identity).await?;
        info!(uuid, "Catalogue entry deleted");
        Ok(true)
    }

    async fn export(
        &self,
        identity: &Identity,
        filters: Option<&str>,
    ) -> Result<ExportFile, DomainError> {
        authorize(identity, Resource::Catalogue, Action::Export)?;

        let filters = parse_filters(filters)?;
        let models = self.store.list_all_catalogues(&filters).await?;

        let rows: Vec<Vec<String>> = models
            .into_iter()
            .map(|m| {
                vec![
                    m.product_name,
                    m.category,
                    m.unit,
                    m.description,
                    m.created_at,
                    m.created_by_username,
                ]
            })
            .collect();

        let payload = self
            .exporter
            .build(CATALOGUE_FILENAME, EXPORT_HEADERS, &rows)?;
        Ok(ExportFile::from(payload))
    }
}
