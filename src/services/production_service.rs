//! Domain service for vegetable production records.
//!
//! Reads are visibility-scoped (farmers to their linked companies, district
//! officers to their district) and denormalized: the company and farm area
//! referenced by each page row are attached as embedded objects before the
//! page is sealed into the envelope.

use async_trait::async_trait;

use crate::models::Identity;
use crate::services::dto::{ExportFile, ProductionInput, ProductionRow, TokenizedPage};
use crate::services::error::DomainError;

#[async_trait]
pub trait ProductionService: Send + Sync {
    /// Lists a scoped, denormalized page as a signed envelope.
    ///
    /// A `companyName` filter is resolved to company UUIDs up front; when
    /// nothing matches, the result is empty without touching the main table.
    async fn list(
        &self,
        identity: &Identity,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<TokenizedPage, DomainError>;

    /// # Errors
    ///
    /// [`DomainError::Validation`] with a fill-in prompt when the company or
    /// farm area reference is blank.
    async fn create(
        &self,
        identity: &Identity,
        input: ProductionInput,
    ) -> Result<ProductionRow, DomainError>;

    /// Updates a record the caller can see. Records outside the caller's
    /// scope behave as absent.
    async fn update(
        &self,
        identity: &Identity,
        uuid: &str,
        input: ProductionInput,
    ) -> Result<ProductionRow, DomainError>;

    async fn delete(&self, identity: &Identity, uuid: &str) -> Result<bool, DomainError>;

    /// Exports every visible record matching the filters as a workbook.
    async fn export(
        &self,
        identity: &Identity,
        filters: Option<&str>,
    ) -> Result<ExportFile, DomainError>;
}
