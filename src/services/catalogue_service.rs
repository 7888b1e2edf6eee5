//! Domain service for the shared product catalogue.
//!
//! The catalogue is reference data: it is never scoped by district or company,
//! only guarded by privilege. Two read paths exist: the tokenized listing used
//! by current clients and a plain-row listing kept for older grid components.

use async_trait::async_trait;

use crate::models::Identity;
use crate::services::dto::{CatalogueInput, CatalogueRow, ExportFile, TokenizedPage};
use crate::services::error::DomainError;

#[async_trait]
pub trait CatalogueService: Send + Sync {
    /// Lists a catalogue page as a signed envelope.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Authorization`] without `Catalogue:Read`
    /// - [`DomainError::Validation`] on malformed filters
    async fn list(
        &self,
        identity: &Identity,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<TokenizedPage, DomainError>;

    /// Plain-row listing for clients that predate the envelope.
    async fn list_rows(
        &self,
        identity: &Identity,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<Vec<CatalogueRow>, DomainError>;

    async fn create(
        &self,
        identity: &Identity,
        input: CatalogueInput,
    ) -> Result<CatalogueRow, DomainError>;

    /// # Errors
    ///
    /// [`DomainError::Integrity`] when no live record carries the uuid.
    async fn update(
        &self,
        identity: &Identity,
        uuid: &str,
        input: CatalogueInput,
    ) -> Result<CatalogueRow, DomainError>;

    async fn delete(&self, identity: &Identity, uuid: &str) -> Result<bool, DomainError>;

    /// Exports every live catalogue row matching the filters as a workbook.
    async fn export(
        &self,
        identity: &Identity,
        filters: Option<&str>,
    ) -> Result<ExportFile, DomainError>;
}
