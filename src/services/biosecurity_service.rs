//! Domain service for biosecurity import records.
//!
//! Reads take an optional point-of-entry argument on top of the caller's
//! scope: the literal `"All"` sentinel lifts the district/post restriction for
//! officers, while a concrete value narrows the result further.

use async_trait::async_trait;

use crate::models::Identity;
use crate::services::dto::{BiosecurityImportInput, BiosecurityRow, ExportFile, TokenizedPage};
use crate::services::error::DomainError;

#[async_trait]
pub trait BiosecurityService: Send + Sync {
    /// Lists a scoped, denormalized page as a signed envelope.
    async fn list(
        &self,
        identity: &Identity,
        point_of_entry: Option<&str>,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<&str>,
    ) -> Result<TokenizedPage, DomainError>;

    async fn create(
        &self,
        identity: &Identity,
        input: BiosecurityImportInput,
    ) -> Result<BiosecurityRow, DomainError>;

    /// Updates a record the caller can see. Records outside the caller's
    /// scope behave as absent.
    async fn update(
        &self,
        identity: &Identity,
        uuid: &str,
        input: BiosecurityImportInput,
    ) -> Result<BiosecurityRow, DomainError>;

    async fn delete(&self, identity: &Identity, uuid: &str) -> Result<bool, DomainError>;

    /// Exports every visible record matching the filters as a workbook.
    async fn export(
        &self,
        identity: &Identity,
        point_of_entry: Option<&str>,
        filters: Option<&str>,
    ) -> Result<ExportFile, DomainError>;
}
