//! Transport DTOs shared by the tokenized and plain read paths.
//!
//! Internal auto-increment ids are surfaced as decimal strings: the transport
//! format has no safe 64-bit integer representation on the client side.
//! Relation objects default to empty values when the referenced row is
//! missing or soft-deleted.

use async_graphql::{InputObject, SimpleObject};
use serde::Serialize;
use serde_json::Value;

use crate::entities::{audit_logs, biosecurity_imports, catalogues, companies, farm_areas, roles,
    users, vegetable_productions};
use crate::services::envelope::Envelope;
use crate::services::error::DomainError;
use crate::services::exporter::ExportPayload;

/// Count plus the signed envelope carrying the page rows.
#[derive(Debug, Clone, SimpleObject)]
pub struct TokenizedPage {
    pub count: u64,
    pub token: String,
}

/// Signs a page of serializable rows into a [`TokenizedPage`].
pub fn tokenize<T: Serialize>(
    envelope: &Envelope,
    rows: &[T],
    count: u64,
) -> Result<TokenizedPage, DomainError> {
    let values: Vec<Value> = rows
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| DomainError::Internal(format!("Failed to serialize rows: {e}")))?;

    Ok(TokenizedPage {
        count,
        token: envelope.sign(values)?,
    })
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "ExportFile")]
pub struct ExportFile {
    pub file_name: String,
    pub content_base64: String,
}

impl From<ExportPayload> for ExportFile {
    fn from(payload: ExportPayload) -> Self {
        Self {
            file_name: payload.file_name,
            content_base64: payload.content_base64,
        }
    }
}

// ---- relation objects ----

#[derive(Debug, Clone, Default, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRef {
    pub id: String,
    pub uuid: String,
    pub registration_number: String,
    pub name: String,
    pub district: String,
}

impl From<&companies::Model> for CompanyRef {
    fn from(model: &companies::Model) -> Self {
        Self {
            id: model.id.to_string(),
            uuid: model.uuid.clone(),
            registration_number: model.registration_number.clone(),
            name: model.name.clone(),
            district: model.district.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct FarmAreaRef {
    pub id: String,
    pub uuid: String,
    pub name: String,
    pub district: String,
}

impl From<&farm_areas::Model> for FarmAreaRef {
    fn from(model: &farm_areas::Model) -> Self {
        Self {
            id: model.id.to_string(),
            uuid: model.uuid.clone(),
            name: model.name.clone(),
            district: model.district.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub id: String,
    pub uuid: String,
    pub name: String,
}

impl From<&roles::Model> for RoleRef {
    fn from(model: &roles::Model) -> Self {
        Self {
            id: model.id.to_string(),
            uuid: model.uuid.clone(),
            name: model.name.clone(),
        }
    }
}

// ---- rows ----

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueRow {
    pub id: String,
    pub uuid: String,
    pub product_name: String,
    pub category: String,
    pub unit: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_username: String,
    pub updated_by_username: String,
}

impl From<catalogues::Model> for CatalogueRow {
    fn from(model: catalogues::Model) -> Self {
        Self {
            id: model.id.to_string(),
            uuid: model.uuid,
            product_name: model.product_name,
            category: model.category,
            unit: model.unit,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
            created_by_username: model.created_by_username,
            updated_by_username: model.updated_by_username,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRow {
    pub id: String,
    pub uuid: String,
    pub company_uuid: String,
    pub farm_area_uuid: String,
    pub vegetable_name: String,
    pub quantity_kg: f64,
    pub harvest_date: String,
    pub district: String,
    /// Attached by the denormalizer; empty object when unresolved.
    pub company: CompanyRef,
    pub farm_area: FarmAreaRef,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_username: String,
    pub updated_by_username: String,
}

impl From<vegetable_productions::Model> for ProductionRow {
    fn from(model: vegetable_productions::Model) -> Self {
        Self {
            id: model.id.to_string(),
            uuid: model.uuid,
            company_uuid: model.company_uuid,
            farm_area_uuid: model.farm_area_uuid,
            vegetable_name: model.vegetable_name,
            quantity_kg: model.quantity_kg,
            harvest_date: model.harvest_date,
            district: model.district,
            company: CompanyRef::default(),
            farm_area: FarmAreaRef::default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
            created_by_username: model.created_by_username,
            updated_by_username: model.updated_by_username,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct BiosecurityRow {
    pub id: String,
    pub uuid: String,
    pub company_uuid: String,
    pub permit_number: String,
    pub country_of_origin: String,
    pub product_name: String,
    pub point_of_entry: String,
    pub district: String,
    pub quantity: f64,
    pub arrival_date: String,
    pub company: CompanyRef,
    pub created_at: String,
    pub updated_at: String,
    pub created_by_username: String,
    pub updated_by_username: String,
}

impl From<biosecurity_imports::Model> for BiosecurityRow {
    fn from(model: biosecurity_imports::Model) -> Self {
        Self {
            id: model.id.to_string(),
            uuid: model.uuid,
            company_uuid: model.company_uuid,
            permit_number: model.permit_number,
            country_of_origin: model.country_of_origin,
            product_name: model.product_name,
            point_of_entry: model.point_of_entry,
            district: model.district,
            quantity: model.quantity,
            arrival_date: model.arrival_date,
            company: CompanyRef::default(),
            created_at: model.created_at,
            updated_at: model.updated_at,
            created_by_username: model.created_by_username,
            updated_by_username: model.updated_by_username,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: String,
    pub uuid: String,
    pub username: String,
    pub role_uuid: String,
    pub role: RoleRef,
    pub registration_type: String,
    pub ic_number: String,
    pub district: String,
    pub control_post: String,
    pub enforcement_only: bool,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for UserRow {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id.to_string(),
            uuid: model.uuid,
            username: model.username,
            role_uuid: model.role_uuid,
            role: RoleRef::default(),
            registration_type: model.registration_type,
            ic_number: model.ic_number,
            district: model.district,
            control_post: model.control_post,
            enforcement_only: model.enforcement_only,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct RoleRow {
    pub id: String,
    pub uuid: String,
    pub name: String,
    pub privileges: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<roles::Model> for RoleRow {
    fn from(model: roles::Model) -> Self {
        let privileges = crate::db::parse_privileges(&model.privileges);
        Self {
            id: model.id.to_string(),
            uuid: model.uuid,
            name: model.name,
            privileges,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct AuditRow {
    pub id: String,
    pub uuid: String,
    pub entity: String,
    pub entity_uuid: String,
    pub action: String,
    pub snapshot: String,
    pub actor_uuid: String,
    pub actor_username: String,
    pub created_at: String,
}

impl From<audit_logs::Model> for AuditRow {
    fn from(model: audit_logs::Model) -> Self {
        Self {
            id: model.id.to_string(),
            uuid: model.uuid,
            entity: model.entity,
            entity_uuid: model.entity_uuid,
            action: model.action,
            snapshot: model.snapshot,
            actor_uuid: model.actor_uuid,
            actor_username: model.actor_username,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "AuditPage")]
pub struct AuditPage {
    pub count: u64,
    pub rows: Vec<AuditRow>,
}

// ---- mutation inputs ----
//
// Typed input objects replace envelope-wrapped mutation payloads. Server-owned
// fields (ids, timestamps, actor snapshots, relation objects) have no
// representation here, so clients cannot supply them.

#[derive(Debug, Clone, InputObject)]
pub struct CatalogueInput {
    pub product_name: String,
    pub category: String,
    pub unit: String,
    pub description: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct ProductionInput {
    pub company_uuid: String,
    pub farm_area_uuid: String,
    pub vegetable_name: String,
    pub quantity_kg: f64,
    pub harvest_date: String,
    pub district: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct BiosecurityImportInput {
    pub company_uuid: String,
    pub permit_number: String,
    pub country_of_origin: String,
    pub product_name: String,
    pub point_of_entry: String,
    pub district: String,
    pub quantity: f64,
    pub arrival_date: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct CreateUserInput {
    pub username: String,
    pub password: String,
    pub role_uuid: String,
    pub registration_type: String,
    pub ic_number: String,
    pub district: String,
    pub control_post: String,
    pub enforcement_only: bool,
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdateUserInput {
    pub role_uuid: String,
    pub registration_type: String,
    pub ic_number: String,
    pub district: String,
    pub control_post: String,
    pub enforcement_only: bool,
    pub active: bool,
}

#[derive(Debug, Clone, InputObject)]
pub struct RoleInput {
    pub name: String,
    pub privileges: Vec<String>,
}
