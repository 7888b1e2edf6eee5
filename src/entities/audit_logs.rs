use sea_orm::entity::prelude::*;

/// Append-only mutation trail. Rows are inserted once and never updated or
/// deleted; soft-deleted business records stay visible here.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: String,

    /// Entity name, e.g. "Catalogue".
    pub entity: String,

    pub entity_uuid: String,

    /// CREATE, UPDATE or DELETE.
    pub action: String,

    /// Full JSON snapshot of the payload (pre-delete snapshot for DELETE).
    pub snapshot: String,

    pub actor_uuid: String,

    pub actor_username: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
