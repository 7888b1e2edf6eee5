use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: String,

    #[sea_orm(unique)]
    pub name: String,

    /// JSON array of "Resource:Action" privilege strings. A literal "*" entry
    /// grants every privilege.
    pub privileges: String,

    pub created_at: String,

    pub updated_at: String,

    pub deleted_at: Option<String>,

    pub created_by_uuid: String,

    pub created_by_username: String,

    pub updated_by_uuid: String,

    pub updated_by_username: String,

    pub deleted_by_uuid: Option<String>,

    pub deleted_by_username: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
