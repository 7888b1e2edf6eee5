use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "catalogues")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: String,

    pub product_name: String,

    pub category: String,

    pub unit: String,

    pub description: String,

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
