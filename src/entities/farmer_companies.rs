use sea_orm::entity::prelude::*;

/// Link rows mapping a farmer's IC number to a registered company. A farmer may
/// control several companies; record visibility for farmers is derived from
/// this table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "farmer_companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: String,

    pub ic_number: String,

    pub company_uuid: String,

    pub created_at: String,

    pub deleted_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
