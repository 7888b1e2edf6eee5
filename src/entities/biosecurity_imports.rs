use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "biosecurity_imports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: String,

    pub company_uuid: String,

    pub permit_number: String,

    pub country_of_origin: String,

    pub product_name: String,

    /// Control post the consignment cleared through. Officer visibility is
    /// scoped to this column unless the "All" sentinel is requested.
    pub point_of_entry: String,

    pub district: String,

    pub quantity: f64,

    pub arrival_date: String,

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
