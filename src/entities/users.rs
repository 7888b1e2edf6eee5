use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub uuid: String,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub role_uuid: String,

    /// "officer" or "farmer"
    pub registration_type: String,

    /// IC/passport number. For farmers this is the reverse-lookup key into
    /// the farmer_companies links.
    pub ic_number: String,

    pub district: String,

    pub control_post: String,

    /// Enforcement officers see cross-district data.
    pub enforcement_only: bool,

    /// Cleared when the user's role is deleted; inactive users cannot log in.
    pub active: bool,

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
