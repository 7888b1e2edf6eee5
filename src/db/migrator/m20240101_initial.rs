use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Seeded root credentials. The password must be rotated on first login.
pub const ROOT_USERNAME: &str = "root";
const ROOT_DEFAULT_PASSWORD: &[u8] = b"password";

pub const SUPERUSER_ROLE_NAME: &str = "Superuser";
pub const OFFICER_ROLE_NAME: &str = "Officer";
pub const FARMER_ROLE_NAME: &str = "Farmer";

const OFFICER_PRIVILEGES: &str = r#"["Catalogue:Read","Catalogue:Create","Catalogue:Update","Catalogue:Delete","Catalogue:Export","VegetableProduction:Read","VegetableProduction:Create","VegetableProduction:Update","VegetableProduction:Delete","VegetableProduction:Export","BiosecurityImport:Read","BiosecurityImport:Create","BiosecurityImport:Update","BiosecurityImport:Delete","BiosecurityImport:Export","AuditLog:Read"]"#;

const FARMER_PRIVILEGES: &str = r#"["Catalogue:Read","VegetableProduction:Read","VegetableProduction:Create","VegetableProduction:Update"]"#;

/// Hash the default root password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(ROOT_DEFAULT_PASSWORD, &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Roles)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(Companies)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(FarmerCompanies)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(FarmAreas)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(Catalogues)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(VegetableProductions)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(BiosecurityImports)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .create_table(
                schema
                    .create_table_from_entity(AuditLogs)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        seed_roles_and_root(manager).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BiosecurityImports).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VegetableProductions).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Catalogues).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FarmAreas).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FarmerCompanies).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Companies).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles).to_owned())
            .await?;

        Ok(())
    }
}

async fn seed_roles_and_root(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    use crate::entities::{roles, users};

    let now = chrono::Utc::now().to_rfc3339();
    let superuser_role_uuid = uuid::Uuid::new_v4().to_string();
    let root_uuid = uuid::Uuid::new_v4().to_string();

    let seed_role = |name: &str, role_uuid: &str, privileges: &str| {
        sea_orm_migration::sea_query::Query::insert()
            .into_table(Roles)
            .columns([
                roles::Column::Uuid,
                roles::Column::Name,
                roles::Column::Privileges,
                roles::Column::CreatedAt,
                roles::Column::UpdatedAt,
                roles::Column::CreatedByUuid,
                roles::Column::CreatedByUsername,
                roles::Column::UpdatedByUuid,
                roles::Column::UpdatedByUsername,
            ])
            .values_panic([
                role_uuid.into(),
                name.into(),
                privileges.into(),
                now.clone().into(),
                now.clone().into(),
                root_uuid.clone().into(),
                ROOT_USERNAME.into(),
                root_uuid.clone().into(),
                ROOT_USERNAME.into(),
            ])
            .to_owned()
    };

    manager
        .exec_stmt(seed_role(
            SUPERUSER_ROLE_NAME,
            &superuser_role_uuid,
            r#"["*"]"#,
        ))
        .await?;
    manager
        .exec_stmt(seed_role(
            OFFICER_ROLE_NAME,
            &uuid::Uuid::new_v4().to_string(),
            OFFICER_PRIVILEGES,
        ))
        .await?;
    manager
        .exec_stmt(seed_role(
            FARMER_ROLE_NAME,
            &uuid::Uuid::new_v4().to_string(),
            FARMER_PRIVILEGES,
        ))
        .await?;

    let password_hash = hash_default_password();

    let insert_root = sea_orm_migration::sea_query::Query::insert()
        .into_table(Users)
        .columns([
            users::Column::Uuid,
            users::Column::Username,
            users::Column::PasswordHash,
            users::Column::RoleUuid,
            users::Column::RegistrationType,
            users::Column::IcNumber,
            users::Column::District,
            users::Column::ControlPost,
            users::Column::EnforcementOnly,
            users::Column::Active,
            users::Column::CreatedAt,
            users::Column::UpdatedAt,
            users::Column::CreatedByUuid,
            users::Column::CreatedByUsername,
            users::Column::UpdatedByUuid,
            users::Column::UpdatedByUsername,
        ])
        .values_panic([
            root_uuid.clone().into(),
            ROOT_USERNAME.into(),
            password_hash.into(),
            superuser_role_uuid.into(),
            crate::constants::registration::OFFICER.into(),
            String::new().into(),
            String::new().into(),
            String::new().into(),
            false.into(),
            true.into(),
            now.clone().into(),
            now.into(),
            root_uuid.clone().into(),
            ROOT_USERNAME.into(),
            root_uuid.into(),
            ROOT_USERNAME.into(),
        ])
        .to_owned();

    manager.exec_stmt(insert_root).await?;

    Ok(())
}
