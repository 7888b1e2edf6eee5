use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{audit_logs, biosecurity_imports, catalogues, companies, farm_areas, roles,
    users, vegetable_productions};
use crate::models::{Actor, ColumnFilter, PageParams};
use crate::services::scope::Scope;

pub mod migrator;
pub mod relations;
pub mod repositories;

pub use repositories::audit::AuditAction;
pub use repositories::biosecurity::{BiosecurityImportChanges, NewBiosecurityImport};
pub use repositories::catalogue::{CatalogueChanges, NewCatalogue};
pub use repositories::company::NewCompany;
pub use repositories::role::{NewRole, RoleChanges, parse_privileges};
pub use repositories::user::{NewUser, UserChanges};
pub use repositories::production::{NewProduction, ProductionChanges};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") && !db_url.contains("::memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn role_repo(&self) -> repositories::role::RoleRepository {
        repositories::role::RoleRepository::new(self.conn.clone())
    }

    fn company_repo(&self) -> repositories::company::CompanyRepository {
        repositories::company::CompanyRepository::new(self.conn.clone())
    }

    fn farm_area_repo(&self) -> repositories::farm_area::FarmAreaRepository {
        repositories::farm_area::FarmAreaRepository::new(self.conn.clone())
    }

    fn catalogue_repo(&self) -> repositories::catalogue::CatalogueRepository {
        repositories::catalogue::CatalogueRepository::new(self.conn.clone())
    }

    fn production_repo(&self) -> repositories::production::ProductionRepository {
        repositories::production::ProductionRepository::new(self.conn.clone())
    }

    fn biosecurity_repo(&self) -> repositories::biosecurity::BiosecurityRepository {
        repositories::biosecurity::BiosecurityRepository::new(self.conn.clone())
    }

    fn audit_repo(&self) -> repositories::audit::AuditRepository {
        repositories::audit::AuditRepository::new(self.conn.clone())
    }

    // ---- users ----

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_uuid(&self, uuid: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_uuid(uuid).await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        self.user_repo().username_exists(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn list_users(
        &self,
        scope: &Scope,
        filters: &[ColumnFilter],
        page: PageParams,
    ) -> Result<(Vec<users::Model>, u64)> {
        self.user_repo().list(scope, filters, page).await
    }

    pub async fn create_user(
        &self,
        new: NewUser,
        config: &SecurityConfig,
        actor: &Actor,
    ) -> Result<users::Model> {
        self.user_repo().insert(new, config, actor).await
    }

    pub async fn update_user(
        &self,
        uuid: &str,
        changes: UserChanges,
        actor: &Actor,
    ) -> Result<Option<users::Model>> {
        self.user_repo().update(uuid, changes, actor).await
    }

    pub async fn update_user_password(
        &self,
        username: &str,
        new_password: &str,
        config: &SecurityConfig,
        actor: &Actor,
    ) -> Result<()> {
        self.user_repo()
            .update_password(username, new_password, config, actor)
            .await
    }

    pub async fn soft_delete_user(
        &self,
        uuid: &str,
        actor: &Actor,
    ) -> Result<Option<users::Model>> {
        self.user_repo().soft_delete(uuid, actor).await
    }

    pub async fn deactivate_users_by_role(&self, role_uuid: &str, actor: &Actor) -> Result<u64> {
        self.user_repo().deactivate_by_role(role_uuid, actor).await
    }

    // ---- roles ----

    pub async fn list_roles(&self) -> Result<Vec<roles::Model>> {
        self.role_repo().list_all().await
    }

    pub async fn get_role_by_uuid(&self, uuid: &str) -> Result<Option<roles::Model>> {
        self.role_repo().get_by_uuid(uuid).await
    }

    pub async fn get_roles_by_uuids(&self, uuids: &[String]) -> Result<Vec<roles::Model>> {
        self.role_repo().get_by_uuids(uuids).await
    }

    pub async fn get_role_by_name(&self, name: &str) -> Result<Option<roles::Model>> {
        self.role_repo().get_by_name(name).await
    }

    pub async fn create_role(&self, new: NewRole, actor: &Actor) -> Result<roles::Model> {
        self.role_repo().insert(new, actor).await
    }

    pub async fn update_role(
        &self,
        uuid: &str,
        changes: RoleChanges,
        actor: &Actor,
    ) -> Result<Option<roles::Model>> {
        self.role_repo().update(uuid, changes, actor).await
    }

    pub async fn soft_delete_role(
        &self,
        uuid: &str,
        actor: &Actor,
    ) -> Result<Option<roles::Model>> {
        self.role_repo().soft_delete(uuid, actor).await
    }

    // ---- companies & farm areas ----

    pub async fn get_companies_by_uuids(&self, uuids: &[String]) -> Result<Vec<companies::Model>> {
        self.company_repo().get_by_uuids(uuids).await
    }

    pub async fn find_company_uuids_by_name(&self, name: &str) -> Result<Vec<String>> {
        self.company_repo().find_uuids_by_name(name).await
    }

    pub async fn company_uuids_for_ic(&self, ic_number: &str) -> Result<Vec<String>> {
        self.company_repo().uuids_for_ic(ic_number).await
    }

    pub async fn create_company(&self, new: NewCompany, actor: &Actor) -> Result<companies::Model> {
        self.company_repo().insert(new, actor).await
    }

    pub async fn link_farmer_company(&self, ic_number: &str, company_uuid: &str) -> Result<()> {
        self.company_repo().link_farmer(ic_number, company_uuid).await
    }

    pub async fn get_farm_areas_by_uuids(&self, uuids: &[String]) -> Result<Vec<farm_areas::Model>> {
        self.farm_area_repo().get_by_uuids(uuids).await
    }

    pub async fn create_farm_area(
        &self,
        name: &str,
        district: &str,
        actor: &Actor,
    ) -> Result<farm_areas::Model> {
        self.farm_area_repo().insert(name, district, actor).await
    }

    // ---- catalogues ----

    pub async fn list_catalogues(
        &self,
        filters: &[ColumnFilter],
        page: PageParams,
    ) -> Result<(Vec<catalogues::Model>, u64)> {
        self.catalogue_repo().list(filters, page).await
    }

    pub async fn list_all_catalogues(
        &self,
        filters: &[ColumnFilter],
    ) -> Result<Vec<catalogues::Model>> {
        self.catalogue_repo().list_all(filters).await
    }

    pub async fn get_catalogue_by_uuid(&self, uuid: &str) -> Result<Option<catalogues::Model>> {
        self.catalogue_repo().get_by_uuid(uuid).await
    }

    pub async fn create_catalogue(
        &self,
        new: NewCatalogue,
        actor: &Actor,
    ) -> Result<catalogues::Model> {
        self.catalogue_repo().insert(new, actor).await
    }

    pub async fn update_catalogue(
        &self,
        uuid: &str,
        changes: CatalogueChanges,
        actor: &Actor,
    ) -> Result<Option<catalogues::Model>> {
        self.catalogue_repo().update(uuid, changes, actor).await
    }

    pub async fn soft_delete_catalogue(
        &self,
        uuid: &str,
        actor: &Actor,
    ) -> Result<Option<catalogues::Model>> {
        self.catalogue_repo().soft_delete(uuid, actor).await
    }

    // ---- vegetable productions ----

    pub async fn list_productions(
        &self,
        scope: &Scope,
        filters: &[ColumnFilter],
        company_uuids: Option<&[String]>,
        page: PageParams,
    ) -> Result<(Vec<vegetable_productions::Model>, u64)> {
        self.production_repo()
            .list(scope, filters, company_uuids, page)
            .await
    }

    pub async fn list_all_productions(
        &self,
        scope: &Scope,
        filters: &[ColumnFilter],
        company_uuids: Option<&[String]>,
    ) -> Result<Vec<vegetable_productions::Model>> {
        self.production_repo()
            .list_all(scope, filters, company_uuids)
            .await
    }

    pub async fn get_production_by_uuid(
        &self,
        uuid: &str,
    ) -> Result<Option<vegetable_productions::Model>> {
        self.production_repo().get_by_uuid(uuid).await
    }

    pub async fn create_production(
        &self,
        new: NewProduction,
        actor: &Actor,
    ) -> Result<vegetable_productions::Model> {
        self.production_repo().insert(new, actor).await
    }

    pub async fn update_production(
        &self,
        uuid: &str,
        changes: ProductionChanges,
        actor: &Actor,
    ) -> Result<Option<vegetable_productions::Model>> {
        self.production_repo().update(uuid, changes, actor).await
    }

    pub async fn soft_delete_production(
        &self,
        uuid: &str,
        actor: &Actor,
    ) -> Result<Option<vegetable_productions::Model>> {
        self.production_repo().soft_delete(uuid, actor).await
    }

    // ---- biosecurity imports ----

    pub async fn list_biosecurity_imports(
        &self,
        scope: &Scope,
        point_of_entry: Option<&str>,
        filters: &[ColumnFilter],
        company_uuids: Option<&[String]>,
        page: PageParams,
    ) -> Result<(Vec<biosecurity_imports::Model>, u64)> {
        self.biosecurity_repo()
            .list(scope, point_of_entry, filters, company_uuids, page)
            .await
    }

    pub async fn list_all_biosecurity_imports(
        &self,
        scope: &Scope,
        point_of_entry: Option<&str>,
        filters: &[ColumnFilter],
        company_uuids: Option<&[String]>,
    ) -> Result<Vec<biosecurity_imports::Model>> {
        self.biosecurity_repo()
            .list_all(scope, point_of_entry, filters, company_uuids)
            .await
    }

    pub async fn get_biosecurity_by_uuid(
        &self,
        uuid: &str,
    ) -> Result<Option<biosecurity_imports::Model>> {
        self.biosecurity_repo().get_by_uuid(uuid).await
    }

    pub async fn create_biosecurity(
        &self,
        new: NewBiosecurityImport,
        actor: &Actor,
    ) -> Result<biosecurity_imports::Model> {
        self.biosecurity_repo().insert(new, actor).await
    }

    pub async fn update_biosecurity(
        &self,
        uuid: &str,
        changes: BiosecurityImportChanges,
        actor: &Actor,
    ) -> Result<Option<biosecurity_imports::Model>> {
        self.biosecurity_repo().update(uuid, changes, actor).await
    }

    pub async fn soft_delete_biosecurity(
        &self,
        uuid: &str,
        actor: &Actor,
    ) -> Result<Option<biosecurity_imports::Model>> {
        self.biosecurity_repo().soft_delete(uuid, actor).await
    }

    // ---- audit ----

    pub async fn append_audit(
        &self,
        entity: &str,
        entity_uuid: &str,
        action: AuditAction,
        snapshot: &serde_json::Value,
        actor: &Actor,
    ) -> Result<()> {
        self.audit_repo()
            .append(entity, entity_uuid, action, snapshot, actor)
            .await
    }

    pub async fn list_audit(
        &self,
        filters: &[ColumnFilter],
        page: PageParams,
    ) -> Result<(Vec<audit_logs::Model>, u64)> {
        self.audit_repo().list(filters, page).await
    }
}
