//! GraphQL schema: one query root and one mutation root over the domain
//! services.
//!
//! The session guard lives here: the transport handler loads the caller's
//! [`Identity`] out of the cookie session into request data, and every guarded
//! resolver starts by demanding it. Domain errors surface on the GraphQL error
//! channel as their display messages.

use async_graphql::{Context, EmptySubscription, Object, Result, Schema};
use tower_sessions::Session;

use crate::constants::session::IDENTITY_KEY;
use crate::models::Identity;
use crate::services::DomainError;
use crate::services::dto::{AuditPage, BiosecurityImportInput, BiosecurityRow, CatalogueInput,
    CatalogueRow, CreateUserInput, ExportFile, ProductionInput, ProductionRow, RoleInput, RoleRow,
    TokenizedPage, UpdateUserInput, UserRow};
use crate::state::SharedState;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(state: SharedState) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

fn identity<'a>(ctx: &Context<'a>) -> Result<&'a Identity> {
    ctx.data_opt::<Identity>()
        .ok_or_else(|| DomainError::Authentication.into())
}

fn state<'a>(ctx: &Context<'a>) -> Result<&'a SharedState> {
    ctx.data::<SharedState>()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The caller's own account.
    async fn me(&self, ctx: &Context<'_>) -> Result<UserRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.auth_service.current_user(identity).await?)
    }

    /// Tokenized catalogue page.
    async fn catalogues(
        &self,
        ctx: &Context<'_>,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<String>,
    ) -> Result<TokenizedPage> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .catalogue_service
            .list(identity, page_index, page_size, filters.as_deref())
            .await?)
    }

    /// Plain catalogue rows; kept for clients that predate the envelope.
    async fn catalogue_rows(
        &self,
        ctx: &Context<'_>,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<String>,
    ) -> Result<Vec<CatalogueRow>> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .catalogue_service
            .list_rows(identity, page_index, page_size, filters.as_deref())
            .await?)
    }

    async fn vegetable_productions(
        &self,
        ctx: &Context<'_>,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<String>,
    ) -> Result<TokenizedPage> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .production_service
            .list(identity, page_index, page_size, filters.as_deref())
            .await?)
    }

    async fn biosecurity_imports(
        &self,
        ctx: &Context<'_>,
        point_of_entry: Option<String>,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<String>,
    ) -> Result<TokenizedPage> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .biosecurity_service
            .list(
                identity,
                point_of_entry.as_deref(),
                page_index,
                page_size,
                filters.as_deref(),
            )
            .await?)
    }

    async fn users(
        &self,
        ctx: &Context<'_>,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<String>,
    ) -> Result<TokenizedPage> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .admin_service
            .list_users(identity, page_index, page_size, filters.as_deref())
            .await?)
    }

    async fn roles(&self, ctx: &Context<'_>) -> Result<Vec<RoleRow>> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.admin_service.list_roles(identity).await?)
    }

    async fn audit_logs(
        &self,
        ctx: &Context<'_>,
        page_index: Option<u64>,
        page_size: Option<u64>,
        filters: Option<String>,
    ) -> Result<AuditPage> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .admin_service
            .list_audit(identity, page_index, page_size, filters.as_deref())
            .await?)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Step one of login: checks the password and returns the short-lived
    /// hop token. No session is created yet.
    async fn verify_credentials(
        &self,
        ctx: &Context<'_>,
        username: String,
        password: String,
    ) -> Result<String> {
        Ok(state(ctx)?
            .auth_service
            .verify_credentials(&username, &password)
            .await?)
    }

    /// Step two of login: exchanges the hop token for a cookie session.
    async fn login(&self, ctx: &Context<'_>, token: String) -> Result<UserRow> {
        let shared = state(ctx)?;
        let session = ctx.data::<Session>()?;

        let resolved = shared.auth_service.login(&token).await?;
        session.insert(IDENTITY_KEY, &resolved).await?;

        Ok(shared.auth_service.current_user(&resolved).await?)
    }

    async fn logout(&self, ctx: &Context<'_>) -> Result<bool> {
        let session = ctx.data::<Session>()?;
        session.flush().await?;
        Ok(true)
    }

    async fn change_password(
        &self,
        ctx: &Context<'_>,
        current_password: String,
        new_password: String,
    ) -> Result<bool> {
        let identity = identity(ctx)?;
        state(ctx)?
            .auth_service
            .change_password(identity, &current_password, &new_password)
            .await?;
        Ok(true)
    }

    // ---- catalogue ----

    async fn create_catalogue(
        &self,
        ctx: &Context<'_>,
        input: CatalogueInput,
    ) -> Result<CatalogueRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.catalogue_service.create(identity, input).await?)
    }

    async fn update_catalogue(
        &self,
        ctx: &Context<'_>,
        uuid: String,
        input: CatalogueInput,
    ) -> Result<CatalogueRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .catalogue_service
            .update(identity, &uuid, input)
            .await?)
    }

    async fn delete_catalogue(&self, ctx: &Context<'_>, uuid: String) -> Result<bool> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.catalogue_service.delete(identity, &uuid).await?)
    }

    async fn export_catalogues(
        &self,
        ctx: &Context<'_>,
        filters: Option<String>,
    ) -> Result<ExportFile> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .catalogue_service
            .export(identity, filters.as_deref())
            .await?)
    }

    // ---- vegetable production ----

    async fn create_vegetable_production(
        &self,
        ctx: &Context<'_>,
        input: ProductionInput,
    ) -> Result<ProductionRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.production_service.create(identity, input).await?)
    }

    async fn update_vegetable_production(
        &self,
        ctx: &Context<'_>,
        uuid: String,
        input: ProductionInput,
    ) -> Result<ProductionRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .production_service
            .update(identity, &uuid, input)
            .await?)
    }

    async fn delete_vegetable_production(&self, ctx: &Context<'_>, uuid: String) -> Result<bool> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.production_service.delete(identity, &uuid).await?)
    }

    async fn export_vegetable_productions(
        &self,
        ctx: &Context<'_>,
        filters: Option<String>,
    ) -> Result<ExportFile> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .production_service
            .export(identity, filters.as_deref())
            .await?)
    }

    // ---- biosecurity imports ----

    async fn create_biosecurity_import(
        &self,
        ctx: &Context<'_>,
        input: BiosecurityImportInput,
    ) -> Result<BiosecurityRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.biosecurity_service.create(identity, input).await?)
    }

    async fn update_biosecurity_import(
        &self,
        ctx: &Context<'_>,
        uuid: String,
        input: BiosecurityImportInput,
    ) -> Result<BiosecurityRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .biosecurity_service
            .update(identity, &uuid, input)
            .await?)
    }

    async fn delete_biosecurity_import(&self, ctx: &Context<'_>, uuid: String) -> Result<bool> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.biosecurity_service.delete(identity, &uuid).await?)
    }

    async fn export_biosecurity_imports(
        &self,
        ctx: &Context<'_>,
        point_of_entry: Option<String>,
        filters: Option<String>,
    ) -> Result<ExportFile> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .biosecurity_service
            .export(identity, point_of_entry.as_deref(), filters.as_deref())
            .await?)
    }

    // ---- administration ----

    async fn create_user(&self, ctx: &Context<'_>, input: CreateUserInput) -> Result<UserRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.admin_service.create_user(identity, input).await?)
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        uuid: String,
        input: UpdateUserInput,
    ) -> Result<UserRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .admin_service
            .update_user(identity, &uuid, input)
            .await?)
    }

    async fn delete_user(&self, ctx: &Context<'_>, uuid: String) -> Result<bool> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.admin_service.delete_user(identity, &uuid).await?)
    }

    async fn create_role(&self, ctx: &Context<'_>, input: RoleInput) -> Result<RoleRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.admin_service.create_role(identity, input).await?)
    }

    async fn update_role(
        &self,
        ctx: &Context<'_>,
        uuid: String,
        input: RoleInput,
    ) -> Result<RoleRow> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?
            .admin_service
            .update_role(identity, &uuid, input)
            .await?)
    }

    async fn delete_role(&self, ctx: &Context<'_>, uuid: String) -> Result<bool> {
        let identity = identity(ctx)?;
        Ok(state(ctx)?.admin_service.delete_role(identity, &uuid).await?)
    }
}
