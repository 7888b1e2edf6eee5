//! HTTP transport: a single GraphQL endpoint behind a cookie session layer,
//! plus a health probe.

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

pub mod schema;

pub use schema::{AppSchema, MutationRoot, QueryRoot, build_schema};

use crate::constants::session::IDENTITY_KEY;
use crate::models::Identity;
use crate::state::SharedState;

#[derive(Clone)]
pub struct ApiState {
    pub schema: AppSchema,
    pub shared: SharedState,
}

/// Builds the full application router: session layer, CORS, trace layer and
/// the GraphQL and health routes.
pub async fn router(shared: SharedState) -> Router {
    let (cors_origins, secure_cookies, expiry_minutes) = {
        let config = shared.config.read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_expiry_minutes,
        )
    };

    let schema = build_schema(shared.clone());
    let state = ApiState { schema, shared };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            expiry_minutes,
        )));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/graphql", post(graphql_handler))
        .route("/health", get(health))
        .layer(session_layer)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

/// Loads the caller's identity out of the cookie session into request data
/// before execution; resolvers treat its absence as unauthenticated.
async fn graphql_handler(
    State(state): State<ApiState>,
    session: Session,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner().data(session.clone());

    if let Ok(Some(identity)) = session.get::<Identity>(IDENTITY_KEY).await {
        request = request.data(identity);
    }

    state.schema.execute(request).await.into()
}

async fn health(
    State(state): State<ApiState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match state.shared.store.ping().await {
        Ok(()) => Ok(Json(json!({ "status": "ok", "database": "up" }))),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "database": "down" })),
            ))
        }
    }
}
