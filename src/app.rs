use std::sync::Arc;

use axum::http::Method;
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::{self, route_policies, PolicyMap};
use crate::errors::AppError;
use crate::jwt::JwtConfig;
use crate::routes::{auth, health, permissions, roles, users, vendors};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
    pub policies: Arc<PolicyMap>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig, policies: PolicyMap) -> Self {
        Self {
            pool,
            jwt: Arc::new(jwt),
            policies: Arc::new(policies),
        }
    }
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;

    let policies = route_policies();
    // refuse to boot with an undeclared action rather than fail open later
    policies.ensure_covers(&guarded_actions())?;

    let state = AppState::new(pool, jwt_config, policies);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/health", get(health::health))
        .route("/auth/login", post(auth::login));

    // guard order per request: authenticate -> ban check -> permission check
    let guarded = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/permissions", get(permissions::index).post(permissions::store))
        .route("/permissions/create", get(permissions::create_form))
        .route("/permissions/:id/edit", get(permissions::edit_form))
        .route("/permissions/:id", put(permissions::update))
        .route("/permissions/:id/delete", delete(permissions::destroy))
        .route("/roles", get(roles::index).post(roles::store))
        .route("/roles/create", get(roles::create_form))
        .route("/roles/:id/edit", get(roles::edit_form))
        .route("/roles/:id", put(roles::update))
        .route("/roles/:id/delete", delete(roles::destroy))
        .route("/users", get(users::index).post(users::store))
        .route("/users/create", get(users::create_form))
        .route("/users/:id/edit", get(users::edit_form))
        .route("/users/:id", put(users::update))
        .route("/vendors", get(vendors::index).post(vendors::store))
        .route("/vendors/create", get(vendors::create_form))
        .route("/vendors/:id/edit", get(vendors::edit_form))
        .route("/vendors/:id", put(vendors::update))
        .route("/vendors/:id/delete", delete(vendors::destroy))
        .layer(middleware::from_fn_with_state(state.clone(), authz::enforce_permission))
        .layer(middleware::from_fn(authz::enforce_not_banned))
        .layer(middleware::from_fn_with_state(state.clone(), authz::authenticate));

    let router = public
        .merge(guarded)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

/// Every guarded action, mirrored from the route table above. Checked against
/// the policy map at startup so the two cannot drift apart silently.
fn guarded_actions() -> Vec<(Method, &'static str)> {
    vec![
        (Method::GET, "/auth/me"),
        (Method::POST, "/auth/logout"),
        (Method::GET, "/permissions"),
        (Method::GET, "/permissions/create"),
        (Method::POST, "/permissions"),
        (Method::GET, "/permissions/:id/edit"),
        (Method::PUT, "/permissions/:id"),
        (Method::DELETE, "/permissions/:id/delete"),
        (Method::GET, "/roles"),
        (Method::GET, "/roles/create"),
        (Method::POST, "/roles"),
        (Method::GET, "/roles/:id/edit"),
        (Method::PUT, "/roles/:id"),
        (Method::DELETE, "/roles/:id/delete"),
        (Method::GET, "/users"),
        (Method::GET, "/users/create"),
        (Method::POST, "/users"),
        (Method::GET, "/users/:id/edit"),
        (Method::PUT, "/users/:id"),
        (Method::GET, "/vendors"),
        (Method::GET, "/vendors/create"),
        (Method::POST, "/vendors"),
        (Method::GET, "/vendors/:id/edit"),
        (Method::PUT, "/vendors/:id"),
        (Method::DELETE, "/vendors/:id/delete"),
    ]
}
