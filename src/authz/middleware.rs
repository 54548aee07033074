use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::gate::is_allowed;
use super::policy::ActionPolicy;
use super::principal::Principal;
use crate::app::AppState;
use crate::errors::{AppError, AppResult};

/// First guard: resolve the bearer token to a `Principal` with a fresh
/// snapshot and stash it in the request extensions. Unauthenticated
/// requests stop here with 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    let token = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::unauthorized("Authorization header missing"))?;

    let claims = state.jwt.decode(token)?;
    let principal = Principal::load(&state.pool, claims.sub).await?;

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Second guard: a banned principal is rejected on every request,
/// independent of whatever permissions they hold.
pub async fn enforce_not_banned(req: Request, next: Next) -> AppResult<Response> {
    let principal = current_principal(&req)?;

    if principal.banned {
        tracing::info!(user_id = %principal.id, "banned principal rejected");
        return Err(AppError::unauthorized("Your account has been banned."));
    }

    Ok(next.run(req).await)
}

/// Third guard: resolve the matched route against the policy table and
/// evaluate the gate. An action with no declared policy is denied, never
/// forwarded.
pub async fn enforce_permission(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> AppResult<Response> {
    let principal = current_principal(&req)?.clone();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    match state.policies.lookup(&method, &path) {
        Some(ActionPolicy::Public) => Ok(next.run(req).await),
        Some(ActionPolicy::Requires(permission)) => {
            if is_allowed(&principal.snapshot, permission) {
                Ok(next.run(req).await)
            } else {
                tracing::debug!(
                    user_id = %principal.id,
                    permission = %permission,
                    "permission denied"
                );
                Err(AppError::forbidden(format!("missing permission: {permission}")))
            }
        }
        None => {
            tracing::warn!(%method, %path, "no action policy declared, denying");
            Err(AppError::forbidden("action has no declared permission policy"))
        }
    }
}

fn current_principal(req: &Request) -> AppResult<&Principal> {
    req.extensions()
        .get::<Principal>()
        .ok_or_else(|| AppError::unauthorized("request is not authenticated"))
}
