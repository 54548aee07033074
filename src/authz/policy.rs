use std::collections::HashMap;

use axum::http::Method;

use super::permissions;
use crate::errors::AppError;

/// Declared requirement for one routed action. Every action must carry an
/// explicit entry: either a required permission or a deliberate `Public`
/// marker (public still means authenticated and not banned).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPolicy {
    Public,
    Requires(&'static str),
}

/// Static action -> permission table keyed by method and route pattern.
/// Lookups that miss are denied by the guard; coverage over the registered
/// routes is verified once at startup so a renamed action cannot silently
/// fall out of the table.
#[derive(Debug, Clone, Default)]
pub struct PolicyMap {
    entries: HashMap<(Method, &'static str), ActionPolicy>,
}

impl PolicyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public(mut self, method: Method, path: &'static str) -> Self {
        self.entries.insert((method, path), ActionPolicy::Public);
        self
    }

    pub fn requires(mut self, method: Method, path: &'static str, permission: &'static str) -> Self {
        self.entries.insert((method, path), ActionPolicy::Requires(permission));
        self
    }

    pub fn lookup(&self, method: &Method, path: &str) -> Option<ActionPolicy> {
        self.entries
            .iter()
            .find(|((m, p), _)| m == method && *p == path)
            .map(|(_, policy)| *policy)
    }

    /// Startup check: every registered action must be declared.
    pub fn ensure_covers(&self, actions: &[(Method, &'static str)]) -> Result<(), AppError> {
        for (method, path) in actions {
            if !self.entries.contains_key(&(method.clone(), *path)) {
                return Err(AppError::configuration(format!(
                    "no action policy declared for {method} {path}"
                )));
            }
        }
        Ok(())
    }
}

/// The full policy table for the guarded surface. Only the vendor screens
/// carry declared permissions; the RBAC screens are explicitly public to
/// any authenticated principal, as in the original panel.
pub fn route_policies() -> PolicyMap {
    PolicyMap::new()
        // auth surface
        .public(Method::GET, "/auth/me")
        .public(Method::POST, "/auth/logout")
        // permissions
        .public(Method::GET, "/permissions")
        .public(Method::GET, "/permissions/create")
        .public(Method::POST, "/permissions")
        .public(Method::GET, "/permissions/:id/edit")
        .public(Method::PUT, "/permissions/:id")
        .public(Method::DELETE, "/permissions/:id/delete")
        // roles
        .public(Method::GET, "/roles")
        .public(Method::GET, "/roles/create")
        .public(Method::POST, "/roles")
        .public(Method::GET, "/roles/:id/edit")
        .public(Method::PUT, "/roles/:id")
        .public(Method::DELETE, "/roles/:id/delete")
        // users (no destroy action is wired up)
        .public(Method::GET, "/users")
        .public(Method::GET, "/users/create")
        .public(Method::POST, "/users")
        .public(Method::GET, "/users/:id/edit")
        .public(Method::PUT, "/users/:id")
        // vendors: the one guarded entity
        .requires(Method::GET, "/vendors", permissions::VIEW_VENDORS)
        .requires(Method::GET, "/vendors/create", permissions::CREATE_VENDORS)
        .requires(Method::POST, "/vendors", permissions::CREATE_VENDORS)
        .requires(Method::GET, "/vendors/:id/edit", permissions::EDIT_VENDORS)
        .requires(Method::PUT, "/vendors/:id", permissions::EDIT_VENDORS)
        .requires(Method::DELETE, "/vendors/:id/delete", permissions::DELETE_VENDORS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_misses_for_undeclared_actions() {
        let map = route_policies();
        assert_eq!(map.lookup(&Method::DELETE, "/users/:id/delete"), None);
        assert_eq!(map.lookup(&Method::GET, "/unknown"), None);
    }

    #[test]
    fn vendor_actions_require_their_permissions() {
        let map = route_policies();
        assert_eq!(
            map.lookup(&Method::GET, "/vendors"),
            Some(ActionPolicy::Requires("view vendors"))
        );
        assert_eq!(
            map.lookup(&Method::DELETE, "/vendors/:id/delete"),
            Some(ActionPolicy::Requires("delete vendors"))
        );
    }

    #[test]
    fn rbac_actions_are_explicitly_public() {
        let map = route_policies();
        assert_eq!(map.lookup(&Method::POST, "/permissions"), Some(ActionPolicy::Public));
        assert_eq!(map.lookup(&Method::PUT, "/roles/:id"), Some(ActionPolicy::Public));
    }

    #[test]
    fn ensure_covers_rejects_missing_declarations() {
        let map = route_policies();
        assert!(map.ensure_covers(&[(Method::GET, "/vendors")]).is_ok());
        assert!(map.ensure_covers(&[(Method::GET, "/vendors/:id/destroy")]).is_err());
    }
}
